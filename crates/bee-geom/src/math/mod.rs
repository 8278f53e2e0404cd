// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Map-space math: points, Euler angles and rotation matrices.
//!
//! Everything uses `f64` because instance origins in map files are written
//! with full double precision and chain bearings are compared against tight
//! gradient thresholds.

mod angle;
mod matrix;
mod vec3;

pub use angle::Angle;
pub use matrix::Matrix;
pub use vec3::Vec3;

/// Converts degrees to radians.
pub fn deg_to_rad(value: f64) -> f64 {
    value.to_radians()
}

