// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

use crate::math::{deg_to_rad, Angle, Vec3};

/// Row-major 3×3 rotation matrix.
///
/// Rows are the rotated basis vectors: row 0 is *forward* (+X), row 1 is
/// *left* (+Y) and row 2 is *up* (+Z). Vectors are treated as rows, so
/// rotating computes `v * M`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Matrix {
    data: [[f64; 3]; 3],
}

impl Default for Matrix {
    fn default() -> Self {
        Self::identity()
    }
}

impl Matrix {
    /// Returns the identity rotation.
    pub const fn identity() -> Self {
        Self {
            data: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
        }
    }

    /// Builds the rotation for a `pitch yaw roll` triple.
    ///
    /// Roll is applied first, then pitch, then yaw, matching how the engine
    /// orients instances.
    pub fn from_angle(angle: &Angle) -> Self {
        let (sin_p, cos_p) = deg_to_rad(angle.pitch).sin_cos();
        let (sin_y, cos_y) = deg_to_rad(angle.yaw).sin_cos();
        let (sin_r, cos_r) = deg_to_rad(angle.roll).sin_cos();
        Self {
            data: [
                [cos_p * cos_y, cos_p * sin_y, -sin_p],
                [
                    sin_p * sin_r * cos_y - cos_r * sin_y,
                    sin_p * sin_r * sin_y + cos_r * cos_y,
                    sin_r * cos_p,
                ],
                [
                    sin_p * cos_r * cos_y + sin_r * sin_y,
                    sin_p * cos_r * sin_y - sin_r * cos_y,
                    cos_r * cos_p,
                ],
            ],
        }
    }

    fn row(&self, idx: usize) -> Vec3 {
        Vec3::from(self.data[idx])
    }

    /// The rotated +X axis.
    pub fn forward(&self) -> Vec3 {
        self.row(0)
    }

    /// The rotated +Z axis.
    pub fn up(&self) -> Vec3 {
        self.row(2)
    }
}
