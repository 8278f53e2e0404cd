// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Errors raised by geometry containers.

use thiserror::Error;

use crate::math::Vec3;

/// Errors emitted by [`BBox`](crate::BBox) construction and the spatial index.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GeomError {
    /// The box collapses to a line or a point (two or more flat axes).
    #[error("degenerate bounding box {min} - {max}: at most one axis may be flat")]
    Degenerate {
        /// Minimum corner after normalisation.
        min: Vec3,
        /// Maximum corner after normalisation.
        max: Vec3,
    },
    /// A coordinate was NaN or infinite.
    #[error("non-finite coordinate in bounding box {0} - {1}")]
    NonFinite(Vec3, Vec3),
    /// No entry with exactly these bounds and an equal value exists.
    #[error("no entry at {min} - {max} with that value")]
    NotFound {
        /// Minimum corner that was searched.
        min: Vec3,
        /// Maximum corner that was searched.
        max: Vec3,
    },
}
