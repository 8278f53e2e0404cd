// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![doc = r"Geometry primitives for the puzzle compiler.

This crate provides:
- Map-space math (`Vec3`, `Angle`, `Matrix`).
- Axis-aligned bounding boxes (`BBox`) with plane detection.
- An R-tree keyed by bounding boxes (`RTree`) for broad-phase lookups.
- Grid rectangle covering (`grid_optim::optimise`) for merging tiles.

Design notes:
- Overlap is inclusive on faces everywhere.
- Containers are plain synchronous data structures with no internal locking.
"]

/// Errors raised by geometry containers.
pub mod error;
/// Broad-phase lookup structures.
pub mod broad;
/// Rectangle covering for sparse 2D grids.
pub mod grid_optim;
/// Vectors, angles and rotation matrices.
pub mod math;
/// Foundational geometric types.
pub mod types;

pub use broad::tree::RTree;
pub use error::GeomError;
pub use grid_optim::{optimise, Rect};
pub use math::{Angle, Matrix, Vec3};
pub use types::bbox::BBox;
