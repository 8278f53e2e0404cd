// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

use crate::error::GeomError;
use crate::math::Vec3;

/// Axis-aligned bounding box in map space.
///
/// Invariants:
/// - `min` components are less than or equal to `max` components.
/// - Boxes built through [`BBox::checked`] are finite and flat on at most one
///   axis; a box flat on exactly one axis is a *plane*.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct BBox {
    min: Vec3,
    max: Vec3,
}

impl BBox {
    /// Builds a box from two opposite corners in any order.
    ///
    /// No validation beyond ordering is done; use this for query volumes,
    /// which may legitimately be points.
    pub fn new(a: Vec3, b: Vec3) -> Self {
        let (min, max) = Vec3::bbox(&a, &b);
        Self { min, max }
    }

    /// Builds a box for storage, rejecting non-finite and line/point boxes.
    ///
    /// # Errors
    /// [`GeomError::NonFinite`] if any coordinate is NaN or infinite,
    /// [`GeomError::Degenerate`] if two or more axes are flat.
    pub fn checked(a: Vec3, b: Vec3) -> Result<Self, GeomError> {
        if !a.is_finite() || !b.is_finite() {
            return Err(GeomError::NonFinite(a, b));
        }
        let bbox = Self::new(a, b);
        if bbox.flat_axes() >= 2 {
            return Err(GeomError::Degenerate {
                min: bbox.min,
                max: bbox.max,
            });
        }
        Ok(bbox)
    }

    /// Returns the minimum corner.
    pub fn min(&self) -> Vec3 {
        self.min
    }

    /// Returns the maximum corner.
    pub fn max(&self) -> Vec3 {
        self.max
    }

    /// Number of axes where `min == max`.
    pub fn flat_axes(&self) -> usize {
        (0..3)
            .filter(|&i| self.min.component(i) == self.max.component(i))
            .count()
    }

    /// `true` for a zero-thickness box flat on exactly one axis.
    ///
    /// Collision code treats these as one-sided planes rather than volumes.
    pub fn is_plane(&self) -> bool {
        self.flat_axes() == 1
    }

    /// Returns `true` if this box overlaps another (inclusive on faces).
    pub fn overlaps(&self, other: &Self) -> bool {
        (0..3).all(|i| {
            self.min.component(i) <= other.max.component(i)
                && other.min.component(i) <= self.max.component(i)
        })
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn inverted_corners_are_normalised() {
        let b = BBox::new(Vec3::new(10.0, 0.0, 5.0), Vec3::new(0.0, 10.0, -5.0));
        assert_eq!(b.min().to_array(), [0.0, 0.0, -5.0]);
        assert_eq!(b.max().to_array(), [10.0, 10.0, 5.0]);
    }

    #[test]
    fn planes_are_flagged_and_lines_rejected() {
        let plane =
            BBox::checked(Vec3::new(0.0, 0.0, 64.0), Vec3::new(128.0, 128.0, 64.0)).unwrap();
        assert!(plane.is_plane());
        let volume = BBox::checked(Vec3::ZERO, Vec3::new(1.0, 1.0, 1.0)).unwrap();
        assert!(!volume.is_plane());
        let line = BBox::checked(Vec3::ZERO, Vec3::new(0.0, 0.0, 64.0));
        assert!(matches!(line, Err(GeomError::Degenerate { .. })));
        let point = BBox::checked(Vec3::ZERO, Vec3::ZERO);
        assert!(matches!(point, Err(GeomError::Degenerate { .. })));
    }

    #[test]
    fn non_finite_is_rejected() {
        let err = BBox::checked(Vec3::new(f64::NAN, 0.0, 0.0), Vec3::new(1.0, 1.0, 1.0));
        assert!(matches!(err, Err(GeomError::NonFinite(..))));
    }

    #[test]
    fn touching_faces_overlap() {
        let a = BBox::new(Vec3::ZERO, Vec3::new(1.0, 1.0, 1.0));
        let b = BBox::new(Vec3::new(1.0, 0.0, 0.0), Vec3::new(2.0, 1.0, 1.0));
        let c = BBox::new(Vec3::new(1.5, 0.0, 0.0), Vec3::new(2.0, 1.0, 1.0));
        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c));
    }
}
