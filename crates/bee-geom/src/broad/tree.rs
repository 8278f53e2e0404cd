// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

use core::fmt;

use rstar::{PointDistance, RTreeObject, AABB};
use tracing::trace;

use crate::error::GeomError;
use crate::math::Vec3;
use crate::types::bbox::BBox;

type Point = [f64; 3];

#[derive(Debug, Clone, PartialEq)]
struct Entry<V> {
    bbox: BBox,
    value: V,
}

fn envelope_of(bbox: &BBox) -> AABB<Point> {
    AABB::from_corners(bbox.min().to_array(), bbox.max().to_array())
}

impl<V> RTreeObject for Entry<V> {
    type Envelope = AABB<Point>;

    fn envelope(&self) -> Self::Envelope {
        envelope_of(&self.bbox)
    }
}

impl<V> PointDistance for Entry<V> {
    // Distance to the nearest face, zero inside the box.
    fn distance_2(&self, point: &Point) -> f64 {
        self.envelope().distance_2(point)
    }
}

/// A three-dimensional R-tree mapping bounding boxes to values.
///
/// Several values may share the same bounds; each `(bbox, value)` pair is a
/// separate entry and can be removed on its own. Inserting a pair that is
/// already present is a no-op.
///
/// Not internally synchronised: wrap in a lock if steps share one.
pub struct RTree<V> {
    tree: rstar::RTree<Entry<V>>,
}

impl<V> Default for RTree<V> {
    fn default() -> Self {
        Self {
            tree: rstar::RTree::new(),
        }
    }
}

impl<V> fmt::Debug for RTree<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RTree")
            .field("len", &self.tree.size())
            .finish_non_exhaustive()
    }
}

impl<V> RTree<V> {
    /// Creates an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `(bbox, value)` pairs stored.
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    /// Returns `true` if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    /// Iterates every stored box with its value, in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (BBox, &V)> + '_ {
        self.tree.iter().map(|e| (e.bbox, &e.value))
    }

    /// Finds all values whose box intersects the box spanned by `p1`/`p2`.
    ///
    /// The query box may be degenerate; a point query returns every box
    /// containing that point.
    pub fn find_bbox(&self, p1: Vec3, p2: Vec3) -> impl Iterator<Item = &V> + '_ {
        let query = envelope_of(&BBox::new(p1, p2));
        self.tree
            .locate_in_envelope_intersecting(&query)
            .map(|e| &e.value)
    }

    /// Finds the values nearest to `point`.
    ///
    /// At least `min_count` values are returned when the tree holds that many.
    /// Entries at exactly the same distance as the last one included are
    /// returned as well, so the result can be longer than `min_count`.
    /// Distance is measured to the nearest face of each box (zero inside).
    pub fn find_nearest(&self, point: Vec3, min_count: usize) -> Vec<&V> {
        let mut found = Vec::with_capacity(min_count);
        let mut cutoff: Option<f64> = None;
        for (entry, dist2) in self.tree.nearest_neighbor_iter_with_distance_2(&point.to_array()) {
            if found.len() >= min_count {
                match cutoff {
                    Some(last) if dist2 <= last => {}
                    _ => break,
                }
            }
            found.push(&entry.value);
            cutoff = Some(dist2);
        }
        found
    }
}

impl<V: PartialEq + Clone> RTree<V> {
    fn locate_exact(&self, bbox: &BBox, value: &V) -> Option<&Entry<V>> {
        self.tree
            .locate_in_envelope(&envelope_of(bbox))
            .find(|e| e.bbox == *bbox && e.value == *value)
    }

    /// Adds `value` occupying the box spanned by `p1`/`p2`.
    ///
    /// Returns `Ok(false)` if the exact pair was already present.
    ///
    /// # Errors
    /// [`GeomError::NonFinite`] or [`GeomError::Degenerate`] if the box is
    /// unusable; see [`BBox::checked`].
    pub fn insert(&mut self, p1: Vec3, p2: Vec3, value: V) -> Result<bool, GeomError> {
        let bbox = BBox::checked(p1, p2)?;
        if self.locate_exact(&bbox, &value).is_some() {
            trace!(min = %bbox.min(), max = %bbox.max(), "duplicate insert ignored");
            return Ok(false);
        }
        self.tree.insert(Entry { bbox, value });
        Ok(true)
    }

    /// Removes the entry with exactly these bounds and an equal value.
    ///
    /// Other entries sharing the bounds are left alone.
    ///
    /// # Errors
    /// [`GeomError::NotFound`] if no such entry exists.
    pub fn remove(&mut self, p1: Vec3, p2: Vec3, value: &V) -> Result<V, GeomError> {
        let bbox = BBox::new(p1, p2);
        let not_found = || GeomError::NotFound {
            min: bbox.min(),
            max: bbox.max(),
        };
        let probe = self.locate_exact(&bbox, value).cloned().ok_or_else(not_found)?;
        self.tree
            .remove(&probe)
            .map(|e| e.value)
            .ok_or_else(not_found)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    fn v(x: f64, y: f64, z: f64) -> Vec3 {
        Vec3::new(x, y, z)
    }

    #[test]
    fn point_query_hits_overlapping_boxes() {
        let mut tree = RTree::new();
        tree.insert(v(0.0, 0.0, 0.0), v(10.0, 10.0, 10.0), "a").unwrap();
        tree.insert(v(5.0, 5.0, 5.0), v(15.0, 15.0, 15.0), "b").unwrap();
        let mut found: Vec<_> = tree
            .find_bbox(v(6.0, 6.0, 6.0), v(6.0, 6.0, 6.0))
            .copied()
            .collect();
        found.sort_unstable();
        assert_eq!(found, ["a", "b"]);
    }

    #[test]
    fn shared_bounds_are_independent() {
        let mut tree = RTree::new();
        assert!(tree.insert(v(0.0, 0.0, 0.0), v(1.0, 1.0, 1.0), 1).unwrap());
        assert!(tree.insert(v(1.0, 1.0, 1.0), v(0.0, 0.0, 0.0), 2).unwrap());
        assert!(!tree.insert(v(0.0, 0.0, 0.0), v(1.0, 1.0, 1.0), 1).unwrap());
        assert_eq!(tree.len(), 2);

        assert_eq!(tree.remove(v(0.0, 0.0, 0.0), v(1.0, 1.0, 1.0), &1), Ok(1));
        let left: Vec<_> = tree.find_bbox(v(0.5, 0.5, 0.5), v(0.5, 0.5, 0.5)).copied().collect();
        assert_eq!(left, [2]);
        assert!(matches!(
            tree.remove(v(0.0, 0.0, 0.0), v(1.0, 1.0, 1.0), &1),
            Err(GeomError::NotFound { .. })
        ));
    }

    #[test]
    fn remove_requires_exact_bounds() {
        let mut tree = RTree::new();
        tree.insert(v(0.0, 0.0, 0.0), v(4.0, 4.0, 4.0), 'x').unwrap();
        assert!(tree.remove(v(0.0, 0.0, 0.0), v(4.0, 4.0, 5.0), &'x').is_err());
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn touching_boundary_counts_as_intersection() {
        let mut tree = RTree::new();
        tree.insert(v(0.0, 0.0, 0.0), v(8.0, 8.0, 8.0), 0u8).unwrap();
        assert_eq!(tree.find_bbox(v(8.0, 0.0, 0.0), v(9.0, 1.0, 1.0)).count(), 1);
        assert_eq!(tree.find_bbox(v(8.5, 0.0, 0.0), v(9.0, 1.0, 1.0)).count(), 0);
    }

    #[test]
    fn plane_boxes_can_be_stored() {
        let mut tree = RTree::new();
        tree.insert(v(0.0, 0.0, 64.0), v(128.0, 128.0, 64.0), "floor").unwrap();
        assert!(tree.iter().all(|(bbox, _)| bbox.is_plane()));
        assert!(tree.insert(v(0.0, 0.0, 0.0), v(0.0, 0.0, 64.0), "line").is_err());
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn nearest_includes_ties() {
        let mut tree = RTree::new();
        tree.insert(v(10.0, -1.0, -1.0), v(12.0, 1.0, 1.0), "east").unwrap();
        tree.insert(v(-12.0, -1.0, -1.0), v(-10.0, 1.0, 1.0), "west").unwrap();
        tree.insert(v(100.0, -1.0, -1.0), v(102.0, 1.0, 1.0), "far").unwrap();

        let mut near = tree.find_nearest(Vec3::ZERO, 1);
        near.sort_unstable();
        assert_eq!(near, [&"east", &"west"]);

        let all = tree.find_nearest(Vec3::ZERO, 3);
        assert_eq!(all.len(), 3);
        assert!(tree.find_nearest(Vec3::ZERO, 0).is_empty());
    }
}
