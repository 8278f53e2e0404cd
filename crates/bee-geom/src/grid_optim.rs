// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Collapse a sparse 2D grid of zone values into covering rectangles.
//!
//! Used to merge runs of identical tiles or voxels into as few brushes as
//! practical. The greedy two-direction growth is not guaranteed minimal, but
//! it is deterministic for a given grid.

use std::collections::BTreeMap;

/// One output rectangle, inclusive on both corners.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Rect<V> {
    /// Smallest X covered.
    pub min_x: i32,
    /// Smallest Y covered.
    pub min_y: i32,
    /// Largest X covered.
    pub max_x: i32,
    /// Largest Y covered.
    pub max_y: i32,
    /// Zone value shared by every covered cell.
    pub value: V,
}

/// Lazily covers a grid; see [`optimise`].
#[derive(Debug)]
pub struct Optimise<V> {
    grid: BTreeMap<(i32, i32), V>,
}

/// Partitions `grid` into non-overlapping rectangles of equal value.
///
/// Cells are visited in ascending `(x, y)` order. From each unconsumed cell
/// two candidates are grown: X first then Y, and Y first then X. The larger
/// candidate wins, with ties going to X-first. Covered cells are removed from
/// the grid, so every input cell ends up in exactly one rectangle.
pub fn optimise<V, I>(grid: I) -> Optimise<V>
where
    V: PartialEq,
    I: IntoIterator<Item = ((i32, i32), V)>,
{
    Optimise {
        grid: grid.into_iter().collect(),
    }
}

impl<V: PartialEq> Optimise<V> {
    fn matches(&self, x: i32, y: i32, seed: &V) -> bool {
        self.grid.get(&(x, y)).is_some_and(|v| v == seed)
    }

    // Both bounds are inclusive.
    fn grow(&self, min_x: i32, min_y: i32, seed: &V) -> (i32, i32) {
        let x1 = extend(min_x, |x| self.matches(x, min_y, seed));
        let y1 = extend(min_y, |y| (min_x..=x1).all(|x| self.matches(x, y, seed)));

        let y2 = extend(min_y, |y| self.matches(min_x, y, seed));
        let x2 = extend(min_x, |x| (min_y..=y2).all(|y| self.matches(x, y, seed)));

        if span(min_x, x1) * span(min_y, y1) >= span(min_x, x2) * span(min_y, y2) {
            (x1, y1)
        } else {
            (x2, y2)
        }
    }
}

/// Last coordinate reached by stepping up from `start` while `ok` holds.
/// Stops at `i32::MAX` instead of wrapping.
fn extend(start: i32, ok: impl Fn(i32) -> bool) -> i32 {
    let mut end = start;
    while let Some(next) = end.checked_add(1) {
        if !ok(next) {
            break;
        }
        end = next;
    }
    end
}

fn span(min: i32, max: i32) -> i64 {
    i64::from(max) - i64::from(min) + 1
}

impl<V: PartialEq> Iterator for Optimise<V> {
    type Item = Rect<V>;

    fn next(&mut self) -> Option<Rect<V>> {
        let (&(min_x, min_y), seed) = self.grid.first_key_value()?;
        let (max_x, max_y) = self.grow(min_x, min_y, seed);

        let mut value = None;
        for x in min_x..=max_x {
            for y in min_y..=max_y {
                let cell = self.grid.remove(&(x, y));
                if value.is_none() {
                    value = cell;
                }
            }
        }
        Some(Rect {
            min_x,
            min_y,
            max_x,
            max_y,
            value: value?,
        })
    }
}
