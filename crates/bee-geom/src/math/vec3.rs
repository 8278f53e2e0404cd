// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

use core::fmt;

/// Point or direction in map space (hammer units).
///
/// * `x`/`y` are horizontal, `z` points up.
/// * Serialises as a plain `[x, y, z]` array when the `serde` feature is on.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(from = "[f64; 3]", into = "[f64; 3]"))]
pub struct Vec3 {
    data: [f64; 3],
}

impl Vec3 {
    /// The origin.
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    /// Unit vector pointing along the positive Z axis.
    pub const UNIT_Z: Self = Self::new(0.0, 0.0, 1.0);

    /// Creates a vector from components.
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { data: [x, y, z] }
    }

    /// Returns the components as an array.
    pub fn to_array(self) -> [f64; 3] {
        self.data
    }

    /// X component.
    pub fn x(&self) -> f64 {
        self.data[0]
    }

    /// Y component.
    pub fn y(&self) -> f64 {
        self.data[1]
    }

    /// Z component.
    pub fn z(&self) -> f64 {
        self.data[2]
    }

    pub(crate) fn component(&self, idx: usize) -> f64 {
        self.data[idx]
    }

    /// Subtracts another vector.
    pub fn sub(&self, other: &Self) -> Self {
        Self::new(
            self.component(0) - other.component(0),
            self.component(1) - other.component(1),
            self.component(2) - other.component(2),
        )
    }

    /// Scales the vector by a scalar.
    pub fn scale(&self, scalar: f64) -> Self {
        Self::new(
            self.component(0) * scalar,
            self.component(1) * scalar,
            self.component(2) * scalar,
        )
    }

    /// Length of the projection onto the horizontal plane.
    pub fn horizontal_length(&self) -> f64 {
        self.component(0).hypot(self.component(1))
    }

    /// Returns `true` if every component is finite.
    pub fn is_finite(&self) -> bool {
        self.data.iter().all(|c| c.is_finite())
    }

    /// Component-wise minimum and maximum of two points.
    pub fn bbox(a: &Self, b: &Self) -> (Self, Self) {
        (
            Self::new(
                a.component(0).min(b.component(0)),
                a.component(1).min(b.component(1)),
                a.component(2).min(b.component(2)),
            ),
            Self::new(
                a.component(0).max(b.component(0)),
                a.component(1).max(b.component(1)),
                a.component(2).max(b.component(2)),
            ),
        )
    }
}

impl From<[f64; 3]> for Vec3 {
    fn from(value: [f64; 3]) -> Self {
        Self { data: value }
    }
}

impl From<Vec3> for [f64; 3] {
    fn from(value: Vec3) -> Self {
        value.data
    }
}

impl fmt::Display for Vec3 {
    /// Writes the `x y z` form used by map keyvalues.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.data[0], self.data[1], self.data[2])
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn bbox_orders_components_independently() {
        let (min, max) = Vec3::bbox(&Vec3::new(5.0, -1.0, 3.0), &Vec3::new(1.0, 4.0, 3.0));
        assert_eq!(min.to_array(), [1.0, -1.0, 3.0]);
        assert_eq!(max.to_array(), [5.0, 4.0, 3.0]);
    }

    #[test]
    fn horizontal_length_ignores_height() {
        assert_eq!(Vec3::new(3.0, 4.0, 100.0).horizontal_length(), 5.0);
    }
}
