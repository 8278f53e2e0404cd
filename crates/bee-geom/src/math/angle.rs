// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

use core::fmt;

/// Euler angles in degrees, in the map's `pitch yaw roll` order.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(from = "[f64; 3]", into = "[f64; 3]"))]
pub struct Angle {
    /// Rotation around the Y axis.
    pub pitch: f64,
    /// Rotation around the Z axis.
    pub yaw: f64,
    /// Rotation around the X axis.
    pub roll: f64,
}

impl Angle {
    /// Creates an angle triple from degrees.
    pub const fn new(pitch: f64, yaw: f64, roll: f64) -> Self {
        Self { pitch, yaw, roll }
    }

    /// Pure yaw rotation, as used for floor-mounted endcaps.
    pub const fn from_yaw(yaw: f64) -> Self {
        Self::new(0.0, yaw, 0.0)
    }
}

impl From<[f64; 3]> for Angle {
    fn from([pitch, yaw, roll]: [f64; 3]) -> Self {
        Self::new(pitch, yaw, roll)
    }
}

impl From<Angle> for [f64; 3] {
    fn from(value: Angle) -> Self {
        [value.pitch, value.yaw, value.roll]
    }
}

impl fmt::Display for Angle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.pitch, self.yaw, self.roll)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_uses_keyvalue_form() {
        assert_eq!(Angle::from_yaw(270.0).to_string(), "0 270 0");
        assert_eq!(Angle::new(-90.0, 0.0, 45.5).to_string(), "-90 0 45.5");
    }

    #[test]
    fn array_conversion_keeps_order() {
        let ang = Angle::from([1.0, 2.0, 3.0]);
        assert_eq!(ang, Angle::new(1.0, 2.0, 3.0));
        assert_eq!(<[f64; 3]>::from(ang), [1.0, 2.0, 3.0]);
    }
}
