//! # Localisation types

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// The planar pose of a rover (or a target point) in the shared World frame.
///
/// Headings follow the right hand rule about the World Z+ (upwards) axis, with zero along the
/// World X+ axis.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    /// Position along the World X axis.
    ///
    /// Units: meters
    pub x_m: f64,

    /// Position along the World Y axis.
    ///
    /// Units: meters
    pub y_m: f64,

    /// Heading to the World X+ axis.
    ///
    /// Units: radians
    pub heading_rad: f64,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Pose {
    pub fn new(x_m: f64, y_m: f64, heading_rad: f64) -> Self {
        Self {
            x_m,
            y_m,
            heading_rad,
        }
    }

    /// Get the planar distance between this pose and another.
    pub fn distance_to(&self, other: &Pose) -> f64 {
        (other.x_m - self.x_m).hypot(other.y_m - self.y_m)
    }

    /// Get the bearing (angle to the World X+ axis) from this pose to another.
    ///
    /// Bearings are given in the range [-pi, pi].
    pub fn bearing_to(&self, other: &Pose) -> f64 {
        (other.y_m - self.y_m).atan2(other.x_m - self.x_m)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_distance_to() {
        let a = Pose::new(0.0, 0.0, 0.0);
        let b = Pose::new(3.0, 4.0, 1.0);

        assert_eq!(a.distance_to(&b), 5.0);
        assert_eq!(b.distance_to(&a), 5.0);
        assert_eq!(a.distance_to(&a), 0.0);
    }

    #[test]
    fn test_bearing_to() {
        let origin = Pose::default();

        assert_eq!(origin.bearing_to(&Pose::new(1.0, 0.0, 0.0)), 0.0);
        assert_eq!(
            origin.bearing_to(&Pose::new(0.0, 1.0, 0.0)),
            std::f64::consts::FRAC_PI_2
        );
        assert_eq!(
            origin.bearing_to(&Pose::new(-1.0, 0.0, 0.0)),
            std::f64::consts::PI
        );
    }
}
