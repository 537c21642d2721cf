//! Spiral search waypoint generator
//!
//! When the rover is near the collection zone but its markers are not in view, waypoints are
//! generated on circles around the zone pose. Each step advances 45 degrees around the circle and
//! grows the radius by one eighth of the configured increment, producing an outward expanding
//! octagonal spiral which guarantees eventual re-detection of the zone's markers without
//! requiring dead-reckoning precision.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

// External
use nalgebra::Vector2;
use serde::Serialize;

// Internal
use super::Params;
use swarm_if::loc::Pose;
use util::maths::rem_euclid;

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Angular advance per spiral step.
const STEP_ANGLE_RAD: f64 = std::f64::consts::FRAC_PI_4;

/// Number of steps per full spiral revolution.
const STEPS_PER_REVOLUTION: f64 = std::f64::consts::TAU / STEP_ANGLE_RAD;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// State of the spiral search generator.
#[derive(Debug, Default, Clone, Serialize)]
pub struct SpiralSearch {
    /// True once at least one spiral waypoint has been generated this trip.
    started: bool,

    /// Angle around the zone of the next waypoint, in [0, 2pi).
    spin_angle_rad: f64,

    /// Current growth of the circle radius over the base radius.
    radius_growth_m: f64,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl SpiralSearch {
    /// True once at least one spiral waypoint has been generated this trip.
    pub fn started(&self) -> bool {
        self.started
    }

    /// The angle of the next waypoint around the zone.
    pub fn spin_angle_rad(&self) -> f64 {
        self.spin_angle_rad
    }

    /// The current radius growth over the base radius.
    pub fn radius_growth_m(&self) -> f64 {
        self.radius_growth_m
    }

    /// Return the generator to its initial state.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Generate the next spiral waypoint around the zone pose.
    ///
    /// The waypoint's heading is the bearing from the rover's current pose to the waypoint, so
    /// the drive controller arrives facing outwards along the spiral.
    pub fn step(&mut self, zone_pose: &Pose, current_pose: &Pose, params: &Params) -> Pose {
        let radius_m = params.spiral_base_radius_m + self.radius_growth_m;

        let offset_m = radius_m * Vector2::new(self.spin_angle_rad.cos(), self.spin_angle_rad.sin());
        let target = Pose::new(zone_pose.x_m + offset_m[0], zone_pose.y_m + offset_m[1], 0.0);

        self.spin_angle_rad = rem_euclid(self.spin_angle_rad + STEP_ANGLE_RAD, std::f64::consts::TAU);
        self.radius_growth_m += params.spiral_radius_increment_m / STEPS_PER_REVOLUTION;
        self.started = true;

        Pose::new(target.x_m, target.y_m, current_pose.bearing_to(&target))
    }
}
