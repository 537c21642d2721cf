//! # Behaviour controller output command definitions
//!
//! Each behaviour controller produces one [`CtrlOutput`] per tick. Exactly one drive mode is
//! meaningful per tick; consumers must ignore the fields of modes which are not active rather
//! than treating them as zero-commands.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use crate::loc::Pose;

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// The shared CPFA lifecycle tag.
///
/// Owned by the forager decision logic, which reads and writes it between behaviours. Behaviour
/// controllers receive the current value each tick and return it, possibly updated, in their
/// output.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ForagerState {
    Start,
    SetSearchLocation,
    TravelToSearchSite,
    SearchWithUninformedWalk,
    SearchWithInformedWalk,
    SenseLocalResourceDensity,
    ReturnToNest,
}

/// Which behaviour should receive control after a handoff.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BehaviorTarget {
    /// Stay with the current behaviour and do nothing.
    Wait,

    /// Hand control back to the behaviour which preceded the current one.
    PrevProcess,

    /// Hand control to the next behaviour in the foraging cycle.
    NextProcess,
}

/// The drive demand produced by a behaviour controller for one tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DriveCmd {
    /// No drive demand, hand control to the named behaviour.
    Behavior(BehaviorTarget),

    /// Long-range waypoint driving. The drive controller follows the targets in order with an
    /// accuracy of roughly 15 cm.
    Waypoints(Vec<Pose>),

    /// Short-range precision driving. The drive controller holds the demanded velocity while
    /// nulling the angular error through its feedback loop, accurate to under 1 cm.
    Precision {
        /// Demanded linear velocity, negative for reversing.
        ///
        /// Units: meters/second
        linear_velocity_ms: f64,

        /// Angular error to be nulled, positive when the target is to the left of the heading.
        ///
        /// Units: radians
        angular_error_rad: f64,
    },
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Full output of a behaviour controller for one tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CtrlOutput {
    /// The drive demand for this tick.
    pub drive: DriveCmd,

    /// Demanded gripper angle, or `None` to leave the gripper where it is.
    ///
    /// Units: radians
    pub gripper_angle_rad: Option<f64>,

    /// Demanded wrist angle, or `None` to leave the wrist where it is.
    ///
    /// Units: radians
    pub wrist_angle_rad: Option<f64>,

    /// True if the behaviour has finished and asks the arbiter to reset it before reuse.
    pub reset_requested: bool,

    /// The shared CPFA lifecycle tag, propagated or updated by the controller.
    pub forager_state: ForagerState,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl CtrlOutput {
    /// An output with no drive demand, handing control to the given behaviour.
    pub fn behavior(target: BehaviorTarget, forager_state: ForagerState) -> Self {
        Self {
            drive: DriveCmd::Behavior(target),
            gripper_angle_rad: None,
            wrist_angle_rad: None,
            reset_requested: false,
            forager_state,
        }
    }

    /// A waypoint driving output.
    pub fn waypoints(wpts: Vec<Pose>, forager_state: ForagerState) -> Self {
        Self {
            drive: DriveCmd::Waypoints(wpts),
            gripper_angle_rad: None,
            wrist_angle_rad: None,
            reset_requested: false,
            forager_state,
        }
    }

    /// A precision driving output.
    pub fn precision(
        linear_velocity_ms: f64,
        angular_error_rad: f64,
        forager_state: ForagerState,
    ) -> Self {
        Self {
            drive: DriveCmd::Precision {
                linear_velocity_ms,
                angular_error_rad,
            },
            gripper_angle_rad: None,
            wrist_angle_rad: None,
            reset_requested: false,
            forager_state,
        }
    }
}

impl DriveCmd {
    /// Returns true if this is a precision driving demand.
    pub fn is_precision(&self) -> bool {
        matches!(self, DriveCmd::Precision { .. })
    }

    /// Returns true if this is a waypoint driving demand.
    pub fn is_waypoints(&self) -> bool {
        matches!(self, DriveCmd::Waypoints(_))
    }
}
