//! Parameters structure for DropOffCtrl

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::Deserialize;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Parameters for the drop-off controller.
///
/// These are process-wide tunables owned by the shared configuration, alongside the forager-wide
/// CPFA probability and decay parameters. The controller never re-derives them.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Params {

    // ---- DETECTION ----

    /// The marker id reserved for the collection zone by the detection pipeline.
    pub zone_marker_id: u32,

    /// Correction added to each marker's horizontal image offset to compensate for the camera
    /// being mounted off the rover's centreline.
    ///
    /// Units: meters
    pub camera_offset_correction_m: f64,

    /// Range inside which the zone markers can be expected to be visible.
    ///
    /// Units: meters
    pub visual_range_m: f64,

    // ---- CENTERING ----

    /// Number of zone markers that must be seen in a single frame before the controller trusts
    /// that it is driving into the zone rather than along an edge.
    pub center_tag_threshold: u32,

    /// Time without a sufficient marker count after which the zone is treated as passed over and
    /// the drop sequence may begin.
    ///
    /// Units: seconds
    pub drop_delay_s: f64,

    /// Time without any marker in view, while approaching, after which the approach is aborted
    /// back to the coarse return.
    ///
    /// Units: seconds
    pub lost_center_cutoff_s: f64,

    /// Forward velocity used while searching for and driving at the zone markers.
    ///
    /// Units: meters/second
    pub search_velocity_ms: f64,

    /// Angular error demanded while turning onto the marker boundary.
    ///
    /// Units: radians
    pub centering_turn_rate_rad: f64,

    /// Linear velocity demanded while turning onto the marker boundary. Negative, the rover backs
    /// into its turns to keep the markers in frame.
    ///
    /// Units: meters/second
    pub edge_creep_velocity_ms: f64,

    /// Marker pitch magnitude beyond which the pitch sign selects the turn side once enough
    /// markers have been seen.
    ///
    /// Units: radians
    pub pitch_steer_threshold_rad: f64,

    // ---- SPIRAL SEARCH ----

    /// Radius of the first spiral search circle around the zone pose.
    ///
    /// Units: meters
    pub spiral_base_radius_m: f64,

    /// Radius growth per full spiral revolution.
    ///
    /// Units: meters
    pub spiral_radius_increment_m: f64,

    /// Phase-elapsed time before the spiral search starts generating waypoints.
    ///
    /// Units: seconds
    pub spiral_start_delay_s: f64,

    // ---- DROP SEQUENCE ----

    /// Elapsed time at which the approach creep ends and the item is released.
    ///
    /// Units: seconds
    pub drop_creep_end_s: f64,

    /// Elapsed time at which the exit handoff begins arming.
    ///
    /// Units: seconds
    pub drop_exit_start_s: f64,

    /// Forward velocity of the approach creep.
    ///
    /// Units: meters/second
    pub creep_velocity_ms: f64,

    /// Reversing velocity used to clear the released item.
    ///
    /// Units: meters/second
    pub release_reverse_velocity_ms: f64,

    // ---- END EFFECTOR ----

    /// Wrist angle used while carrying an item.
    ///
    /// Units: radians
    pub wrist_carry_angle_rad: f64,

    /// Wrist angle used while creeping over the zone, ready to drop.
    ///
    /// Units: radians
    pub wrist_raised_angle_rad: f64,

    /// Gripper angle which releases the held item.
    ///
    /// Units: radians
    pub gripper_open_angle_rad: f64,
}
