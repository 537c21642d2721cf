//! Implementations for the DropOffCtrl state structure

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

// External
use log::{debug, info};
use serde::Serialize;

// Internal
use super::{DropOffCtrlError, Params, SpiralSearch};
use swarm_if::{
    ctrl::{BehaviorTarget, CtrlOutput, ForagerState},
    loc::Pose,
};
use util::params;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Drop-off controller state.
///
/// One instance is constructed per rover process and reused for every foraging trip; the caller
/// must invoke [`DropOffCtrl::reset`] between trips. All calls must come from a single logical
/// thread, the controller provides no internal locking.
#[derive(Debug)]
pub struct DropOffCtrl {
    pub(crate) params: Params,

    /// Current phase of the docking state machine.
    pub(crate) phase: DockingPhase,

    // ---- INGESTED INPUTS ----
    pub(crate) current_pose: Pose,
    pub(crate) zone_pose: Pose,
    pub(crate) count_left: u32,
    pub(crate) count_right: u32,

    /// Average pitch over the zone markers of the current frame, `None` while no frame with zone
    /// markers has been seen. Stale values must not steer: the centering logic only reads this
    /// when the current count is non-zero.
    pub(crate) avg_pitch_rad: Option<f64>,

    pub(crate) holding_item: bool,
    pub(crate) clock_ms: i64,

    // ---- TIMERS ----
    /// Clock value at which the current top-level phase started, `None` before the first tick.
    pub(crate) phase_start_ms: Option<i64>,

    /// Clock value at which a sufficient marker count was last seen.
    pub(crate) last_sufficient_ms: i64,

    // ---- HYSTERESIS & LATCHES ----
    pub(crate) spiral: SpiralSearch,
    pub(crate) seen_enough_markers: bool,
    pub(crate) prev_marker_count: u32,

    /// True until the controller has performed its one-tick yield on first taking over from an
    /// active precision-driving mode.
    pub(crate) first_activation: bool,

    pub(crate) precision_driving: bool,
    pub(crate) waypoint_pending: bool,
    pub(crate) waypoint_interrupt_latched: bool,
    pub(crate) precision_interrupt_latched: bool,

    pub(crate) report: StatusReport,
}

/// Status report for DropOffCtrl processing, a per-tick monitoring snapshot.
#[derive(Debug, Default, Clone, Copy, Serialize)]
pub struct StatusReport {
    /// The phase in force when the tick was processed.
    pub phase: DockingPhase,

    /// Planar distance from the current pose to the zone pose.
    pub distance_to_zone_m: f64,

    /// Total zone marker count ingested for the tick.
    pub marker_count: u32,

    /// Time elapsed in the current phase.
    pub elapsed_s: f64,

    /// True once a sufficient marker count has latched the centering hysteresis.
    pub seen_enough_markers: bool,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// The mutually exclusive phases of the docking state machine.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum DockingPhase {
    /// Constructed or reset, no tick processed yet.
    Idle,

    /// Waypoint driving towards the zone pose.
    ReturningCoarse,

    /// Generating spiral search waypoints around the zone pose.
    SearchingSpiral,

    /// Precision driving on the zone markers.
    Centering,

    /// Markers lost during centering, riding out the dropout.
    Recovering,

    /// Zone reached, running the timed drop sequence.
    Dropping(DropPhase),
}

/// Sub-phases of the timed drop sequence.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum DropPhase {
    /// Creep forward over the zone with the wrist raised.
    Creep,

    /// Open the gripper and reverse clear of the item.
    Release,

    /// Exit armed; the handoff is finalised on the next tick.
    Exit,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for DockingPhase {
    fn default() -> Self {
        DockingPhase::Idle
    }
}

impl DockingPhase {
    /// A flat name for the phase, including the drop sub-phase.
    pub fn name(&self) -> &'static str {
        match self {
            DockingPhase::Idle => "Idle",
            DockingPhase::ReturningCoarse => "ReturningCoarse",
            DockingPhase::SearchingSpiral => "SearchingSpiral",
            DockingPhase::Centering => "Centering",
            DockingPhase::Recovering => "Recovering",
            DockingPhase::Dropping(DropPhase::Creep) => "DroppingCreep",
            DockingPhase::Dropping(DropPhase::Release) => "DroppingRelease",
            DockingPhase::Dropping(DropPhase::Exit) => "DroppingExit",
        }
    }
}

// Serialised as the flat name so that reports containing a phase archive cleanly to CSV
impl Serialize for DockingPhase {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.name())
    }
}

impl DropOffCtrl {
    /// Initialise the DropOffCtrl module, loading parameters from the given file.
    pub fn init(params_path: &str) -> Result<Self, DropOffCtrlError> {
        let params = match params::load(params_path) {
            Ok(p) => p,
            Err(e) => return Err(DropOffCtrlError::ParamLoadError(e)),
        };

        Ok(Self::with_params(params))
    }

    /// Build a controller directly from a parameter structure.
    pub fn with_params(params: Params) -> Self {
        Self {
            params,
            phase: DockingPhase::Idle,
            current_pose: Pose::default(),
            zone_pose: Pose::default(),
            count_left: 0,
            count_right: 0,
            avg_pitch_rad: None,
            holding_item: false,
            clock_ms: 0,
            phase_start_ms: None,
            last_sufficient_ms: 0,
            spiral: SpiralSearch::default(),
            seen_enough_markers: false,
            prev_marker_count: 0,
            first_activation: true,
            precision_driving: false,
            waypoint_pending: false,
            waypoint_interrupt_latched: false,
            precision_interrupt_latched: false,
            report: StatusReport::default(),
        }
    }

    /// The current phase of the docking state machine.
    pub fn phase(&self) -> DockingPhase {
        self.phase
    }

    /// The controller's parameters.
    pub fn params(&self) -> &Params {
        &self.params
    }

    /// The spiral search generator state.
    pub fn spiral(&self) -> &SpiralSearch {
        &self.spiral
    }

    /// The status report for the most recent tick.
    pub fn status_report(&self) -> StatusReport {
        self.report
    }

    /// True while the controller wants the precision driving mode.
    pub fn is_changing_mode(&self) -> bool {
        self.precision_driving
    }

    /// Perform one tick of the docking state machine.
    ///
    /// Pose, zone pose, markers and clock must have been ingested for this tick before calling.
    /// The shared CPFA lifecycle tag is passed in and returned in the output, possibly updated.
    pub fn tick(&mut self, forager_state: ForagerState) -> CtrlOutput {
        let now_ms = self.clock_ms;

        // Start the phase timer on the first tick
        let phase_start_ms = *self.phase_start_ms.get_or_insert(now_ms);
        let elapsed_s = millis_to_seconds(now_ms - phase_start_ms);

        // Once the zone is reached the drop sequence owns the output unconditionally
        if let DockingPhase::Dropping(sub) = self.phase {
            self.report = StatusReport {
                phase: self.phase,
                distance_to_zone_m: self.current_pose.distance_to(&self.zone_pose),
                marker_count: 0,
                elapsed_s,
                seen_enough_markers: self.seen_enough_markers,
            };

            return self.drop_sequence_step(sub, elapsed_s, forager_state);
        }

        let count = self.count_left + self.count_right;
        let distance_to_zone_m = self.current_pose.distance_to(&self.zone_pose);

        self.report = StatusReport {
            phase: self.phase,
            distance_to_zone_m,
            marker_count: count,
            elapsed_s,
            seen_enough_markers: self.seen_enough_markers,
        };

        // Coarse waypoint return while the zone is out of visual range and the spiral search has
        // not begun
        if distance_to_zone_m > self.params.visual_range_m && !self.spiral.started() && count == 0
        {
            debug!(
                "Zone {:.2} m away, issuing coarse return waypoint",
                distance_to_zone_m
            );

            self.phase = DockingPhase::ReturningCoarse;
            self.precision_driving = false;
            self.waypoint_pending = false;
            self.phase_start_ms = Some(now_ms);

            let mut out = CtrlOutput::waypoints(vec![self.zone_pose], ForagerState::ReturnToNest);
            out.wrist_angle_rad = Some(self.params.wrist_carry_angle_rad);
            return out;
        }

        let was_approaching = matches!(
            self.phase,
            DockingPhase::Centering | DockingPhase::Recovering
        );

        // Spiral search step. This does not return early: the centering and recovery logic below
        // may overwrite the command within the same tick.
        let mut pending: Option<CtrlOutput> = None;
        if elapsed_s >= self.params.spiral_start_delay_s {
            let wp = self
                .spiral
                .step(&self.zone_pose, &self.current_pose, &self.params);

            if !was_approaching {
                self.phase = DockingPhase::SearchingSpiral;
            }

            pending = Some(CtrlOutput::waypoints(vec![wp], forager_state));
        }

        // Refresh the sufficient-markers stamp while there is no approach to time out
        if (!was_approaching && !self.seen_enough_markers)
            || (count > 0 && !self.seen_enough_markers)
        {
            self.last_sufficient_ms = now_ms;
        }

        // Markers in view now, or recently, or the hysteresis latch is set: centre on the zone
        if count > 0 || self.seen_enough_markers || self.prev_marker_count > 0 {
            return self.centering_step(count, now_ms, forager_state);
        }
        // No markers at all while an approach was in progress: recovery
        else if was_approaching {
            return self.recovery_step(now_ms, forager_state);
        }

        // Nothing took over the tick: either the spiral waypoint stands, or there is nothing to do
        pending.unwrap_or_else(|| {
            let mut out = CtrlOutput::behavior(BehaviorTarget::Wait, forager_state);
            out.wrist_angle_rad = Some(self.params.wrist_carry_angle_rad);
            out
        })
    }

    /// Reset the controller to its initial state for the next foraging trip.
    ///
    /// Cancels all in-progress phases immediately. Idempotent.
    pub fn reset(&mut self) {
        debug!("DropOffCtrl reset");

        self.phase = DockingPhase::Idle;
        self.count_left = 0;
        self.count_right = 0;
        self.avg_pitch_rad = None;
        self.holding_item = false;
        self.phase_start_ms = None;
        self.last_sufficient_ms = 0;
        self.spiral.reset();
        self.seen_enough_markers = false;
        self.prev_marker_count = 0;
        self.first_activation = true;
        self.precision_driving = false;
        self.waypoint_pending = false;
        self.waypoint_interrupt_latched = false;
        self.precision_interrupt_latched = false;
        self.report = StatusReport::default();
    }

    // ---- MODE ARBITER ----

    /// Returns true if the controller has a waypoint or precision-drive command pending.
    ///
    /// While the spiral search has just started the controller deliberately reports no work for
    /// the first moments, giving the drive controller time to act on the spiral waypoint before
    /// this controller claims the arbiter's attention.
    pub fn has_work(&mut self) -> bool {
        let elapsed_s = match self.phase_start_ms {
            Some(t) => millis_to_seconds(self.clock_ms - t),
            None => -1.0,
        };

        if self.spiral.started()
            && elapsed_s < self.params.spiral_start_delay_s
            && !self.precision_driving
        {
            return false;
        }

        self.waypoint_pending || self.precision_driving
    }

    /// Edge-triggered interrupt request towards the behaviour arbiter.
    ///
    /// Returns true exactly once per transition into needing waypoint control, once per
    /// transition into needing precision-drive control, and on every tick once the drop-sequence
    /// exit has armed so the arbiter reliably regains control.
    pub fn should_interrupt(&mut self) -> bool {
        self.process_data();

        if self.waypoint_pending && !self.waypoint_interrupt_latched {
            self.waypoint_interrupt_latched = true;
            self.precision_interrupt_latched = false;
            return true;
        }

        if self.precision_driving && !self.precision_interrupt_latched {
            self.precision_interrupt_latched = true;
            return true;
        }

        matches!(self.phase, DockingPhase::Dropping(DropPhase::Exit))
    }

    /// Derive the needed driving mode from the current tick's marker counts.
    fn process_data(&mut self) {
        if self.count_left + self.count_right > 0 {
            self.precision_driving = true;
        } else {
            self.waypoint_pending = true;
        }
    }

    // ---- HELPERS ----

    /// Declare arrival at the collection zone and arm the drop sequence timer.
    pub(crate) fn declare_arrival(&mut self, now_ms: i64) {
        info!("Collection zone reached, starting drop sequence");

        self.phase = DockingPhase::Dropping(DropPhase::Creep);
        self.phase_start_ms = Some(now_ms);
    }
}

/// Convert a millisecond count into seconds.
pub(crate) fn millis_to_seconds(ms: i64) -> f64 {
    ms as f64 / 1e3
}

#[cfg(test)]
mod test {
    use super::*;
    use swarm_if::ctrl::DriveCmd;
    use swarm_if::marker::MarkerObservation;

    fn test_params() -> Params {
        Params {
            zone_marker_id: 256,
            camera_offset_correction_m: 0.02,
            visual_range_m: 1.0,
            center_tag_threshold: 8,
            drop_delay_s: 1.8,
            lost_center_cutoff_s: 3.0,
            search_velocity_ms: 0.15,
            centering_turn_rate_rad: 0.15,
            edge_creep_velocity_ms: -0.1,
            pitch_steer_threshold_rad: 0.5,
            spiral_base_radius_m: 0.6,
            spiral_radius_increment_m: 0.5,
            spiral_start_delay_s: 2.0,
            drop_creep_end_s: 3.0,
            drop_exit_start_s: 12.0,
            creep_velocity_ms: 0.05,
            release_reverse_velocity_ms: -0.15,
            wrist_carry_angle_rad: 1.0,
            wrist_raised_angle_rad: 0.0,
            gripper_open_angle_rad: std::f64::consts::FRAC_PI_2,
        }
    }

    /// A controller holding an item, near the zone, with its clock at 1 s.
    fn near_zone_ctrl() -> DropOffCtrl {
        let mut ctrl = DropOffCtrl::with_params(test_params());
        ctrl.set_item_held(true);
        ctrl.set_zone_pose(Pose::default());
        ctrl.set_current_pose(Pose::new(-0.3, 0.0, 0.0));
        ctrl.set_clock_ms(1000);
        ctrl
    }

    /// Build a frame with the given number of zone markers per side.
    fn frame(n_left: u32, n_right: u32, pitch_rad: f64) -> Vec<MarkerObservation> {
        let mut markers = Vec::new();
        for _ in 0..n_left {
            markers.push(MarkerObservation {
                id: 256,
                image_x_m: -0.5,
                pitch_rad,
            });
        }
        for _ in 0..n_right {
            markers.push(MarkerObservation {
                id: 256,
                image_x_m: 0.5,
                pitch_rad,
            });
        }
        markers
    }

    #[test]
    fn test_coarse_return_beyond_visual_range() {
        let mut ctrl = DropOffCtrl::with_params(test_params());
        ctrl.set_item_held(true);
        ctrl.set_zone_pose(Pose::default());
        ctrl.set_current_pose(Pose::new(5.0, 0.0, std::f64::consts::PI));
        ctrl.set_clock_ms(1000);

        let out = ctrl.tick(ForagerState::Start);

        assert_eq!(out.drive, DriveCmd::Waypoints(vec![Pose::default()]));
        assert_eq!(out.forager_state, ForagerState::ReturnToNest);
        assert_eq!(ctrl.phase(), DockingPhase::ReturningCoarse);
        assert!(!ctrl.is_changing_mode());
    }

    #[test]
    fn test_spiral_search_after_hold_off() {
        let mut ctrl = near_zone_ctrl();
        ctrl.set_current_pose(Pose::new(-0.5, 0.0, 0.0));

        // First tick starts the phase timer, no spiral yet
        let out = ctrl.tick(ForagerState::Start);
        assert_eq!(out.drive, DriveCmd::Behavior(BehaviorTarget::Wait));
        assert!(!ctrl.spiral().started());

        // 2.5 s into the phase the spiral generates its first waypoint on the base circle
        ctrl.set_clock_ms(3500);
        let out = ctrl.tick(ForagerState::Start);

        match out.drive {
            DriveCmd::Waypoints(ref wpts) => {
                assert_eq!(wpts.len(), 1);
                assert!((wpts[0].x_m - 0.6).abs() < 1e-12);
                assert!(wpts[0].y_m.abs() < 1e-12);
            }
            ref d => panic!("expected waypoints, got {:?}", d),
        }

        assert_eq!(ctrl.phase(), DockingPhase::SearchingSpiral);
        assert!(ctrl.spiral().started());
        assert!((ctrl.spiral().spin_angle_rad() - std::f64::consts::FRAC_PI_4).abs() < 1e-12);
        assert!((ctrl.spiral().radius_growth_m() - 0.5 / 8.0).abs() < 1e-12);
    }

    #[test]
    fn test_centering_left_only_edge_follow() {
        let mut ctrl = near_zone_ctrl();
        ctrl.set_markers(&frame(3, 0, -0.1));

        let out = ctrl.tick(ForagerState::SearchWithInformedWalk);

        match out.drive {
            DriveCmd::Precision {
                linear_velocity_ms,
                angular_error_rad,
            } => {
                assert!((linear_velocity_ms - (-0.1)).abs() < 1e-12);
                assert!((angular_error_rad - (-0.15)).abs() < 1e-12);
            }
            ref d => panic!("expected precision drive, got {:?}", d),
        }

        // The tag is propagated, not overwritten, while centering
        assert_eq!(out.forager_state, ForagerState::SearchWithInformedWalk);
        assert_eq!(ctrl.phase(), DockingPhase::Centering);
        assert_eq!(ctrl.prev_marker_count, 3);
        assert!(ctrl.is_changing_mode());
    }

    #[test]
    fn test_centering_both_sides_drives_straight() {
        let mut ctrl = near_zone_ctrl();
        ctrl.set_markers(&frame(2, 2, 0.0));

        let out = ctrl.tick(ForagerState::Start);

        assert_eq!(
            out.drive,
            DriveCmd::Precision {
                linear_velocity_ms: 0.15,
                angular_error_rad: 0.0
            }
        );
    }

    #[test]
    fn test_pitch_steering_when_seen_enough() {
        let mut ctrl = near_zone_ctrl();
        ctrl.seen_enough_markers = true;
        ctrl.last_sufficient_ms = 1000;
        ctrl.set_markers(&frame(0, 2, 0.8));

        let out = ctrl.tick(ForagerState::Start);

        // Pitch > threshold steers right, with the turn direction inverted by -3
        assert_eq!(
            out.drive,
            DriveCmd::Precision {
                linear_velocity_ms: -0.1 * -3.0,
                angular_error_rad: 0.15 * -3.0
            }
        );
    }

    #[test]
    fn test_stale_pitch_not_used_when_no_markers() {
        let mut ctrl = near_zone_ctrl();
        ctrl.seen_enough_markers = true;
        ctrl.last_sufficient_ms = 1000;
        ctrl.avg_pitch_rad = Some(0.8);

        // No markers this tick: entered via the hysteresis latch, pitch must not steer
        let out = ctrl.tick(ForagerState::Start);

        assert_eq!(
            out.drive,
            DriveCmd::Precision {
                linear_velocity_ms: 0.15,
                angular_error_rad: 0.0
            }
        );
    }

    #[test]
    fn test_first_activation_yields_once_while_precision_driving() {
        let mut ctrl = near_zone_ctrl();

        // First centering tick takes over directly since precision driving is not yet active
        ctrl.set_markers(&frame(2, 2, 0.0));
        let out = ctrl.tick(ForagerState::Start);
        assert!(out.drive.is_precision());

        // Second tick yields for exactly one tick to smooth the mode switch
        ctrl.set_clock_ms(1100);
        ctrl.set_markers(&frame(2, 2, 0.0));
        let out = ctrl.tick(ForagerState::Start);
        assert_eq!(out.drive, DriveCmd::Behavior(BehaviorTarget::NextProcess));
        assert!(!out.reset_requested);

        // Third tick resumes precision driving
        ctrl.set_clock_ms(1200);
        ctrl.set_markers(&frame(2, 2, 0.0));
        let out = ctrl.tick(ForagerState::Start);
        assert!(out.drive.is_precision());
    }

    /// Drive a controller through sustained detection followed by dropout, up to arrival.
    fn drive_to_arrival(ctrl: &mut DropOffCtrl) -> i64 {
        let mut t = 1000;

        for _ in 0..3 {
            ctrl.set_clock_ms(t);
            ctrl.set_markers(&frame(5, 4, 0.0));
            ctrl.tick(ForagerState::Start);
            t += 100;
        }

        assert!(ctrl.seen_enough_markers);

        // Dropout: the zone stays latched until drop_delay_s expires
        loop {
            ctrl.set_clock_ms(t);
            ctrl.set_markers(&[]);
            let out = ctrl.tick(ForagerState::Start);
            assert!(!out.reset_requested);

            if matches!(ctrl.phase(), DockingPhase::Dropping(_)) {
                return t;
            }

            t += 100;
            assert!(t < 10_000, "controller never declared arrival");
        }
    }

    #[test]
    fn test_sustained_then_lost_markers_declares_arrival() {
        let mut ctrl = near_zone_ctrl();
        let t_arrival = drive_to_arrival(&mut ctrl);

        assert_eq!(ctrl.phase(), DockingPhase::Dropping(DropPhase::Creep));

        // Arrival happens once the dropout has outlasted drop_delay_s (1.8 s after the last
        // sufficient count at t = 1200 ms)
        assert_eq!(t_arrival, 3100);
    }

    #[test]
    fn test_drop_sequence_phases_and_exit_guard() {
        let mut ctrl = near_zone_ctrl();
        let t_arrival = drive_to_arrival(&mut ctrl);

        // Creep phase: slow forward drive, wrist raised, never a waypoint command
        ctrl.set_clock_ms(t_arrival + 100);
        let out = ctrl.tick(ForagerState::Start);
        assert_eq!(
            out.drive,
            DriveCmd::Precision {
                linear_velocity_ms: 0.05,
                angular_error_rad: 0.0
            }
        );
        assert_eq!(out.wrist_angle_rad, Some(0.0));
        assert_eq!(ctrl.phase(), DockingPhase::Dropping(DropPhase::Creep));

        // Release phase: gripper open, reversing clear
        ctrl.set_clock_ms(t_arrival + 3500);
        let out = ctrl.tick(ForagerState::Start);
        assert_eq!(
            out.drive,
            DriveCmd::Precision {
                linear_velocity_ms: -0.15,
                angular_error_rad: 0.0
            }
        );
        assert_eq!(out.gripper_angle_rad, Some(std::f64::consts::FRAC_PI_2));
        assert_eq!(ctrl.phase(), DockingPhase::Dropping(DropPhase::Release));

        // First tick past the exit threshold arms the exit but does not finalise
        ctrl.set_clock_ms(t_arrival + 12_100);
        let out = ctrl.tick(ForagerState::Start);
        assert!(!out.reset_requested);
        assert!(!out.drive.is_waypoints());
        assert_eq!(ctrl.phase(), DockingPhase::Dropping(DropPhase::Exit));

        // The armed exit interrupts on every tick
        assert!(ctrl.should_interrupt());
        assert!(ctrl.should_interrupt());

        // Second consecutive tick finalises the handoff
        ctrl.set_clock_ms(t_arrival + 12_200);
        let out = ctrl.tick(ForagerState::Start);
        assert_eq!(out.drive, DriveCmd::Behavior(BehaviorTarget::NextProcess));
        assert!(out.reset_requested);
        assert!(!ctrl.holding_item);
    }

    #[test]
    fn test_drop_sequence_never_emits_waypoints() {
        let mut ctrl = near_zone_ctrl();
        let t_arrival = drive_to_arrival(&mut ctrl);

        let mut t = t_arrival;
        loop {
            t += 100;
            ctrl.set_clock_ms(t);
            let out = ctrl.tick(ForagerState::Start);

            assert!(!out.drive.is_waypoints());

            if out.reset_requested {
                break;
            }
            assert!(t < t_arrival + 15_000, "drop sequence never finished");
        }
    }

    #[test]
    fn test_recovery_rides_out_brief_dropout() {
        let mut ctrl = near_zone_ctrl();

        // Three centering ticks (the second is the one-tick yield) with a sub-threshold count
        for t in &[1000, 1100, 1200] {
            ctrl.set_clock_ms(*t);
            ctrl.set_markers(&frame(2, 0, 0.0));
            ctrl.tick(ForagerState::Start);
        }
        assert_eq!(ctrl.phase(), DockingPhase::Centering);
        assert!(!ctrl.seen_enough_markers);

        // One empty frame is carried by the previous-count hysteresis
        ctrl.set_clock_ms(1300);
        ctrl.set_markers(&[]);
        let out = ctrl.tick(ForagerState::Start);
        assert!(out.drive.is_precision());
        assert_eq!(ctrl.phase(), DockingPhase::Centering);

        // Further empty frames within the cutoff keep the rover moving straight
        ctrl.set_clock_ms(1400);
        ctrl.set_markers(&[]);
        let out = ctrl.tick(ForagerState::Start);
        assert_eq!(
            out.drive,
            DriveCmd::Precision {
                linear_velocity_ms: 0.15,
                angular_error_rad: 0.0
            }
        );
        assert_eq!(ctrl.phase(), DockingPhase::Recovering);
    }

    #[test]
    fn test_recovery_aborts_after_cutoff() {
        let mut ctrl = near_zone_ctrl();

        for t in &[1000, 1100, 1200] {
            ctrl.set_clock_ms(*t);
            ctrl.set_markers(&frame(2, 0, 0.0));
            ctrl.tick(ForagerState::Start);
        }

        ctrl.set_clock_ms(1300);
        ctrl.set_markers(&[]);
        ctrl.tick(ForagerState::Start);

        // Beyond the cutoff (3 s after the last marker at 1200 ms) the approach is aborted.
        // Precision driving was active so the arbiter gets a behaviour handoff.
        ctrl.set_clock_ms(4300);
        ctrl.set_markers(&[]);
        let out = ctrl.tick(ForagerState::Start);

        assert_eq!(out.drive, DriveCmd::Behavior(BehaviorTarget::PrevProcess));
        assert_eq!(ctrl.phase(), DockingPhase::ReturningCoarse);
        assert!(!ctrl.seen_enough_markers);
        assert!(!ctrl.is_changing_mode());
        assert!(!ctrl.waypoint_interrupt_latched);
        assert!(!ctrl.precision_interrupt_latched);
    }

    #[test]
    fn test_reset_is_idempotent() {
        let mut ctrl = near_zone_ctrl();
        drive_to_arrival(&mut ctrl);

        ctrl.reset();
        let after_one = format!("{:?}", ctrl);

        ctrl.reset();
        let after_two = format!("{:?}", ctrl);

        assert_eq!(after_one, after_two);
        assert_eq!(ctrl.phase(), DockingPhase::Idle);
        assert!(!ctrl.spiral().started());
    }

    #[test]
    fn test_interrupts_are_edge_triggered() {
        let mut ctrl = near_zone_ctrl();

        // No markers: the controller wants waypoint control, exactly once
        assert!(ctrl.should_interrupt());
        assert!(!ctrl.should_interrupt());

        // Markers appear: the controller wants precision control, exactly once
        ctrl.set_markers(&frame(1, 1, 0.0));
        assert!(ctrl.should_interrupt());
        assert!(!ctrl.should_interrupt());
    }

    #[test]
    fn test_has_work_holds_off_during_young_spiral() {
        let mut ctrl = near_zone_ctrl();

        assert!(!ctrl.has_work());

        ctrl.should_interrupt();
        assert!(ctrl.has_work());

        // A freshly started spiral suppresses work until the hold-off passes
        let params = test_params();
        ctrl.spiral
            .step(&Pose::default(), &Pose::new(-0.5, 0.0, 0.0), &params);
        ctrl.phase_start_ms = Some(0);
        ctrl.set_clock_ms(1000);
        assert!(!ctrl.has_work());

        ctrl.set_clock_ms(2500);
        assert!(ctrl.has_work());
    }
}
