//! Visual centering logic for DropOffCtrl
//!
//! Converts the per-side marker counts and the average marker pitch into precision driving
//! commands. Until enough markers have been seen in one frame the controller follows the marker
//! boundary edge; once the hysteresis latch is set the turn direction is inverted so the rover
//! dives towards the zone centre instead of tracking an edge.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

// External
use log::{debug, info};

// Internal
use super::{state::millis_to_seconds, DockingPhase, DropOffCtrl};
use swarm_if::ctrl::{BehaviorTarget, CtrlOutput, ForagerState};

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl DropOffCtrl {
    /// Run one tick of the visual centering controller.
    ///
    /// Entered when markers are in view now, were in view on the previous tick, or the
    /// seen-enough hysteresis latch is set.
    pub(crate) fn centering_step(
        &mut self,
        count: u32,
        now_ms: i64,
        forager_state: ForagerState,
    ) -> CtrlOutput {
        // On the controller's first activation this trip while a precision-driving mode is
        // already active, yield control for one tick to avoid a hard mode-switch transient.
        if self.first_activation && self.precision_driving {
            self.first_activation = false;

            debug!("First centering activation while precision driving, yielding one tick");
            return CtrlOutput::behavior(BehaviorTarget::NextProcess, forager_state);
        }

        self.precision_driving = true;

        // Pick the turn side. With the hysteresis latch set the left/right counts are ignored
        // and the pitch sign chooses the side; pitch is unknown whenever no marker is in view
        // this tick, in which case the rover drives straight.
        let (left, right) = if self.seen_enough_markers {
            match self.current_pitch(count) {
                Some(p) if p < -self.params.pitch_steer_threshold_rad => (true, false),
                Some(p) if p > self.params.pitch_steer_threshold_rad => (false, true),
                _ => (false, false),
            }
        } else {
            (self.count_left > 0, self.count_right > 0)
        };

        // Invert the steering once aligned: reject the edge rather than following it
        let turn_direction = if self.seen_enough_markers { -3.0 } else { 1.0 };

        let out = if left && right {
            CtrlOutput::precision(self.params.search_velocity_ms, 0.0, forager_state)
        } else if right {
            CtrlOutput::precision(
                self.params.edge_creep_velocity_ms * turn_direction,
                self.params.centering_turn_rate_rad * turn_direction,
                forager_state,
            )
        } else if left {
            CtrlOutput::precision(
                self.params.edge_creep_velocity_ms * turn_direction,
                -self.params.centering_turn_rate_rad * turn_direction,
                forager_state,
            )
        } else {
            CtrlOutput::precision(self.params.search_velocity_ms, 0.0, forager_state)
        };

        // A count beyond the threshold means we are driving into the zone, not along an edge
        if count > self.params.center_tag_threshold {
            if !self.seen_enough_markers {
                info!("Seen {} zone markers at once, locking centering onto the zone", count);
            }

            self.seen_enough_markers = true;
            self.last_sufficient_ms = now_ms;
        }

        // A sustained dropout while aligned means the rover has driven over the zone
        let since_sufficient_s = millis_to_seconds(now_ms - self.last_sufficient_ms);
        let zone_visible =
            !(self.seen_enough_markers && since_sufficient_s > self.params.drop_delay_s);

        self.phase = DockingPhase::Centering;
        self.prev_marker_count = count;
        self.count_left = 0;
        self.count_right = 0;

        if !zone_visible && self.seen_enough_markers {
            self.declare_arrival(now_ms);
        }

        out
    }

    /// The average marker pitch for this tick, or `None` if no marker is currently in view.
    fn current_pitch(&self, count: u32) -> Option<f64> {
        if count > 0 {
            self.avg_pitch_rad
        } else {
            None
        }
    }
}
