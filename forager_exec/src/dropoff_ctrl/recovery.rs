//! Visual lock recovery for DropOffCtrl
//!
//! Entered when an approach was in progress but the current tick has no markers at all. Brief
//! dropouts are ridden out by continuing to drive straight; a sustained loss aborts the approach
//! back to the coarse waypoint return.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

// External
use log::warn;

// Internal
use super::{state::millis_to_seconds, DockingPhase, DropOffCtrl};
use swarm_if::ctrl::{BehaviorTarget, CtrlOutput, ForagerState};

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl DropOffCtrl {
    /// Run one tick of the lost-lock recovery tracker.
    pub(crate) fn recovery_step(
        &mut self,
        now_ms: i64,
        forager_state: ForagerState,
    ) -> CtrlOutput {
        let since_sufficient_s = millis_to_seconds(now_ms - self.last_sufficient_ms);

        if since_sufficient_s > self.params.lost_center_cutoff_s {
            warn!(
                "No zone markers for {:.2} s, aborting approach back to coarse return",
                since_sufficient_s
            );

            self.seen_enough_markers = false;
            self.phase = DockingPhase::ReturningCoarse;

            // Fall back to a waypoint at the zone; if a precision-driving mode is active the
            // arbiter must first take control back from it
            let out = if self.precision_driving {
                CtrlOutput::behavior(BehaviorTarget::PrevProcess, forager_state)
            } else {
                CtrlOutput::waypoints(vec![self.zone_pose], forager_state)
            };

            self.precision_driving = false;
            self.waypoint_interrupt_latched = false;
            self.precision_interrupt_latched = false;

            out
        } else {
            // Transient occlusion: keep moving straight rather than stopping
            self.phase = DockingPhase::Recovering;

            CtrlOutput::precision(self.params.search_velocity_ms, 0.0, forager_state)
        }
    }
}
