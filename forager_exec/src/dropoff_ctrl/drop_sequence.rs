//! Timed drop sequence for DropOffCtrl
//!
//! Once the zone is confirmed reached the rover is assumed stationary relative to it, so the
//! sequence is purely time-boxed and needs no further sensing: creep forward over the zone,
//! release the item and reverse clear, then hand control back for the next foraging trip.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

// External
use log::info;

// Internal
use super::{DockingPhase, DropOffCtrl, DropPhase};
use swarm_if::ctrl::{BehaviorTarget, CtrlOutput, ForagerState};

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl DropOffCtrl {
    /// Run one tick of the drop sequence.
    ///
    /// `elapsed_s` is the time since arrival at the zone was declared. Phases are keyed on
    /// elapsed time only and never regress under a monotonic clock.
    pub(crate) fn drop_sequence_step(
        &mut self,
        sub: DropPhase,
        elapsed_s: f64,
        forager_state: ForagerState,
    ) -> CtrlOutput {
        if elapsed_s >= self.params.drop_exit_start_s {
            if let DropPhase::Exit = sub {
                // Second consecutive tick past the exit threshold: finalise the handoff
                info!("Drop-off complete, handing control back for the next foraging trip");

                self.holding_item = false;

                let mut out = CtrlOutput::behavior(BehaviorTarget::NextProcess, forager_state);
                out.reset_requested = true;
                out
            } else {
                // First tick past the exit threshold: arm the exit and hold the release demand
                // for one more tick, guarding against a single bad clock read
                self.phase = DockingPhase::Dropping(DropPhase::Exit);

                self.release_output(forager_state)
            }
        } else if elapsed_s >= self.params.drop_creep_end_s {
            self.phase = DockingPhase::Dropping(DropPhase::Release);

            self.release_output(forager_state)
        } else {
            // Creep forward slowly with the wrist raised, ready to drop
            self.precision_driving = true;

            let mut out = CtrlOutput::precision(self.params.creep_velocity_ms, 0.0, forager_state);
            out.wrist_angle_rad = Some(self.params.wrist_raised_angle_rad);
            out
        }
    }

    /// The release demand: gripper open, reversing clear of the item.
    fn release_output(&self, forager_state: ForagerState) -> CtrlOutput {
        let mut out = CtrlOutput::precision(
            self.params.release_reverse_velocity_ms,
            0.0,
            forager_state,
        );
        out.gripper_angle_rad = Some(self.params.gripper_open_angle_rad);
        out.wrist_angle_rad = Some(self.params.wrist_raised_angle_rad);
        out
    }
}
