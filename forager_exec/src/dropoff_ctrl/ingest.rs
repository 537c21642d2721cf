//! Pose, marker and clock ingestion for DropOffCtrl
//!
//! All inputs are supplied by external collaborators once per tick, before [`DropOffCtrl::tick`]
//! runs. They are treated as always-valid best-effort sensor data.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

// Internal
use super::{DockingPhase, DropOffCtrl};
use swarm_if::{loc::Pose, marker::MarkerObservation};

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl DropOffCtrl {
    /// Set the rover's current pose for this tick.
    pub fn set_current_pose(&mut self, pose: Pose) {
        self.current_pose = pose;
    }

    /// Set the collection zone's pose.
    pub fn set_zone_pose(&mut self, pose: Pose) {
        self.zone_pose = pose;
    }

    /// Set whether the rover is currently holding a resource item.
    pub fn set_item_held(&mut self, held: bool) {
        self.holding_item = held;
    }

    /// Set the monotonic clock value for this tick.
    pub fn set_clock_ms(&mut self, clock_ms: i64) {
        self.clock_ms = clock_ms;
    }

    /// Ingest the current frame's marker observations.
    ///
    /// A no-op unless the rover holds an item and has not yet reached the zone, markers are
    /// irrelevant otherwise. Zone markers are counted per side of the image, corrected for the
    /// camera mounting offset, and their pitch is averaged. A frame with no zone markers zeroes
    /// the counts but leaves the last pitch in place; the centering logic treats pitch as unknown
    /// whenever the current count is zero.
    pub fn set_markers(&mut self, markers: &[MarkerObservation]) {
        if !self.holding_item || matches!(self.phase, DockingPhase::Dropping(_)) {
            return;
        }

        self.count_left = 0;
        self.count_right = 0;

        let mut pitch_sum_rad = 0.0;

        let zone_marker_id = self.params.zone_marker_id;
        for marker in markers.iter().filter(|m| m.id == zone_marker_id) {
            if marker.image_x_m + self.params.camera_offset_correction_m > 0.0 {
                self.count_right += 1;
            } else {
                self.count_left += 1;
            }

            pitch_sum_rad += marker.pitch_rad;
        }

        let count = self.count_left + self.count_right;
        if count > 0 {
            self.avg_pitch_rad = Some(pitch_sum_rad / count as f64);
        }
    }
}

#[cfg(test)]
mod test {
    use super::super::{DockingPhase, DropPhase, DropOffCtrl, Params};
    use swarm_if::marker::MarkerObservation;

    fn test_params() -> Params {
        Params {
            zone_marker_id: 256,
            camera_offset_correction_m: 0.02,
            ..Params::default()
        }
    }

    fn marker(id: u32, image_x_m: f64, pitch_rad: f64) -> MarkerObservation {
        MarkerObservation {
            id,
            image_x_m,
            pitch_rad,
        }
    }

    #[test]
    fn test_markers_ignored_unless_holding() {
        let mut ctrl = DropOffCtrl::with_params(test_params());

        ctrl.set_markers(&[marker(256, 0.1, 0.0)]);
        assert_eq!(ctrl.count_left + ctrl.count_right, 0);

        ctrl.set_item_held(true);
        ctrl.set_markers(&[marker(256, 0.1, 0.0)]);
        assert_eq!(ctrl.count_right, 1);

        // Markers are also ignored once the zone is reached
        ctrl.phase = DockingPhase::Dropping(DropPhase::Creep);
        ctrl.set_markers(&[marker(256, 0.1, 0.0), marker(256, -0.1, 0.0)]);
        assert_eq!(ctrl.count_right, 1);
        assert_eq!(ctrl.count_left, 0);
    }

    #[test]
    fn test_side_counts_and_pitch() {
        let mut ctrl = DropOffCtrl::with_params(test_params());
        ctrl.set_item_held(true);

        // Non-zone ids are filtered out; the camera offset shifts the side boundary
        ctrl.set_markers(&[
            marker(256, -0.30, -0.2),
            marker(256, -0.01, 0.4),
            marker(256, 0.10, 0.1),
            marker(12, 0.50, 3.0),
        ]);

        assert_eq!(ctrl.count_left, 1);
        assert_eq!(ctrl.count_right, 2);

        let pitch = ctrl.avg_pitch_rad.unwrap();
        assert!((pitch - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_empty_frame_zeroes_counts_keeps_pitch() {
        let mut ctrl = DropOffCtrl::with_params(test_params());
        ctrl.set_item_held(true);

        ctrl.set_markers(&[marker(256, -0.3, 0.6)]);
        assert_eq!(ctrl.count_left, 1);

        ctrl.set_markers(&[]);
        assert_eq!(ctrl.count_left + ctrl.count_right, 0);
        assert_eq!(ctrl.avg_pitch_rad, Some(0.6));
    }
}
