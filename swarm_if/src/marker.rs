//! # Visual marker detection types

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A single fiducial marker detection for one camera frame.
///
/// Produced by the marker-detection pipeline. No marker identity is carried between frames, each
/// frame's observations stand alone.
#[derive(Debug, Copy, Clone, Serialize, Deserialize)]
pub struct MarkerObservation {
    /// The id encoded in the marker. The collection zone is delimited by markers with a reserved
    /// id which is part of the detection pipeline's configuration.
    pub id: u32,

    /// Horizontal offset of the marker from the camera's optical axis, positive to the right of
    /// the image.
    ///
    /// Units: meters
    pub image_x_m: f64,

    /// Pitch of the marker relative to the camera.
    ///
    /// Units: radians
    pub pitch_rad: f64,
}
