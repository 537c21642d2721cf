//! # Drop-off Simulation
//!
//! This binary runs the drop-off controller against a simple point-mass rover and a synthetic
//! marker detection model, without requiring the simulation or physical rover. It is designed to
//! allow quick and easy development of the drop-off behaviour itself.
//!
//! The rover starts away from the collection zone holding an item, and the run ends when the
//! controller reports the drop-off complete. Status reports are archived to CSV under the
//! session directory for offline plotting.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::env;

use color_eyre::{
    eyre::{eyre, WrapErr},
    Result,
};
use log::{debug, info, warn};

use forager_lib::dropoff_ctrl::{DropOffCtrl, Params};
use swarm_if::{
    ctrl::{DriveCmd, ForagerState},
    loc::Pose,
    marker::MarkerObservation,
};
use util::{
    archive::Archiver,
    logger::{logger_init, LevelFilter},
    maths,
    session::Session,
};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Period of one simulated cycle.
const CYCLE_PERIOD_S: f64 = 0.10;

/// Speed at which the simulated drive controller follows waypoints.
///
/// Units: meters/second
const WAYPOINT_SPEED_MS: f64 = 0.30;

/// Half-angle of the simulated camera's horizontal field of view.
///
/// Units: radians
const CAMERA_HALF_FOV_RAD: f64 = 0.8;

/// Simulated time after which the run is considered failed.
///
/// Units: seconds
const SIM_TIMEOUT_S: f64 = 300.0;

// ------------------------------------------------------------------------------------------------
// MAIN
// ------------------------------------------------------------------------------------------------

fn main() -> Result<()> {
    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session =
        Session::new("dropoff_sim", "sessions").wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(LevelFilter::Trace, &session).wrap_err("Failed to initialise logging")?;

    info!("Drop-off Simulation\n");
    info!("Session directory: {:?}\n", session.session_root);

    // ---- STARTING POSE ----

    // Either "x y heading" as arguments or the default start
    let args: Vec<String> = env::args().collect();

    debug!("CLI arguments: {:?}", args);

    let mut rover_pose = match args.len() {
        1 => Pose::new(4.0, 3.0, 0.0),
        4 => {
            let parse = |s: &String| {
                s.parse::<f64>()
                    .map_err(|e| eyre!("Invalid start pose component {:?}: {}", s, e))
            };
            Pose::new(parse(&args[1])?, parse(&args[2])?, parse(&args[3])?)
        }
        _ => return Err(eyre!("Expected no arguments or `x_m y_m heading_rad`")),
    };

    let zone_pose = Pose::default();

    // ---- MODULE INIT ----

    let mut dropoff_ctrl =
        DropOffCtrl::init("dropoff_ctrl.toml").wrap_err("Failed to initialise DropOffCtrl")?;
    info!("DropOffCtrl init complete");

    let mut report_archiver = Archiver::from_path(&session, "dropoff_ctrl/report.csv")
        .wrap_err("Failed to create the report archive")?;

    dropoff_ctrl.set_zone_pose(zone_pose);
    dropoff_ctrl.set_item_held(true);

    // ---- MAIN LOOP ----

    info!("Begining main loop\n");

    let mut forager_state = ForagerState::ReturnToNest;
    let mut sim_time_ms: i64 = 0;
    let mut num_cycles: u64 = 0;

    loop {
        // ---- SENSOR MODEL ----

        dropoff_ctrl.set_current_pose(rover_pose);
        dropoff_ctrl.set_clock_ms(sim_time_ms);

        let markers = detect_markers(&rover_pose, &zone_pose, dropoff_ctrl.params());
        dropoff_ctrl.set_markers(&markers);

        // ---- CONTROLLER PROCESSING ----

        if dropoff_ctrl.should_interrupt() {
            debug!(
                "DropOffCtrl interrupt at {:.1} s (phase {})",
                millis_to_s(sim_time_ms),
                dropoff_ctrl.phase().name()
            );
        }

        let output = dropoff_ctrl.tick(forager_state);
        forager_state = output.forager_state;

        // ---- SIMULATED DRIVING ----

        match output.drive {
            DriveCmd::Waypoints(ref wpts) => {
                if let Some(wp) = wpts.first() {
                    rover_pose = drive_towards(&rover_pose, wp);
                }
            }
            DriveCmd::Precision {
                linear_velocity_ms,
                angular_error_rad,
            } => {
                // The angular error is treated as a turn-rate demand by the point-mass model
                let heading_rad = maths::rem_euclid(
                    rover_pose.heading_rad + angular_error_rad * CYCLE_PERIOD_S,
                    std::f64::consts::TAU,
                );

                rover_pose = Pose::new(
                    rover_pose.x_m + linear_velocity_ms * CYCLE_PERIOD_S * heading_rad.cos(),
                    rover_pose.y_m + linear_velocity_ms * CYCLE_PERIOD_S * heading_rad.sin(),
                    heading_rad,
                );
            }
            DriveCmd::Behavior(_) => (),
        }

        // ---- TELEMETRY ----

        match report_archiver.serialise(dropoff_ctrl.status_report()) {
            Ok(_) => (),
            Err(e) => warn!("Report archive error: {}", e),
        };

        // ---- CYCLE MANAGEMENT ----

        sim_time_ms += (CYCLE_PERIOD_S * 1e3) as i64;
        num_cycles += 1;

        if output.reset_requested {
            info!(
                "Drop-off complete after {:.1} s ({} cycles), exiting",
                millis_to_s(sim_time_ms),
                num_cycles
            );
            dropoff_ctrl.reset();
            break;
        }

        if millis_to_s(sim_time_ms) > SIM_TIMEOUT_S {
            return Err(eyre!(
                "Rover failed to complete the drop-off within {} s",
                SIM_TIMEOUT_S
            ));
        }
    }

    Ok(())
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Synthesise the marker detections a camera would make of the collection zone.
///
/// The zone is modelled as a disc of markers around the zone pose. Markers are visible when the
/// rover is within visual range and the zone is inside the camera's field of view, with the
/// visible count growing as the rover closes in. The observations are split across the image
/// according to where the zone sits relative to the heading.
fn detect_markers(rover: &Pose, zone: &Pose, params: &Params) -> Vec<MarkerObservation> {
    let distance_m = rover.distance_to(zone);

    if distance_m > params.visual_range_m {
        return vec![];
    }

    // Bearing error from the heading to the zone, positive when the zone is to the left
    let bearing_err_rad = maths::get_ang_dist_2pi(rover.heading_rad, rover.bearing_to(zone));

    if bearing_err_rad.abs() > CAMERA_HALF_FOV_RAD && distance_m > 0.2 {
        return vec![];
    }

    let count = ((1.0 - distance_m / params.visual_range_m) * 12.0).round() as u32;
    let left_fraction = maths::clamp(
        &(0.5 + bearing_err_rad / (2.0 * CAMERA_HALF_FOV_RAD)),
        &0.0,
        &1.0,
    );
    let n_left = (count as f64 * left_fraction).round() as u32;

    let mut markers = Vec::with_capacity(count as usize);
    for i in 0..count {
        let image_x_m = if i < n_left { -0.3 } else { 0.3 };

        markers.push(MarkerObservation {
            id: params.zone_marker_id,
            image_x_m,
            pitch_rad: 0.0,
        });
    }

    markers
}

/// Step the simulated waypoint drive towards the given target.
fn drive_towards(rover: &Pose, target: &Pose) -> Pose {
    let distance_m = rover.distance_to(target);

    // Within the waypoint controller's accuracy, hold position
    if distance_m < 0.15 {
        return *rover;
    }

    let heading_rad = rover.bearing_to(target);
    let step_m = (WAYPOINT_SPEED_MS * CYCLE_PERIOD_S).min(distance_m);

    Pose::new(
        rover.x_m + step_m * heading_rad.cos(),
        rover.y_m + step_m * heading_rad.sin(),
        heading_rad,
    )
}

/// Convert simulated milliseconds to seconds.
fn millis_to_s(ms: i64) -> f64 {
    ms as f64 / 1e3
}
