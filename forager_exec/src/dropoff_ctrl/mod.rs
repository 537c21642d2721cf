//! # Drop-off controller module
//!
//! Once the rover has picked up a resource item this controller takes over navigation and
//! actuation to carry the item back to the shared collection zone, centre on the zone using its
//! visual markers, release the item and hand control back to the behaviour arbiter.
//!
//! The controller is a docking state machine ticked once per sensing cycle. Its phases:
//!
//! - `ReturningCoarse` - waypoint drive towards the zone pose given by localisation, used while
//!   the zone is beyond visual range.
//! - `SearchingSpiral` - the zone is near but its markers are not in view; waypoints are
//!   generated on an expanding octagonal spiral around the zone pose until the markers are
//!   reacquired.
//! - `Centering` - precision driving on the left/right marker counts and marker pitch. Until
//!   enough markers have been seen at once the controller edge-follows the marker boundary; after
//!   that it inverts the turn direction and dives towards the zone centre.
//! - `Recovering` - visual lock lost during centering. Brief dropouts are ridden out by driving
//!   straight; a sustained loss aborts back to the coarse return.
//! - `Dropping` - the zone has been confirmed reached. A timed sequence creeps forward, releases
//!   the item, reverses clear, and finally requests a behaviour handoff and a reset.
//!
//! All timing is derived from a monotonic clock value supplied by the caller each tick; the
//! controller never blocks or sleeps.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

mod centering;
mod drop_sequence;
mod ingest;
mod params;
mod recovery;
mod spiral;
mod state;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

// Internal
pub use params::Params;
pub use spiral::SpiralSearch;
pub use state::*;

// ------------------------------------------------------------------------------------------------
// ENUMERATIONS
// ------------------------------------------------------------------------------------------------

/// Possible errors that can occur during DropOffCtrl operation.
#[derive(Debug, thiserror::Error)]
pub enum DropOffCtrlError {
    #[error("Could not load parameters: {0}")]
    ParamLoadError(util::params::LoadError),
}
