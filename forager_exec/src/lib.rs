//! # Forager library.
//!
//! This library holds the behaviour controllers of the central-place-foraging rover. Each
//! controller is ticked by the behaviour arbiter once per sensing cycle and produces a single
//! [`swarm_if::ctrl::CtrlOutput`] consumed by the drive controller and the end-effector driver.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Drop-off controller module - carries a held resource item back to the shared collection zone,
/// centers on the zone using its visual markers and releases the item
pub mod dropoff_ctrl;
