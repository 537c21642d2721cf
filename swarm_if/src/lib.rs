//! # Swarm interface crate.
//!
//! Provides the common types exchanged between the behaviour controllers,
//! the drive controller, the end-effector driver, and the marker-detection
//! pipeline.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Behaviour controller output command definitions
pub mod ctrl;

/// Localisation types
pub mod loc;

/// Visual marker detection types
pub mod marker;
