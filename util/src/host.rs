//! Host environment utility functions

use std::path::PathBuf;

/// Name of the environment variable which points at the root of the software
/// tree. Parameter files and session directories are resolved relative to
/// this root.
pub const SW_ROOT_ENV_VAR: &str = "FORAGE_SW_ROOT";

/// Get the root directory of the software tree from the environment.
pub fn get_forage_sw_root() -> Result<PathBuf, std::env::VarError> {
    std::env::var(SW_ROOT_ENV_VAR).map(PathBuf::from)
}
