//! Host platform (linux for example) utility functions

use std::{env, path::PathBuf};
use uname;

/// Name of the environment variable pointing at the root of the arm software.
pub const SW_ROOT_ENV_VAR: &str = "ARM_SW_ROOT";

/// Retrieve uname information.
pub fn get_uname() -> std::io::Result<uname::Info> {
    uname::uname()
}

/// Get the root directory of the arm software, which contains the `params`
/// and `sessions` directories.
pub fn get_arm_sw_root() -> Result<PathBuf, env::VarError> {
    env::var(SW_ROOT_ENV_VAR).map(PathBuf::from)
}
