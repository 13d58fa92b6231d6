//! Global Configuration (~/.testrig/config.toml)
//!
//! Locates user-level configuration stored in `~/.testrig/config.toml`.
//! The file uses the same layout as a project's `testrig.toml`.

use crate::{ConfigError, ConfigResult};
use std::path::PathBuf;

/// Name of the per-user configuration directory
pub const GLOBAL_DIR: &str = ".testrig";

/// Name of the configuration file inside [`GLOBAL_DIR`]
pub const GLOBAL_FILE: &str = "config.toml";

/// Get the global configuration directory (~/.testrig)
pub fn global_config_dir() -> ConfigResult<PathBuf> {
    let home = dirs::home_dir().ok_or(ConfigError::HomeNotFound)?;
    Ok(home.join(GLOBAL_DIR))
}

/// Get the global config file path (~/.testrig/config.toml)
pub fn global_config_path() -> ConfigResult<PathBuf> {
    Ok(global_config_dir()?.join(GLOBAL_FILE))
}
