//! testrig Configuration System
//!
//! Provides run configuration for the testrig harness including:
//! - A mutable [`ConfigBuilder`] finalized into an immutable [`Config`]
//! - Setting normalization and key-based application
//! - Environment overrides and defaults (`testrig_*`)
//! - A [`Registry`] of named profiles and CLI presets
//! - Configuration files (`~/.testrig/config.toml`, `testrig.toml`)
//! - Project root discovery and load path derivation
//!
//! # Configuration Hierarchy
//!
//! Configuration is layered in the following order (later overrides earlier):
//! 1. Built-in defaults
//! 2. Global config (~/.testrig/config.toml)
//! 3. Project config (./testrig.toml), including presets
//! 4. CLI flags
//! 5. Environment variables (testrig_*) fill whatever is still unset
//!
//! # Example
//!
//! ```
//! use testrig_config::Registry;
//!
//! let mut registry = Registry::new();
//! registry
//!     .configure(None, |config| {
//!         config.files("test/unit:test/integration").verbose(true);
//!         Ok(())
//!     })
//!     .unwrap();
//!
//! let config = registry.configuration(None, false).build();
//! assert_eq!(config.files(), ["test/unit", "test/integration"]);
//! assert_eq!(config.format(), "dotprogress");
//! ```

pub mod builder;
pub mod config;
pub mod env;
pub mod global;
pub mod loader;
pub mod project;
pub mod registry;
pub mod setting;

use std::path::PathBuf;
use thiserror::Error;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("No such setting: '{0}'")]
    NoSuchSetting(String),

    #[error("No such preset: '{0}'")]
    NoSuchPreset(String),

    #[error("config file not found -- `{}'", .0.display())]
    ConfigFileNotFound(PathBuf),

    #[error("Failed to read configuration file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML syntax in {file}: {error}")]
    TomlParseError {
        file: PathBuf,
        error: toml::de::Error,
    },

    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Home directory not found")]
    HomeNotFound,
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

// Re-export main types
pub use builder::{ConfigBuilder, Hook};
pub use config::{Config, DEFAULT_FORMAT};
pub use loader::ConfigLoader;
pub use project::Project;
pub use registry::Registry;
pub use setting::{Setting, SettingValue};
