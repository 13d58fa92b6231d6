//! Configuration Loader
//!
//! Loads configuration files into a [`Registry`] with proper precedence:
//! 1. Global config (~/.testrig/config.toml) - lowest priority
//! 2. Project config (<root>/testrig.toml) - overrides global
//!
//! CLI flags and environment variables are layered on top by the caller.

use crate::global;
use crate::project::Project;
use crate::registry::Registry;
use crate::ConfigResult;
use std::path::{Path, PathBuf};

/// Name of the project configuration file
pub const PROJECT_FILE: &str = "testrig.toml";

/// Configuration loader
pub struct ConfigLoader {
    /// Global config path, `None` to skip the global layer
    global_config_path: Option<PathBuf>,
}

impl ConfigLoader {
    /// Create a loader that reads the user's global configuration
    pub fn new() -> Self {
        Self {
            global_config_path: global::global_config_path().ok(),
        }
    }

    /// Use a specific global configuration file, or none at all
    pub fn with_global_config(mut self, path: Option<PathBuf>) -> Self {
        self.global_config_path = path;
        self
    }

    /// Load configuration for the project containing `start_dir`.
    ///
    /// Both files are optional. Returns the discovered project so the
    /// caller can derive its load path.
    pub fn load(&self, registry: &mut Registry, start_dir: &Path) -> ConfigResult<Project> {
        if let Some(path) = &self.global_config_path {
            if path.is_file() {
                registry.load_config_from(start_dir, path)?;
            }
        }

        let project = Project::discover(start_dir);
        let project_file = project.root().join(PROJECT_FILE);
        if project_file.is_file() {
            registry.load_config_from(project.root(), Path::new(PROJECT_FILE))?;
        } else {
            tracing::debug!(root = %project.root().display(), "no project config");
        }

        Ok(project)
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_project_overrides_global() {
        let home = TempDir::new().unwrap();
        let global_path = home.path().join("config.toml");
        fs::write(&global_path, "format = \"tapy\"\nverbose = true\n").unwrap();

        let project_dir = TempDir::new().unwrap();
        fs::write(project_dir.path().join(PROJECT_FILE), "format = \"tapj\"\n").unwrap();

        let mut registry = Registry::new();
        let project = ConfigLoader::new()
            .with_global_config(Some(global_path))
            .load(&mut registry, project_dir.path())
            .unwrap();

        assert_eq!(project.root(), project_dir.path());
        let config = registry.configuration(None, false).build();
        assert_eq!(config.format(), "tapj");
        assert!(config.verbose());
    }

    #[test]
    fn test_missing_files_are_not_errors() {
        let project_dir = TempDir::new().unwrap();
        let mut registry = Registry::new();
        ConfigLoader::new()
            .with_global_config(Some(project_dir.path().join("absent.toml")))
            .load(&mut registry, project_dir.path())
            .unwrap();
        assert!(registry.presets().is_empty());
    }
}
