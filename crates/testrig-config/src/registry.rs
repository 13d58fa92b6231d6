//! Profile registry
//!
//! The registry stores named profiles. The profile named `""` is the default
//! profile that a run starts from; every other profile doubles as a CLI
//! preset (`--NAME`), except two reserved names:
//!
//! - `common` is applied before option parsing, unconditionally
//! - `default` is applied after option parsing, only when no preset flag
//!   was given
//!
//! `configure` normally replaces a profile wholesale. After
//! `configuration(_, true)` has been called once, the registry is
//! *reconfigurable* and `configure` augments existing profiles in place.

use crate::builder::ConfigBuilder;
use crate::setting::Setting;
use crate::{ConfigError, ConfigResult};
use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};
use std::env;
use std::path::{Path, PathBuf};

/// Preset applied before option parsing.
pub const COMMON_PRESET: &str = "common";

/// Preset applied when no other preset was selected.
pub const DEFAULT_PRESET: &str = "default";

/// Extension assumed for configuration files given without one.
pub const CONFIG_EXTENSION: &str = "toml";

/// Named profile store
#[derive(Debug, Default)]
pub struct Registry {
    profiles: BTreeMap<String, ConfigBuilder>,
    reconfigurable: bool,
    loaded: BTreeSet<PathBuf>,
}

impl Registry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure a profile (the default profile when `profile` is `None`).
    ///
    /// Unless the registry is reconfigurable, a brand-new configuration
    /// replaces any previous one for the profile. If `initializer` fails the
    /// previous configuration is kept.
    pub fn configure<F>(&mut self, profile: Option<&str>, initializer: F) -> ConfigResult<&mut ConfigBuilder>
    where
        F: FnOnce(&mut ConfigBuilder) -> ConfigResult<()>,
    {
        let name = profile.unwrap_or_default().to_string();

        // The initializer works on a scratch copy so a failure writes nothing
        let mut config = if self.reconfigurable {
            self.profiles.get(&name).cloned().unwrap_or_default()
        } else {
            ConfigBuilder::new()
        };
        initializer(&mut config)?;
        match self.profiles.entry(name) {
            Entry::Occupied(mut entry) => {
                entry.insert(config);
                Ok(entry.into_mut())
            }
            Entry::Vacant(entry) => Ok(entry.insert(config)),
        }
    }

    /// Get the configuration of a profile, creating an empty one on first
    /// access.
    ///
    /// Passing `make_reconfigurable` switches the registry into
    /// reconfigurable mode for the rest of its life.
    pub fn configuration(&mut self, profile: Option<&str>, make_reconfigurable: bool) -> &mut ConfigBuilder {
        if make_reconfigurable {
            self.reconfigurable = true;
        }
        self.profiles
            .entry(profile.unwrap_or_default().to_string())
            .or_default()
    }

    /// Look up a profile without creating it
    pub fn profile(&self, name: &str) -> Option<&ConfigBuilder> {
        self.profiles.get(name)
    }

    pub fn is_reconfigurable(&self) -> bool {
        self.reconfigurable
    }

    /// Names of profiles exposed as CLI preset flags, sorted.
    pub fn presets(&self) -> Vec<&str> {
        self.profiles
            .keys()
            .map(String::as_str)
            .filter(|name| !name.is_empty() && *name != COMMON_PRESET && *name != DEFAULT_PRESET)
            .collect()
    }

    /// Merge the named profile into `target`.
    pub fn apply_preset(&self, name: &str, target: &mut ConfigBuilder) -> ConfigResult<()> {
        let preset = self
            .profiles
            .get(name)
            .ok_or_else(|| ConfigError::NoSuchPreset(name.to_string()))?;
        tracing::debug!(preset = name, "applying preset");
        target.merge(preset);
        Ok(())
    }

    /// Load a configuration file.
    ///
    /// The path is resolved against the default profile's `chdir` when set,
    /// else against the current directory, and gets a `.toml` extension if
    /// it has none. Top-level keys configure the default profile;
    /// `[profiles.NAME]` tables configure named profiles.
    ///
    /// Returns `false` when the file was already loaded.
    pub fn load_config(&mut self, path: impl AsRef<Path>) -> ConfigResult<bool> {
        let base = match self.profiles.get("").and_then(|c| c.chdir.clone()) {
            Some(chdir) => PathBuf::from(chdir),
            None => env::current_dir()?,
        };
        self.load_config_from(&base, path.as_ref())
    }

    /// Load a configuration file resolved against `base`.
    pub fn load_config_from(&mut self, base: &Path, path: &Path) -> ConfigResult<bool> {
        let mut file = path.to_path_buf();
        if file.extension().is_none() {
            file.set_extension(CONFIG_EXTENSION);
        }
        let file = base.join(file);

        if !file.is_file() {
            return Err(ConfigError::ConfigFileNotFound(file));
        }
        let key = file.canonicalize()?;
        if self.loaded.contains(&key) {
            tracing::debug!(file = %file.display(), "config file already loaded");
            return Ok(false);
        }

        let content = std::fs::read_to_string(&file)?;
        let mut settings: toml::Table =
            toml::from_str(&content).map_err(|e| ConfigError::TomlParseError {
                file: file.clone(),
                error: e,
            })?;

        let profiles = match settings.remove("profiles") {
            None => BTreeMap::new(),
            Some(toml::Value::Table(table)) => table
                .into_iter()
                .map(|(name, value)| match value {
                    toml::Value::Table(profile) => Ok((name, profile)),
                    _ => Err(ConfigError::InvalidValue {
                        field: format!("profiles.{name}"),
                        reason: "expected a table".to_string(),
                    }),
                })
                .collect::<ConfigResult<BTreeMap<_, _>>>()?,
            Some(_) => {
                return Err(ConfigError::InvalidValue {
                    field: "profiles".to_string(),
                    reason: "expected a table".to_string(),
                })
            }
        };

        // Reject the whole file before touching any profile
        check_keys(&settings)?;
        for profile in profiles.values() {
            check_keys(profile)?;
        }

        self.configuration(None, false).apply(settings)?;
        for (name, profile) in profiles {
            self.configure(Some(&name), |config| {
                config.apply(profile)?;
                Ok(())
            })?;
        }

        tracing::debug!(file = %file.display(), "loaded config file");
        self.loaded.insert(key);
        Ok(true)
    }
}

fn check_keys(table: &toml::Table) -> ConfigResult<()> {
    match table.keys().find(|key| Setting::from_key(key).is_none()) {
        Some(key) => Err(ConfigError::NoSuchSetting(key.clone())),
        None => Ok(()),
    }
}
