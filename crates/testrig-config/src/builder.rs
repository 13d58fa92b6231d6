//! Mutable run configuration
//!
//! A [`ConfigBuilder`] accumulates settings from every layer (files, presets,
//! flags, environment) and is finalized once with [`ConfigBuilder::build`].
//!
//! Every list field has two setters. The merge form (`files`, `tags`, ...)
//! appends normalized entries; the replace form (`set_files`, `set_tags`, ...)
//! discards what was there. Both apply the same normalization, see
//! [`SettingValue::into_list`].

use crate::config::Config;
use crate::setting::{Setting, SettingValue};
use crate::{ConfigError, ConfigResult};
use std::fmt;
use std::sync::Arc;

/// A zero-argument callable run before or after the test run.
#[derive(Clone)]
pub struct Hook(Arc<dyn Fn() + Send + Sync>);

impl Hook {
    pub fn new(f: impl Fn() + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    /// Invoke the hook.
    pub fn call(&self) {
        (self.0)()
    }
}

impl fmt::Debug for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Hook(..)")
    }
}

/// Accumulates run settings before they are finalized into a [`Config`].
#[derive(Debug, Clone, Default)]
pub struct ConfigBuilder {
    pub(crate) format: Option<String>,
    pub(crate) files: Vec<String>,
    pub(crate) tags: Vec<String>,
    pub(crate) units: Vec<String>,
    pub(crate) matches: Vec<String>,
    pub(crate) loadpath: Vec<String>,
    pub(crate) requires: Vec<String>,
    pub(crate) autopath: Option<bool>,
    pub(crate) verbose: Option<bool>,
    pub(crate) hard: Option<bool>,
    pub(crate) chdir: Option<String>,
    pub(crate) name: Option<String>,
    pub(crate) mode: Option<String>,
    pub(crate) before: Option<Hook>,
    pub(crate) after: Option<Hook>,
}

impl ConfigBuilder {
    /// Create an empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the report format.
    pub fn format(&mut self, name: impl Into<String>) -> &mut Self {
        self.format = Some(name.into());
        self
    }

    /// Add test files or directories.
    pub fn files(&mut self, list: impl Into<SettingValue>) -> &mut Self {
        self.files.extend(list.into().into_list());
        self
    }

    /// Replace the test file list.
    pub fn set_files(&mut self, list: impl Into<SettingValue>) -> &mut Self {
        self.files = list.into().into_list();
        self
    }

    /// Add tags for filtering tests.
    pub fn tags(&mut self, list: impl Into<SettingValue>) -> &mut Self {
        self.tags.extend(list.into().into_list());
        self
    }

    /// Replace the tag filter.
    pub fn set_tags(&mut self, list: impl Into<SettingValue>) -> &mut Self {
        self.tags = list.into().into_list();
        self
    }

    /// Add units (module, type or function names) for filtering tests.
    pub fn units(&mut self, list: impl Into<SettingValue>) -> &mut Self {
        self.units.extend(list.into().into_list());
        self
    }

    /// Replace the unit filter.
    pub fn set_units(&mut self, list: impl Into<SettingValue>) -> &mut Self {
        self.units = list.into().into_list();
        self
    }

    /// Add description matches for filtering tests.
    pub fn matches(&mut self, list: impl Into<SettingValue>) -> &mut Self {
        self.matches.extend(list.into().into_list());
        self
    }

    /// Replace the description match filter.
    pub fn set_matches(&mut self, list: impl Into<SettingValue>) -> &mut Self {
        self.matches = list.into().into_list();
        self
    }

    /// Add load path entries.
    pub fn loadpath(&mut self, list: impl Into<SettingValue>) -> &mut Self {
        self.loadpath.extend(list.into().into_list());
        self
    }

    /// Replace the load path entries.
    pub fn set_loadpath(&mut self, list: impl Into<SettingValue>) -> &mut Self {
        self.loadpath = list.into().into_list();
        self
    }

    /// Add scripts to run before the tests.
    pub fn requires(&mut self, list: impl Into<SettingValue>) -> &mut Self {
        self.requires.extend(list.into().into_list());
        self
    }

    /// Replace the scripts to run before the tests.
    pub fn set_requires(&mut self, list: impl Into<SettingValue>) -> &mut Self {
        self.requires = list.into().into_list();
        self
    }

    /// Automatically derive load path entries from the project layout?
    pub fn autopath(&mut self, autopath: bool) -> &mut Self {
        self.autopath = Some(autopath);
        self
    }

    /// Provide extra details in reports?
    pub fn verbose(&mut self, verbose: bool) -> &mut Self {
        self.verbose = Some(verbose);
        self
    }

    /// Treat tests without assertions as failures?
    pub fn hard(&mut self, hard: bool) -> &mut Self {
        self.hard = Some(hard);
        self
    }

    /// Change to this directory before running tests.
    pub fn chdir(&mut self, dir: impl Into<String>) -> &mut Self {
        self.chdir = Some(dir.into());
        self
    }

    pub fn name(&mut self, name: impl Into<String>) -> &mut Self {
        self.name = Some(name.into());
        self
    }

    /// Opaque mode string for the host environment.
    pub fn mode(&mut self, mode: impl Into<String>) -> &mut Self {
        self.mode = Some(mode.into());
        self
    }

    /// Procedure to call just before running tests.
    pub fn before(&mut self, hook: impl Fn() + Send + Sync + 'static) -> &mut Self {
        self.before = Some(Hook::new(hook));
        self
    }

    /// Procedure to call just after running tests.
    pub fn after(&mut self, hook: impl Fn() + Send + Sync + 'static) -> &mut Self {
        self.after = Some(Hook::new(hook));
        self
    }

    /// Replace a single setting.
    pub fn set(&mut self, setting: Setting, value: SettingValue) -> &mut Self {
        match setting {
            Setting::Format => self.format(value.into_text()),
            Setting::Files => self.set_files(value),
            Setting::Tags => self.set_tags(value),
            Setting::Units => self.set_units(value),
            Setting::Match => self.set_matches(value),
            Setting::Loadpath => self.set_loadpath(value),
            Setting::Requires => self.set_requires(value),
            Setting::Autopath => self.autopath(value.into_bool()),
            Setting::Verbose => self.verbose(value.into_bool()),
            Setting::Hard => self.hard(value.into_bool()),
            Setting::Chdir => self.chdir(value.into_text()),
            Setting::Name => self.name(value.into_text()),
            Setting::Mode => self.mode(value.into_text()),
        }
    }

    /// Whether a setting currently holds an explicit value.
    ///
    /// List settings count as unset while empty.
    pub fn is_set(&self, setting: Setting) -> bool {
        match setting {
            Setting::Format => self.format.is_some(),
            Setting::Files => !self.files.is_empty(),
            Setting::Tags => !self.tags.is_empty(),
            Setting::Units => !self.units.is_empty(),
            Setting::Match => !self.matches.is_empty(),
            Setting::Loadpath => !self.loadpath.is_empty(),
            Setting::Requires => !self.requires.is_empty(),
            Setting::Autopath => self.autopath.is_some(),
            Setting::Verbose => self.verbose.is_some(),
            Setting::Hard => self.hard.is_some(),
            Setting::Chdir => self.chdir.is_some(),
            Setting::Name => self.name.is_some(),
            Setting::Mode => self.mode.is_some(),
        }
    }

    /// Apply a mapping of setting keys to values.
    ///
    /// Each key is routed to its replace setter. Every key is resolved before
    /// anything is written, so an unknown key leaves the builder untouched.
    pub fn apply<K, V, I>(&mut self, settings: I) -> ConfigResult<&mut Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<SettingValue>,
    {
        let resolved = settings
            .into_iter()
            .map(|(key, value)| {
                let key = key.as_ref();
                Setting::from_key(key)
                    .map(|setting| (setting, value.into()))
                    .ok_or_else(|| ConfigError::NoSuchSetting(key.to_string()))
            })
            .collect::<ConfigResult<Vec<_>>>()?;

        for (setting, value) in resolved {
            self.set(setting, value);
        }
        Ok(self)
    }

    /// Overlay every field `other` has explicitly set.
    ///
    /// Lists are extended, scalars and hooks replaced.
    pub fn merge(&mut self, other: &ConfigBuilder) -> &mut Self {
        self.files.extend(other.files.iter().cloned());
        self.tags.extend(other.tags.iter().cloned());
        self.units.extend(other.units.iter().cloned());
        self.matches.extend(other.matches.iter().cloned());
        self.loadpath.extend(other.loadpath.iter().cloned());
        self.requires.extend(other.requires.iter().cloned());

        if other.format.is_some() {
            self.format = other.format.clone();
        }
        if other.autopath.is_some() {
            self.autopath = other.autopath;
        }
        if other.verbose.is_some() {
            self.verbose = other.verbose;
        }
        if other.hard.is_some() {
            self.hard = other.hard;
        }
        if other.chdir.is_some() {
            self.chdir = other.chdir.clone();
        }
        if other.name.is_some() {
            self.name = other.name.clone();
        }
        if other.mode.is_some() {
            self.mode = other.mode.clone();
        }
        if other.before.is_some() {
            self.before = other.before.clone();
        }
        if other.after.is_some() {
            self.after = other.after.clone();
        }
        self
    }

    /// Finalize into an immutable [`Config`].
    pub fn build(&self) -> Config {
        Config {
            format: self.format.clone(),
            files: self.files.clone(),
            tags: self.tags.clone(),
            units: self.units.clone(),
            matches: self.matches.clone(),
            loadpath: self.loadpath.clone(),
            requires: self.requires.clone(),
            autopath: self.autopath,
            verbose: self.verbose.unwrap_or(false),
            hard: self.hard.unwrap_or(false),
            chdir: self.chdir.clone(),
            name: self.name.clone(),
            mode: self.mode.clone(),
            before: self.before.clone(),
            after: self.after.clone(),
        }
    }
}
