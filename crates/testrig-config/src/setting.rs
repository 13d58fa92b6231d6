//! Setting keys and values
//!
//! Every configurable field has a [`Setting`] key. Values arriving from
//! configuration files, the environment or `apply` are carried as a
//! [`SettingValue`] and normalized by the setter they are routed to.

use std::fmt;

/// A dynamically typed setting value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingValue {
    /// A single string. List setters split it on `:` and `;`.
    Text(String),
    /// An explicit list of entries.
    List(Vec<String>),
    /// A boolean flag.
    Flag(bool),
}

impl SettingValue {
    /// Normalize into a list of non-blank strings.
    ///
    /// Text is split at `:` and `;` markers. Lists are taken as-is and flags
    /// become a one-element list. Blank or whitespace-only entries are dropped.
    pub fn into_list(self) -> Vec<String> {
        let list = match self {
            SettingValue::Text(text) => split_list(&text),
            SettingValue::List(list) => list,
            SettingValue::Flag(flag) => vec![flag.to_string()],
        };
        list.into_iter()
            .filter(|entry| !entry.trim().is_empty())
            .collect()
    }

    /// Interpret as a boolean.
    ///
    /// Text is matched against the truthy set (`1`, `true`, `yes`, `on`);
    /// a list is true when it is non-empty.
    pub fn into_bool(self) -> bool {
        match self {
            SettingValue::Flag(flag) => flag,
            SettingValue::Text(text) => is_truthy(&text),
            SettingValue::List(list) => !list.is_empty(),
        }
    }

    /// Interpret as a single string.
    pub fn into_text(self) -> String {
        match self {
            SettingValue::Text(text) => text,
            SettingValue::List(list) => list.join(";"),
            SettingValue::Flag(flag) => flag.to_string(),
        }
    }
}

impl From<&str> for SettingValue {
    fn from(value: &str) -> Self {
        SettingValue::Text(value.to_string())
    }
}

impl From<String> for SettingValue {
    fn from(value: String) -> Self {
        SettingValue::Text(value)
    }
}

impl From<bool> for SettingValue {
    fn from(value: bool) -> Self {
        SettingValue::Flag(value)
    }
}

impl From<Vec<String>> for SettingValue {
    fn from(value: Vec<String>) -> Self {
        SettingValue::List(value)
    }
}

impl From<Vec<&str>> for SettingValue {
    fn from(value: Vec<&str>) -> Self {
        SettingValue::List(value.into_iter().map(str::to_string).collect())
    }
}

impl<const N: usize> From<[&str; N]> for SettingValue {
    fn from(value: [&str; N]) -> Self {
        SettingValue::List(value.iter().map(|s| s.to_string()).collect())
    }
}

impl From<&[String]> for SettingValue {
    fn from(value: &[String]) -> Self {
        SettingValue::List(value.to_vec())
    }
}

impl From<toml::Value> for SettingValue {
    fn from(value: toml::Value) -> Self {
        match value {
            toml::Value::String(s) => SettingValue::Text(s),
            toml::Value::Boolean(b) => SettingValue::Flag(b),
            toml::Value::Array(items) => SettingValue::List(
                items
                    .into_iter()
                    .map(|item| match item {
                        toml::Value::String(s) => s,
                        other => other.to_string(),
                    })
                    .collect(),
            ),
            other => SettingValue::Text(other.to_string()),
        }
    }
}

/// Split a delimited string at `:` and `;` markers.
pub fn split_list(text: &str) -> Vec<String> {
    text.split([':', ';']).map(str::to_string).collect()
}

/// Canonical truthy strings for boolean settings.
pub fn is_truthy(text: &str) -> bool {
    matches!(
        text.trim().to_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

/// Keys recognized by [`ConfigBuilder::apply`](crate::ConfigBuilder::apply).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Setting {
    Format,
    Files,
    Tags,
    Units,
    Match,
    Loadpath,
    Requires,
    Autopath,
    Verbose,
    Hard,
    Chdir,
    Name,
    Mode,
}

impl Setting {
    /// All settings, in display order.
    pub const ALL: [Setting; 13] = [
        Setting::Format,
        Setting::Files,
        Setting::Tags,
        Setting::Units,
        Setting::Match,
        Setting::Loadpath,
        Setting::Requires,
        Setting::Autopath,
        Setting::Verbose,
        Setting::Hard,
        Setting::Chdir,
        Setting::Name,
        Setting::Mode,
    ];

    /// Settings that can be taken from `testrig_*` environment variables.
    pub const ENVIRONMENT: [Setting; 8] = [
        Setting::Format,
        Setting::Autopath,
        Setting::Files,
        Setting::Match,
        Setting::Tags,
        Setting::Units,
        Setting::Requires,
        Setting::Loadpath,
    ];

    /// Look up a setting by key, accepting the historical aliases.
    pub fn from_key(key: &str) -> Option<Setting> {
        let setting = match key {
            "format" => Setting::Format,
            "files" | "test_files" => Setting::Files,
            "tags" => Setting::Tags,
            "units" => Setting::Units,
            "match" => Setting::Match,
            "loadpath" | "load_path" => Setting::Loadpath,
            "requires" => Setting::Requires,
            "autopath" => Setting::Autopath,
            "verbose" => Setting::Verbose,
            "hard" => Setting::Hard,
            "chdir" => Setting::Chdir,
            "name" => Setting::Name,
            "mode" => Setting::Mode,
            _ => return None,
        };
        Some(setting)
    }

    /// Canonical key.
    pub fn key(self) -> &'static str {
        match self {
            Setting::Format => "format",
            Setting::Files => "files",
            Setting::Tags => "tags",
            Setting::Units => "units",
            Setting::Match => "match",
            Setting::Loadpath => "loadpath",
            Setting::Requires => "requires",
            Setting::Autopath => "autopath",
            Setting::Verbose => "verbose",
            Setting::Hard => "hard",
            Setting::Chdir => "chdir",
            Setting::Name => "name",
            Setting::Mode => "mode",
        }
    }

    /// Whether the setting holds a list.
    pub fn is_list(self) -> bool {
        matches!(
            self,
            Setting::Files
                | Setting::Tags
                | Setting::Units
                | Setting::Match
                | Setting::Loadpath
                | Setting::Requires
        )
    }

    /// Whether the setting holds a boolean.
    pub fn is_flag(self) -> bool {
        matches!(self, Setting::Autopath | Setting::Verbose | Setting::Hard)
    }
}

impl fmt::Display for Setting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}
