//! Environment variable configuration
//!
//! Settings can be supplied as `testrig_<field>` environment variables. The
//! lookup is case-insensitive, so `TESTRIG_FORMAT` works as well as
//! `testrig_format`. List fields are split on `:` and `;`, `autopath` uses
//! the truthy set and `format` is taken verbatim.

use crate::builder::ConfigBuilder;
use crate::setting::{Setting, SettingValue};
use std::collections::HashMap;
use std::env;

/// Namespace prefix of configuration environment variables.
pub const ENV_PREFIX: &str = "testrig";

/// Environment variable name for a setting, in canonical (lower) case.
pub fn var_name(setting: Setting) -> String {
    format!("{ENV_PREFIX}_{}", setting.key())
}

/// Collect the `testrig_*` settings present in `vars`.
///
/// When the same setting appears under several spellings the last one wins.
pub fn lookup<I, K, V>(vars: I) -> HashMap<Setting, String>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: Into<String>,
{
    let mut found = HashMap::new();
    for (name, value) in vars {
        let name = name.as_ref().to_lowercase();
        if let Some(setting) = Setting::ENVIRONMENT
            .into_iter()
            .find(|setting| var_name(*setting) == name)
        {
            found.insert(setting, value.into());
        }
    }
    found
}

fn to_value(setting: Setting, raw: String) -> SettingValue {
    if setting.is_list() {
        SettingValue::List(SettingValue::Text(raw).into_list())
    } else if setting.is_flag() {
        SettingValue::Flag(SettingValue::Text(raw).into_bool())
    } else {
        SettingValue::Text(raw)
    }
}

impl ConfigBuilder {
    /// Apply the process environment, overriding any previous settings.
    pub fn apply_environment_overrides(&mut self) -> &mut Self {
        self.apply_environment_overrides_from(env::vars())
    }

    /// Apply `vars` as if they were the environment, overriding any previous
    /// settings.
    pub fn apply_environment_overrides_from<I, K, V>(&mut self, vars: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let found = lookup(vars);
        for setting in Setting::ENVIRONMENT {
            if let Some(raw) = found.get(&setting) {
                tracing::debug!(setting = %setting, value = %raw, "environment override");
                self.set(setting, to_value(setting, raw.clone()));
            }
        }
        self
    }

    /// Apply the process environment as defaults for unset settings.
    pub fn apply_environment_defaults(&mut self) -> &mut Self {
        self.apply_environment_defaults_from(env::vars())
    }

    /// Apply `vars` as if they were the environment, filling only settings
    /// that are still unset.
    pub fn apply_environment_defaults_from<I, K, V>(&mut self, vars: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let found = lookup(vars);
        for setting in Setting::ENVIRONMENT {
            if self.is_set(setting) {
                continue;
            }
            if let Some(raw) = found.get(&setting) {
                tracing::debug!(setting = %setting, value = %raw, "environment default");
                self.set(setting, to_value(setting, raw.clone()));
            }
        }
        self
    }
}
