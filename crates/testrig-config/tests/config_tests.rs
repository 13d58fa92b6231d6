//! Configuration layering, profile and precedence tests

use pretty_assertions::assert_eq;
use std::fs;
use std::path::Path;
use tempfile::TempDir;
use testrig_config::{ConfigError, ConfigLoader, Registry, SettingValue};

fn create_config_file(dir: &Path, name: &str, content: &str) -> std::path::PathBuf {
    let config_path = dir.join(name);
    fs::write(&config_path, content).unwrap();
    config_path
}

fn env(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

// ============================================================================
// Profile Tests
// ============================================================================

#[test]
fn test_configure_twice_keeps_only_second() {
    let mut registry = Registry::new();
    registry
        .configure(None, |c| {
            c.files("test/a").format("tapj");
            Ok(())
        })
        .unwrap();
    registry
        .configure(None, |c| {
            c.tags("slow");
            Ok(())
        })
        .unwrap();

    let config = registry.configuration(None, false).build();
    assert!(config.files().is_empty());
    assert_eq!(config.format(), "dotprogress");
    assert_eq!(config.tags(), ["slow"]);
}

#[test]
fn test_reconfigure_twice_unions_settings() {
    let mut registry = Registry::new();
    registry.configuration(Some("ci"), true);
    registry
        .configure(Some("ci"), |c| {
            c.files("test/a").format("tapj");
            Ok(())
        })
        .unwrap();
    registry
        .configure(Some("ci"), |c| {
            c.format("tapy").tags("slow");
            Ok(())
        })
        .unwrap();

    let config = registry.profile("ci").unwrap().build();
    assert_eq!(config.files(), ["test/a"]);
    assert_eq!(config.format(), "tapy");
    assert_eq!(config.tags(), ["slow"]);
}

#[test]
fn test_configuration_creates_empty_profile() {
    let mut registry = Registry::new();
    let config = registry.configuration(Some("fresh"), false).build();
    assert!(config.files().is_empty());
    assert!(registry.profile("fresh").is_some());
}

// ============================================================================
// Apply Tests
// ============================================================================

#[test]
fn test_apply_typo_is_reported() {
    let mut registry = Registry::new();
    let result = registry.configure(None, |c| {
        c.apply([("verbose", SettingValue::from(true)), ("tagz", SettingValue::from("x"))])?;
        Ok(())
    });

    match result {
        Err(ConfigError::NoSuchSetting(key)) => assert_eq!(key, "tagz"),
        other => panic!("expected NoSuchSetting, got {other:?}"),
    }
}

// ============================================================================
// Environment Precedence Tests
// ============================================================================

#[test]
fn test_env_overrides_after_config_file() {
    let temp_dir = TempDir::new().unwrap();
    create_config_file(temp_dir.path(), "testrig.toml", "format = \"tapj\"\n");

    let mut registry = Registry::new();
    ConfigLoader::new()
        .with_global_config(None)
        .load(&mut registry, temp_dir.path())
        .unwrap();

    let builder = registry.configuration(None, false);
    builder.apply_environment_overrides_from(env(&[("TESTRIG_FORMAT", "tapy")]));
    assert_eq!(builder.build().format(), "tapy");
}

#[test]
fn test_env_defaults_after_config_file() {
    let temp_dir = TempDir::new().unwrap();
    create_config_file(temp_dir.path(), "testrig.toml", "format = \"tapj\"\n");

    let mut registry = Registry::new();
    ConfigLoader::new()
        .with_global_config(None)
        .load(&mut registry, temp_dir.path())
        .unwrap();

    let builder = registry.configuration(None, false);
    builder.apply_environment_defaults_from(env(&[
        ("TESTRIG_FORMAT", "tapy"),
        ("testrig_requires", "setup.sh"),
    ]));
    let config = builder.build();
    assert_eq!(config.format(), "tapj");
    assert_eq!(config.requires(), ["setup.sh"]);
}

// ============================================================================
// Config File Tests
// ============================================================================

#[test]
fn test_project_file_registers_presets() {
    let temp_dir = TempDir::new().unwrap();
    create_config_file(
        temp_dir.path(),
        "testrig.toml",
        r#"
files = ["test"]

[profiles.common]
loadpath = "lib"

[profiles.default]
tags = "fast"

[profiles.full]
tags = ["fast", "slow"]
verbose = true
"#,
    );

    let mut registry = Registry::new();
    ConfigLoader::new()
        .with_global_config(None)
        .load(&mut registry, temp_dir.path())
        .unwrap();

    assert_eq!(registry.presets(), vec!["full"]);
    let mut active = registry.configuration(None, false).clone();
    registry.apply_preset("common", &mut active).unwrap();
    registry.apply_preset("full", &mut active).unwrap();

    let config = active.build();
    assert_eq!(config.files(), ["test"]);
    assert_eq!(config.loadpath(), ["lib"]);
    assert_eq!(config.tags(), ["fast", "slow"]);
    assert!(config.verbose());
}

#[test]
fn test_invalid_toml_syntax() {
    let temp_dir = TempDir::new().unwrap();
    create_config_file(temp_dir.path(), "broken.toml", "format = \"tapj\n");

    let mut registry = Registry::new();
    let result = registry.load_config_from(temp_dir.path(), Path::new("broken"));
    assert!(matches!(result, Err(ConfigError::TomlParseError { .. })));
}

#[test]
fn test_profiles_must_be_tables() {
    let temp_dir = TempDir::new().unwrap();
    create_config_file(temp_dir.path(), "odd.toml", "profiles = \"ci\"\n");

    let mut registry = Registry::new();
    let result = registry.load_config_from(temp_dir.path(), Path::new("odd.toml"));
    assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
}

#[test]
fn test_explicit_extension_is_kept() {
    let temp_dir = TempDir::new().unwrap();
    create_config_file(temp_dir.path(), "settings.cfg", "verbose = true\n");

    let mut registry = Registry::new();
    assert!(registry
        .load_config_from(temp_dir.path(), Path::new("settings.cfg"))
        .unwrap());
    assert!(registry.configuration(None, false).build().verbose());
}

// ============================================================================
// Shell Representation Tests
// ============================================================================

#[test]
fn test_shell_representation_omits_unset_fields() {
    let mut registry = Registry::new();
    registry
        .configure(None, |c| {
            c.matches("parses input").requires("helper.sh");
            Ok(())
        })
        .unwrap();

    let argv = registry.configuration(None, false).build().to_shell_representation();
    assert_eq!(argv, ["--match=parses input", "--require=helper.sh"]);
}
