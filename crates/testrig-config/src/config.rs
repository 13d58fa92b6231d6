//! Finalized run configuration

use crate::builder::{ConfigBuilder, Hook};

/// Default report is in the "dot-progress" format.
pub const DEFAULT_FORMAT: &str = "dotprogress";

/// Immutable configuration for one test run.
///
/// Produced by [`ConfigBuilder::build`]. List accessors never return
/// anything but a (possibly empty) slice.
#[derive(Debug, Clone)]
pub struct Config {
    pub(crate) format: Option<String>,
    pub(crate) files: Vec<String>,
    pub(crate) tags: Vec<String>,
    pub(crate) units: Vec<String>,
    pub(crate) matches: Vec<String>,
    pub(crate) loadpath: Vec<String>,
    pub(crate) requires: Vec<String>,
    pub(crate) autopath: Option<bool>,
    pub(crate) verbose: bool,
    pub(crate) hard: bool,
    pub(crate) chdir: Option<String>,
    pub(crate) name: Option<String>,
    pub(crate) mode: Option<String>,
    pub(crate) before: Option<Hook>,
    pub(crate) after: Option<Hook>,
}

impl Default for Config {
    fn default() -> Self {
        ConfigBuilder::new().build()
    }
}

impl Config {
    /// Name of the report format, `dotprogress` unless set.
    pub fn format(&self) -> &str {
        self.format.as_deref().unwrap_or(DEFAULT_FORMAT)
    }

    /// Test files, directories or patterns to run.
    pub fn files(&self) -> &[String] {
        &self.files
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn units(&self) -> &[String] {
        &self.units
    }

    /// Description match filter.
    pub fn matches(&self) -> &[String] {
        &self.matches
    }

    pub fn loadpath(&self) -> &[String] {
        &self.loadpath
    }

    pub fn requires(&self) -> &[String] {
        &self.requires
    }

    /// `None` when never configured.
    pub fn autopath(&self) -> Option<bool> {
        self.autopath
    }

    pub fn verbose(&self) -> bool {
        self.verbose
    }

    pub fn hard(&self) -> bool {
        self.hard
    }

    pub fn chdir(&self) -> Option<&str> {
        self.chdir.as_deref()
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn mode(&self) -> Option<&str> {
        self.mode.as_deref()
    }

    pub fn before(&self) -> Option<&Hook> {
        self.before.as_ref()
    }

    pub fn after(&self) -> Option<&Hook> {
        self.after.as_ref()
    }

    /// Convert to command line arguments, compatible with the `testrig`
    /// command line.
    ///
    /// Parsing the result reproduces this configuration, hooks excepted.
    /// Files come last as positional arguments.
    pub fn to_shell_representation(&self) -> Vec<String> {
        let mut argv = Vec::new();

        match self.autopath {
            Some(true) => argv.push("--autopath".to_string()),
            Some(false) => argv.push("--no-autopath".to_string()),
            None => {}
        }
        if self.verbose {
            argv.push("--verbose".to_string());
        }
        if let Some(format) = &self.format {
            argv.push(format!("--format={format}"));
        }
        if let Some(chdir) = &self.chdir {
            argv.push(format!("--chdir={chdir}"));
        }

        let lists = [
            ("tag", &self.tags),
            ("match", &self.matches),
            ("unit", &self.units),
            ("loadpath", &self.loadpath),
            ("require", &self.requires),
        ];
        // One flag per entry, so entries holding separators survive
        for (flag, list) in lists {
            argv.extend(list.iter().map(|entry| format!("--{flag}={entry}")));
        }

        if !self.files.is_empty() {
            // Keep anything that looks like a flag from being parsed as one
            argv.push("--".to_string());
            argv.extend(self.files.iter().cloned());
        }
        argv
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_snapshot;

    #[test]
    fn test_default_format() {
        let config = Config::default();
        assert_eq!(config.format(), DEFAULT_FORMAT);
        assert!(config.to_shell_representation().is_empty());
    }

    #[test]
    fn test_shell_representation() {
        let mut builder = ConfigBuilder::new();
        builder
            .autopath(true)
            .verbose(true)
            .format("tapj")
            .chdir("sub")
            .tags("slow:net")
            .units("Parser")
            .loadpath("lib")
            .files(["test/a_test", "test/b_test"]);

        let argv = builder.build().to_shell_representation();
        assert_snapshot!(
            argv.join(" "),
            @"--autopath --verbose --format=tapj --chdir=sub --tag=slow --tag=net --unit=Parser --loadpath=lib -- test/a_test test/b_test"
        );
    }

    #[test]
    fn test_shell_representation_keeps_entries_whole() {
        let mut builder = ConfigBuilder::new();
        builder.matches(vec!["http://x", "a;b"]);
        assert_eq!(
            builder.build().to_shell_representation(),
            ["--match=http://x", "--match=a;b"]
        );
    }

    #[test]
    fn test_shell_representation_autopath_off() {
        let mut builder = ConfigBuilder::new();
        builder.autopath(false);
        assert_eq!(builder.build().to_shell_representation(), ["--no-autopath"]);
    }
}
