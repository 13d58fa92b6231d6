//! Run context - process-wide state that is not part of a run configuration
//!
//! The load path, debug mode and ANSI styling are owned by the run
//! orchestrator rather than by any profile. The environment seeds them:
//! `testrig_debug` (truthy) turns debug mode on and `NO_COLOR` disables
//! styling.

use anyhow::{bail, Context, Result};
use std::collections::BTreeSet;
use std::env;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::process::Command;
use testrig_config::setting::{is_truthy, split_list};

/// Environment variable enabling debug mode
pub const DEBUG_VAR: &str = "testrig_debug";

/// Separator used when passing the load path to child processes
#[cfg(unix)]
pub const PATH_SEPARATOR: &str = ":";
#[cfg(not(unix))]
pub const PATH_SEPARATOR: &str = ";";

/// Process-wide run state
#[derive(Debug, Clone, Default)]
pub struct RunContext {
    /// Ordered directories consulted when resolving required files
    pub load_path: Vec<PathBuf>,
    /// Decorate reporter output with ANSI styles
    pub ansi: bool,
    /// Propagate errors with their full context instead of a one-line message
    pub debug: bool,
    required: BTreeSet<PathBuf>,
}

impl RunContext {
    /// Load the context from the process environment
    pub fn from_env() -> Self {
        let mut context = Self::from_env_vars(env::vars());
        context.ansi = std::io::stdout().is_terminal() && env::var_os("NO_COLOR").is_none();
        context
    }

    /// Load the context from the given variables.
    ///
    /// Variable names match case-insensitively. ANSI stays off.
    pub fn from_env_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let debug = vars
            .into_iter()
            .any(|(k, v)| k.as_ref().eq_ignore_ascii_case(DEBUG_VAR) && is_truthy(v.as_ref()));
        Self {
            debug,
            ..Self::default()
        }
    }

    /// Prepend a delimited list of directories, keeping its order at the
    /// front of the load path.
    pub fn prepend_load_path(&mut self, list: &str) {
        for dir in split_list(list).into_iter().rev() {
            self.load_path.insert(0, PathBuf::from(dir));
        }
    }

    /// Append project directories not already on the load path
    pub fn add_project_paths(&mut self, paths: impl IntoIterator<Item = PathBuf>) {
        for path in paths {
            if !self.load_path.contains(&path) {
                tracing::debug!(path = %path.display(), "adding project load path");
                self.load_path.push(path);
            }
        }
    }

    /// Load path joined for child process environments
    pub fn load_path_string(&self) -> String {
        self.load_path
            .iter()
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>()
            .join(PATH_SEPARATOR)
    }

    /// Find a required file: as given, else under each load path entry.
    pub fn resolve(&self, file: &str) -> Option<PathBuf> {
        let path = Path::new(file);
        if path.is_file() {
            return Some(path.to_path_buf());
        }
        if path.is_absolute() {
            return None;
        }
        self.load_path
            .iter()
            .map(|dir| dir.join(path))
            .find(|candidate| candidate.is_file())
    }

    /// Find a required file and make its path absolute.
    pub fn locate(&self, file: &str) -> Result<PathBuf> {
        let path = self
            .resolve(file)
            .with_context(|| format!("cannot load such file -- {file}"))?;
        absolute(&path)
    }

    /// Execute a located script once.
    ///
    /// Returns `false` when the script already ran in this process.
    pub fn require(&mut self, path: &Path) -> Result<bool> {
        let key = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        if self.required.contains(&key) {
            tracing::debug!(file = %path.display(), "already required");
            return Ok(false);
        }

        tracing::debug!(file = %path.display(), "requiring");
        let status = Command::new(path)
            .env("TESTRIG_LOADPATH", self.load_path_string())
            .status()
            .with_context(|| format!("failed to run required file {}", path.display()))?;
        if !status.success() {
            bail!("required file {} exited with {}", path.display(), status);
        }

        self.required.insert(key);
        Ok(true)
    }
}

/// Join a relative path onto the current directory.
///
/// Spawning a bare name would search `PATH` instead of the directory it was
/// found in.
pub fn absolute(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd = env::current_dir().context("cannot determine the current directory")?;
    Ok(cwd.join(path))
}
