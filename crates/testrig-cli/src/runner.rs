//! Run orchestration - from a resolved configuration to a tally

use crate::config::RunContext;
use crate::testing::engine::Engine;
use crate::testing::outcome::Tally;
use crate::testing::reporter::reporter_for;
use anyhow::{Context, Result};
use std::env;
use std::io::Write;
use testrig_config::{Config, Project};

/// Drives one test run
pub struct Runner<'a> {
    config: Config,
    context: &'a mut RunContext,
}

impl<'a> Runner<'a> {
    pub fn new(config: Config, context: &'a mut RunContext) -> Self {
        Self { config, context }
    }

    /// Add the project's load path entries unless autopath is switched off.
    pub fn setup_load_path(&mut self, project: &Project) {
        if self.config.autopath() == Some(false) {
            tracing::debug!("autopath disabled");
            return;
        }
        self.context.add_project_paths(project.load_paths());
    }

    /// Run the suite and return its tally.
    ///
    /// Changes directory if configured, calls the `before` hook, loads each
    /// required file once, lets `engine` report into a reporter writing to
    /// `out`, finalizes the report and calls the `after` hook. Required files
    /// are located before the directory changes.
    pub fn run<W: Write + 'static>(&mut self, engine: &mut dyn Engine, out: W) -> Result<Tally> {
        let mut reporter = reporter_for(
            self.config.format(),
            out,
            self.config.verbose(),
            self.context.ansi,
        )?;

        let requires = self
            .config
            .requires()
            .iter()
            .map(|file| self.context.locate(file))
            .collect::<Result<Vec<_>>>()?;

        if let Some(dir) = self.config.chdir() {
            tracing::debug!(dir, "changing directory");
            env::set_current_dir(dir).with_context(|| format!("cannot change directory to {dir}"))?;
        }

        if let Some(hook) = self.config.before() {
            hook.call();
        }
        for path in &requires {
            self.context.require(path)?;
        }

        engine
            .run(&self.config, &*self.context, reporter.as_mut())
            .context("test engine failed")?;
        let tally = reporter.end_suite()?;

        if let Some(hook) = self.config.after() {
            hook.call();
        }
        tracing::debug!(%tally, "run finished");
        Ok(tally)
    }
}
