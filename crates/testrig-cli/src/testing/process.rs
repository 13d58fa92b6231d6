//! Process engine - run each test file as a subprocess
//!
//! Exit status maps to outcomes: `0` passes, [`OMIT_EXIT_CODE`] omits, any
//! other code fails with the last line of stderr as the description. A file
//! that cannot be spawned, or that dies from a signal, is an error.

use crate::config::{absolute, RunContext};
use crate::testing::discovery::{TestFile, TestSuite};
use crate::testing::engine::Engine;
use crate::testing::outcome::{Detail, Outcome};
use crate::testing::reporter::Reporter;
use anyhow::Result;
use std::process::{Command, Output};
use testrig_config::Config;

/// Exit code a test file uses to mark itself omitted
pub const OMIT_EXIT_CODE: i32 = 77;

/// Runs executable test files
#[derive(Debug, Default)]
pub struct ProcessEngine;

impl ProcessEngine {
    pub fn new() -> Self {
        Self
    }

    fn run_file(&self, file: &TestFile, config: &Config, ctx: &RunContext) -> Outcome {
        tracing::debug!(file = %file.path.display(), "running test file");
        let program = match absolute(&file.path) {
            Ok(program) => program,
            Err(e) => {
                return Outcome::Error(Detail::new(format!("{e:#}")).at(&file.path, None));
            }
        };

        let mut command = Command::new(program);
        command
            .env("TESTRIG_TAGS", config.tags().join(";"))
            .env("TESTRIG_HARD", if config.hard() { "1" } else { "0" })
            .env("TESTRIG_LOADPATH", ctx.load_path_string());
        if let Some(mode) = config.mode() {
            command.env("TESTRIG_MODE", mode);
        }

        match command.output() {
            Ok(output) => outcome_for(file, &output),
            Err(e) => Outcome::Error(
                Detail::new(format!("failed to run {}: {e}", file.name)).at(&file.path, None),
            ),
        }
    }
}

fn last_stderr_line(output: &Output) -> Option<String> {
    String::from_utf8_lossy(&output.stderr)
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .last()
        .map(str::to_string)
}

fn outcome_for(file: &TestFile, output: &Output) -> Outcome {
    match output.status.code() {
        Some(0) => Outcome::Pass,
        Some(OMIT_EXIT_CODE) => {
            let reason = last_stderr_line(output).unwrap_or_else(|| "omitted".to_string());
            Outcome::Omit(Detail::new(reason).at(&file.path, None))
        }
        Some(code) => {
            let description =
                last_stderr_line(output).unwrap_or_else(|| format!("exited with status {code}"));
            Outcome::Fail(Detail::new(description).at(&file.path, None))
        }
        None => Outcome::Error(
            Detail::new(format!("terminated by signal ({})", output.status)).at(&file.path, None),
        ),
    }
}

impl Engine for ProcessEngine {
    fn run(&mut self, config: &Config, ctx: &RunContext, reporter: &mut dyn Reporter) -> Result<()> {
        let suite = TestSuite::discover(config.files()).filter(config.units(), config.matches());
        tracing::debug!(files = suite.len(), missing = suite.missing.len(), "discovered tests");

        for path in &suite.missing {
            let name = path.display().to_string();
            reporter.error(&name, Detail::new(format!("no such file or directory -- {name}")))?;
        }
        for file in &suite.files {
            let outcome = self.run_file(file, config, ctx);
            reporter.report(&file.name, outcome)?;
        }
        Ok(())
    }
}
