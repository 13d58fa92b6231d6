//! Test reporter - accumulate outcomes and display results
//!
//! A reporter serves exactly one suite run. It moves from `Idle` to
//! `Running` on the first outcome and to `Finalized` on [`Reporter::end_suite`];
//! after that every call is rejected with [`ReportError::Finalized`].

use crate::testing::dotprogress::DotProgress;
use crate::testing::outcome::{Detail, Outcome, OutcomeKind, Tally};
use crate::testing::tap::{TapFlavor, TapReporter};
use std::io::{self, Write};
use std::time::{Duration, Instant};
use thiserror::Error;

/// Reporter errors
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("reporter already finalized; no further events accepted")]
    Finalized,

    #[error("unknown report format '{0}'")]
    UnknownFormat(String),

    #[error("failed to write report: {0}")]
    Io(#[from] io::Error),

    #[error("failed to encode report document: {0}")]
    Json(#[from] serde_json::Error),
}

pub type ReportResult<T> = Result<T, ReportError>;

/// Lifecycle of a reporter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReporterState {
    Idle,
    Running,
    Finalized,
}

/// Receives outcome events from the engine, in order.
pub trait Reporter {
    /// Record the outcome of one test unit.
    fn report(&mut self, unit: &str, outcome: Outcome) -> ReportResult<()>;

    /// Render the final report and return the tally.
    fn end_suite(&mut self) -> ReportResult<Tally>;

    fn pass(&mut self, unit: &str) -> ReportResult<()> {
        self.report(unit, Outcome::Pass)
    }

    fn fail(&mut self, unit: &str, detail: Detail) -> ReportResult<()> {
        self.report(unit, Outcome::Fail(detail))
    }

    fn error(&mut self, unit: &str, detail: Detail) -> ReportResult<()> {
        self.report(unit, Outcome::Error(detail))
    }

    fn todo(&mut self, unit: &str, detail: Detail) -> ReportResult<()> {
        self.report(unit, Outcome::Todo(detail))
    }

    fn omit(&mut self, unit: &str, detail: Detail) -> ReportResult<()> {
        self.report(unit, Outcome::Omit(detail))
    }
}

/// Categorized outcome record shared by all reporters
#[derive(Debug)]
pub struct Record {
    state: ReporterState,
    started: Instant,
    passed: usize,
    fail: Vec<(String, Detail)>,
    error: Vec<(String, Detail)>,
    todo: Vec<(String, Detail)>,
    omit: Vec<(String, Detail)>,
}

impl Default for Record {
    fn default() -> Self {
        Self::new()
    }
}

impl Record {
    pub fn new() -> Self {
        Self {
            state: ReporterState::Idle,
            started: Instant::now(),
            passed: 0,
            fail: Vec::new(),
            error: Vec::new(),
            todo: Vec::new(),
            omit: Vec::new(),
        }
    }

    pub fn state(&self) -> ReporterState {
        self.state
    }

    /// Append an outcome, returning its kind.
    pub fn push(&mut self, unit: &str, outcome: Outcome) -> ReportResult<OutcomeKind> {
        if self.state == ReporterState::Finalized {
            return Err(ReportError::Finalized);
        }
        self.state = ReporterState::Running;

        let kind = outcome.kind();
        match outcome.into_detail() {
            None => self.passed += 1,
            Some(detail) => {
                let entry = (unit.to_string(), detail);
                match kind {
                    OutcomeKind::Fail => self.fail.push(entry),
                    OutcomeKind::Error => self.error.push(entry),
                    OutcomeKind::Todo => self.todo.push(entry),
                    OutcomeKind::Omit => self.omit.push(entry),
                    OutcomeKind::Pass => self.passed += 1,
                }
            }
        }
        Ok(kind)
    }

    /// Close the record; later pushes fail.
    pub fn finalize(&mut self) -> ReportResult<Tally> {
        if self.state == ReporterState::Finalized {
            return Err(ReportError::Finalized);
        }
        self.state = ReporterState::Finalized;
        Ok(self.tally())
    }

    /// Recorded entries of a non-pass kind
    pub fn entries(&self, kind: OutcomeKind) -> &[(String, Detail)] {
        match kind {
            OutcomeKind::Pass => &[],
            OutcomeKind::Fail => &self.fail,
            OutcomeKind::Error => &self.error,
            OutcomeKind::Todo => &self.todo,
            OutcomeKind::Omit => &self.omit,
        }
    }

    pub fn tally(&self) -> Tally {
        Tally {
            pass: self.passed,
            fail: self.fail.len(),
            error: self.error.len(),
            todo: self.todo.len(),
            omit: self.omit.len(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

/// Create the reporter for a format name.
pub fn reporter_for<W: Write + 'static>(
    format: &str,
    out: W,
    verbose: bool,
    ansi: bool,
) -> ReportResult<Box<dyn Reporter>> {
    let reporter: Box<dyn Reporter> = match format {
        "dotprogress" | "dot" => Box::new(DotProgress::new(out, verbose).with_ansi(ansi)),
        "tapj" => Box::new(TapReporter::new(out, TapFlavor::Json)),
        "tapy" => Box::new(TapReporter::new(out, TapFlavor::Yaml)),
        other => return Err(ReportError::UnknownFormat(other.to_string())),
    };
    Ok(reporter)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_state_machine() {
        let mut record = Record::new();
        assert_eq!(record.state(), ReporterState::Idle);

        record.push("a", Outcome::Pass).unwrap();
        assert_eq!(record.state(), ReporterState::Running);

        let kind = record.push("b", Outcome::Todo(Detail::new("later"))).unwrap();
        assert_eq!(kind, OutcomeKind::Todo);

        let tally = record.finalize().unwrap();
        assert_eq!(record.state(), ReporterState::Finalized);
        assert_eq!(tally.pass, 1);
        assert_eq!(tally.todo, 1);

        assert!(matches!(
            record.push("c", Outcome::Pass),
            Err(ReportError::Finalized)
        ));
        assert!(matches!(record.finalize(), Err(ReportError::Finalized)));
    }

    #[test]
    fn test_record_keeps_order_per_kind() {
        let mut record = Record::new();
        record.push("t1", Outcome::Fail(Detail::new("one"))).unwrap();
        record.push("t2", Outcome::Error(Detail::new("two"))).unwrap();
        record.push("t3", Outcome::Fail(Detail::new("three"))).unwrap();

        let failures: Vec<_> = record
            .entries(OutcomeKind::Fail)
            .iter()
            .map(|(unit, _)| unit.as_str())
            .collect();
        assert_eq!(failures, ["t1", "t3"]);
        assert_eq!(record.entries(OutcomeKind::Error).len(), 1);
        assert!(record.entries(OutcomeKind::Pass).is_empty());
    }

    #[test]
    fn test_reporter_for_formats() {
        assert!(reporter_for("dotprogress", io::sink(), false, false).is_ok());
        assert!(reporter_for("tapj", io::sink(), false, false).is_ok());
        assert!(reporter_for("tapy", io::sink(), false, false).is_ok());
        assert!(matches!(
            reporter_for("html", io::sink(), false, false),
            Err(ReportError::UnknownFormat(name)) if name == "html"
        ));
    }
}
