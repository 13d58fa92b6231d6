//! Test outcomes - what a single test unit produced

use std::fmt;
use std::fs;
use std::path::PathBuf;

/// Classification of a single test unit's result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutcomeKind {
    Pass,
    Fail,
    Error,
    Todo,
    Omit,
}

impl OutcomeKind {
    /// Progress mark printed as the outcome arrives
    pub fn mark(self) -> &'static str {
        match self {
            OutcomeKind::Pass => ".",
            OutcomeKind::Fail => "F",
            OutcomeKind::Error => "E",
            OutcomeKind::Todo => "P",
            OutcomeKind::Omit => "O",
        }
    }

    /// Status name used by the TAP formats
    pub fn as_str(self) -> &'static str {
        match self {
            OutcomeKind::Pass => "pass",
            OutcomeKind::Fail => "fail",
            OutcomeKind::Error => "error",
            OutcomeKind::Todo => "todo",
            OutcomeKind::Omit => "omit",
        }
    }
}

impl fmt::Display for OutcomeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a failure originated
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub file: PathBuf,
    /// 1-based line, when known
    pub line: Option<u32>,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "{}:{}", self.file.display(), line),
            None => write!(f, "{}", self.file.display()),
        }
    }
}

/// Description of a non-passing outcome
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Detail {
    pub description: String,
    pub location: Option<Location>,
}

impl Detail {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            location: None,
        }
    }

    /// Attach the originating file and, if known, line.
    pub fn at(mut self, file: impl Into<PathBuf>, line: Option<u32>) -> Self {
        self.location = Some(Location {
            file: file.into(),
            line,
        });
        self
    }

    /// `file:line` attribution, if the origin is known
    pub fn file_and_line(&self) -> Option<String> {
        self.location.as_ref().map(Location::to_string)
    }

    /// Lines of source around the failing line, best effort.
    ///
    /// Returns `(line number, text, is_failing_line)` triples, or `None`
    /// when there is no line information or the file cannot be read.
    pub fn source_excerpt(&self, radius: u32) -> Option<Vec<(u32, String, bool)>> {
        let location = self.location.as_ref()?;
        let line = location.line?;
        let source = fs::read_to_string(&location.file).ok()?;

        let first = line.saturating_sub(radius).max(1);
        let last = line.saturating_add(radius);
        let excerpt: Vec<_> = source
            .lines()
            .enumerate()
            .map(|(i, text)| (i as u32 + 1, text))
            .filter(|(n, _)| (first..=last).contains(n))
            .map(|(n, text)| (n, text.to_string(), n == line))
            .collect();

        if excerpt.is_empty() {
            None
        } else {
            Some(excerpt)
        }
    }
}

impl fmt::Display for Detail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.description)
    }
}

/// Result of running one test unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Pass,
    Fail(Detail),
    Error(Detail),
    Todo(Detail),
    Omit(Detail),
}

impl Outcome {
    pub fn kind(&self) -> OutcomeKind {
        match self {
            Outcome::Pass => OutcomeKind::Pass,
            Outcome::Fail(_) => OutcomeKind::Fail,
            Outcome::Error(_) => OutcomeKind::Error,
            Outcome::Todo(_) => OutcomeKind::Todo,
            Outcome::Omit(_) => OutcomeKind::Omit,
        }
    }

    /// Detail of a non-passing outcome
    pub fn detail(&self) -> Option<&Detail> {
        match self {
            Outcome::Pass => None,
            Outcome::Fail(d) | Outcome::Error(d) | Outcome::Todo(d) | Outcome::Omit(d) => Some(d),
        }
    }

    pub fn into_detail(self) -> Option<Detail> {
        match self {
            Outcome::Pass => None,
            Outcome::Fail(d) | Outcome::Error(d) | Outcome::Todo(d) | Outcome::Omit(d) => Some(d),
        }
    }
}

/// Final outcome counts of a suite run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    pub pass: usize,
    pub fail: usize,
    pub error: usize,
    pub todo: usize,
    pub omit: usize,
}

impl Tally {
    pub fn total(&self) -> usize {
        self.pass + self.fail + self.error + self.todo + self.omit
    }

    /// A run succeeds when nothing failed or errored
    pub fn is_success(&self) -> bool {
        self.fail == 0 && self.error == 0
    }
}

impl fmt::Display for Tally {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} tests: {} pass, {} fail, {} error, {} todo, {} omit",
            self.total(),
            self.pass,
            self.fail,
            self.error,
            self.todo,
            self.omit
        )
    }
}
