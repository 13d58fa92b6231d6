//! Dot-progress reporter - one character per test, details at the end

use crate::testing::outcome::{Detail, Outcome, OutcomeKind, Tally};
use crate::testing::reporter::{Record, ReportResult, Reporter};
use colored::*;
use std::io::Write;

/// Lines of source shown on each side of a failing line
const EXCERPT_RADIUS: u32 = 2;

/// Simple dot-progress reporter
pub struct DotProgress<W: Write> {
    out: W,
    record: Record,
    /// Show omissions in the final report
    verbose: bool,
    /// Decorate output with ANSI styles
    ansi: bool,
}

impl<W: Write> DotProgress<W> {
    /// Create a new dot-progress reporter writing to `out`
    pub fn new(out: W, verbose: bool) -> Self {
        Self {
            out,
            record: Record::new(),
            verbose,
            ansi: true,
        }
    }

    /// Enable or disable ANSI styling
    pub fn with_ansi(mut self, ansi: bool) -> Self {
        self.ansi = ansi;
        self
    }

    /// Access the underlying writer
    pub fn get_ref(&self) -> &W {
        &self.out
    }

    fn paint(&self, text: &str, style: impl Fn(&str) -> ColoredString) -> String {
        if self.ansi {
            style(text).to_string()
        } else {
            text.to_string()
        }
    }

    fn mark(&self, kind: OutcomeKind) -> String {
        let mark = kind.mark();
        match kind {
            OutcomeKind::Pass => mark.to_string(),
            OutcomeKind::Fail => self.paint(mark, |s| s.red()),
            OutcomeKind::Error => self.paint(mark, |s| s.red().bold()),
            OutcomeKind::Todo => self.paint(mark, |s| s.yellow()),
            OutcomeKind::Omit => self.paint(mark, |s| s.cyan()),
        }
    }

    fn timestamp(&self, tally: &Tally) -> String {
        let secs = self.record.elapsed().as_secs_f64();
        let rate = if secs > 0.0 {
            tally.total() as f64 / secs
        } else {
            0.0
        };
        format!("Finished in {secs:.5}s, {rate:.2} tests/s.")
    }

    /// Print one section of the final report.
    fn section(&mut self, title: &str, kind: OutcomeKind, excerpt: bool) -> ReportResult<()> {
        let entries: Vec<(String, Detail)> = self.record.entries(kind).to_vec();
        if entries.is_empty() {
            return Ok(());
        }

        writeln!(self.out, "{title}")?;
        writeln!(self.out)?;
        for (unit, detail) in &entries {
            // Pending entries may have no unit name
            if !(kind == OutcomeKind::Todo && unit.is_empty()) {
                let line = self.paint(&format!("    {unit}"), |s| s.bold());
                writeln!(self.out, "{line}")?;
            }
            writeln!(self.out, "    {detail}")?;
            if let Some(file_and_line) = detail.file_and_line() {
                writeln!(self.out, "    {file_and_line}")?;
            }
            if excerpt {
                if let Some(lines) = detail.source_excerpt(EXCERPT_RADIUS) {
                    for (number, text, failing) in lines {
                        let marker = if failing { "=>" } else { "  " };
                        writeln!(self.out, "    {marker} {number:>4} | {text}")?;
                    }
                }
            }
            writeln!(self.out)?;
        }
        Ok(())
    }
}

impl<W: Write> Reporter for DotProgress<W> {
    fn report(&mut self, unit: &str, outcome: Outcome) -> ReportResult<()> {
        let kind = self.record.push(unit, outcome)?;
        let mark = self.mark(kind);
        write!(self.out, "{mark}")?;
        self.out.flush()?;
        Ok(())
    }

    fn end_suite(&mut self) -> ReportResult<Tally> {
        let tally = self.record.finalize()?;

        writeln!(self.out)?;
        writeln!(self.out)?;
        let stamp = self.timestamp(&tally);
        writeln!(self.out, "{stamp}")?;
        writeln!(self.out)?;

        if self.verbose {
            self.section("OMISSIONS", OutcomeKind::Omit, false)?;
        }
        self.section("PENDING", OutcomeKind::Todo, true)?;
        self.section("FAILURES", OutcomeKind::Fail, true)?;
        self.section("ERRORS", OutcomeKind::Error, true)?;

        let summary = if tally.is_success() {
            self.paint(&tally.to_string(), |s| s.green())
        } else {
            self.paint(&tally.to_string(), |s| s.red())
        };
        writeln!(self.out, "{summary}")?;
        self.out.flush()?;
        Ok(tally)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::reporter::ReportError;
    use std::io::Write as _;
    use tempfile::NamedTempFile;

    fn output(reporter: &DotProgress<Vec<u8>>) -> String {
        String::from_utf8(reporter.get_ref().clone()).unwrap()
    }

    #[test]
    fn test_marks_and_tally() {
        let mut reporter = DotProgress::new(Vec::new(), false).with_ansi(false);
        reporter.pass("t0").unwrap();
        reporter.fail("t1", Detail::new("boom")).unwrap();
        reporter.error("t2", Detail::new("boom2")).unwrap();
        reporter.pass("t3").unwrap();
        assert_eq!(output(&reporter), ".FE.");

        let tally = reporter.end_suite().unwrap();
        assert_eq!(
            tally,
            Tally {
                pass: 2,
                fail: 1,
                error: 1,
                todo: 0,
                omit: 0
            }
        );

        let out = output(&reporter);
        assert!(out.contains("Finished in "));
        assert!(out.contains("FAILURES\n\n    t1\n    boom\n\n"));
        assert!(out.contains("ERRORS\n\n    t2\n    boom2\n\n"));
        assert!(!out.contains("OMISSIONS"));
        assert!(!out.contains("PENDING"));
        assert!(out.ends_with("4 tests: 2 pass, 1 fail, 1 error, 0 todo, 0 omit\n"));

        let failures = out.find("FAILURES").unwrap();
        let errors = out.find("ERRORS").unwrap();
        assert!(failures < errors);
    }

    #[test]
    fn test_omissions_only_when_verbose() {
        let mut quiet = DotProgress::new(Vec::new(), false).with_ansi(false);
        quiet.omit("skipped", Detail::new("not on this platform")).unwrap();
        quiet.end_suite().unwrap();
        assert!(!output(&quiet).contains("OMISSIONS"));

        let mut verbose = DotProgress::new(Vec::new(), true).with_ansi(false);
        verbose.omit("skipped", Detail::new("not on this platform")).unwrap();
        verbose.end_suite().unwrap();
        let out = output(&verbose);
        assert!(out.starts_with("O\n\n"));
        assert!(out.contains("OMISSIONS\n\n    skipped\n    not on this platform\n"));
    }

    #[test]
    fn test_section_order() {
        let mut reporter = DotProgress::new(Vec::new(), true).with_ansi(false);
        reporter.error("e", Detail::new("err")).unwrap();
        reporter.fail("f", Detail::new("fail")).unwrap();
        reporter.todo("", Detail::new("write me")).unwrap();
        reporter.omit("o", Detail::new("omit")).unwrap();
        reporter.end_suite().unwrap();

        let out = output(&reporter);
        let positions: Vec<usize> = ["OMISSIONS", "PENDING", "FAILURES", "ERRORS", "4 tests:"]
            .iter()
            .map(|title| out.find(title).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
        // Empty pending unit names are not printed
        assert!(out.contains("PENDING\n\n    write me\n"));
    }

    #[test]
    fn test_location_and_excerpt() {
        let mut source = NamedTempFile::new().unwrap();
        write!(source, "setup\ncheck\nteardown\n").unwrap();

        let mut reporter = DotProgress::new(Vec::new(), false).with_ansi(false);
        reporter
            .fail("t1", Detail::new("boom").at(source.path(), Some(2)))
            .unwrap();
        reporter
            .fail("t2", Detail::new("no origin"))
            .unwrap();
        reporter.end_suite().unwrap();

        let out = output(&reporter);
        let location = format!("    {}:2\n", source.path().display());
        assert!(out.contains(&location));
        assert!(out.contains("    =>    2 | check\n"));
        assert!(out.contains("          1 | setup\n"));
        assert!(out.contains("    t2\n    no origin\n\n"));
    }

    #[test]
    fn test_events_after_end_suite_are_rejected() {
        let mut reporter = DotProgress::new(Vec::new(), false).with_ansi(false);
        reporter.pass("t").unwrap();
        reporter.end_suite().unwrap();

        assert!(matches!(reporter.pass("late"), Err(ReportError::Finalized)));
        assert!(matches!(
            reporter.fail("late", Detail::new("x")),
            Err(ReportError::Finalized)
        ));
        assert!(matches!(reporter.end_suite(), Err(ReportError::Finalized)));
    }

    #[test]
    fn test_empty_suite() {
        let mut reporter = DotProgress::new(Vec::new(), false).with_ansi(false);
        let tally = reporter.end_suite().unwrap();
        assert_eq!(tally.total(), 0);
        assert!(output(&reporter).ends_with("0 tests: 0 pass, 0 fail, 0 error, 0 todo, 0 omit\n"));
    }
}
