//! TAP-J / TAP-Y reporters - machine readable document streams
//!
//! Both formats emit the same documents: a `suite` header, one `test`
//! document per outcome, and a `final` document with the tally. TAP-J puts
//! one JSON document on each line. TAP-Y writes a YAML stream; each document
//! is JSON in flow style, which YAML parsers read as-is.

use crate::testing::outcome::{Outcome, Tally};
use crate::testing::reporter::{Record, ReportResult, Reporter};
use serde_json::{json, Value};
use std::io::Write;

/// TAP document revision emitted in the suite header
const TAP_REVISION: u32 = 4;

/// Output flavor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TapFlavor {
    /// TAP-J: newline-delimited JSON
    Json,
    /// TAP-Y: YAML document stream
    Yaml,
}

/// Machine-readable reporter
pub struct TapReporter<W: Write> {
    out: W,
    record: Record,
    flavor: TapFlavor,
    header_written: bool,
}

impl<W: Write> TapReporter<W> {
    pub fn new(out: W, flavor: TapFlavor) -> Self {
        Self {
            out,
            record: Record::new(),
            flavor,
            header_written: false,
        }
    }

    pub fn get_ref(&self) -> &W {
        &self.out
    }

    fn emit(&mut self, document: &Value) -> ReportResult<()> {
        match self.flavor {
            TapFlavor::Json => {
                serde_json::to_writer(&mut self.out, document)?;
                writeln!(self.out)?;
            }
            TapFlavor::Yaml => {
                writeln!(self.out, "---")?;
                serde_json::to_writer_pretty(&mut self.out, document)?;
                writeln!(self.out)?;
            }
        }
        self.out.flush()?;
        Ok(())
    }

    fn ensure_header(&mut self) -> ReportResult<()> {
        if self.header_written {
            return Ok(());
        }
        self.header_written = true;
        let header = json!({
            "type": "suite",
            "start": chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            "count": Value::Null,
            "rev": TAP_REVISION,
        });
        self.emit(&header)
    }
}

fn test_document(unit: &str, outcome: &Outcome) -> Value {
    let mut document = json!({
        "type": "test",
        "status": outcome.kind().as_str(),
        "label": unit,
    });
    if let Some(detail) = outcome.detail() {
        let mut exception = json!({ "message": detail.description });
        if let Some(location) = &detail.location {
            exception["file"] = json!(location.file.display().to_string());
            if let Some(line) = location.line {
                exception["line"] = json!(line);
            }
        }
        document["exception"] = exception;
    }
    document
}

fn final_document(tally: &Tally, seconds: f64) -> Value {
    json!({
        "type": "final",
        "time": seconds,
        "counts": {
            "total": tally.total(),
            "pass": tally.pass,
            "fail": tally.fail,
            "error": tally.error,
            "todo": tally.todo,
            "omit": tally.omit,
        },
    })
}

impl<W: Write> Reporter for TapReporter<W> {
    fn report(&mut self, unit: &str, outcome: Outcome) -> ReportResult<()> {
        let document = test_document(unit, &outcome);
        self.record.push(unit, outcome)?;
        self.ensure_header()?;
        self.emit(&document)
    }

    fn end_suite(&mut self) -> ReportResult<Tally> {
        let tally = self.record.finalize()?;
        self.ensure_header()?;
        let document = final_document(&tally, self.record.elapsed().as_secs_f64());
        self.emit(&document)?;
        if self.flavor == TapFlavor::Yaml {
            writeln!(self.out, "...")?;
            self.out.flush()?;
        }
        Ok(tally)
    }
}
