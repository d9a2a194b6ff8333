//! Reporting of comparisons and run summaries.
//!
//! The engine only talks to a [`Reporter`]; output format is the reporter's business. Two reporters ship:
//! [`ConsoleReporter`] renders the human-readable block format and [`JsonReporter`] writes one JSON object per event.
//!
//! Reporter callbacks cannot fail. A writer error is recorded and returned from `finish`, and later output is
//! skipped.

use std::io::{self, Write};

use gauntlet_core::Outcome;

use crate::engine::{CaseReport, Comparison, EngineError, Tally};

/// Receives engine events as they happen.
pub trait Reporter {
    /// Called before a case's operations are invoked.
    fn on_case_start(&mut self, _description: &str) {}

    /// Called once per compared index.
    fn on_comparison(&mut self, description: &str, comparison: &Comparison);

    /// Called when a case is aborted.
    fn on_case_error(&mut self, description: &str, error: &EngineError);

    /// Called after a case's last comparison.
    fn on_case_complete(&mut self, _report: &CaseReport) {}

    /// Called once, after every case.
    fn on_run_complete(&mut self, tally: &Tally);
}

const MISSING: &str = "<missing>";

fn render(outcome: Option<&Outcome>) -> String {
    outcome.map_or_else(|| MISSING.to_string(), Outcome::to_string)
}

/// Plain-text reporter.
///
/// ```text
/// list | PASS: size() -> 0
/// list | **** FAIL:     get(3) -> IndexOutOfBounds
/// list |      Expected: 4
/// ```
#[derive(Debug)]
pub struct ConsoleReporter<W: Write> {
    out: W,
    show_passes: bool,
    error: Option<io::Error>,
}

impl<W: Write> ConsoleReporter<W> {
    pub fn new(out: W, show_passes: bool) -> Self {
        Self {
            out,
            show_passes,
            error: None,
        }
    }

    /// Return the writer, or the first write error.
    pub fn finish(mut self) -> io::Result<W> {
        match self.error.take() {
            Some(err) => Err(err),
            None => {
                self.out.flush()?;
                Ok(self.out)
            }
        }
    }

    fn line(&mut self, text: std::fmt::Arguments<'_>) {
        if self.error.is_some() {
            return;
        }
        if let Err(err) = self.out.write_fmt(text).and_then(|()| self.out.write_all(b"\n")) {
            self.error = Some(err);
        }
    }
}

impl<W: Write> Reporter for ConsoleReporter<W> {
    fn on_comparison(&mut self, description: &str, comparison: &Comparison) {
        let achieved = render(comparison.achieved.as_ref());
        if comparison.passed {
            if self.show_passes {
                self.line(format_args!("{description} | PASS: {achieved}"));
            }
            return;
        }

        let expected = render(comparison.expected.as_ref());
        self.line(format_args!("{description} | **** FAIL:     {achieved}"));
        self.line(format_args!("{description} |      Expected: {expected}"));
        if let Some(trace) = comparison.trace() {
            for frame in trace.lines() {
                self.line(format_args!("        {frame}"));
            }
        }
    }

    fn on_case_error(&mut self, description: &str, error: &EngineError) {
        self.line(format_args!("{description} | **** ERROR: {error}"));
    }

    fn on_run_complete(&mut self, tally: &Tally) {
        self.line(format_args!(" Total: {}", tally.total));
        self.line(format_args!("Passed: {} ({:.2}%)", tally.passed, tally.pass_rate()));
        self.line(format_args!("Failed: {}", tally.failed));
    }
}

/// Newline-delimited JSON reporter.
#[derive(Debug)]
pub struct JsonReporter<W: Write> {
    out: W,
    error: Option<io::Error>,
}

impl<W: Write> JsonReporter<W> {
    pub fn new(out: W) -> Self {
        Self { out, error: None }
    }

    pub fn finish(mut self) -> io::Result<W> {
        match self.error.take() {
            Some(err) => Err(err),
            None => {
                self.out.flush()?;
                Ok(self.out)
            }
        }
    }

    fn emit(&mut self, event: serde_json::Value) {
        if self.error.is_some() {
            return;
        }
        let result = serde_json::to_writer(&mut self.out, &event)
            .map_err(io::Error::from)
            .and_then(|()| self.out.write_all(b"\n"));
        if let Err(err) = result {
            self.error = Some(err);
        }
    }
}

impl<W: Write> Reporter for JsonReporter<W> {
    fn on_case_start(&mut self, description: &str) {
        self.emit(serde_json::json!({ "event": "case_start", "case": description }));
    }

    fn on_comparison(&mut self, description: &str, comparison: &Comparison) {
        let achieved = comparison.achieved.as_ref().map(Outcome::to_string);
        let expected = comparison.expected.as_ref().map(Outcome::to_string);
        self.emit(serde_json::json!({
            "event": "comparison",
            "case": description,
            "operation": comparison.operation,
            "index": comparison.index,
            "passed": comparison.passed,
            "achieved": achieved,
            "expected": expected,
            "trace": comparison.trace(),
        }));
    }

    fn on_case_error(&mut self, description: &str, error: &EngineError) {
        self.emit(serde_json::json!({
            "event": "case_error",
            "case": description,
            "error": error.to_string(),
        }));
    }

    fn on_case_complete(&mut self, report: &CaseReport) {
        self.emit(serde_json::json!({
            "event": "case_complete",
            "case": report.description,
            "total": report.tally.total,
            "passed": report.tally.passed,
            "failed": report.tally.failed,
        }));
    }

    fn on_run_complete(&mut self, tally: &Tally) {
        self.emit(serde_json::json!({
            "event": "run_complete",
            "total": tally.total,
            "passed": tally.passed,
            "failed": tally.failed,
            "pass_rate": tally.pass_rate(),
        }));
    }
}
