//! The orchestrator: discover, expand, invoke, compare.
//!
//! Counting is explicit. Every case produces a [`Tally`], and a run is the sum of its cases' tallies; the engine
//! itself holds no counters and can run cases in any order or more than once.

use std::iter::Sum;
use std::ops::{Add, AddAssign};

use gauntlet_core::{Fault, Outcome};

use crate::case::{Runnable, TestCase};
use crate::config::HarnessConfig;
use crate::domain::combinations;
use crate::invoker::{InvokeError, Invoker};
use crate::operation::{DuplicateOperation, Operation, Subject, discover};
use crate::report::Reporter;
use crate::table::OutcomeTable;

/// Pass/fail counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
}

impl Tally {
    pub fn pass() -> Self {
        Self {
            total: 1,
            passed: 1,
            failed: 0,
        }
    }

    pub fn fail() -> Self {
        Self {
            total: 1,
            passed: 0,
            failed: 1,
        }
    }

    /// Percentage of passed comparisons; `0.0` for an empty run.
    pub fn pass_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.passed as f64 * 100.0 / self.total as f64
        }
    }
}

impl Add for Tally {
    type Output = Tally;

    fn add(self, rhs: Tally) -> Tally {
        Tally {
            total: self.total + rhs.total,
            passed: self.passed + rhs.passed,
            failed: self.failed + rhs.failed,
        }
    }
}

impl AddAssign for Tally {
    fn add_assign(&mut self, rhs: Tally) {
        *self = *self + rhs;
    }
}

impl Sum for Tally {
    fn sum<I: Iterator<Item = Tally>>(iter: I) -> Tally {
        iter.fold(Tally::default(), Add::add)
    }
}

/// One index of one operation, compared.
#[derive(Debug, Clone)]
pub struct Comparison {
    pub operation: String,
    pub index: usize,
    /// `None` when the achieved sequence is shorter than the expected one.
    pub achieved: Option<Outcome>,
    /// `None` when the expected sequence is shorter than the achieved one.
    pub expected: Option<Outcome>,
    pub passed: bool,
}

impl Comparison {
    pub fn tally(&self) -> Tally {
        if self.passed { Tally::pass() } else { Tally::fail() }
    }

    /// The stripped trace of a genuine achieved fault.
    pub fn trace(&self) -> Option<&str> {
        self.achieved
            .as_ref()
            .filter(|outcome| outcome.is_genuine_fault())
            .and_then(Outcome::fault)
            .and_then(Fault::trace)
    }
}

#[derive(Debug, Clone)]
pub struct CaseReport {
    pub description: String,
    pub achieved: OutcomeTable,
    pub comparisons: Vec<Comparison>,
    pub tally: Tally,
}

#[derive(Debug, Default)]
pub struct RunReport {
    pub cases: Vec<CaseReport>,
    /// Cases that were aborted, by description.
    pub errors: Vec<(String, EngineError)>,
    pub tally: Tally,
}

impl RunReport {
    pub fn is_success(&self) -> bool {
        self.errors.is_empty() && self.tally.failed == 0
    }
}

/// A problem that aborts one test case.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Registry(#[from] DuplicateOperation),

    #[error(transparent)]
    Invoke(#[from] InvokeError),

    #[error("domain for `{operation}` has {rows} row(s) but the operation takes {arity} parameter(s)")]
    DomainShape {
        operation: String,
        rows: usize,
        arity: usize,
    },
}

#[derive(Debug, Clone)]
pub struct Engine {
    config: HarnessConfig,
    invoker: Invoker,
}

impl Engine {
    pub fn new(config: HarnessConfig) -> Self {
        let invoker = Invoker::new(&config);
        Self { config, invoker }
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    pub fn invoker(&self) -> &Invoker {
        &self.invoker
    }

    /// Build the achieved table for `case`.
    ///
    /// Operations named by neither the domain table nor the expectation table are not invoked.
    #[tracing::instrument(skip_all, fields(case = case.description()))]
    pub fn achieve<S: Subject>(&self, case: &TestCase<S>) -> Result<OutcomeTable, EngineError> {
        let mut achieved = OutcomeTable::new();
        for operation in discover::<S>()? {
            let qualified = operation.qualified_name();
            if case.domains().get(&qualified).is_none() && !case.expected().contains(&qualified) {
                tracing::debug!(operation = %qualified, "no domain or expectation, skipping");
                continue;
            }
            let outcomes = self.achieve_operation(case, &operation, &qualified)?;
            achieved.insert(qualified, outcomes);
        }
        Ok(achieved)
    }

    fn achieve_operation<S: Subject>(
        &self,
        case: &TestCase<S>,
        operation: &Operation<S>,
        qualified: &str,
    ) -> Result<Vec<Outcome>, EngineError> {
        let Some(rows) = case.domains().get(qualified) else {
            return Ok(vec![self.invoker.invoke(case.factory(), operation, None)?]);
        };
        if rows.len() != operation.arity() {
            return Err(EngineError::DomainShape {
                operation: qualified.to_string(),
                rows: rows.len(),
                arity: operation.arity(),
            });
        }
        let tuples = combinations(rows);
        tracing::debug!(operation = %qualified, invocations = tuples.len(), "expanding domain");
        tuples
            .iter()
            .map(|args| {
                self.invoker
                    .invoke(case.factory(), operation, Some(args.as_slice()))
                    .map_err(EngineError::from)
            })
            .collect()
    }

    /// Run one case, reporting each comparison.
    pub fn run_case<S: Subject>(
        &self,
        case: &TestCase<S>,
        reporter: &mut dyn Reporter,
    ) -> Result<CaseReport, EngineError> {
        reporter.on_case_start(case.description());
        let achieved = self.achieve(case)?;
        let comparisons = compare(case.expected(), &achieved);
        for comparison in &comparisons {
            reporter.on_comparison(case.description(), comparison);
        }
        let tally = comparisons.iter().map(Comparison::tally).sum();
        let report = CaseReport {
            description: case.description().to_string(),
            achieved,
            comparisons,
            tally,
        };
        tracing::info!(case = %report.description, passed = tally.passed, failed = tally.failed, "case complete");
        reporter.on_case_complete(&report);
        Ok(report)
    }

    /// Run every case. An aborted case is reported and the run continues.
    pub fn run_all(&self, cases: &[Box<dyn Runnable>], reporter: &mut dyn Reporter) -> RunReport {
        let mut run = RunReport::default();
        for case in cases {
            match case.run(self, reporter) {
                Ok(report) => {
                    run.tally += report.tally;
                    run.cases.push(report);
                }
                Err(err) => {
                    tracing::error!(case = case.description(), error = %err, "case aborted");
                    reporter.on_case_error(case.description(), &err);
                    run.errors.push((case.description().to_string(), err));
                }
            }
        }
        reporter.on_run_complete(&run.tally);
        run
    }
}

/// Compare index-aligned sequences for every expected operation.
///
/// A missing element on either side is a failing comparison; the remaining indices are still compared.
pub fn compare(expected: &OutcomeTable, achieved: &OutcomeTable) -> Vec<Comparison> {
    let mut comparisons = Vec::new();
    for (operation, wanted) in expected.iter() {
        let got = achieved.get(operation).unwrap_or(&[]);
        if achieved.get(operation).is_none() {
            tracing::warn!(operation, "expected operation was not invoked");
        }
        for index in 0..wanted.len().max(got.len()) {
            let achieved_at = got.get(index).cloned();
            let expected_at = wanted.get(index).cloned();
            let passed = matches!((&achieved_at, &expected_at), (Some(a), Some(e)) if a == e);
            comparisons.push(Comparison {
                operation: operation.to_string(),
                index,
                achieved: achieved_at,
                expected: expected_at,
                passed,
            });
        }
    }
    comparisons
}
