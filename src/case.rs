//! Test cases: a receiver factory plus the domain and expectation tables it is checked against.

use std::fmt;
use std::sync::Arc;

use gauntlet_markup::{MarkupError, ResultsFile};

use crate::domain::DomainTable;
use crate::engine::{CaseReport, Engine, EngineError};
use crate::invoker::Factory;
use crate::operation::Subject;
use crate::report::Reporter;
use crate::table::OutcomeTable;

/// Immutable once built; the engine only borrows it.
pub struct TestCase<S> {
    description: String,
    factory: Factory<S>,
    domains: DomainTable,
    expected: OutcomeTable,
}

impl<S> Clone for TestCase<S> {
    fn clone(&self) -> Self {
        Self {
            description: self.description.clone(),
            factory: Arc::clone(&self.factory),
            domains: self.domains.clone(),
            expected: self.expected.clone(),
        }
    }
}

impl<S> fmt::Debug for TestCase<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestCase")
            .field("description", &self.description)
            .field("domains", &self.domains.len())
            .field("expected", &self.expected.len())
            .finish_non_exhaustive()
    }
}

impl<S: Subject> TestCase<S> {
    pub fn new(
        description: impl Into<String>,
        factory: impl Fn() -> S + Send + Sync + 'static,
        domains: DomainTable,
        expected: OutcomeTable,
    ) -> Self {
        Self {
            description: description.into(),
            factory: Arc::new(factory),
            domains,
            expected,
        }
    }

    /// Build a case whose expectations are the case called `case` in `file`.
    pub fn from_results(
        description: impl Into<String>,
        factory: impl Fn() -> S + Send + Sync + 'static,
        domains: DomainTable,
        file: &ResultsFile,
        case: &str,
    ) -> Result<Self, MarkupError> {
        let expected = OutcomeTable::from(&file.read_case(case)?);
        Ok(Self::new(description, factory, domains, expected))
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn factory(&self) -> &Factory<S> {
        &self.factory
    }

    pub fn domains(&self) -> &DomainTable {
        &self.domains
    }

    pub fn expected(&self) -> &OutcomeTable {
        &self.expected
    }
}

/// A case of any subject type, so one suite can mix types.
pub trait Runnable {
    fn description(&self) -> &str;

    fn run(&self, engine: &Engine, reporter: &mut dyn Reporter) -> Result<CaseReport, EngineError>;
}

impl<S: Subject> Runnable for TestCase<S> {
    fn description(&self) -> &str {
        &self.description
    }

    fn run(&self, engine: &Engine, reporter: &mut dyn Reporter) -> Result<CaseReport, EngineError> {
        engine.run_case(self, reporter)
    }
}
