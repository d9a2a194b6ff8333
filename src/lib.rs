#![forbid(unsafe_code)]
//! gauntlet: a black-box test harness
//!
//! A type under test registers its operations (usually with [`operations`]). A [`TestCase`] pairs a receiver
//! factory with a [`DomainTable`] of candidate arguments and an [`OutcomeTable`] of expected results, typically
//! read from a results file. The [`Engine`] calls every operation once per argument combination, each call on a
//! fresh receiver in its own worker thread under a poll budget, and compares what it observed with what was
//! expected.
//!
//! ## Panic Policy
//!
//! This codebase follows explicit error handling:
//!
//! - **Production code**: Use `Result` or `Option` with `?` / `ok_or` / `map_err`. The `cli` module enforces
//!   `#![deny(clippy::unwrap_used)]`.
//!
//! - **Test code**: `.unwrap()` and `.expect()` are acceptable in tests.
//!
//! - **Tested code**: Panics inside an invoked operation are the harness's input, not its failure. They are caught
//!   in the worker and recorded as fault values.
//!
//! ## Examples
//! ```rust
//! use gauntlet::{DomainTable, Engine, HarnessConfig, OutcomeTable, TestCase, vals};
//! use gauntlet::demos::IndexedList;
//! use gauntlet::report::ConsoleReporter;
//!
//! let case = TestCase::new(
//!     "pair",
//!     || IndexedList::from(vec![1_i64, 2]),
//!     DomainTable::new().with("get(usize)", vec![vals![0, 1]]),
//!     OutcomeTable::new().with("size()", vals![2]).with("get(usize)", vals![1, 2]),
//! );
//! let engine = Engine::new(HarnessConfig::new().with_max_polls(1000));
//! let mut reporter = ConsoleReporter::new(Vec::new(), false);
//! let report = engine.run_case(&case, &mut reporter).unwrap();
//! assert_eq!(report.tally.passed, 3);
//! ```

extern crate self as gauntlet;

pub mod cancel;
pub mod case;
pub mod cli;
pub mod config;
pub mod demos;
pub mod domain;
pub mod engine;
pub mod invoker;
pub mod operation;
pub mod report;
pub mod table;
pub mod trace;

pub use gauntlet_core::{
    ArgumentError, Bidirectional, CursorKind, Fault, FaultKind, Forward, FromValue, IntoValue, Invocation, Outcome,
    Splittable, Value, equivalent, vals,
};
pub use gauntlet_derive::operations;
pub use gauntlet_markup::{MarkupError, ResultsFile};

pub use case::{Runnable, TestCase};
pub use config::HarnessConfig;
pub use domain::{DomainTable, combinations};
pub use engine::{CaseReport, Comparison, Engine, EngineError, RunReport, Tally};
pub use invoker::{InvokeError, Invoker};
pub use operation::{Operation, Subject};
pub use report::{ConsoleReporter, JsonReporter, Reporter};
pub use table::OutcomeTable;
