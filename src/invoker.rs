//! Timeout-bounded, isolated invocation of one operation.
//!
//! ## Lifecycle
//!
//! `Pending -> Running -> Completed | Abandoned`
//!
//! - **Pending**: the request is validated (argument set present, arity, argument conversions). Invalid requests are
//!   rejected with an [`InvokeError`] and no worker is started.
//! - **Running**: a fresh worker thread builds the receiver from the factory and calls the operation inside a panic
//!   boundary. A panic becomes a fault value; it never reaches the caller.
//! - **Completed**: the worker reported within the poll budget.
//! - **Abandoned**: `max_polls` polls of `poll_interval` elapsed without a report. The caller gets a non-termination
//!   fault immediately, the worker's cancel token is tripped and its channel closed, so a late result is dropped.
//!
//! ## Notes
//! - Abandoned workers are detached, not killed. Tested code that never calls [`crate::cancel::checkpoint`] keeps
//!   running until it returns on its own.
//! - Receivers are built inside the worker, so an abandoned worker never holds state a later invocation uses.
//! - An operation registered without a check converts its arguments in the worker. A conversion failure there is
//!   still an [`InvokeError::Argument`], never a fault value.

use std::backtrace::Backtrace;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::Duration;

use gauntlet_core::{ArgumentError, Fault, FaultKind, Invocation, Outcome, Value};

use crate::cancel::{self, CancelToken};
use crate::config::HarnessConfig;
use crate::operation::{Operation, Subject};
use crate::trace;

/// Builds a fresh receiver for every invocation.
pub type Factory<S> = Arc<dyn Fn() -> S + Send + Sync>;

/// An invocation request rejected before any worker started.
#[derive(Debug, thiserror::Error)]
pub enum InvokeError {
    #[error("`{operation}` takes {arity} argument(s) but no argument set was supplied")]
    MissingArguments { operation: String, arity: usize },

    #[error("`{operation}` takes {expected} argument(s), got {found}")]
    ArityMismatch {
        operation: String,
        expected: usize,
        found: usize,
    },

    #[error("invalid argument for `{operation}`: {source}")]
    Argument {
        operation: String,
        #[source]
        source: ArgumentError,
    },

    #[error("failed to start a worker for `{operation}`")]
    Spawn {
        operation: String,
        #[source]
        source: std::io::Error,
    },
}

/// Lifecycle of one invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Pending,
    Running,
    Completed,
    Abandoned,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Pending => "pending",
            Phase::Running => "running",
            Phase::Completed => "completed",
            Phase::Abandoned => "abandoned",
        };
        f.write_str(name)
    }
}

/// What a worker sends back.
enum Report {
    /// The operation returned; the receiver is rendered after the call.
    Returned { value: Value, receiver: String },
    /// The arguments did not convert, so the operation never ran.
    Rejected(ArgumentError),
    /// The operation panicked.
    Panicked { fault: Fault, backtrace: Option<Backtrace> },
}

enum Wait {
    Reported(Report),
    Lost,
    TimedOut,
}

#[derive(Debug, Clone)]
pub struct Invoker {
    poll_interval: Duration,
    max_polls: u32,
    trace_depth: usize,
    capture_traces: bool,
}

impl Invoker {
    pub fn new(config: &HarnessConfig) -> Self {
        trace::install_hook();
        Self {
            poll_interval: config.poll_interval,
            max_polls: config.max_polls,
            trace_depth: config.trace_depth,
            capture_traces: config.capture_traces,
        }
    }

    /// Longest time one call to [`Invoker::invoke`] waits for a worker.
    pub fn budget(&self) -> Duration {
        self.poll_interval.saturating_mul(self.max_polls)
    }

    /// Call `operation` on a fresh receiver with `args`.
    ///
    /// `None` means no argument set; that is only valid for zero-parameter operations.
    #[tracing::instrument(level = "debug", skip_all, fields(operation = operation.name(), arity = operation.arity()))]
    pub fn invoke<S: Subject>(
        &self,
        factory: &Factory<S>,
        operation: &Operation<S>,
        args: Option<&[Value]>,
    ) -> Result<Outcome, InvokeError> {
        tracing::trace!(phase = %Phase::Pending);
        let args = guard(operation, args)?;
        let invocation = Invocation::new(operation.name(), args.clone());

        let (tx, rx) = mpsc::channel();
        let token = CancelToken::new();
        self.spawn(Arc::clone(factory), *operation, args, token.clone(), tx)
            .map_err(|source| InvokeError::Spawn {
                operation: operation.qualified_name(),
                source,
            })?;
        tracing::trace!(phase = %Phase::Running);

        let outcome = match self.wait(&rx) {
            Wait::Reported(Report::Returned { value, receiver }) => {
                tracing::trace!(phase = %Phase::Completed);
                Outcome::achieved(value, invocation.with_receiver(receiver))
            }
            Wait::Reported(Report::Rejected(source)) => {
                tracing::trace!(phase = %Phase::Completed, "arguments rejected by the worker");
                return Err(InvokeError::Argument {
                    operation: operation.qualified_name(),
                    source,
                });
            }
            Wait::Reported(Report::Panicked { fault, backtrace }) => {
                tracing::trace!(phase = %Phase::Completed);
                let fault = match backtrace.and_then(|raw| trace::strip(&raw.to_string(), self.trace_depth)) {
                    Some(stripped) => fault.with_trace(stripped),
                    None => fault,
                };
                Outcome::achieved(Value::Fault(fault), invocation)
            }
            Wait::Lost => {
                tracing::warn!(operation = operation.name(), "worker exited without reporting");
                let fault = Fault::with_message(FaultKind::Panic, "worker exited without reporting a result");
                Outcome::achieved(Value::Fault(fault), invocation)
            }
            Wait::TimedOut => {
                token.cancel();
                drop(rx);
                tracing::debug!(phase = %Phase::Abandoned, budget = ?self.budget());
                Outcome::achieved(Value::Fault(Fault::non_termination()), invocation)
            }
        };
        Ok(outcome)
    }

    fn spawn<S: Subject>(
        &self,
        factory: Factory<S>,
        operation: Operation<S>,
        args: Vec<Value>,
        token: CancelToken,
        tx: Sender<Report>,
    ) -> std::io::Result<()> {
        let capture = self.capture_traces;
        thread::Builder::new()
            .name(format!("gauntlet-{}", operation.name()))
            .spawn(move || {
                cancel::install(token);
                trace::enter_worker(capture);
                let caught = panic::catch_unwind(AssertUnwindSafe(|| {
                    let mut receiver = factory();
                    operation
                        .call(&mut receiver, &args)
                        .map(|value| (value, format!("{:?}", receiver)))
                }));
                let report = match caught {
                    Ok(Ok((value, receiver))) => Report::Returned { value, receiver },
                    Ok(Err(err)) => Report::Rejected(err),
                    Err(payload) => Report::Panicked {
                        fault: Fault::from_panic(&*payload),
                        backtrace: trace::take(),
                    },
                };
                // A closed channel means the invocation was abandoned.
                let _ = tx.send(report);
            })?;
        Ok(())
    }

    fn wait(&self, rx: &Receiver<Report>) -> Wait {
        for _ in 0..self.max_polls {
            match rx.recv_timeout(self.poll_interval) {
                Ok(report) => return Wait::Reported(report),
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => return Wait::Lost,
            }
        }
        Wait::TimedOut
    }
}

/// Validate a request in the pending phase.
fn guard<S>(operation: &Operation<S>, args: Option<&[Value]>) -> Result<Vec<Value>, InvokeError> {
    let args: &[Value] = match args {
        Some(args) => args,
        None if operation.arity() == 0 => &[],
        None => {
            return Err(InvokeError::MissingArguments {
                operation: operation.qualified_name(),
                arity: operation.arity(),
            });
        }
    };
    if args.len() != operation.arity() {
        return Err(InvokeError::ArityMismatch {
            operation: operation.qualified_name(),
            expected: operation.arity(),
            found: args.len(),
        });
    }
    operation.check(args).map_err(|source| InvokeError::Argument {
        operation: operation.qualified_name(),
        source,
    })?;
    Ok(args.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use gauntlet_core::{FromValue, IntoValue, faults::raise};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Instant;

    #[derive(Debug, Default)]
    struct Probe {
        items: Vec<i64>,
    }

    static STOPPED: AtomicBool = AtomicBool::new(false);

    impl Subject for Probe {
        fn operations() -> Vec<Operation<Self>> {
            vec![
                Operation::new("len", &[], |p: &mut Probe, _: &[Value]| Ok(p.items.len().into_value())),
                Operation::new("get", &["usize"], |p: &mut Probe, args: &[Value]| {
                    let index = usize::from_value(&args[0])?;
                    Ok(p.items[index].into_value())
                })
                .with_check(|args: &[Value]| usize::from_value(&args[0]).map(|_| ())),
                Operation::new("peek", &["usize"], |p: &mut Probe, args: &[Value]| {
                    let index = usize::from_value(&args[0])?;
                    Ok(p.items.get(index).copied().into_value())
                }),
                Operation::new("reject", &[], |_: &mut Probe, _: &[Value]| {
                    raise(FaultKind::IllegalState, "not now")
                }),
                Operation::new("hang", &[], |_: &mut Probe, _: &[Value]| loop {
                    thread::sleep(Duration::from_millis(50));
                }),
                Operation::new("polite", &[], |_: &mut Probe, _: &[Value]| loop {
                    if cancel::is_cancelled() {
                        STOPPED.store(true, Ordering::SeqCst);
                        cancel::checkpoint();
                    }
                    thread::sleep(Duration::from_millis(1));
                }),
            ]
        }
    }

    fn op(name: &str) -> Operation<Probe> {
        Probe::operations().into_iter().find(|o| o.name() == name).unwrap()
    }

    fn factory() -> Factory<Probe> {
        Arc::new(Probe::default)
    }

    fn patient() -> Invoker {
        Invoker::new(&HarnessConfig::new().with_poll_interval(Duration::from_millis(20)).with_max_polls(250))
    }

    #[test]
    fn completed_call_carries_context() {
        let outcome = patient().invoke(&factory(), &op("len"), None).unwrap();
        assert_eq!(outcome.value(), &Value::Int(0));
        let call = outcome.invocation().unwrap();
        assert_eq!(call.operation, "len");
        assert_eq!(call.receiver.as_deref(), Some("Probe { items: [] }"));
    }

    #[test]
    fn std_panic_becomes_classified_fault() {
        let outcome = patient().invoke(&factory(), &op("get"), Some(&[Value::Int(3)])).unwrap();
        assert_eq!(outcome.fault().map(Fault::kind), Some(FaultKind::IndexOutOfBounds));
        assert!(outcome.is_genuine_fault());
        assert!(outcome.invocation().unwrap().receiver.is_none());
    }

    #[test]
    fn raised_fault_is_unwrapped_once() {
        let outcome = patient().invoke(&factory(), &op("reject"), None).unwrap();
        let fault = outcome.fault().unwrap();
        assert_eq!(fault.kind(), FaultKind::IllegalState);
        assert_eq!(fault.message(), Some("not now"));
    }

    #[test]
    fn hang_is_abandoned_within_budget() {
        let invoker = Invoker::new(&HarnessConfig::new().with_poll_interval(Duration::from_millis(5)).with_max_polls(4));
        let started = Instant::now();
        let outcome = invoker.invoke(&factory(), &op("hang"), None).unwrap();
        assert!(outcome.fault().is_some_and(Fault::is_non_termination));
        assert!(!outcome.is_genuine_fault());
        assert!(started.elapsed() < invoker.budget() + Duration::from_secs(2));
    }

    #[test]
    fn abandoned_worker_sees_cancellation() {
        let invoker = Invoker::new(&HarnessConfig::new().with_poll_interval(Duration::from_millis(2)).with_max_polls(3));
        let outcome = invoker.invoke(&factory(), &op("polite"), None).unwrap();
        assert!(outcome.fault().is_some_and(Fault::is_non_termination));
        let deadline = Instant::now() + Duration::from_secs(5);
        while !STOPPED.load(Ordering::SeqCst) && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(5));
        }
        assert!(STOPPED.load(Ordering::SeqCst));
    }

    #[test]
    fn missing_argument_set_is_rejected() {
        let err = patient().invoke(&factory(), &op("get"), None).unwrap_err();
        assert!(matches!(err, InvokeError::MissingArguments { arity: 1, .. }));
    }

    #[test]
    fn arity_mismatch_is_rejected() {
        let err = patient()
            .invoke(&factory(), &op("get"), Some(&[Value::Int(0), Value::Int(1)]))
            .unwrap_err();
        assert_eq!(err.to_string(), "`get(usize)` takes 1 argument(s), got 2");
    }

    #[test]
    fn unconvertible_argument_is_rejected() {
        let err = patient().invoke(&factory(), &op("get"), Some(&[Value::Int(-1)])).unwrap_err();
        assert!(matches!(err, InvokeError::Argument { .. }));
    }

    #[test]
    fn unconvertible_argument_without_check_is_rejected() {
        let err = patient()
            .invoke(&factory(), &op("peek"), Some(&[Value::Str("x".to_string())]))
            .unwrap_err();
        assert!(
            matches!(&err, InvokeError::Argument { operation, source }
                if operation == "peek(usize)" && source.expected == "usize"),
            "{err:?}"
        );
    }
}
