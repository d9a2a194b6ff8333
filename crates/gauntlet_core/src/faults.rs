//! Fault vocabulary.
//!
//! A fault is the value an operation produces when it fails instead of returning. Faults compare by
//! [`FaultKind`] only, so the registry below is the complete list of categories an expectation can name.
//!
//! ## Notes
//! - Canonical spellings double as panic-message prefixes: a panic whose message starts with `IllegalState: ` is
//!   classified as [`FaultKind::IllegalState`] (see [`Fault::from_panic`]).
//! - [`raise`] is the preferred way for tested code to fail with a specific kind.

use std::any::Any;
use std::fmt;

/// Category of a fault. Two faults are equivalent iff their kinds are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FaultKind {
    IndexOutOfBounds,
    NoSuchElement,
    IllegalState,
    IllegalArgument,
    Unsupported,
    Overflow,
    /// A panic that matched no other category.
    Panic,
    /// Synthesized by the invoker when a worker exceeds its poll budget.
    NonTermination,
}

/// Metadata for a fault kind.
#[derive(Debug, Clone, Copy)]
pub struct FaultInfo {
    pub id: FaultKind,
    pub canonical: &'static str,
    pub aliases: &'static [&'static str],
    pub description: &'static str,
}

/// Registry of fault kinds.
pub const FAULTS: &[FaultInfo] = &[
    info(
        FaultKind::IndexOutOfBounds,
        "IndexOutOfBounds",
        &["IndexOutOfBoundsException"],
        "An index or position was outside the valid range of the receiver.",
    ),
    info(
        FaultKind::NoSuchElement,
        "NoSuchElement",
        &["NoSuchElementException"],
        "An element was requested from an empty receiver or an exhausted cursor.",
    ),
    info(
        FaultKind::IllegalState,
        "IllegalState",
        &["IllegalStateException"],
        "The operation is not valid for the receiver's current state.",
    ),
    info(
        FaultKind::IllegalArgument,
        "IllegalArgument",
        &["IllegalArgumentException"],
        "An argument had the right type but an unacceptable value.",
    ),
    info(
        FaultKind::Unsupported,
        "Unsupported",
        &["UnsupportedOperationException"],
        "The receiver does not support the operation.",
    ),
    info(
        FaultKind::Overflow,
        "Overflow",
        &["ArithmeticException"],
        "An arithmetic result or conversion did not fit its type.",
    ),
    info(
        FaultKind::Panic,
        "Panic",
        &[],
        "The operation panicked with a message that matched no other kind.",
    ),
    info(
        FaultKind::NonTermination,
        "NonTermination",
        &["InfiniteLoop"],
        "The operation did not finish within the invocation budget and was abandoned.",
    ),
];

const fn info(
    id: FaultKind,
    canonical: &'static str,
    aliases: &'static [&'static str],
    description: &'static str,
) -> FaultInfo {
    FaultInfo {
        id,
        canonical,
        aliases,
        description,
    }
}

/// Return the canonical spelling for a fault kind (e.g. `"IllegalState"`).
#[inline]
pub fn as_str(kind: FaultKind) -> &'static str {
    info_for(kind).canonical
}

/// Resolve a spelling (canonical or alias) to a fault kind.
///
/// Matching is case-sensitive.
pub fn from_str(name: &str) -> Option<FaultKind> {
    if let Some(f) = FAULTS.iter().find(|f| f.canonical == name) {
        return Some(f.id);
    }
    FAULTS.iter().find(|f| f.aliases.contains(&name)).map(|f| f.id)
}

/// Return full metadata for a fault kind.
///
/// ## Panics
/// - If the registry is missing an entry for `kind` (programming error).
pub fn info_for(kind: FaultKind) -> &'static FaultInfo {
    FAULTS
        .iter()
        .find(|f| f.id == kind)
        .expect("INVARIANT: fault registry covers every FaultKind")
}

impl fmt::Display for FaultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(as_str(*self))
    }
}

/// A fault value: a kind plus optional message and captured trace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fault {
    kind: FaultKind,
    message: Option<String>,
    trace: Option<String>,
}

impl Fault {
    pub fn new(kind: FaultKind) -> Self {
        Self {
            kind,
            message: None,
            trace: None,
        }
    }

    pub fn with_message(kind: FaultKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: Some(message.into()),
            trace: None,
        }
    }

    /// The marker substituted for an abandoned invocation.
    pub fn non_termination() -> Self {
        Self::new(FaultKind::NonTermination)
    }

    /// Attach a (possibly truncated) cause trace.
    pub fn with_trace(mut self, trace: impl Into<String>) -> Self {
        self.trace = Some(trace.into());
        self
    }

    pub fn kind(&self) -> FaultKind {
        self.kind
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn trace(&self) -> Option<&str> {
        self.trace.as_deref()
    }

    pub fn is_non_termination(&self) -> bool {
        self.kind == FaultKind::NonTermination
    }

    /// Classify a caught panic payload.
    ///
    /// ## Notes
    /// - A payload raised with [`raise`] (or `panic_any(Fault)`) is returned as-is, one level unwrapped.
    /// - A string payload with a canonical `Kind: ` prefix maps to that kind.
    /// - Standard library panics are mapped by message: index/range panics to `IndexOutOfBounds`, unwrapping an
    ///   empty `Option` to `NoSuchElement`, arithmetic overflow to `Overflow`.
    /// - Everything else becomes [`FaultKind::Panic`].
    pub fn from_panic(payload: &(dyn Any + Send)) -> Self {
        if let Some(fault) = payload.downcast_ref::<Fault>() {
            return fault.clone();
        }
        Self::from_panic_message(&panic_message(payload))
    }

    /// Classify a panic message (see [`Fault::from_panic`]).
    pub fn from_panic_message(message: &str) -> Self {
        for f in FAULTS {
            for spelling in std::iter::once(&f.canonical).chain(f.aliases.iter()) {
                if message == *spelling {
                    return Self::new(f.id);
                }
                if let Some(rest) = message.strip_prefix(spelling).and_then(|r| r.strip_prefix(": ")) {
                    return Self::with_message(f.id, rest);
                }
            }
        }

        let kind = if message.contains("index out of bounds")
            || message.contains("out of range for")
            || message.contains("is out of bounds")
            || message.contains("Out of bounds access")
        {
            FaultKind::IndexOutOfBounds
        } else if message.contains("called `Option::unwrap()` on a `None` value") {
            FaultKind::NoSuchElement
        } else if message.contains("with overflow") {
            FaultKind::Overflow
        } else {
            FaultKind::Panic
        };
        Self::with_message(kind, message)
    }
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.message {
            Some(msg) if !msg.is_empty() => write!(f, "{}: {}", self.kind, msg),
            _ => write!(f, "{}", self.kind),
        }
    }
}

impl std::error::Error for Fault {}

/// Extract the human-readable message from a panic payload.
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else if let Some(fault) = payload.downcast_ref::<Fault>() {
        fault.to_string()
    } else {
        "unknown panic".to_string()
    }
}

/// Fail the current operation with a fault of the given kind.
///
/// The fault travels as the panic payload, so the harness recovers it exactly.
#[cold]
#[track_caller]
pub fn raise(kind: FaultKind, message: impl Into<String>) -> ! {
    std::panic::panic_any(Fault::with_message(kind, message))
}
