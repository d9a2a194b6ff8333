//! Observed results.
//!
//! An [`Outcome`] is either context-free (an expectation read from a results file) or carries the
//! [`Invocation`] that produced it (an achieved result). Equality between outcomes is the comparator's
//! partial equivalence on their values; the context never participates.

use std::fmt;

use crate::compare::equivalent;
use crate::faults::Fault;
use crate::value::Value;

/// The call that produced an achieved outcome.
#[derive(Debug, Clone)]
pub struct Invocation {
    /// Simple operation name, e.g. `add`.
    pub operation: String,
    /// Debug rendering of the receiver after the call, when it was built.
    pub receiver: Option<String>,
    pub arguments: Vec<Value>,
}

impl Invocation {
    pub fn new(operation: impl Into<String>, arguments: Vec<Value>) -> Self {
        Self {
            operation: operation.into(),
            receiver: None,
            arguments,
        }
    }

    pub fn with_receiver(mut self, receiver: impl Into<String>) -> Self {
        self.receiver = Some(receiver.into());
        self
    }
}

#[derive(Debug, Clone)]
pub struct Outcome {
    value: Value,
    invocation: Option<Invocation>,
}

impl Outcome {
    /// A bare value, used as an expectation.
    pub fn expected(value: Value) -> Self {
        Self {
            value,
            invocation: None,
        }
    }

    /// A value together with the call that produced it.
    pub fn achieved(value: Value, invocation: Invocation) -> Self {
        Self {
            value,
            invocation: Some(invocation),
        }
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn invocation(&self) -> Option<&Invocation> {
        self.invocation.as_ref()
    }

    pub fn fault(&self) -> Option<&Fault> {
        self.value.as_fault()
    }

    /// Whether this outcome is a fault raised by the tested code itself (not the non-termination marker).
    pub fn is_genuine_fault(&self) -> bool {
        self.fault().is_some_and(|f| !f.is_non_termination())
    }

    pub fn into_value(self) -> Value {
        self.value
    }
}

impl PartialEq for Outcome {
    fn eq(&self, other: &Self) -> bool {
        equivalent(&self.value, &other.value)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(call) = &self.invocation else {
            return write!(f, "{}", self.value);
        };
        write!(f, "{}(", call.operation)?;
        for (i, arg) in call.arguments.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", arg)?;
        }
        write!(f, ") -> {}", self.value)
    }
}
