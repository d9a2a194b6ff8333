//! Registered operations and their qualified names.
//!
//! A type under test exposes its operations through [`Subject`], normally generated by `#[operations]`. Each
//! [`Operation`] knows its simple name, its erased parameter labels and how to call itself with domain values.
//! The qualified name (`get(usize)`, `size()`) joins the domain table, the expectation table and the achieved
//! results.

use std::collections::BTreeSet;
use std::fmt;

use gauntlet_core::{ArgumentError, Value};

/// Calls an operation on a receiver, converting the arguments first.
pub type CallFn<S> = fn(&mut S, &[Value]) -> Result<Value, ArgumentError>;

/// Converts arguments without calling anything.
pub type CheckFn = fn(&[Value]) -> Result<(), ArgumentError>;

/// A type whose operations can be exercised by the engine.
pub trait Subject: fmt::Debug + Sized + 'static {
    fn operations() -> Vec<Operation<Self>>;
}

pub struct Operation<S> {
    name: &'static str,
    params: &'static [&'static str],
    call: CallFn<S>,
    check: Option<CheckFn>,
}

impl<S> Clone for Operation<S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S> Copy for Operation<S> {}

impl<S> fmt::Debug for Operation<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Operation")
            .field("name", &self.name)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

impl<S> Operation<S> {
    pub fn new(name: &'static str, params: &'static [&'static str], call: CallFn<S>) -> Self {
        Self {
            name,
            params,
            call,
            check: None,
        }
    }

    /// Attach an argument check run before any worker starts.
    pub fn with_check(mut self, check: CheckFn) -> Self {
        self.check = Some(check);
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn params(&self) -> &'static [&'static str] {
        self.params
    }

    pub fn arity(&self) -> usize {
        self.params.len()
    }

    pub fn qualified_name(&self) -> String {
        qualified_name(self.name, self.params)
    }

    /// Validate an argument tuple: count first, then conversions.
    pub fn check(&self, args: &[Value]) -> Result<(), ArgumentError> {
        if args.len() != self.arity() {
            return Err(ArgumentError::arity(self.arity(), args.len()));
        }
        match self.check {
            Some(check) => check(args),
            None => Ok(()),
        }
    }

    pub fn call(&self, receiver: &mut S, args: &[Value]) -> Result<Value, ArgumentError> {
        if args.len() != self.arity() {
            return Err(ArgumentError::arity(self.arity(), args.len()));
        }
        (self.call)(receiver, args)
    }
}

/// `name(T1, T2)`; zero parameters render as `name()`.
pub fn qualified_name(name: &str, params: &[&str]) -> String {
    format!("{}({})", name, params.join(", "))
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("operation `{qualified}` is registered twice on {subject}")]
pub struct DuplicateOperation {
    pub subject: &'static str,
    pub qualified: String,
}

/// The operations of `S`, sorted by qualified name.
pub fn discover<S: Subject>() -> Result<Vec<Operation<S>>, DuplicateOperation> {
    let mut operations = S::operations();
    operations.sort_by_cached_key(Operation::qualified_name);

    let mut seen = BTreeSet::new();
    for op in &operations {
        let qualified = op.qualified_name();
        if !seen.insert(qualified.clone()) {
            return Err(DuplicateOperation {
                subject: std::any::type_name::<S>(),
                qualified,
            });
        }
    }
    tracing::debug!(subject = std::any::type_name::<S>(), count = operations.len(), "discovered operations");
    Ok(operations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gauntlet_core::{FromValue, IntoValue};

    #[derive(Debug, Default)]
    struct Stack(Vec<i64>);

    impl Subject for Stack {
        fn operations() -> Vec<Operation<Self>> {
            vec![
                Operation::new("push", &["i64"], |s: &mut Stack, args: &[Value]| {
                    let [a0] = args else {
                        return Err(ArgumentError::arity(1, args.len()));
                    };
                    s.0.push(i64::from_value(a0)?);
                    Ok(Value::Null)
                })
                .with_check(|args: &[Value]| i64::from_value(&args[0]).map(|_| ())),
                Operation::new("len", &[], |s: &mut Stack, _: &[Value]| Ok(s.0.len().into_value())),
            ]
        }
    }

    #[test]
    fn zero_parameter_names_have_empty_parens() {
        assert_eq!(qualified_name("size", &[]), "size()");
        assert_eq!(qualified_name("add", &["usize", "Object"]), "add(usize, Object)");
    }

    #[test]
    fn discovery_is_sorted() {
        let names: Vec<_> = discover::<Stack>().unwrap().iter().map(Operation::qualified_name).collect();
        assert_eq!(names, vec!["len()", "push(i64)"]);
    }

    #[test]
    fn check_rejects_arity_before_conversion() {
        let ops = discover::<Stack>().unwrap();
        let push = ops[1];
        assert_eq!(push.check(&[]), Err(ArgumentError::arity(1, 0)));
        assert!(push.check(&[Value::Str("x".into())]).is_err());
        assert_eq!(push.check(&[Value::Int(3)]), Ok(()));
    }

    #[test]
    fn call_runs_against_receiver() {
        let ops = discover::<Stack>().unwrap();
        let mut stack = Stack::default();
        ops[1].call(&mut stack, &[Value::Int(9)]).unwrap();
        assert_eq!(ops[0].call(&mut stack, &[]).unwrap(), Value::Int(1));
    }

    #[derive(Debug)]
    struct Twice;

    impl Subject for Twice {
        fn operations() -> Vec<Operation<Self>> {
            let op = Operation::new("f", &[], |_: &mut Twice, _: &[Value]| Ok(Value::Null));
            vec![op, op]
        }
    }

    #[test]
    fn duplicates_are_rejected() {
        let err = discover::<Twice>().unwrap_err();
        assert_eq!(err.qualified, "f()");
    }
}
