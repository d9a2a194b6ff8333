//! Equivalence policy for observed values.
//!
//! Equality here is partial and class-based rather than structural:
//! - both absent: equal; exactly one absent: not equal,
//! - both faults: equal iff the fault kinds match (messages and traces are ignored),
//! - both cursors: equal iff they belong to the same [`CursorFamily`] (elements are never inspected),
//! - both plain values: ordinary value equality (lists compare element-wise with this same policy),
//! - any other pairing: not equal.
//!
//! ## Notes
//! - [`classify`] matches every [`Value`] variant by name. Adding a variant without a rule here fails the build.

use crate::cursor::CursorFamily;
use crate::faults::FaultKind;
use crate::value::Value;

/// Comparison class of a value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ValueClass<'a> {
    Absent,
    Fault(FaultKind),
    Cursor(CursorFamily),
    Plain(&'a Value),
}

/// Place a value in its comparison class.
pub fn classify(value: &Value) -> ValueClass<'_> {
    match value {
        Value::Null => ValueClass::Absent,
        Value::Fault(fault) => ValueClass::Fault(fault.kind()),
        Value::Cursor(kind) => ValueClass::Cursor(kind.family()),
        Value::Bool(_) | Value::Int(_) | Value::Str(_) | Value::List(_) => ValueClass::Plain(value),
    }
}

/// Decide whether an achieved value matches an expected one.
pub fn equivalent(a: &Value, b: &Value) -> bool {
    match (classify(a), classify(b)) {
        (ValueClass::Absent, ValueClass::Absent) => true,
        (ValueClass::Absent, _) | (_, ValueClass::Absent) => false,
        (ValueClass::Fault(x), ValueClass::Fault(y)) => x == y,
        (ValueClass::Cursor(x), ValueClass::Cursor(y)) => x == y,
        (ValueClass::Plain(x), ValueClass::Plain(y)) => plain_eq(x, y),
        (ValueClass::Fault(_) | ValueClass::Cursor(_) | ValueClass::Plain(_), _) => false,
    }
}

fn plain_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::List(xs), Value::List(ys)) => xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| equivalent(x, y)),
        _ => a == b,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cursor::CursorKind;
    use crate::faults::Fault;

    fn fault(kind: FaultKind, msg: &str) -> Value {
        Value::Fault(Fault::with_message(kind, msg))
    }

    #[test]
    fn absent_rules() {
        assert!(equivalent(&Value::Null, &Value::Null));
        assert!(!equivalent(&Value::Null, &Value::Int(0)));
        assert!(!equivalent(&Value::Str(String::new()), &Value::Null));
    }

    #[test]
    fn faults_compare_by_kind_only() {
        let a = fault(FaultKind::IndexOutOfBounds, "index 5, size 0");
        let b = fault(FaultKind::IndexOutOfBounds, "something else entirely");
        let c = fault(FaultKind::NoSuchElement, "index 5, size 0");
        assert!(equivalent(&a, &b));
        assert!(!equivalent(&a, &c));
    }

    #[test]
    fn cursor_tiers() {
        let it = Value::Cursor(CursorKind::Iterator);
        let list_it = Value::Cursor(CursorKind::ListIterator);
        let split = Value::Cursor(CursorKind::Splitter);
        assert!(equivalent(&it, &list_it));
        assert!(equivalent(&list_it, &it));
        assert!(equivalent(&split, &split));
        assert!(!equivalent(&it, &split));
        assert!(!equivalent(&it, &Value::Int(42)));
    }

    #[test]
    fn fault_never_matches_plain_value() {
        assert!(!equivalent(&fault(FaultKind::Panic, "42"), &Value::Int(42)));
    }

    #[test]
    fn lists_compare_elementwise_with_policy() {
        let a = Value::List(vec![Value::Int(1), fault(FaultKind::IllegalState, "x")]);
        let b = Value::List(vec![Value::Int(1), fault(FaultKind::IllegalState, "y")]);
        let c = Value::List(vec![Value::Int(1)]);
        assert!(equivalent(&a, &b));
        assert!(!equivalent(&a, &c));
    }

    #[test]
    fn plain_values_use_value_equality() {
        assert!(equivalent(&Value::Int(7), &Value::Int(7)));
        assert!(!equivalent(&Value::Int(7), &Value::Str("7".into())));
        assert!(!equivalent(&Value::Bool(true), &Value::Bool(false)));
    }
}
