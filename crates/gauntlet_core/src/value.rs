//! Observable values and the conversions in and out of them.
//!
//! Operation arguments are drawn from domains of [`Value`]s and converted to parameter types with [`FromValue`];
//! return values are converted back with [`IntoValue`].

use std::fmt;

use crate::cursor::CursorKind;
use crate::faults::{Fault, FaultKind};

/// A value observed from (or fed to) an operation.
///
/// The set is closed: the comparator classifies every variant explicitly, so a new variant cannot be added
/// without deciding how it compares.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// No value: `None`, `()`, or the markup literal `null`.
    Null,
    Bool(bool),
    Int(i64),
    Str(String),
    List(Vec<Value>),
    /// A live cursor, recorded by capability tier only.
    Cursor(CursorKind),
    Fault(Fault),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_fault(&self) -> Option<&Fault> {
        match self {
            Value::Fault(f) => Some(f),
            _ => None,
        }
    }

    /// Short type label used in argument errors.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Str(_) => "string",
            Value::List(_) => "list",
            Value::Cursor(_) => "cursor",
            Value::Fault(_) => "fault",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Str(s) => write!(f, "\"{}\"", s),
            Value::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
            Value::Cursor(kind) => write!(f, "{}", kind),
            Value::Fault(fault) => write!(f, "{}", fault),
        }
    }
}

// ============================================================================
// Into
// ============================================================================

/// Convert an operation's return value into a [`Value`].
pub trait IntoValue {
    fn into_value(self) -> Value;
}

impl IntoValue for Value {
    fn into_value(self) -> Value {
        self
    }
}

impl IntoValue for () {
    fn into_value(self) -> Value {
        Value::Null
    }
}

impl IntoValue for bool {
    fn into_value(self) -> Value {
        Value::Bool(self)
    }
}

macro_rules! lossless_int {
    ($($ty:ty),+) => {
        $(
            impl IntoValue for $ty {
                fn into_value(self) -> Value {
                    Value::Int(i64::from(self))
                }
            }
        )+
    };
}

lossless_int!(i8, i16, i32, i64, u8, u16, u32);

macro_rules! checked_int {
    ($($ty:ty),+) => {
        $(
            impl IntoValue for $ty {
                fn into_value(self) -> Value {
                    match i64::try_from(self) {
                        Ok(v) => Value::Int(v),
                        Err(_) => Value::Fault(Fault::with_message(
                            FaultKind::Overflow,
                            format!("{} does not fit in a 64-bit signed integer", self),
                        )),
                    }
                }
            }
        )+
    };
}

checked_int!(u64, usize, isize, i128, u128);

impl IntoValue for char {
    fn into_value(self) -> Value {
        Value::Str(self.to_string())
    }
}

impl IntoValue for String {
    fn into_value(self) -> Value {
        Value::Str(self)
    }
}

impl IntoValue for &str {
    fn into_value(self) -> Value {
        Value::Str(self.to_string())
    }
}

impl<T: IntoValue + Clone> IntoValue for &T {
    fn into_value(self) -> Value {
        self.clone().into_value()
    }
}

impl<T: IntoValue + Clone> IntoValue for &[T] {
    fn into_value(self) -> Value {
        Value::List(self.iter().cloned().map(IntoValue::into_value).collect())
    }
}

impl<T: IntoValue> IntoValue for Vec<T> {
    fn into_value(self) -> Value {
        Value::List(self.into_iter().map(IntoValue::into_value).collect())
    }
}

impl<T: IntoValue> IntoValue for Option<T> {
    fn into_value(self) -> Value {
        match self {
            Some(v) => v.into_value(),
            None => Value::Null,
        }
    }
}

impl IntoValue for Fault {
    fn into_value(self) -> Value {
        Value::Fault(self)
    }
}

impl<T: IntoValue, E: Into<Fault>> IntoValue for Result<T, E> {
    fn into_value(self) -> Value {
        match self {
            Ok(v) => v.into_value(),
            Err(e) => Value::Fault(e.into()),
        }
    }
}

// ============================================================================
// From
// ============================================================================

/// A domain value could not be converted to a parameter type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgumentError {
    pub expected: String,
    pub found: String,
}

impl ArgumentError {
    pub fn new(expected: &str, found: &Value) -> Self {
        Self {
            expected: expected.to_string(),
            found: format!("{} {}", found.type_name(), found),
        }
    }

    /// The argument count did not match the parameter count.
    pub fn arity(expected: usize, found: usize) -> Self {
        Self {
            expected: format!("{} argument(s)", expected),
            found: found.to_string(),
        }
    }
}

impl fmt::Display for ArgumentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "expected {}, found {}", self.expected, self.found)
    }
}

impl std::error::Error for ArgumentError {}

/// Convert a domain [`Value`] into a parameter type.
pub trait FromValue: Sized {
    /// Name used in argument errors.
    const TYPE_NAME: &'static str;

    fn from_value(value: &Value) -> Result<Self, ArgumentError>;
}

impl FromValue for Value {
    const TYPE_NAME: &'static str = "Object";

    fn from_value(value: &Value) -> Result<Self, ArgumentError> {
        Ok(value.clone())
    }
}

impl FromValue for bool {
    const TYPE_NAME: &'static str = "bool";

    fn from_value(value: &Value) -> Result<Self, ArgumentError> {
        match value {
            Value::Bool(b) => Ok(*b),
            other => Err(ArgumentError::new(Self::TYPE_NAME, other)),
        }
    }
}

macro_rules! int_from_value {
    ($($ty:ty),+) => {
        $(
            impl FromValue for $ty {
                const TYPE_NAME: &'static str = stringify!($ty);

                fn from_value(value: &Value) -> Result<Self, ArgumentError> {
                    match value {
                        Value::Int(i) => <$ty>::try_from(*i).map_err(|_| ArgumentError::new(Self::TYPE_NAME, value)),
                        other => Err(ArgumentError::new(Self::TYPE_NAME, other)),
                    }
                }
            }
        )+
    };
}

int_from_value!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl FromValue for String {
    const TYPE_NAME: &'static str = "String";

    fn from_value(value: &Value) -> Result<Self, ArgumentError> {
        match value {
            Value::Str(s) => Ok(s.clone()),
            other => Err(ArgumentError::new(Self::TYPE_NAME, other)),
        }
    }
}

impl FromValue for char {
    const TYPE_NAME: &'static str = "char";

    fn from_value(value: &Value) -> Result<Self, ArgumentError> {
        if let Value::Str(s) = value {
            let mut chars = s.chars();
            if let (Some(c), None) = (chars.next(), chars.next()) {
                return Ok(c);
            }
        }
        Err(ArgumentError::new(Self::TYPE_NAME, value))
    }
}

impl<T: FromValue> FromValue for Option<T> {
    const TYPE_NAME: &'static str = "Option";

    fn from_value(value: &Value) -> Result<Self, ArgumentError> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    const TYPE_NAME: &'static str = "Vec";

    fn from_value(value: &Value) -> Result<Self, ArgumentError> {
        match value {
            Value::List(items) => items.iter().map(T::from_value).collect(),
            other => Err(ArgumentError::new(Self::TYPE_NAME, other)),
        }
    }
}
