//! Value literals accepted inside an operation section.
//!
//! Words are resolved against [`LITERALS`] first, then as decimal integers (`[-+]?[0-9]+`). Quoted tokens are
//! always strings. Anything else is rejected.

use gauntlet_core::{CursorKind, Fault, FaultKind, Value};

/// What a keyword literal stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralValue {
    Null,
    Bool(bool),
    Fault(FaultKind),
    Cursor(CursorKind),
}

impl LiteralValue {
    pub fn to_value(self) -> Value {
        match self {
            LiteralValue::Null => Value::Null,
            LiteralValue::Bool(b) => Value::Bool(b),
            LiteralValue::Fault(kind) => Value::Fault(Fault::new(kind)),
            LiteralValue::Cursor(kind) => Value::Cursor(kind),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct LiteralInfo {
    pub spelling: &'static str,
    pub value: LiteralValue,
}

/// Keyword literals, case-sensitive.
pub const LITERALS: &[LiteralInfo] = &[
    LiteralInfo { spelling: "null", value: LiteralValue::Null },
    LiteralInfo { spelling: "true", value: LiteralValue::Bool(true) },
    LiteralInfo { spelling: "false", value: LiteralValue::Bool(false) },
    LiteralInfo { spelling: "IndexOutOfBounds", value: LiteralValue::Fault(FaultKind::IndexOutOfBounds) },
    LiteralInfo { spelling: "NoSuchElement", value: LiteralValue::Fault(FaultKind::NoSuchElement) },
    LiteralInfo { spelling: "IllegalState", value: LiteralValue::Fault(FaultKind::IllegalState) },
    LiteralInfo { spelling: "NonTermination", value: LiteralValue::Fault(FaultKind::NonTermination) },
    LiteralInfo { spelling: "ListIterator", value: LiteralValue::Cursor(CursorKind::ListIterator) },
    LiteralInfo { spelling: "Iterator", value: LiteralValue::Cursor(CursorKind::Iterator) },
];

pub fn keyword(word: &str) -> Option<LiteralValue> {
    LITERALS.iter().find(|l| l.spelling == word).map(|l| l.value)
}

/// Why a word is not a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WordError {
    Unknown,
    OutOfRange,
}

fn is_integer(word: &str) -> bool {
    let digits = word.strip_prefix(['-', '+']).unwrap_or(word);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

/// Resolve an unquoted word to a value.
pub fn parse_word(word: &str) -> Result<Value, WordError> {
    if let Some(lit) = keyword(word) {
        return Ok(lit.to_value());
    }
    if !is_integer(word) {
        return Err(WordError::Unknown);
    }
    word.parse::<i64>().map(Value::Int).map_err(|_| WordError::OutOfRange)
}
