//! Provide the value model and the comparison policy for the gauntlet harness.
//!
//! This crate is intentionally small and dependency-free. It holds everything the engine and the expected-results
//! parser need to agree on:
//! - [`Value`]: the closed set of observable result kinds,
//! - [`faults`]: the fault vocabulary (canonical spellings + panic classification),
//! - [`cursor`]: cursor capability tiers for live iterator-like results,
//! - [`Outcome`]: an observed value together with the invocation that produced it,
//! - [`compare`]: the partial equivalence used to decide pass/fail.
//!
//! ## Notes
//!
//! - No IO and no global state live here; the harness crate owns threads, timing and reporting.

pub mod compare;
pub mod cursor;
pub mod faults;
pub mod outcome;
pub mod value;

pub use compare::{ValueClass, equivalent};
pub use cursor::{Bidirectional, CursorFamily, CursorKind, Forward, Splittable};
pub use faults::{Fault, FaultKind};
pub use outcome::{Invocation, Outcome};
pub use value::{ArgumentError, FromValue, IntoValue, Value};

/// Build a `Vec<Value>` from heterogeneous expressions.
///
/// ## Examples
/// ```rust
/// use gauntlet_core::{Value, vals};
///
/// let row = vals![1, "a", Value::Null, true];
/// assert_eq!(row.len(), 4);
/// assert_eq!(row[0], Value::Int(1));
/// ```
#[macro_export]
macro_rules! vals {
    () => {
        ::std::vec::Vec::<$crate::Value>::new()
    };
    ($($item:expr),+ $(,)?) => {
        ::std::vec![$($crate::IntoValue::into_value($item)),+]
    };
}
