//! Cursor capability tiers.
//!
//! Operations often return live views (iterators) that cannot be drained without consuming state or blocking.
//! The harness never inspects their elements; it records only which capability tier the result belongs to.
//!
//! | Kind | Family | Rust shape |
//! |---|---|---|
//! | `Iterator` | sequential | forward-only iterators ([`Forward`], hash-map iterators) |
//! | `ListIterator` | sequential | double-ended, position-aware iterators ([`Bidirectional`], slice/deque/list iterators) |
//! | `Splitter` | splitting | splittable sources for parallel traversal ([`Splittable`]) |
//!
//! A list iterator is also an iterator, so the two sequential kinds are equivalent to each other.

use std::collections::{btree_map, btree_set, hash_map, hash_set, linked_list, vec_deque};
use std::fmt;

use crate::value::{IntoValue, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CursorKind {
    Iterator,
    ListIterator,
    Splitter,
}

/// Equivalence class of cursor kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CursorFamily {
    Sequential,
    Splitting,
}

impl CursorKind {
    pub const fn family(self) -> CursorFamily {
        match self {
            CursorKind::Iterator | CursorKind::ListIterator => CursorFamily::Sequential,
            CursorKind::Splitter => CursorFamily::Splitting,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            CursorKind::Iterator => "Iterator",
            CursorKind::ListIterator => "ListIterator",
            CursorKind::Splitter => "Splitter",
        }
    }
}

impl fmt::Display for CursorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Marks a returned forward-only iterator.
#[derive(Debug, Clone)]
pub struct Forward<I>(pub I);

/// Marks a returned double-ended iterator.
#[derive(Debug, Clone)]
pub struct Bidirectional<I>(pub I);

/// Marks a returned splittable source.
#[derive(Debug, Clone)]
pub struct Splittable<I>(pub I);

impl<I: Iterator> Forward<I> {
    pub fn new(iter: I) -> Self {
        Self(iter)
    }
}

impl<I: DoubleEndedIterator> Bidirectional<I> {
    pub fn new(iter: I) -> Self {
        Self(iter)
    }
}

impl<I> Splittable<I> {
    pub fn new(source: I) -> Self {
        Self(source)
    }
}

impl<I> IntoValue for Forward<I> {
    fn into_value(self) -> Value {
        Value::Cursor(CursorKind::Iterator)
    }
}

impl<I> IntoValue for Bidirectional<I> {
    fn into_value(self) -> Value {
        Value::Cursor(CursorKind::ListIterator)
    }
}

impl<I> IntoValue for Splittable<I> {
    fn into_value(self) -> Value {
        Value::Cursor(CursorKind::Splitter)
    }
}

macro_rules! cursor_value {
    ($kind:expr => $($ty:ty),+ $(,)?) => {
        $(
            impl<'a, T> IntoValue for $ty {
                fn into_value(self) -> Value {
                    Value::Cursor($kind)
                }
            }
        )+
    };
}

cursor_value!(CursorKind::ListIterator =>
    std::slice::Iter<'a, T>,
    std::slice::IterMut<'a, T>,
    vec_deque::Iter<'a, T>,
    vec_deque::IterMut<'a, T>,
    linked_list::Iter<'a, T>,
    linked_list::IterMut<'a, T>,
    btree_set::Iter<'a, T>,
);

cursor_value!(CursorKind::Iterator =>
    hash_set::Iter<'a, T>,
);

impl<T> IntoValue for std::vec::IntoIter<T> {
    fn into_value(self) -> Value {
        Value::Cursor(CursorKind::ListIterator)
    }
}

impl<'a, K, V> IntoValue for btree_map::Iter<'a, K, V> {
    fn into_value(self) -> Value {
        Value::Cursor(CursorKind::ListIterator)
    }
}

impl<'a, K, V> IntoValue for hash_map::Iter<'a, K, V> {
    fn into_value(self) -> Value {
        Value::Cursor(CursorKind::Iterator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequential_kinds_share_a_family() {
        assert_eq!(CursorKind::Iterator.family(), CursorKind::ListIterator.family());
        assert_ne!(CursorKind::Iterator.family(), CursorKind::Splitter.family());
    }

    #[test]
    fn std_iterators_convert_without_draining() {
        let items = vec![1, 2, 3];
        let mut iter = items.iter();
        assert_eq!(iter.clone().into_value(), Value::Cursor(CursorKind::ListIterator));
        assert_eq!(iter.next(), Some(&1));
    }

    #[test]
    fn wrappers_pick_their_tier() {
        let items = [1, 2];
        assert_eq!(Forward::new(items.iter().map(|x| x + 1)).into_value(), Value::Cursor(CursorKind::Iterator));
        assert_eq!(Bidirectional::new(items.iter().rev()).into_value(), Value::Cursor(CursorKind::ListIterator));
        assert_eq!(Splittable::new(&items[..]).into_value(), Value::Cursor(CursorKind::Splitter));
    }
}
