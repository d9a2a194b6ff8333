//! An index-addressable list, the reference subject of the bundled suite.

use std::thread;
use std::time::Duration;

use gauntlet_core::FaultKind;
use gauntlet_core::faults::raise;

use crate::cancel;

/// A growable list addressed by position.
///
/// Out-of-range positions raise `IndexOutOfBounds`; reading the head of an empty list raises `NoSuchElement`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexedList<T> {
    items: Vec<T>,
}

impl<T> IndexedList<T> {
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    fn check_index(&self, index: usize, limit: usize) {
        if index >= limit {
            raise(
                FaultKind::IndexOutOfBounds,
                format!("index {index}, size {}", self.items.len()),
            );
        }
    }
}

impl<T> From<Vec<T>> for IndexedList<T> {
    fn from(items: Vec<T>) -> Self {
        Self { items }
    }
}

#[crate::operations]
impl<T: Clone + PartialEq> IndexedList<T> {
    pub fn size(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> T {
        self.items[index].clone()
    }

    /// Replace the element at `index`, returning the previous one.
    pub fn set(&mut self, index: usize, value: T) -> T {
        self.check_index(index, self.items.len());
        std::mem::replace(&mut self.items[index], value)
    }

    #[gauntlet(rename = "add")]
    pub fn push(&mut self, value: T) -> bool {
        self.items.push(value);
        true
    }

    #[gauntlet(rename = "add")]
    pub fn insert(&mut self, index: usize, value: T) {
        self.check_index(index, self.items.len() + 1);
        self.items.insert(index, value);
    }

    pub fn remove(&mut self, index: usize) -> T {
        self.check_index(index, self.items.len());
        self.items.remove(index)
    }

    pub fn index_of(&self, value: &T) -> Option<usize> {
        self.items.iter().position(|item| item == value)
    }

    pub fn first(&self) -> T {
        match self.items.first() {
            Some(item) => item.clone(),
            None => raise(FaultKind::NoSuchElement, "list is empty"),
        }
    }

    /// Wait for a head element. Nothing can add one while this runs, so on an empty list it only ends when the
    /// invocation is abandoned.
    pub fn await_first(&self) -> T {
        loop {
            if let Some(item) = self.items.first() {
                return item.clone();
            }
            cancel::checkpoint();
            thread::sleep(Duration::from_millis(1));
        }
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &T> {
        self.items.iter()
    }

    pub fn values(&self) -> impl Iterator<Item = T> + '_ {
        self.items.iter().cloned()
    }

    #[gauntlet(skip)]
    pub fn clear(&mut self) {
        self.items.clear();
    }
}
