//! Parameter domains and their combinatorial expansion.
//!
//! A domain table maps a qualified operation name to one row of candidate values per parameter. The engine
//! invokes the operation once per element of the cartesian product of those rows, in the order produced by
//! [`combinations`]: the leftmost row varies slowest, the rightmost fastest.

use std::collections::BTreeMap;

use gauntlet_core::Value;

/// Candidate argument rows keyed by qualified operation name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DomainTable {
    entries: BTreeMap<String, Vec<Vec<Value>>>,
}

impl DomainTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the rows for one operation (builder form of [`DomainTable::insert`]).
    pub fn with(mut self, operation: impl Into<String>, rows: Vec<Vec<Value>>) -> Self {
        self.insert(operation, rows);
        self
    }

    pub fn insert(&mut self, operation: impl Into<String>, rows: Vec<Vec<Value>>) {
        self.entries.insert(operation.into(), rows);
    }

    /// The rows for `operation`; `None` when absent or empty, meaning "call once with no arguments".
    pub fn get(&self, operation: &str) -> Option<&[Vec<Value>]> {
        self.entries
            .get(operation)
            .filter(|rows| !rows.is_empty())
            .map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Vec<Value>])> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }
}

/// Every tuple taking one value from each row, row order preserved.
///
/// Zero rows yield exactly one empty tuple; any empty row yields none.
///
/// ## Examples
/// ```rust
/// use gauntlet::domain::combinations;
///
/// let tuples = combinations(&[vec![1, 2], vec![10, 20, 30]]);
/// assert_eq!(tuples[0], vec![1, 10]);
/// assert_eq!(tuples[1], vec![1, 20]);
/// assert_eq!(tuples.len(), 6);
/// ```
#[tracing::instrument(level = "trace", skip_all, fields(rows = rows.len()))]
pub fn combinations<T: Clone>(rows: &[Vec<T>]) -> Vec<Vec<T>> {
    rows.iter().fold(vec![Vec::with_capacity(rows.len())], |acc, row| {
        acc.iter()
            .flat_map(|prefix| {
                row.iter().map(move |value| {
                    let mut tuple = prefix.clone();
                    tuple.push(value.clone());
                    tuple
                })
            })
            .collect()
    })
}

/// Number of tuples [`combinations`] produces for `rows`.
pub fn combination_count<T>(rows: &[Vec<T>]) -> usize {
    rows.iter().map(Vec::len).product()
}

#[cfg(test)]
mod tests {
    use super::*;
    use gauntlet_core::vals;

    #[test]
    fn zero_rows_is_one_empty_tuple() {
        let none: [Vec<i32>; 0] = [];
        assert_eq!(combinations(&none), vec![Vec::<i32>::new()]);
        assert_eq!(combination_count(&none), 1);
    }

    #[test]
    fn empty_row_yields_nothing() {
        let rows = vec![vec![1, 2], vec![]];
        assert!(combinations(&rows).is_empty());
        assert_eq!(combination_count(&rows), 0);
    }

    #[test]
    fn left_row_varies_slowest() {
        let rows = vec![vals![0, 1], vals!["a", "b"]];
        assert_eq!(
            combinations(&rows),
            vec![vals![0, "a"], vals![0, "b"], vals![1, "a"], vals![1, "b"]]
        );
    }

    #[test]
    fn absent_and_empty_entries_mean_no_arguments() {
        let table = DomainTable::new().with("size()", vec![]).with("get(usize)", vec![vals![0, 1]]);
        assert!(table.get("size()").is_none());
        assert!(table.get("clear()").is_none());
        assert_eq!(table.get("get(usize)").map(<[_]>::len), Some(1));
    }

    #[test]
    fn overloads_are_separate_entries() {
        let table = DomainTable::new()
            .with("add(Object)", vec![vals!["x"]])
            .with("add(usize, Object)", vec![vals![0], vals!["y"]]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.get("add(Object)").unwrap().len(), 1);
        assert_eq!(table.get("add(usize, Object)").unwrap().len(), 2);
    }
}
