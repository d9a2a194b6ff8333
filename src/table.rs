//! Expectation and achieved tables.
//!
//! Both map a qualified operation name to outcomes index-aligned with the operation's combination order.

use std::collections::BTreeMap;

use gauntlet_core::{Outcome, Value};
use gauntlet_markup::CaseResults;

#[derive(Debug, Clone, Default)]
pub struct OutcomeTable {
    entries: BTreeMap<String, Vec<Outcome>>,
}

impl OutcomeTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add expected values for one operation (builder form).
    pub fn with(mut self, operation: impl Into<String>, values: Vec<Value>) -> Self {
        self.insert(operation, values.into_iter().map(Outcome::expected).collect());
        self
    }

    pub fn insert(&mut self, operation: impl Into<String>, outcomes: Vec<Outcome>) {
        self.entries.insert(operation.into(), outcomes);
    }

    /// Append one outcome to an operation's sequence.
    pub fn push(&mut self, operation: &str, outcome: Outcome) {
        match self.entries.get_mut(operation) {
            Some(outcomes) => outcomes.push(outcome),
            None => {
                self.entries.insert(operation.to_string(), vec![outcome]);
            }
        }
    }

    pub fn get(&self, operation: &str) -> Option<&[Outcome]> {
        self.entries.get(operation).map(Vec::as_slice)
    }

    pub fn contains(&self, operation: &str) -> bool {
        self.entries.contains_key(operation)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in qualified-name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Outcome])> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }
}

impl From<&CaseResults> for OutcomeTable {
    fn from(case: &CaseResults) -> Self {
        let mut table = OutcomeTable::new();
        for section in case.iter() {
            let outcomes = section.values.iter().cloned().map(Outcome::expected).collect();
            table.insert(section.operation.clone(), outcomes);
        }
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gauntlet_core::{Invocation, vals};
    use gauntlet_markup::ResultsFile;

    #[test]
    fn built_from_markup_case() {
        let file = ResultsFile::new("t", "<c><size()>0</size()><get(usize)>1 IndexOutOfBounds</get(usize)></c>");
        let table = OutcomeTable::from(&file.read_case("c").unwrap());
        assert_eq!(table.len(), 2);
        assert_eq!(table.get("size()").unwrap(), &[Outcome::expected(Value::Int(0))]);
        assert_eq!(table.get("get(usize)").unwrap().len(), 2);
    }

    #[test]
    fn push_appends_in_order() {
        let mut table = OutcomeTable::new();
        for i in 0..3 {
            table.push("get(usize)", Outcome::achieved(Value::Int(i), Invocation::new("get", vals![i])));
        }
        let values: Vec<_> = table.get("get(usize)").unwrap().iter().map(|o| o.value().clone()).collect();
        assert_eq!(values, vals![0, 1, 2]);
    }
}
