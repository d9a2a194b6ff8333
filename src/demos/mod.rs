//! The bundled demo suite.
//!
//! [`IndexedList`] is exercised against `indexed_list.results`: a seeded list (`[10, 20, 30]`) and an empty one. The
//! CLI runs this suite, and the integration tests use it as the end-to-end reference.

pub mod indexed_list;

use gauntlet_core::vals;
use gauntlet_markup::{MarkupError, ResultsFile};

use crate::case::{Runnable, TestCase};
use crate::domain::DomainTable;

pub use indexed_list::IndexedList;

/// File name of the bundled results.
pub const RESULTS_NAME: &str = "indexed_list.results";

/// Expected results for [`suite`], embedded at compile time.
pub const RESULTS: &str = include_str!("indexed_list.results");

pub fn bundled_results() -> ResultsFile {
    ResultsFile::new(RESULTS_NAME, RESULTS)
}

pub fn seeded_domains() -> DomainTable {
    DomainTable::new()
        .with("get(usize)", vec![vals![0, 1, 2, 3]])
        .with("set(usize, Object)", vec![vals![0, 3], vals![99]])
        .with("add(Object)", vec![vals![40]])
        .with("add(usize, Object)", vec![vals![0, 3, 4], vals![5]])
        .with("remove(usize)", vec![vals![2, 5]])
        .with("index_of(Object)", vec![vals![20, 99]])
}

pub fn empty_domains() -> DomainTable {
    DomainTable::new()
        .with("get(usize)", vec![vals![0]])
        .with("remove(usize)", vec![vals![0]])
}

/// The demo cases, with expectations read from `results`.
pub fn suite(results: &ResultsFile) -> Result<Vec<Box<dyn Runnable>>, MarkupError> {
    let seeded = TestCase::from_results(
        "seeded",
        || IndexedList::from(vec![10_i64, 20, 30]),
        seeded_domains(),
        results,
        "seeded",
    )?;
    let empty = TestCase::from_results("empty", IndexedList::<i64>::new, empty_domains(), results, "empty")?;
    let cases: Vec<Box<dyn Runnable>> = vec![Box::new(seeded), Box::new(empty)];
    Ok(cases)
}
