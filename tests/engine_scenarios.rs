//! End-to-end tests: test cases run through the engine against real subjects.

use std::sync::Arc;
use std::time::{Duration, Instant};

use gauntlet::demos;
use gauntlet::report::{ConsoleReporter, Reporter};
use gauntlet::{
    Comparison, DomainTable, Engine, EngineError, HarnessConfig, OutcomeTable, ResultsFile, Runnable, Subject, Tally,
    TestCase, Value, operations, vals,
};

/// Generous budget so slow machines do not turn completed calls into timeouts.
fn patient() -> Engine {
    Engine::new(
        HarnessConfig::new()
            .with_poll_interval(Duration::from_millis(10))
            .with_max_polls(500),
    )
}

/// Collects every comparison line for inspection.
#[derive(Default)]
struct Recorder {
    comparisons: Vec<Comparison>,
    errors: Vec<String>,
    finished: Option<Tally>,
}

impl Reporter for Recorder {
    fn on_comparison(&mut self, _description: &str, comparison: &Comparison) {
        self.comparisons.push(comparison.clone());
    }

    fn on_case_error(&mut self, description: &str, error: &EngineError) {
        self.errors.push(format!("{description}: {error}"));
    }

    fn on_run_complete(&mut self, tally: &Tally) {
        self.finished = Some(*tally);
    }
}

#[derive(Debug, Default)]
struct Counter {
    n: i64,
}

#[operations]
impl Counter {
    pub fn size(&self) -> i64 {
        self.n
    }

    #[gauntlet(rename = "bump")]
    pub fn bump_one(&mut self) -> i64 {
        self.n += 1;
        self.n
    }

    #[gauntlet(rename = "bump")]
    pub fn bump_by(&mut self, by: i64) -> i64 {
        self.n += by;
        self.n
    }

    pub fn stall(&self) -> i64 {
        loop {
            std::thread::sleep(Duration::from_millis(20));
        }
    }
}

// =============================================================================
// Scenarios
// =============================================================================

#[test]
fn zero_argument_operation_without_domain_passes_once() {
    let case = TestCase::new(
        "size only",
        Counter::default,
        DomainTable::new(),
        OutcomeTable::new().with("size()", vals![0]),
    );
    let mut recorder = Recorder::default();
    let report = patient().run_case(&case, &mut recorder).unwrap();
    assert_eq!(report.tally, Tally { total: 1, passed: 1, failed: 0 });
    assert_eq!(recorder.comparisons.len(), 1);
}

#[test]
fn operations_the_case_never_names_are_not_invoked() {
    let case = TestCase::new(
        "size only",
        Counter::default,
        DomainTable::new(),
        OutcomeTable::new().with("size()", vals![0]),
    );
    let achieved = patient().achieve(&case).unwrap();
    let names: Vec<&str> = achieved.iter().map(|(name, _)| name).collect();
    assert_eq!(names, vec!["size()"]);
}

#[test]
fn overloads_do_not_collide() {
    let case = TestCase::new(
        "overloads",
        Counter::default,
        DomainTable::new().with("bump(i64)", vec![vals![5, 7]]),
        OutcomeTable::new().with("bump()", vals![1]).with("bump(i64)", vals![5, 7]),
    );
    let report = patient().run_case(&case, &mut Recorder::default()).unwrap();
    assert_eq!(report.achieved.get("bump()").unwrap().len(), 1);
    assert_eq!(report.achieved.get("bump(i64)").unwrap().len(), 2);
    assert_eq!(report.tally.passed, 3);
}

#[test]
fn every_invocation_gets_a_fresh_receiver() {
    let case = TestCase::new(
        "fresh",
        Counter::default,
        DomainTable::new().with("bump(i64)", vec![vals![1, 1, 1]]),
        OutcomeTable::new().with("bump(i64)", vals![1, 1, 1]),
    );
    let report = patient().run_case(&case, &mut Recorder::default()).unwrap();
    assert_eq!(report.tally.failed, 0);
}

#[test]
fn non_terminating_operation_is_bounded_by_the_budget() {
    let engine = Engine::new(
        HarnessConfig::new()
            .with_poll_interval(Duration::from_millis(5))
            .with_max_polls(10),
    );
    let case = TestCase::new(
        "stall",
        Counter::default,
        DomainTable::new(),
        OutcomeTable::new().with("stall()", vec![Value::Int(0)]),
    );
    let mut recorder = Recorder::default();
    let started = Instant::now();
    let report = engine.run_case(&case, &mut recorder).unwrap();
    assert!(started.elapsed() < engine.config().budget() + Duration::from_secs(2));
    assert_eq!(report.tally.failed, 1);
    let achieved = recorder.comparisons[0].achieved.as_ref().unwrap();
    assert!(achieved.fault().is_some_and(|f| f.is_non_termination()));
    assert!(recorder.comparisons[0].trace().is_none());
}

#[test]
fn failures_do_not_stop_later_comparisons() {
    let case = TestCase::new(
        "mixed",
        Counter::default,
        DomainTable::new().with("bump(i64)", vec![vals![1, 2, 3]]),
        OutcomeTable::new().with("bump(i64)", vals![9, 2, 9]).with("size()", vals![0]),
    );
    let mut recorder = Recorder::default();
    let report = patient().run_case(&case, &mut recorder).unwrap();
    let passed: Vec<bool> = recorder.comparisons.iter().map(|c| c.passed).collect();
    assert_eq!(passed, vec![false, true, false, true]);
    assert_eq!(report.tally, Tally { total: 4, passed: 2, failed: 2 });
}

#[test]
fn domain_shape_mismatch_aborts_only_that_case() {
    let broken = TestCase::new(
        "broken",
        Counter::default,
        DomainTable::new().with("bump(i64)", vec![vals![1], vals![2]]),
        OutcomeTable::new().with("bump(i64)", vals![1]),
    );
    let missing = TestCase::new(
        "missing",
        Counter::default,
        DomainTable::new(),
        OutcomeTable::new().with("bump(i64)", vals![1]),
    );
    let fine = TestCase::new(
        "fine",
        Counter::default,
        DomainTable::new(),
        OutcomeTable::new().with("size()", vals![0]),
    );
    let cases: Vec<Box<dyn Runnable>> = vec![Box::new(broken), Box::new(missing), Box::new(fine)];
    let mut recorder = Recorder::default();
    let run = patient().run_all(&cases, &mut recorder);

    assert_eq!(run.errors.len(), 2);
    assert!(matches!(run.errors[0].1, EngineError::DomainShape { rows: 2, arity: 1, .. }));
    assert_eq!(
        recorder.errors[1],
        "missing: `bump(i64)` takes 1 argument(s) but no argument set was supplied"
    );
    assert_eq!(run.cases.len(), 1);
    assert_eq!(recorder.finished, Some(Tally { total: 1, passed: 1, failed: 0 }));
    assert!(!run.is_success());
}

#[test]
fn markup_round_trip_feeds_the_engine() {
    let file = ResultsFile::new("inline", r#"<caseA><size()>1 2 "x" null</size()></caseA>"#);
    let expected = file.read_case("caseA").unwrap();
    assert_eq!(
        expected.get("size()").unwrap(),
        &[Value::Int(1), Value::Int(2), Value::Str("x".to_string()), Value::Null]
    );

    let case = TestCase::from_results("round trip", Counter::default, DomainTable::new(), &file, "caseA").unwrap();
    let report = patient().run_case(&case, &mut Recorder::default()).unwrap();
    // size() runs once; the three extra expected values have no achieved counterpart.
    assert_eq!(report.tally, Tally { total: 4, passed: 0, failed: 4 });
}

#[test]
fn missing_case_is_reported_by_name() {
    let file = ResultsFile::new("inline", "<caseA></caseA>");
    let err = TestCase::from_results("nope", Counter::default, DomainTable::new(), &file, "caseB").unwrap_err();
    assert_eq!(err.to_string(), "case `caseB` not found in inline");
}

// =============================================================================
// Demo suite
// =============================================================================

#[test]
fn demo_suite_passes_against_bundled_results() {
    let cases = demos::suite(&demos::bundled_results()).unwrap();
    let mut reporter = ConsoleReporter::new(Vec::new(), false);
    let run = patient().run_all(&cases, &mut reporter);
    let text = String::from_utf8(reporter.finish().unwrap()).unwrap();

    assert!(run.errors.is_empty(), "{:?}", run.errors);
    assert_eq!(run.tally, Tally { total: 27, passed: 27, failed: 0 }, "{text}");
    assert!(text.ends_with(" Total: 27\nPassed: 27 (100.00%)\nFailed: 0\n"));
}

#[test]
fn demo_suite_reports_wrong_expectations() {
    let results = ResultsFile::new(
        "edited",
        demos::RESULTS.replace("<size()>\n3\n</size()>", "<size()>\n4\n</size()>"),
    );
    let cases = demos::suite(&results).unwrap();
    let mut reporter = ConsoleReporter::new(Vec::new(), false);
    let run = patient().run_all(&cases, &mut reporter);
    let text = String::from_utf8(reporter.finish().unwrap()).unwrap();

    assert_eq!(run.tally.failed, 1);
    assert!(text.starts_with("seeded | **** FAIL:     size() -> 3\nseeded |      Expected: 4\n"));
}

#[test]
fn unexpected_fault_carries_the_tested_frames() {
    let factory: gauntlet::invoker::Factory<demos::IndexedList<i64>> =
        Arc::new(|| demos::IndexedList::from(vec![10_i64, 20, 30]));
    let remove = demos::IndexedList::<i64>::operations()
        .into_iter()
        .find(|op| op.qualified_name() == "remove(usize)")
        .unwrap();
    let outcome = patient().invoker().invoke(&factory, &remove, Some(vals![9].as_slice())).unwrap();

    let trace = outcome.fault().and_then(|fault| fault.trace()).unwrap();
    assert!(trace.contains("IndexedList<T>::check_index"), "{trace}");
    assert!(trace.contains("IndexedList<T>::remove"), "{trace}");
    assert!(!trace.contains("gauntlet::invoker::"), "{trace}");
}

#[test]
fn console_prints_the_trace_under_a_failing_fault() {
    let results = ResultsFile::new(
        "edited",
        demos::RESULTS.replace("30 IndexOutOfBounds\n</remove(usize)>", "30 40\n</remove(usize)>"),
    );
    let cases = demos::suite(&results).unwrap();
    let mut reporter = ConsoleReporter::new(Vec::new(), false);
    let run = patient().run_all(&cases, &mut reporter);
    let text = String::from_utf8(reporter.finish().unwrap()).unwrap();

    assert_eq!(run.tally.failed, 1, "{text}");
    assert!(text.contains("seeded |      Expected: 40\n        at "), "{text}");
    assert!(text.contains("IndexedList<T>::remove"), "{text}");
}
