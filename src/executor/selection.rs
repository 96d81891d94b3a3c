//! Test selection by regular expression
//!
//! A test is selected when the pattern matches anywhere in its test
//! name, its suite name or the full `Suite.Test` identifier.

use regex::Regex;

use crate::models::{RunError, TestId, TestKind};
use crate::suite::DynSuite;

/// Compiled selection pattern; empty selects everything
#[derive(Clone, Debug, Default)]
pub struct Selection {
    pattern: Option<Regex>,
}

impl Selection {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn compile(filter: &str) -> Result<Self, RunError> {
        if filter.is_empty() {
            return Ok(Self::all());
        }
        let pattern = Regex::new(filter)?;
        Ok(Self {
            pattern: Some(pattern),
        })
    }

    pub fn matches(&self, id: &TestId) -> bool {
        match &self.pattern {
            None => true,
            Some(re) => {
                re.is_match(&id.test) || re.is_match(&id.suite) || re.is_match(&id.to_string())
            }
        }
    }
}

/// A discovered test that passed selection
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectedTest {
    /// Position in the suite's declaration order
    pub index: usize,
    pub id: TestId,
    pub kind: TestKind,
}

/// Discover and filter the tests of `suite`, in declaration order
///
/// Benchmark mode selects only benchmarks; otherwise only tests.
pub fn select(suite: &dyn DynSuite, selection: &Selection, benchmark: bool) -> Vec<SelectedTest> {
    let wanted = if benchmark {
        TestKind::Benchmark
    } else {
        TestKind::Test
    };
    let suite_name = suite.suite_name();

    suite
        .test_specs()
        .into_iter()
        .enumerate()
        .filter(|(_, spec)| spec.kind == wanted)
        .map(|(index, spec)| SelectedTest {
            index,
            id: TestId::new(suite_name.clone(), spec.name),
            kind: spec.kind,
        })
        .filter(|test| selection.matches(&test.id))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::suite::{Suite, TestContext, TestDescriptor};

    struct Math;

    impl Math {
        fn noop(&mut self, _c: &mut TestContext) {}
    }

    impl Suite for Math {
        fn tests(&self) -> Vec<TestDescriptor<Self>> {
            vec![
                TestDescriptor::test("TestAdd", Math::noop),
                TestDescriptor::benchmark("BenchmarkAdd", Math::noop),
                TestDescriptor::test("TestSub", Math::noop),
                TestDescriptor::test("TestAddMany", Math::noop),
            ]
        }
    }

    fn names(tests: &[SelectedTest]) -> Vec<String> {
        tests.iter().map(|t| t.id.to_string()).collect()
    }

    #[test]
    fn test_empty_filter_selects_all_tests() {
        let tests = select(&Math, &Selection::all(), false);
        assert_eq!(
            names(&tests),
            vec!["Math.TestAdd", "Math.TestSub", "Math.TestAddMany"]
        );
        assert_eq!(tests[1].index, 2);
    }

    #[test]
    fn test_benchmark_mode_selects_benchmarks() {
        let tests = select(&Math, &Selection::all(), true);
        assert_eq!(names(&tests), vec!["Math.BenchmarkAdd"]);
        assert_eq!(tests[0].index, 1);
    }

    #[test]
    fn test_filter_by_full_name() {
        let selection = Selection::compile("Math.TestSub").unwrap();
        let tests = select(&Math, &selection, false);
        assert_eq!(names(&tests), vec!["Math.TestSub"]);
    }

    #[test]
    fn test_filter_matches_suite_or_test_name() {
        let by_suite = Selection::compile("^Math$").unwrap();
        assert_eq!(select(&Math, &by_suite, false).len(), 3);

        let by_test = Selection::compile("^TestAdd").unwrap();
        assert_eq!(
            names(&select(&Math, &by_test, false)),
            vec!["Math.TestAdd", "Math.TestAddMany"]
        );

        let anchored = Selection::compile("^Math\\.TestAdd$").unwrap();
        assert_eq!(names(&select(&Math, &anchored, false)), vec!["Math.TestAdd"]);
    }

    #[test]
    fn test_selection_is_idempotent() {
        let selection = Selection::compile("Add").unwrap();
        let first = select(&Math, &selection, false);
        let second = select(&Math, &selection, false);
        assert_eq!(first, second);
    }

    #[test]
    fn test_invalid_filter() {
        let err = Selection::compile("Math(").unwrap_err();
        assert!(matches!(err, RunError::InvalidFilter(_)));
    }
}
