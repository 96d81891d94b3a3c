//! Test identity and classification models

use serde::{Deserialize, Serialize};
use std::fmt;

/// `(suite, test)` pair naming one test
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TestId {
    pub suite: String,
    pub test: String,
}

impl TestId {
    pub fn new(suite: impl Into<String>, test: impl Into<String>) -> Self {
        Self {
            suite: suite.into(),
            test: test.into(),
        }
    }
}

impl fmt::Display for TestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.suite, self.test)
    }
}

/// Whether a descriptor is a plain test or a benchmark
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestKind {
    Test,
    Benchmark,
}

/// Final classification of one test execution
///
/// Exactly one status is recorded per selected test.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestStatus {
    Succeeded,
    Skipped,
    Failed,
    Panicked,
    FixturePanicked,
    ExpectedFailure,
    Missed,
}

impl TestStatus {
    /// Label used in report lines
    pub fn label(&self) -> &'static str {
        match self {
            TestStatus::Succeeded => "PASS",
            TestStatus::Skipped => "SKIP",
            TestStatus::Failed => "FAIL",
            TestStatus::Panicked => "PANIC",
            TestStatus::FixturePanicked => "FIXTURE-PANIC",
            TestStatus::ExpectedFailure => "FAIL EXPECTED",
            TestStatus::Missed => "MISS",
        }
    }

    /// Failures and panics always get a full report block
    pub fn is_problem(&self) -> bool {
        matches!(
            self,
            TestStatus::Failed | TestStatus::Panicked | TestStatus::FixturePanicked
        )
    }
}

impl fmt::Display for TestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_display() {
        let id = TestId::new("Math", "TestAdd");
        assert_eq!(id.to_string(), "Math.TestAdd");
    }

    #[test]
    fn test_id_equality() {
        assert_eq!(TestId::new("A", "b"), TestId::new("A", "b"));
        assert_ne!(TestId::new("A", "b"), TestId::new("A", "c"));
        assert_ne!(TestId::new("A", "b"), TestId::new("B", "b"));
    }

    #[test]
    fn test_status_problems() {
        assert!(TestStatus::Failed.is_problem());
        assert!(TestStatus::Panicked.is_problem());
        assert!(!TestStatus::Skipped.is_problem());
        assert!(!TestStatus::Missed.is_problem());
        assert_eq!(TestStatus::ExpectedFailure.to_string(), "FAIL EXPECTED");
    }
}
