//! Aggregated run result
//!
//! A [`RunResult`] is created empty per suite, filled by the suite runner
//! and merged upward with [`RunResult::add`]. Counter merging is field-wise
//! addition, so aggregation order never changes the totals.

use serde::{Serialize, Serializer};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

use super::TestStatus;

/// Run-level faults that prevent tests from running at all
#[derive(Clone, Debug, Error)]
pub enum RunError {
    #[error("Bad filter expression: {0}")]
    InvalidFilter(#[from] regex::Error),

    #[error("{received} of {expected} suites reported results")]
    Incomplete { expected: usize, received: usize },
}

/// Counters for one suite or a whole run
#[derive(Clone, Debug, Default, Serialize)]
pub struct RunResult {
    pub succeeded: u32,
    pub skipped: u32,
    pub failed: u32,
    pub panicked: u32,
    pub fixture_panicked: u32,
    pub expected_failures: u32,
    pub missed: u32,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_run_error"
    )]
    pub run_error: Option<RunError>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub work_dirs: Vec<PathBuf>,
}

impl RunResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Result carrying only a fatal error
    pub fn from_error(error: RunError) -> Self {
        Self {
            run_error: Some(error),
            ..Default::default()
        }
    }

    /// Count one classification
    pub fn record(&mut self, status: TestStatus) {
        let counter = match status {
            TestStatus::Succeeded => &mut self.succeeded,
            TestStatus::Skipped => &mut self.skipped,
            TestStatus::Failed => &mut self.failed,
            TestStatus::Panicked => &mut self.panicked,
            TestStatus::FixturePanicked => &mut self.fixture_panicked,
            TestStatus::ExpectedFailure => &mut self.expected_failures,
            TestStatus::Missed => &mut self.missed,
        };
        *counter += 1;
    }

    /// Remember a retained work directory
    pub fn keep_work_dir(&mut self, path: impl Into<PathBuf>) {
        self.work_dirs.push(path.into());
    }

    /// Merge another result into this one
    pub fn add(&mut self, other: &RunResult) {
        self.succeeded += other.succeeded;
        self.skipped += other.skipped;
        self.failed += other.failed;
        self.panicked += other.panicked;
        self.fixture_panicked += other.fixture_panicked;
        self.expected_failures += other.expected_failures;
        self.missed += other.missed;
        if self.run_error.is_none() {
            self.run_error = other.run_error.clone();
        }
        self.work_dirs.extend(other.work_dirs.iter().cloned());
    }

    /// Skipped tests and expected failures never fail a run
    pub fn passed(&self) -> bool {
        self.failed == 0
            && self.panicked == 0
            && self.fixture_panicked == 0
            && self.missed == 0
            && self.run_error.is_none()
    }

    /// Retained work directories joined with `:`
    pub fn work_dir(&self) -> Option<String> {
        if self.work_dirs.is_empty() {
            return None;
        }
        let joined = self
            .work_dirs
            .iter()
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>()
            .join(":");
        Some(joined)
    }

    /// Number of tests that received a classification
    pub fn total(&self) -> u32 {
        self.succeeded
            + self.skipped
            + self.failed
            + self.panicked
            + self.expected_failures
            + self.missed
    }

    /// True when every counter matches, ignoring errors and paths
    pub fn same_counts(&self, other: &RunResult) -> bool {
        self.succeeded == other.succeeded
            && self.skipped == other.skipped
            && self.failed == other.failed
            && self.panicked == other.panicked
            && self.fixture_panicked == other.fixture_panicked
            && self.expected_failures == other.expected_failures
            && self.missed == other.missed
    }
}

impl fmt::Display for RunResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(err) = &self.run_error {
            return write!(f, "ERROR: {err}");
        }

        let prefix = if self.passed() { "OK: " } else { "OOPS: " };
        write!(f, "{prefix}{} passed", self.succeeded)?;

        let tail = [
            (self.skipped, "skipped"),
            (self.expected_failures, "expected failures"),
            (self.failed, "FAILED"),
            (self.panicked, "PANICKED"),
            (self.fixture_panicked, "FIXTURE-PANICKED"),
            (self.missed, "MISSED"),
        ];
        for (count, label) in tail {
            if count != 0 {
                write!(f, ", {count} {label}")?;
            }
        }

        if let Some(work) = self.work_dir() {
            write!(f, "\nWORK={work}")?;
        }
        Ok(())
    }
}

fn serialize_run_error<S>(error: &Option<RunError>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match error {
        Some(err) => serializer.serialize_str(&err.to_string()),
        None => serializer.serialize_none(),
    }
}
