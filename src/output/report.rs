//! Per-test report lines
//!
//! Problems (failures, panics, fixture faults) always print a separated
//! block with the buffered log. Other outcomes print a one-line record
//! only in verbose or streaming runs. Benchmark results always print.

use std::time::Duration;

use crate::benchmark::BenchmarkStats;
use crate::models::{TestId, TestStatus};

const SEPARATOR: &str = "----------------------------------------------------------------------";

/// Everything needed to report one classified test or fixture
#[derive(Debug)]
pub struct TestReport<'a> {
    /// `Suite.Test` or `Suite.Fixture`
    pub name: &'a str,
    pub status: TestStatus,
    pub duration: Duration,
    pub log: &'a str,
    /// Skip reason or expected-failure reason
    pub note: Option<&'a str>,
    pub bench: Option<&'a BenchmarkStats>,
}

impl<'a> TestReport<'a> {
    pub fn new(name: &'a str, status: TestStatus) -> Self {
        Self {
            name,
            status,
            duration: Duration::ZERO,
            log: "",
            note: None,
            bench: None,
        }
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    pub fn with_log(mut self, log: &'a str) -> Self {
        self.log = log;
        self
    }

    pub fn with_note(mut self, note: Option<&'a str>) -> Self {
        self.note = note;
        self
    }

    pub fn with_bench(mut self, bench: Option<&'a BenchmarkStats>) -> Self {
        self.bench = bench;
        self
    }
}

/// Formats report lines for one run
#[derive(Clone, Copy, Debug, Default)]
pub struct ReportFormatter {
    reports_passes: bool,
}

impl ReportFormatter {
    pub fn new(reports_passes: bool) -> Self {
        Self { reports_passes }
    }

    /// Stream-mode announcement before a test starts
    pub fn start_line(&self, id: &TestId) -> String {
        format!("START: {id}\n")
    }

    /// Report text for `report`, or `None` when it stays silent
    pub fn format(&self, report: &TestReport<'_>) -> Option<String> {
        if report.status.is_problem() {
            return Some(self.problem_block(report));
        }

        match (report.status, report.bench) {
            (TestStatus::Succeeded, Some(stats)) => {
                return Some(format!("PASS: {}\t{}\n", report.name, stats.format_row()));
            }
            _ if !self.reports_passes => return None,
            _ => {}
        }

        let line = match report.status {
            TestStatus::Succeeded => {
                format!("PASS: {}\t{}\n", report.name, secs(report.duration))
            }
            TestStatus::ExpectedFailure => format!(
                "FAIL EXPECTED: {}{}\t{}\n",
                report.name,
                reason(report.note),
                secs(report.duration)
            ),
            TestStatus::Skipped => format!("SKIP: {}{}\n", report.name, reason(report.note)),
            TestStatus::Missed => format!("MISS: {}\n", report.name),
            _ => return None,
        };
        Some(line)
    }

    fn problem_block(&self, report: &TestReport<'_>) -> String {
        let mut block = format!("\n{SEPARATOR}\n{}: {}\n\n", report.status.label(), report.name);
        if !report.log.is_empty() {
            block.push_str(report.log);
            if !report.log.ends_with('\n') {
                block.push('\n');
            }
        }
        block
    }
}

fn secs(duration: Duration) -> String {
    format!("{:.3}s", duration.as_secs_f64())
}

fn reason(note: Option<&str>) -> String {
    match note {
        Some(note) if !note.is_empty() => format!(" ({note})"),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_problem_block_always_printed() {
        let formatter = ReportFormatter::new(false);
        let report = TestReport::new("Math.TestSub", TestStatus::Failed).with_log("... obtained = 1");
        let text = formatter.format(&report).unwrap();
        assert!(text.starts_with(&format!("\n{SEPARATOR}\nFAIL: Math.TestSub\n\n")));
        assert!(text.ends_with("... obtained = 1\n"));
    }

    #[test]
    fn test_passes_silent_unless_verbose() {
        let quiet = ReportFormatter::new(false);
        let report = TestReport::new("Math.TestAdd", TestStatus::Succeeded)
            .with_duration(Duration::from_millis(12));
        assert!(quiet.format(&report).is_none());

        let verbose = ReportFormatter::new(true);
        assert_eq!(
            verbose.format(&report).unwrap(),
            "PASS: Math.TestAdd\t0.012s\n"
        );
    }

    #[test]
    fn test_verbose_skip_and_miss_lines() {
        let verbose = ReportFormatter::new(true);
        let skip = TestReport::new("Net.TestDial", TestStatus::Skipped).with_note(Some("offline"));
        assert_eq!(verbose.format(&skip).unwrap(), "SKIP: Net.TestDial (offline)\n");

        let miss = TestReport::new("Net.TestRead", TestStatus::Missed);
        assert_eq!(verbose.format(&miss).unwrap(), "MISS: Net.TestRead\n");

        let expected = TestReport::new("Net.TestBug", TestStatus::ExpectedFailure)
            .with_note(Some("issue 12"));
        assert!(verbose
            .format(&expected)
            .unwrap()
            .starts_with("FAIL EXPECTED: Net.TestBug (issue 12)\t"));
    }

    #[test]
    fn test_benchmark_line_always_printed() {
        let stats = BenchmarkStats {
            iterations: 1000,
            elapsed: Duration::from_micros(500),
            ..Default::default()
        };
        let quiet = ReportFormatter::new(false);
        let report =
            TestReport::new("Math.BenchmarkAdd", TestStatus::Succeeded).with_bench(Some(&stats));
        let line = quiet.format(&report).unwrap();
        assert!(line.starts_with("PASS: Math.BenchmarkAdd\t"));
        assert!(line.contains("500 ns/op"));
    }

    #[test]
    fn test_start_line() {
        let formatter = ReportFormatter::default();
        assert_eq!(
            formatter.start_line(&TestId::new("A", "B")),
            "START: A.B\n"
        );
    }
}
