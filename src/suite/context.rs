//! Per-test context handed to fixtures and test bodies
//!
//! The context is the outcome channel between a running test and the
//! suite runner: bodies report failures, skips and expected failures
//! through it, and the runner reads the classification back once the
//! body returns. Panics are trapped by the runner and recorded through
//! [`OutcomeReporter::report_panic`].

use std::fmt::{self, Debug, Display};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use crate::benchmark::BenchState;
use crate::models::TestStatus;
use crate::output::OutputWriter;
use crate::utils::workdir::{TempDirProvisioner, WorkDir};

/// Outcome channel used by assertion helpers
pub trait OutcomeReporter {
    /// Mark the test as failed, logging `message`
    fn report_failure(&mut self, message: &str);

    /// Mark the test as deliberately not run
    fn report_skip(&mut self, reason: &str);

    /// Declare that the test is expected to fail
    fn report_expected_failure(&mut self, reason: &str);

    /// Record a trapped panic
    fn report_panic(&mut self, message: &str);
}

/// Where log lines go
pub(crate) enum LogSink {
    Buffered(String),
    Streamed(OutputWriter),
}

impl LogSink {
    pub(crate) fn buffered() -> Self {
        LogSink::Buffered(String::new())
    }

    fn write_line(&mut self, line: &str) {
        match self {
            LogSink::Buffered(buf) => {
                buf.push_str(line);
                buf.push('\n');
            }
            LogSink::Streamed(out) => out.write_block(&format!("{line}\n")),
        }
    }

    /// Buffered text; empty once streamed
    pub(crate) fn text(&self) -> &str {
        match self {
            LogSink::Buffered(buf) => buf,
            LogSink::Streamed(_) => "",
        }
    }
}

/// State carried across the phases of one scope
pub(crate) struct Scope {
    pub(crate) work_dir: WorkDir,
    pub(crate) log: LogSink,
}

/// How a fixture phase ended
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum FixtureVerdict {
    Ok,
    Skip(String),
    Broken,
}

/// Handle passed to every fixture and test body
pub struct TestContext {
    name: String,
    failed: bool,
    skip_reason: Option<String>,
    expected_failure: Option<String>,
    panic_message: Option<String>,
    scope: Scope,
    bench: Option<BenchState>,
}

impl TestContext {
    pub(crate) fn new(name: impl Into<String>, scope: Scope) -> Self {
        Self {
            name: name.into(),
            failed: false,
            skip_reason: None,
            expected_failure: None,
            panic_message: None,
            scope,
            bench: None,
        }
    }

    /// Context outside any run, for exercising suite methods directly
    pub fn detached(name: impl Into<String>) -> Self {
        let scope = Scope {
            work_dir: WorkDir::new(Arc::new(TempDirProvisioner::new()), false),
            log: LogSink::buffered(),
        };
        Self::new(name, scope)
    }

    pub(crate) fn with_bench(mut self, bench: BenchState) -> Self {
        self.bench = Some(bench);
        self
    }

    /// Full `Suite.Test` name of the running test
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Append a line to the test log
    pub fn log(&mut self, message: impl Display) {
        let text = message.to_string();
        for line in text.lines() {
            self.scope.log.write_line(line);
        }
        if text.is_empty() {
            self.scope.log.write_line("");
        }
    }

    /// Log `message` and mark the test as failed
    pub fn error(&mut self, message: impl Display) {
        self.report_failure(&message.to_string());
    }

    /// Mark the test as failed without a message
    pub fn fail(&mut self) {
        self.failed = true;
    }

    pub fn failed(&self) -> bool {
        self.failed
    }

    /// Skip the rest of the test; the body should return right after
    pub fn skip(&mut self, reason: impl Display) {
        self.report_skip(&reason.to_string());
    }

    pub fn skipped(&self) -> bool {
        self.skip_reason.is_some()
    }

    /// Declare the failure of this test as expected
    pub fn expect_failure(&mut self, reason: impl Display) {
        self.report_expected_failure(&reason.to_string());
    }

    /// Fail with `message` unless `condition` holds
    pub fn check(&mut self, condition: bool, message: impl Display) -> bool {
        if !condition {
            self.error(message);
        }
        condition
    }

    /// Fail unless `obtained == expected`
    pub fn check_eq<T: PartialEq + Debug>(&mut self, obtained: T, expected: T) -> bool {
        let equal = obtained == expected;
        if !equal {
            self.error(format!(
                "... obtained = {obtained:?}\n... expected = {expected:?}"
            ));
        }
        equal
    }

    /// Buffered log output so far
    pub fn output(&self) -> &str {
        self.scope.log.text()
    }

    /// Create a fresh directory removed when the scope ends
    pub fn mk_dir(&mut self) -> io::Result<PathBuf> {
        self.scope.work_dir.mk_dir()
    }

    /// Iterations a benchmark body must run; 1 outside benchmarks
    pub fn n(&self) -> u64 {
        self.bench.as_ref().map(|b| b.n()).unwrap_or(1)
    }

    /// Zero the elapsed time and memory counters
    pub fn reset_timer(&mut self) {
        if let Some(bench) = &mut self.bench {
            bench.reset();
        }
    }

    pub fn start_timer(&mut self) {
        if let Some(bench) = &mut self.bench {
            bench.start();
        }
    }

    /// Pause timing, e.g. around expensive per-iteration setup
    pub fn stop_timer(&mut self) {
        if let Some(bench) = &mut self.bench {
            bench.stop();
        }
    }

    /// Bytes processed per iteration, reported as MB/s
    pub fn set_bytes(&mut self, bytes: u64) {
        if let Some(bench) = &mut self.bench {
            bench.set_bytes(bytes);
        }
    }

    pub(crate) fn bench_mut(&mut self) -> Option<&mut BenchState> {
        self.bench.as_mut()
    }

    /// Stop calibrating once the body failed or skipped
    pub(crate) fn interrupted(&self) -> bool {
        self.failed || self.skip_reason.is_some() || self.panic_message.is_some()
    }

    pub(crate) fn skip_reason(&self) -> Option<&str> {
        self.skip_reason.as_deref()
    }

    pub(crate) fn expected_reason(&self) -> Option<&str> {
        self.expected_failure.as_deref()
    }

    /// Classify a test body after it returned or panicked
    pub(crate) fn classify(&mut self) -> TestStatus {
        if self.skip_reason.is_some() {
            return TestStatus::Skipped;
        }
        let faulted = self.failed || self.panic_message.is_some();
        match (faulted, self.expected_failure.is_some()) {
            (true, true) => TestStatus::ExpectedFailure,
            (true, false) if self.panic_message.is_some() => TestStatus::Panicked,
            (true, false) => TestStatus::Failed,
            (false, true) => {
                self.scope
                    .log
                    .write_line("Error: Test succeeded, but was expected to fail");
                TestStatus::Failed
            }
            (false, false) => TestStatus::Succeeded,
        }
    }

    /// Classify a fixture phase
    pub(crate) fn fixture_verdict(&self) -> FixtureVerdict {
        if self.failed || self.panic_message.is_some() {
            return FixtureVerdict::Broken;
        }
        match &self.skip_reason {
            Some(reason) => FixtureVerdict::Skip(reason.clone()),
            None => FixtureVerdict::Ok,
        }
    }

    pub(crate) fn into_scope(self) -> Scope {
        self.scope
    }
}

impl OutcomeReporter for TestContext {
    fn report_failure(&mut self, message: &str) {
        self.log(message);
        self.failed = true;
    }

    fn report_skip(&mut self, reason: &str) {
        self.skip_reason = Some(reason.to_string());
    }

    fn report_expected_failure(&mut self, reason: &str) {
        self.expected_failure = Some(reason.to_string());
    }

    fn report_panic(&mut self, message: &str) {
        self.log(format!("... Panic: {message}"));
        self.panic_message = Some(message.to_string());
    }
}

impl fmt::Debug for TestContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestContext")
            .field("name", &self.name)
            .field("failed", &self.failed)
            .field("skip_reason", &self.skip_reason)
            .field("expected_failure", &self.expected_failure)
            .field("panic_message", &self.panic_message)
            .finish()
    }
}
