//! Suite runner
//!
//! Executes the selected tests of one suite:
//!
//! ```text
//! SetUpSuite -> { SetUpTest -> body -> TearDownTest }* -> TearDownSuite
//! ```
//!
//! Every phase runs behind `catch_unwind`, so faults become counters and
//! never escape the runner. A broken `SetUpSuite` turns every selected test
//! into a miss; a broken `SetUpTest` misses only its own test. Teardowns
//! always run.

use std::any::Any;
use std::mem;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{debug, warn};

use super::selection::{select, SelectedTest, Selection};
use crate::benchmark::{calibrate, BenchState, BenchmarkStats};
use crate::config::RunConf;
use crate::models::{RunError, RunResult, TestId, TestKind, TestStatus};
use crate::output::{OutputWriter, ReportFormatter, TestReport};
use crate::suite::{
    DynSuite, Fixture, FixtureVerdict, LogSink, OutcomeReporter, Scope, Target, TestContext,
};
use crate::utils::timer::Timer;
use crate::utils::workdir::{TempDirProvisioner, WorkDir, WorkDirProvisioner};

/// Everything a run shares across suites and workers
#[derive(Debug)]
pub struct RunEnv {
    pub conf: RunConf,
    pub selection: Selection,
    pub output: OutputWriter,
    pub provisioner: Arc<dyn WorkDirProvisioner>,
}

impl RunEnv {
    /// Compile the selection pattern of `conf`
    pub fn new(
        conf: &RunConf,
        output: OutputWriter,
        provisioner: Arc<dyn WorkDirProvisioner>,
    ) -> Result<Self, RunError> {
        Ok(Self {
            conf: conf.clone(),
            selection: Selection::compile(conf.filter())?,
            output,
            provisioner,
        })
    }
}

/// Runs one suite and produces its result
pub struct SuiteRunner<'a> {
    suite: &'a mut dyn DynSuite,
    env: &'a RunEnv,
    formatter: ReportFormatter,
    suite_name: String,
    result: RunResult,
}

impl<'a> SuiteRunner<'a> {
    pub fn new(suite: &'a mut dyn DynSuite, env: &'a RunEnv) -> Self {
        let suite_name = suite.suite_name();
        Self {
            suite,
            env,
            formatter: ReportFormatter::new(env.conf.reports_passes()),
            suite_name,
            result: RunResult::new(),
        }
    }

    pub fn run(mut self) -> RunResult {
        let tests = select(&*self.suite, &self.env.selection, self.env.conf.benchmark());
        if tests.is_empty() {
            debug!("Suite {} has no selected tests", self.suite_name);
            return self.result;
        }
        debug!("Running suite {} ({} tests)", self.suite_name, tests.len());

        let suite_label = format!("{}.{}", self.suite_name, Fixture::SetUpSuite.name());
        let scope = self.new_scope();
        let (verdict, mut scope) = self.run_fixture(Fixture::SetUpSuite, &suite_label, scope);

        match verdict {
            FixtureVerdict::Ok => {
                for test in &tests {
                    self.run_test(test);
                }
            }
            FixtureVerdict::Skip(reason) => {
                for test in &tests {
                    self.conclude_unrun(&test.id, TestStatus::Skipped, Some(reason.as_str()));
                }
            }
            FixtureVerdict::Broken => {
                for test in &tests {
                    self.conclude_unrun(&test.id, TestStatus::Missed, None);
                }
            }
        }

        scope.log = self.new_log();
        let suite_label = format!("{}.{}", self.suite_name, Fixture::TearDownSuite.name());
        let (_, scope) = self.run_fixture(Fixture::TearDownSuite, &suite_label, scope);
        self.finish_scope(scope);

        debug!("Suite {} finished: {}", self.suite_name, self.result);
        self.result
    }

    fn run_test(&mut self, test: &SelectedTest) {
        let name = test.id.to_string();
        if self.env.conf.stream() {
            self.env.output.write_block(&self.formatter.start_line(&test.id));
        }
        debug!("Running {}", name);

        let timer = Timer::start(&name);
        let scope = self.new_scope();
        let (setup, scope) = self.run_fixture(Fixture::SetUpTest, &name, scope);

        let mut note = None;
        let mut bench = None;
        let (status, mut scope) = match setup {
            FixtureVerdict::Ok => {
                let mut c = TestContext::new(&name, scope);
                if test.kind == TestKind::Benchmark {
                    c = c.with_bench(BenchState::new(self.env.conf.benchmark_mem()));
                    bench = self.invoke_benchmark(test.index, &mut c);
                } else {
                    self.invoke(Target::Test(test.index), &mut c);
                }
                let status = c.classify();
                note = c
                    .skip_reason()
                    .or_else(|| c.expected_reason())
                    .map(str::to_string);
                (status, c.into_scope())
            }
            FixtureVerdict::Skip(reason) => {
                note = Some(reason);
                (TestStatus::Skipped, scope)
            }
            FixtureVerdict::Broken => (TestStatus::Missed, scope),
        };

        // Teardown output is reported on its own
        let test_log = mem::replace(&mut scope.log, self.new_log());
        let (_, scope) = self.run_fixture(Fixture::TearDownTest, &name, scope);
        self.result.record(status);

        let bench = bench.filter(|_| status == TestStatus::Succeeded);
        let report = TestReport::new(&name, status)
            .with_duration(timer.stop())
            .with_log(test_log.text())
            .with_note(note.as_deref())
            .with_bench(bench.as_ref());
        self.emit(&report);

        self.finish_scope(scope);
    }

    /// Run a fixture hook; a broken fixture is counted and reported here
    fn run_fixture(
        &mut self,
        fixture: Fixture,
        context_name: &str,
        scope: Scope,
    ) -> (FixtureVerdict, Scope) {
        let mut c = TestContext::new(context_name, scope);
        let timer = Timer::start(fixture.name());
        self.invoke(Target::Fixture(fixture), &mut c);
        let verdict = c.fixture_verdict();

        if verdict == FixtureVerdict::Broken {
            let label = format!("{}.{}", self.suite_name, fixture.name());
            warn!("Fixture {} failed", label);
            self.result.record(TestStatus::FixturePanicked);
            let report = TestReport::new(&label, TestStatus::FixturePanicked)
                .with_duration(timer.stop())
                .with_log(c.output());
            self.emit(&report);
        }

        (verdict, c.into_scope())
    }

    fn invoke(&mut self, target: Target, c: &mut TestContext) {
        let suite = &mut *self.suite;
        let caught = panic::catch_unwind(AssertUnwindSafe(|| suite.call(target, c)));
        if let Err(payload) = caught {
            c.report_panic(&panic_message(payload.as_ref()));
        }
    }

    fn invoke_benchmark(&mut self, index: usize, c: &mut TestContext) -> Option<BenchmarkStats> {
        let target = self.env.conf.benchmark_time();
        let suite = &mut *self.suite;
        let caught = panic::catch_unwind(AssertUnwindSafe(|| {
            calibrate(c, target, |c| suite.call(Target::Test(index), c))
        }));
        match caught {
            Ok(stats) => stats,
            Err(payload) => {
                c.report_panic(&panic_message(payload.as_ref()));
                None
            }
        }
    }

    fn conclude_unrun(&mut self, id: &TestId, status: TestStatus, note: Option<&str>) {
        self.result.record(status);
        let name = id.to_string();
        self.emit(&TestReport::new(&name, status).with_note(note));
    }

    fn emit(&self, report: &TestReport<'_>) {
        if let Some(text) = self.formatter.format(report) {
            self.env.output.write_block(&text);
        }
    }

    fn new_log(&self) -> LogSink {
        if self.env.conf.stream() {
            LogSink::Streamed(self.env.output.clone())
        } else {
            LogSink::buffered()
        }
    }

    fn new_scope(&self) -> Scope {
        Scope {
            work_dir: WorkDir::new(self.env.provisioner.clone(), self.env.conf.keep_work_dir()),
            log: self.new_log(),
        }
    }

    fn finish_scope(&mut self, scope: Scope) {
        if let Some(path) = scope.work_dir.finish() {
            debug!("Keeping work directory {}", path.display());
            self.result.keep_work_dir(path);
        }
    }
}

/// Run one suite with stdout reporting and system temp work directories
pub fn run(suite: &mut dyn DynSuite, conf: &RunConf) -> RunResult {
    let env = match RunEnv::new(conf, OutputWriter::stdout(), Arc::new(TempDirProvisioner::new())) {
        Ok(env) => env,
        Err(e) => return RunResult::from_error(e),
    };
    SuiteRunner::new(suite, &env).run()
}

/// Identifiers of the tests `conf` would run in `suite`
pub fn list(suite: &dyn DynSuite, conf: &RunConf) -> Result<Vec<TestId>, RunError> {
    let selection = Selection::compile(conf.filter())?;
    Ok(select(suite, &selection, conf.benchmark())
        .into_iter()
        .map(|t| t.id)
        .collect())
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
