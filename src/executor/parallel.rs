//! Suite dispatcher
//!
//! Fans the registered suites out over a fixed pool of blocking workers.
//! Each worker pops whole suites off a shared queue and runs them test by
//! test; results flow back over a channel and are merged as they arrive.

use futures::future::join_all;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use super::runner::{list, RunEnv, SuiteRunner};
use crate::config::RunConf;
use crate::models::{RunError, RunResult, TestId};
use crate::output::OutputWriter;
use crate::suite::{Registry, SharedSuite};
use crate::utils::workdir::{TempDirProvisioner, WorkDirProvisioner};

/// Runs every suite of a registry on a worker pool
#[derive(Debug)]
pub struct Dispatcher {
    registry: Registry,
    output: OutputWriter,
    provisioner: Arc<dyn WorkDirProvisioner>,
}

impl Dispatcher {
    pub fn new(registry: Registry) -> Self {
        Self {
            registry,
            output: OutputWriter::stdout(),
            provisioner: Arc::new(TempDirProvisioner::new()),
        }
    }

    /// Send report lines to `output` instead of stdout
    pub fn with_output(mut self, output: OutputWriter) -> Self {
        self.output = output;
        self
    }

    /// Provision work directories through `provisioner`
    pub fn with_provisioner(mut self, provisioner: Arc<dyn WorkDirProvisioner>) -> Self {
        self.provisioner = provisioner;
        self
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Run all selected tests and merge the per-suite results
    pub async fn run_all(&self, conf: &RunConf) -> RunResult {
        let env = match RunEnv::new(conf, self.output.clone(), self.provisioner.clone()) {
            Ok(env) => Arc::new(env),
            Err(e) => {
                error!("{}", e);
                return RunResult::from_error(e);
            }
        };

        let expected = self.registry.len();
        let queue: Arc<Mutex<VecDeque<SharedSuite>>> =
            Arc::new(Mutex::new(self.registry.suites().iter().cloned().collect()));
        let workers = conf.workers().min(expected.max(1));

        info!("Running {} suites on {} workers", expected, workers);
        let start = Instant::now();

        let (tx, mut rx) = mpsc::unbounded_channel::<RunResult>();
        let mut handles = Vec::with_capacity(workers);

        for worker in 0..workers {
            let queue = queue.clone();
            let env = env.clone();
            let tx = tx.clone();

            let handle = tokio::task::spawn_blocking(move || {
                let mut ran = 0usize;
                loop {
                    let next = queue.lock().pop_front();
                    let Some(suite) = next else { break };

                    let result = {
                        let mut suite = suite.lock();
                        SuiteRunner::new(&mut *suite, &env).run()
                    };
                    ran += 1;
                    if tx.send(result).is_err() {
                        break;
                    }
                }
                debug!("Worker {} finished after {} suites", worker, ran);
            });

            handles.push(handle);
        }
        drop(tx);

        let mut total = RunResult::new();
        let mut received = 0usize;
        while let Some(result) = rx.recv().await {
            total.add(&result);
            received += 1;
        }

        for joined in join_all(handles).await {
            if let Err(e) = joined {
                error!("Suite worker died: {}", e);
            }
        }

        if received != expected {
            total.add(&RunResult::from_error(RunError::Incomplete {
                expected,
                received,
            }));
        }

        info!(
            "Run completed in {}ms: {}",
            start.elapsed().as_millis(),
            total.to_string().lines().next().unwrap_or_default()
        );
        total
    }

    /// Identifiers of every selected test, suite by suite in registration order
    pub fn list_all(&self, conf: &RunConf) -> Result<Vec<TestId>, RunError> {
        let mut ids = Vec::new();
        for suite in self.registry.suites() {
            ids.extend(list(&*suite.lock(), conf)?);
        }
        Ok(ids)
    }
}

#[cfg(test)]
mod unit_tests {
    use super::*;
    use crate::output::CapturedOutput;
    use crate::suite::{OutcomeReporter, Suite, SuiteHandle, TestContext, TestDescriptor};

    struct Counting {
        name: &'static str,
        runs: u32,
        fail_second: bool,
    }

    impl Counting {
        fn new(name: &'static str, fail_second: bool) -> Self {
            Self {
                name,
                runs: 0,
                fail_second,
            }
        }

        fn first(&mut self, _c: &mut TestContext) {
            self.runs += 1;
        }

        fn second(&mut self, c: &mut TestContext) {
            self.runs += 1;
            if self.fail_second {
                c.report_failure("second failed");
            }
        }

        fn third(&mut self, c: &mut TestContext) {
            self.runs += 1;
            c.skip("later");
        }
    }

    impl Suite for Counting {
        fn name(&self) -> String {
            self.name.to_string()
        }

        fn tests(&self) -> Vec<TestDescriptor<Self>> {
            vec![
                TestDescriptor::test("TestFirst", Self::first),
                TestDescriptor::test("TestSecond", Self::second),
                TestDescriptor::test("TestThird", Self::third),
            ]
        }
    }

    fn registry() -> (Registry, Vec<SuiteHandle<Counting>>) {
        let mut registry = Registry::new();
        let handles = (0..6)
            .map(|i| {
                let name = ["A", "B", "C", "D", "E", "F"][i];
                registry.register(Counting::new(name, i % 2 == 0))
            })
            .collect();
        (registry, handles)
    }

    fn dispatcher(registry: Registry) -> (Dispatcher, CapturedOutput, tempfile::TempDir) {
        let root = tempfile::tempdir().unwrap();
        let (output, captured) = OutputWriter::capture();
        let dispatcher = Dispatcher::new(registry)
            .with_output(output)
            .with_provisioner(Arc::new(TempDirProvisioner::in_dir(root.path())));
        (dispatcher, captured, root)
    }

    #[tokio::test]
    async fn test_worker_count_does_not_change_totals() {
        let (registry, _) = registry();
        let (dispatcher, _captured, _root) = dispatcher(registry);

        let sequential = dispatcher.run_all(&RunConf::new()).await;
        let parallel = dispatcher.run_all(&RunConf::new().with_workers(4)).await;

        assert!(sequential.same_counts(&parallel));
        assert_eq!(sequential.succeeded, 9);
        assert_eq!(sequential.failed, 3);
        assert_eq!(sequential.skipped, 6);
        assert!(sequential.run_error.is_none());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_every_test_runs_exactly_once() {
        let (registry, handles) = registry();
        let (dispatcher, _captured, _root) = dispatcher(registry);

        let result = dispatcher.run_all(&RunConf::new().with_workers(3)).await;
        assert_eq!(result.total(), 18);
        for handle in &handles {
            assert_eq!(handle.lock().runs, 3);
        }
    }

    #[tokio::test]
    async fn test_filter_applies_across_suites() {
        let (registry, handles) = registry();
        let (dispatcher, _captured, _root) = dispatcher(registry);

        let result = dispatcher
            .run_all(&RunConf::new().with_filter("^[AB]\\.TestFirst$").with_workers(2))
            .await;
        assert_eq!(result.succeeded, 2);
        assert_eq!(result.total(), 2);
        assert_eq!(handles[0].lock().runs, 1);
        assert_eq!(handles[2].lock().runs, 0);
    }

    #[tokio::test]
    async fn test_invalid_filter_runs_nothing() {
        let (registry, handles) = registry();
        let (dispatcher, captured, _root) = dispatcher(registry);

        let result = dispatcher.run_all(&RunConf::new().with_filter("[")).await;
        assert!(matches!(result.run_error, Some(RunError::InvalidFilter(_))));
        assert!(!result.passed());
        assert!(result.to_string().starts_with("ERROR: Bad filter expression"));
        assert!(handles.iter().all(|h| h.lock().runs == 0));
        assert!(captured.contents().is_empty());
    }

    #[tokio::test]
    async fn test_empty_registry_passes() {
        let (dispatcher, _captured, _root) = dispatcher(Registry::new());
        let result = dispatcher.run_all(&RunConf::new().with_workers(4)).await;
        assert_eq!(result.total(), 0);
        assert!(result.passed());
    }

    #[test]
    fn test_run_all_outside_async_context() {
        let (registry, _) = registry();
        let (dispatcher, captured, _root) = dispatcher(registry);

        let result = tokio_test::block_on(dispatcher.run_all(&RunConf::new().with_workers(2)));
        assert_eq!(result.failed, 3);
        assert_eq!(captured.contents().matches("FAIL: ").count(), 3);
    }

    #[test]
    fn test_list_all_in_registration_order() {
        let (registry, handles) = registry();
        let (dispatcher, _captured, _root) = dispatcher(registry);

        let ids = dispatcher
            .list_all(&RunConf::new().with_filter("TestSecond"))
            .unwrap();
        let names: Vec<String> = ids.iter().map(ToString::to_string).collect();
        assert_eq!(
            names,
            vec![
                "A.TestSecond",
                "B.TestSecond",
                "C.TestSecond",
                "D.TestSecond",
                "E.TestSecond",
                "F.TestSecond"
            ]
        );
        assert!(handles.iter().all(|h| h.lock().runs == 0));
        assert!(dispatcher.list_all(&RunConf::new().with_filter("(")).is_err());
    }
}
