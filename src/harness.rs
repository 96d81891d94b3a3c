//! Bridge to the host test harness
//!
//! Lets a plain `#[test]` drive a whole registry:
//!
//! ```no_run
//! use suitecheck::{harness, Registry};
//!
//! # struct MathSuite;
//! # impl suitecheck::Suite for MathSuite {
//! #     fn tests(&self) -> Vec<suitecheck::TestDescriptor<Self>> { Vec::new() }
//! # }
//! let mut registry = Registry::new();
//! registry.register(MathSuite);
//! harness::check_from_env(registry).unwrap();
//! ```
//!
//! These functions start their own tokio runtime and must be called from
//! synchronous code.

use std::io;
use std::path::Path;
use thiserror::Error;
use tracing::info;

use crate::config::{ConfigFile, EnvConfig, RunConf};
use crate::executor::Dispatcher;
use crate::models::{RunError, RunResult, TestId};
use crate::suite::Registry;

#[derive(Debug, Error)]
pub enum HarnessError {
    /// The run finished but did not pass; carries the summary line
    #[error("{0}")]
    Failed(String),

    #[error(transparent)]
    Run(#[from] RunError),

    #[error("Failed to start runtime: {0}")]
    Runtime(#[from] io::Error),

    #[error("Invalid configuration: {0:#}")]
    Config(#[from] anyhow::Error),
}

/// Run every selected test of `registry` and print the summary
pub fn check(registry: Registry, conf: &RunConf) -> Result<RunResult, HarnessError> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    let dispatcher = Dispatcher::new(registry);
    let result = runtime.block_on(dispatcher.run_all(conf));

    let summary = result.to_string();
    println!("{summary}");
    if result.passed() {
        Ok(result)
    } else {
        Err(HarnessError::Failed(summary))
    }
}

/// Print the selected test identifiers, one per line
pub fn list(registry: Registry, conf: &RunConf) -> Result<Vec<TestId>, HarnessError> {
    let ids = Dispatcher::new(registry).list_all(conf)?;
    for id in &ids {
        println!("{id}");
    }
    Ok(ids)
}

/// Configure from `SUITECHECK_*` variables, then run or list
pub fn check_from_env(registry: Registry) -> Result<RunResult, HarnessError> {
    let env = EnvConfig::load();
    let conf = conf_from_env(&env)?;

    if env.list_or(false) {
        let ids = list(registry, &conf)?;
        info!("Listed {} tests", ids.len());
        return Ok(RunResult::new());
    }
    check(registry, &conf)
}

/// File named by `SUITECHECK_CONFIG` first, environment values on top
pub fn conf_from_env(env: &EnvConfig) -> anyhow::Result<RunConf> {
    let file = match &env.config_file {
        Some(path) => ConfigFile::load(Path::new(path))?,
        None => ConfigFile::default(),
    };
    file.merge_env(env).to_run_conf()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::suite::{Suite, TestContext, TestDescriptor};
    use std::time::Duration;

    struct Arith {
        broken: bool,
    }

    impl Arith {
        fn test_add(&mut self, c: &mut TestContext) {
            c.check_eq(1 + 1, 2);
        }

        fn test_mul(&mut self, c: &mut TestContext) {
            let product = if self.broken { 5 } else { 6 };
            c.check_eq(product, 2 * 3);
        }
    }

    impl Suite for Arith {
        fn tests(&self) -> Vec<TestDescriptor<Self>> {
            vec![
                TestDescriptor::test("TestAdd", Self::test_add),
                TestDescriptor::test("TestMul", Self::test_mul),
            ]
        }
    }

    fn registry(broken: bool) -> Registry {
        let mut registry = Registry::new();
        registry.register(Arith { broken });
        registry
    }

    #[test]
    fn test_check_passes() {
        let result = check(registry(false), &RunConf::new()).unwrap();
        assert_eq!(result.succeeded, 2);
    }

    #[test]
    fn test_check_failure_carries_summary() {
        match check(registry(true), &RunConf::new().with_workers(2)) {
            Err(HarnessError::Failed(summary)) => {
                assert!(summary.starts_with("OOPS: 1 passed, 1 FAILED"));
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn test_list_reports_bad_filter() {
        let ids = list(registry(false), &RunConf::new().with_filter("Mul")).unwrap();
        assert_eq!(ids, vec![TestId::new("Arith", "TestMul")]);

        let err = list(registry(false), &RunConf::new().with_filter("(")).unwrap_err();
        assert!(matches!(err, HarnessError::Run(RunError::InvalidFilter(_))));
    }

    #[test]
    fn test_conf_from_env_values() {
        let env = EnvConfig {
            filter: Some("Arith".into()),
            benchmark_time: Some("250ms".into()),
            workers: Some(0),
            ..Default::default()
        };
        let conf = conf_from_env(&env).unwrap();
        assert_eq!(conf.filter(), "Arith");
        assert_eq!(conf.benchmark_time(), Duration::from_millis(250));
        assert_eq!(conf.workers(), 1);
    }

    #[test]
    fn test_conf_from_env_layers_over_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("suitecheck.yaml");
        std::fs::write(&path, "filter: FromFile\nverbose: true\nworkers: 4\n").unwrap();

        let env = EnvConfig {
            filter: Some("FromEnv".into()),
            config_file: Some(path.to_string_lossy().into_owned()),
            ..Default::default()
        };
        let conf = conf_from_env(&env).unwrap();
        assert_eq!(conf.filter(), "FromEnv");
        assert!(conf.verbose());
        assert_eq!(conf.workers(), 4);
    }

    #[test]
    fn test_conf_from_env_missing_file() {
        let env = EnvConfig {
            config_file: Some("/nonexistent/suitecheck.yaml".into()),
            ..Default::default()
        };
        assert!(conf_from_env(&env).is_err());
    }
}
