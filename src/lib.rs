//! suitecheck - suite-based test execution engine
//!
//! Suites are plain structs implementing [`Suite`]. Each one lists its
//! test methods and optional fixtures; a [`Registry`] collects them and a
//! [`Dispatcher`] runs them on a pool of workers:
//!
//! ```text
//! Registry -> Dispatcher -> SuiteRunner (one per suite) -> RunResult
//! ```
//!
//! Inside a suite every test runs as
//! `SetUpTest -> body -> TearDownTest`, wrapped by one
//! `SetUpSuite`/`TearDownSuite` pair. Failures, skips, expected failures
//! and panics are classified per test and summed into a [`RunResult`].
//!
//! ## Features
//!
//! - Regular-expression selection over `Suite.Test` names
//! - Buffered or streamed per-test logs
//! - Benchmarks with automatic iteration calibration
//! - Per-test work directories, removed unless asked to keep them
//! - Suite-level parallelism on a fixed worker pool

pub mod benchmark;
pub mod config;
pub mod executor;
pub mod harness;
pub mod models;
pub mod output;
pub mod suite;
pub mod utils;

pub use config::RunConf;
pub use executor::{list, run, Dispatcher};
pub use models::{RunError, RunResult, TestId, TestStatus};
pub use suite::{OutcomeReporter, Registry, Suite, SuiteHandle, TestContext, TestDescriptor};
