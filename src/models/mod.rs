//! Data models for suite execution
//!
//! Test identifiers, per-test classifications and the aggregated run result.

mod run_result;
mod test_result;

pub use run_result::{RunError, RunResult};
pub use test_result::{TestId, TestKind, TestStatus};
