//! Output module
//!
//! Report sinks, per-test report lines and final result formats.

mod formatter;
mod report;
mod writer;

pub use formatter::{OutputFormat, ResultFormatter};
pub use report::{ReportFormatter, TestReport};
pub use writer::{CapturedOutput, OutputWriter};
