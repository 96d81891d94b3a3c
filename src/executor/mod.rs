//! Test execution engine
//!
//! Selection, the per-suite runner and the parallel dispatcher.

mod parallel;
mod runner;
mod selection;

pub use parallel::Dispatcher;
pub use runner::{list, run, RunEnv, SuiteRunner};
pub use selection::{select, SelectedTest, Selection};
