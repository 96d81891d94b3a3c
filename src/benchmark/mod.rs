//! Benchmark timing
//!
//! Calibrates iteration counts until a benchmark body runs for the
//! configured duration, and measures time, throughput and allocations.

mod alloc;
mod metrics;
mod runner;

pub use alloc::{AllocSnapshot, CountingAllocator};
pub use metrics::{BenchmarkStats, MemoryStats};
pub use runner::{calibrate, next_iterations, round_up, BenchState, MAX_ITERATIONS};
