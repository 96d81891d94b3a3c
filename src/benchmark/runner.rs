//! Benchmark calibration loop
//!
//! Runs a benchmark body with N = 1 first, then predicts how many
//! iterations fill the target duration, grows N by half again on top of
//! the prediction (capped at 100x per round, always at least N + 1) and
//! rounds up to 1, 2, 3 or 5 times a power of ten. Only the final round
//! is reported.

use std::time::Duration;
use tracing::debug;

use super::alloc::AllocSnapshot;
use super::metrics::{BenchmarkStats, MemoryStats};
use crate::suite::TestContext;
use crate::utils::timer::PausableTimer;

/// Upper bound on iterations per round
pub const MAX_ITERATIONS: u64 = 1_000_000_000;

/// Timing state of a running benchmark round
#[derive(Debug, Default)]
pub struct BenchState {
    n: u64,
    timer: PausableTimer,
    bytes: u64,
    track_mem: bool,
    mem_mark: Option<AllocSnapshot>,
    memory: MemoryStats,
}

impl BenchState {
    pub fn new(track_mem: bool) -> Self {
        Self {
            n: 1,
            track_mem,
            ..Default::default()
        }
    }

    pub fn n(&self) -> u64 {
        self.n
    }

    /// Prepare a round of `n` iterations and start timing
    pub fn begin_round(&mut self, n: u64) {
        self.n = n;
        self.timer = PausableTimer::new();
        self.mem_mark = None;
        self.memory = MemoryStats::default();
        self.start();
    }

    pub fn start(&mut self) {
        if self.timer.is_running() {
            return;
        }
        self.timer.start();
        if self.track_mem {
            self.mem_mark = Some(AllocSnapshot::now());
        }
    }

    pub fn stop(&mut self) {
        if !self.timer.is_running() {
            return;
        }
        self.timer.stop();
        if let Some(mark) = self.mem_mark.take() {
            let delta = AllocSnapshot::now().since(&mark);
            self.memory.allocations += delta.allocations;
            self.memory.bytes += delta.bytes;
        }
    }

    pub fn reset(&mut self) {
        self.timer.reset();
        self.memory = MemoryStats::default();
        if self.track_mem && self.timer.is_running() {
            self.mem_mark = Some(AllocSnapshot::now());
        }
    }

    pub fn set_bytes(&mut self, bytes: u64) {
        self.bytes = bytes;
    }

    pub fn elapsed(&self) -> Duration {
        self.timer.elapsed()
    }

    pub fn stats(&self) -> BenchmarkStats {
        BenchmarkStats {
            iterations: self.n,
            elapsed: self.timer.elapsed(),
            bytes: self.bytes,
            memory: self.track_mem.then_some(self.memory),
        }
    }
}

/// Run `invoke` in rounds until one lasts at least `target`
///
/// Stops early when the body fails, skips or reaches [`MAX_ITERATIONS`].
/// Panics from `invoke` propagate to the caller.
pub fn calibrate<F>(c: &mut TestContext, target: Duration, mut invoke: F) -> Option<BenchmarkStats>
where
    F: FnMut(&mut TestContext),
{
    let mut n = 1;
    loop {
        c.bench_mut()?.begin_round(n);
        invoke(&mut *c);

        let bench = c.bench_mut()?;
        bench.stop();
        let elapsed = bench.elapsed();
        debug!("{}: {} iterations in {:?}", c.name(), n, elapsed);

        if c.interrupted() || elapsed >= target || n >= MAX_ITERATIONS {
            return c.bench_mut().map(|b| b.stats());
        }
        n = next_iterations(n, elapsed, target);
    }
}

/// Iteration count for the next round
pub fn next_iterations(n: u64, elapsed: Duration, target: Duration) -> u64 {
    let ns_per_op = elapsed.as_nanos() / u128::from(n.max(1));
    let predicted = if ns_per_op == 0 {
        MAX_ITERATIONS
    } else {
        (target.as_nanos() / ns_per_op).min(u128::from(MAX_ITERATIONS)) as u64
    };

    let grown = (predicted + predicted / 2)
        .min(n.saturating_mul(100))
        .max(n + 1);
    round_up(grown).min(MAX_ITERATIONS)
}

/// Round up to 1, 2, 3 or 5 times a power of ten
pub fn round_up(n: u64) -> u64 {
    let mut base = 1u64;
    while base <= n / 10 {
        base *= 10;
    }
    [1, 2, 3, 5, 10]
        .into_iter()
        .map(|m| m * base)
        .find(|&candidate| n <= candidate)
        .unwrap_or(10 * base)
}
