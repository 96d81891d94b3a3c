//! Benchmark measurements and their report row

use serde::Serialize;
use std::time::Duration;

/// Measurements from the final calibrated round of one benchmark
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct BenchmarkStats {
    /// Iterations in the final round
    pub iterations: u64,
    /// Timed duration of the final round
    pub elapsed: Duration,
    /// Bytes processed per iteration
    pub bytes: u64,
    /// Allocation figures, present when memory reporting is on
    pub memory: Option<MemoryStats>,
}

/// Allocation totals for a whole round
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct MemoryStats {
    pub allocations: u64,
    pub bytes: u64,
}

impl BenchmarkStats {
    pub fn ns_per_op(&self) -> u64 {
        if self.iterations == 0 {
            return 0;
        }
        (self.elapsed.as_nanos() / self.iterations as u128) as u64
    }

    /// Throughput, when bytes per iteration were set
    pub fn mb_per_sec(&self) -> Option<f64> {
        let secs = self.elapsed.as_secs_f64();
        if self.bytes == 0 || self.iterations == 0 || secs <= 0.0 {
            return None;
        }
        Some((self.bytes as f64 * self.iterations as f64) / 1e6 / secs)
    }

    pub fn alloc_bytes_per_op(&self) -> Option<u64> {
        self.memory
            .map(|m| m.bytes / self.iterations.max(1))
    }

    pub fn allocs_per_op(&self) -> Option<u64> {
        self.memory
            .map(|m| m.allocations / self.iterations.max(1))
    }

    /// Tab-separated row: iterations, ns/op, then MB/s and memory if known
    pub fn format_row(&self) -> String {
        let mut row = format!("{:>8}\t{:>10} ns/op", self.iterations, self.ns_per_op());
        if let Some(mbs) = self.mb_per_sec() {
            row.push_str(&format!("\t{mbs:>7.2} MB/s"));
        }
        if let (Some(bytes), Some(allocs)) = (self.alloc_bytes_per_op(), self.allocs_per_op()) {
            row.push_str(&format!("\t{bytes:>8} B/op\t{allocs:>8} allocs/op"));
        }
        row
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ns_per_op() {
        let stats = BenchmarkStats {
            iterations: 4,
            elapsed: Duration::from_nanos(1000),
            ..Default::default()
        };
        assert_eq!(stats.ns_per_op(), 250);
        assert_eq!(stats.mb_per_sec(), None);
    }

    #[test]
    fn test_throughput() {
        let stats = BenchmarkStats {
            iterations: 1000,
            elapsed: Duration::from_secs(1),
            bytes: 1000,
            ..Default::default()
        };
        let mbs = stats.mb_per_sec().unwrap();
        assert!((mbs - 1.0).abs() < 1e-9);
        assert!(stats.format_row().contains("1.00 MB/s"));
    }

    #[test]
    fn test_memory_row() {
        let stats = BenchmarkStats {
            iterations: 10,
            elapsed: Duration::from_micros(10),
            memory: Some(MemoryStats {
                allocations: 20,
                bytes: 640,
            }),
            ..Default::default()
        };
        let row = stats.format_row();
        assert!(row.contains("64 B/op"));
        assert!(row.contains("2 allocs/op"));
    }

    #[test]
    fn test_zero_iterations() {
        let stats = BenchmarkStats::default();
        assert_eq!(stats.ns_per_op(), 0);
    }
}
