//! Bundled suites run by the `suitecheck` binary

mod arithmetic;
mod workspace;

use suitecheck::Registry;

pub use arithmetic::ArithmeticSuite;
pub use workspace::WorkspaceSuite;

/// Registry with every bundled suite, in a fixed order
pub fn registry() -> Registry {
    let mut registry = Registry::new();
    registry.register(ArithmeticSuite::default());
    registry.register(WorkspaceSuite::default());
    registry
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use suitecheck::{harness, RunConf};

    #[test]
    fn test_bundled_suites_pass() {
        let result = harness::check(registry(), &RunConf::new().with_workers(2)).unwrap();
        assert_eq!(result.expected_failures, 1);
        assert_eq!(result.succeeded + result.skipped, 8);
    }

    #[test]
    fn test_bundled_benchmarks_pass() {
        let conf = RunConf::new()
            .with_benchmark(true)
            .with_benchmark_time(Duration::from_millis(5))
            .with_benchmark_mem(true);
        let result = harness::check(registry(), &conf).unwrap();
        assert_eq!(result.succeeded, 2);
    }
}
