//! Integer arithmetic checks and a pair of benchmarks

use suitecheck::{Suite, TestContext, TestDescriptor};

#[derive(Debug, Default)]
pub struct ArithmeticSuite {
    samples: Vec<u64>,
}

impl ArithmeticSuite {
    fn test_add(&mut self, c: &mut TestContext) {
        let sum: u64 = self.samples.iter().sum();
        c.check_eq(sum, 5050);
    }

    fn test_checked_div(&mut self, c: &mut TestContext) {
        c.check_eq(10u64.checked_div(2), Some(5));
        c.check_eq(10u64.checked_div(0), None);
    }

    fn test_wrapping(&mut self, c: &mut TestContext) {
        c.check_eq(u8::MAX.wrapping_add(1), 0);
        c.check(u64::MAX.checked_add(1).is_none(), "u64::MAX + 1 should overflow");
    }

    fn test_samples_untouched(&mut self, c: &mut TestContext) {
        c.check_eq(self.samples.len(), 100);
        c.check(
            self.samples.windows(2).all(|w| w[0] < w[1]),
            "samples must stay sorted",
        );
    }

    fn benchmark_sum(&mut self, c: &mut TestContext) {
        c.set_bytes((self.samples.len() * std::mem::size_of::<u64>()) as u64);
        for _ in 0..c.n() {
            let sum: u64 = std::hint::black_box(&self.samples).iter().sum();
            std::hint::black_box(sum);
        }
    }

    fn benchmark_sort(&mut self, c: &mut TestContext) {
        for _ in 0..c.n() {
            c.stop_timer();
            let mut data: Vec<u64> = self.samples.iter().rev().copied().collect();
            c.start_timer();
            data.sort_unstable();
            std::hint::black_box(&data);
        }
    }
}

impl Suite for ArithmeticSuite {
    fn tests(&self) -> Vec<TestDescriptor<Self>> {
        vec![
            TestDescriptor::test("TestAdd", Self::test_add),
            TestDescriptor::test("TestCheckedDiv", Self::test_checked_div),
            TestDescriptor::test("TestWrapping", Self::test_wrapping),
            TestDescriptor::test("TestSamplesUntouched", Self::test_samples_untouched),
            TestDescriptor::benchmark("BenchmarkSum", Self::benchmark_sum),
            TestDescriptor::benchmark("BenchmarkSort", Self::benchmark_sort),
        ]
    }

    fn set_up_suite(&mut self, c: &mut TestContext) {
        self.samples = (1..=100).collect();
        c.log(format!("prepared {} samples", self.samples.len()));
    }

    fn tear_down_suite(&mut self, _c: &mut TestContext) {
        self.samples.clear();
    }
}
