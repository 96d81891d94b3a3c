//! Suite capability interface
//!
//! A suite is any type implementing [`Suite`]: it lists its tests in
//! declaration order and may override the four fixture hooks. The engine
//! drives suites through the object-safe [`DynSuite`], which every
//! [`Suite`] gets for free.

mod context;
mod registry;

pub use context::{OutcomeReporter, TestContext};
pub use registry::{Registry, SharedSuite, SuiteHandle};

pub(crate) use context::{FixtureVerdict, LogSink, Scope};

use crate::models::TestKind;

/// Signature of a test or benchmark body
pub type TestFn<S> = fn(&mut S, &mut TestContext);

/// One named, invocable test of suite `S`
pub struct TestDescriptor<S> {
    name: String,
    kind: TestKind,
    func: TestFn<S>,
}

impl<S> TestDescriptor<S> {
    pub fn test(name: impl Into<String>, func: TestFn<S>) -> Self {
        Self {
            name: name.into(),
            kind: TestKind::Test,
            func,
        }
    }

    /// A body that reads `c.n()` and runs that many iterations
    pub fn benchmark(name: impl Into<String>, func: TestFn<S>) -> Self {
        Self {
            name: name.into(),
            kind: TestKind::Benchmark,
            func,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> TestKind {
        self.kind
    }
}

/// A group of related tests sharing fixtures and state
///
/// ```ignore
/// struct Math;
///
/// impl Suite for Math {
///     fn tests(&self) -> Vec<TestDescriptor<Self>> {
///         vec![TestDescriptor::test("TestAdd", Math::test_add)]
///     }
/// }
/// ```
pub trait Suite: Send + Sized + 'static {
    /// Suite name used in identifiers; defaults to the type name
    fn name(&self) -> String {
        short_type_name::<Self>().to_string()
    }

    /// Tests and benchmarks in declaration order
    fn tests(&self) -> Vec<TestDescriptor<Self>>;

    fn set_up_suite(&mut self, _c: &mut TestContext) {}

    fn tear_down_suite(&mut self, _c: &mut TestContext) {}

    fn set_up_test(&mut self, _c: &mut TestContext) {}

    fn tear_down_test(&mut self, _c: &mut TestContext) {}
}

/// Fixture hooks, in the order the runner may call them
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Fixture {
    SetUpSuite,
    TearDownSuite,
    SetUpTest,
    TearDownTest,
}

impl Fixture {
    pub fn name(&self) -> &'static str {
        match self {
            Fixture::SetUpSuite => "SetUpSuite",
            Fixture::TearDownSuite => "TearDownSuite",
            Fixture::SetUpTest => "SetUpTest",
            Fixture::TearDownTest => "TearDownTest",
        }
    }
}

/// What a [`DynSuite::call`] invokes
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Target {
    Fixture(Fixture),
    /// Index into [`DynSuite::test_specs`]
    Test(usize),
}

/// Name and kind of a discovered test
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TestSpec {
    pub name: String,
    pub kind: TestKind,
}

/// Object-safe view of a suite
pub trait DynSuite: Send {
    fn suite_name(&self) -> String;

    fn test_specs(&self) -> Vec<TestSpec>;

    fn call(&mut self, target: Target, c: &mut TestContext);
}

impl<S: Suite> DynSuite for S {
    fn suite_name(&self) -> String {
        self.name()
    }

    fn test_specs(&self) -> Vec<TestSpec> {
        self.tests()
            .into_iter()
            .map(|t| TestSpec {
                name: t.name,
                kind: t.kind,
            })
            .collect()
    }

    fn call(&mut self, target: Target, c: &mut TestContext) {
        match target {
            Target::Fixture(Fixture::SetUpSuite) => self.set_up_suite(c),
            Target::Fixture(Fixture::TearDownSuite) => self.tear_down_suite(c),
            Target::Fixture(Fixture::SetUpTest) => self.set_up_test(c),
            Target::Fixture(Fixture::TearDownTest) => self.tear_down_test(c),
            Target::Test(index) => {
                let func = self.tests().get(index).map(|t| t.func);
                match func {
                    Some(func) => func(self, c),
                    None => c.report_failure(&format!("no test at index {index}")),
                }
            }
        }
    }
}

fn short_type_name<T>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Calls {
        log: Vec<&'static str>,
    }

    impl Calls {
        fn first(&mut self, _c: &mut TestContext) {
            self.log.push("first");
        }

        fn second(&mut self, _c: &mut TestContext) {
            self.log.push("second");
        }
    }

    impl Suite for Calls {
        fn tests(&self) -> Vec<TestDescriptor<Self>> {
            vec![
                TestDescriptor::test("TestFirst", Calls::first),
                TestDescriptor::benchmark("BenchmarkSecond", Calls::second),
            ]
        }

        fn set_up_test(&mut self, _c: &mut TestContext) {
            self.log.push("set_up_test");
        }
    }

    #[test]
    fn test_default_name_is_short_type_name() {
        assert_eq!(Calls::default().suite_name(), "Calls");
    }

    #[test]
    fn test_specs_keep_declaration_order() {
        let specs = Calls::default().test_specs();
        assert_eq!(
            specs,
            vec![
                TestSpec {
                    name: "TestFirst".to_string(),
                    kind: TestKind::Test
                },
                TestSpec {
                    name: "BenchmarkSecond".to_string(),
                    kind: TestKind::Benchmark
                },
            ]
        );
    }

    #[test]
    fn test_call_dispatches_targets() {
        let mut suite = Calls::default();
        let mut c = TestContext::detached("Calls.TestFirst");

        suite.call(Target::Fixture(Fixture::SetUpTest), &mut c);
        suite.call(Target::Test(1), &mut c);
        suite.call(Target::Test(0), &mut c);
        suite.call(Target::Fixture(Fixture::TearDownSuite), &mut c);

        assert_eq!(suite.log, vec!["set_up_test", "second", "first"]);
        assert!(!c.failed());
    }

    #[test]
    fn test_call_unknown_index_fails() {
        let mut suite = Calls::default();
        let mut c = TestContext::detached("Calls.Nope");
        suite.call(Target::Test(7), &mut c);
        assert!(c.failed());
    }
}
