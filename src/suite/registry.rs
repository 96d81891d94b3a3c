//! Suite registry
//!
//! Append-only, ordered list of suites for one process. Registration must
//! finish before a run starts; the registry itself does no locking.

use parking_lot::Mutex;
use std::sync::Arc;

use super::{DynSuite, Suite};

/// Type-erased suite as stored in the registry
pub type SharedSuite = Arc<Mutex<dyn DynSuite>>;

/// Typed handle returned by [`Registry::register`]
pub type SuiteHandle<S> = Arc<Mutex<S>>;

#[derive(Clone, Default)]
pub struct Registry {
    suites: Vec<SharedSuite>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `suite`, returning a handle to inspect it after a run
    pub fn register<S: Suite>(&mut self, suite: S) -> SuiteHandle<S> {
        let handle = Arc::new(Mutex::new(suite));
        let shared: SharedSuite = handle.clone();
        self.suites.push(shared);
        handle
    }

    /// Suites in registration order
    pub fn suites(&self) -> &[SharedSuite] {
        &self.suites
    }

    pub fn len(&self) -> usize {
        self.suites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.suites.is_empty()
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<String> = self.suites.iter().map(|s| s.lock().suite_name()).collect();
        f.debug_struct("Registry").field("suites", &names).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::suite::{TestContext, TestDescriptor};

    struct Named(&'static str);

    impl Named {
        fn noop(&mut self, _c: &mut TestContext) {}
    }

    impl Suite for Named {
        fn name(&self) -> String {
            self.0.to_string()
        }

        fn tests(&self) -> Vec<TestDescriptor<Self>> {
            vec![TestDescriptor::test("TestNoop", Named::noop)]
        }
    }

    #[test]
    fn test_register_keeps_order() {
        let mut registry = Registry::new();
        assert!(registry.is_empty());

        registry.register(Named("B"));
        registry.register(Named("A"));
        registry.register(Named("C"));

        let names: Vec<String> = registry
            .suites()
            .iter()
            .map(|s| s.lock().suite_name())
            .collect();
        assert_eq!(names, vec!["B", "A", "C"]);
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn test_register_returns_handle_to_same_suite() {
        let mut registry = Registry::new();
        let handle = registry.register(Named("First"));
        handle.lock().0 = "Renamed";
        assert_eq!(registry.suites()[0].lock().suite_name(), "Renamed");
    }
}
