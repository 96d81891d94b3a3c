//! Filesystem checks built on per-scope work directories

use std::fs;
use std::path::PathBuf;

use suitecheck::{Suite, TestContext, TestDescriptor};

#[derive(Debug, Default)]
pub struct WorkspaceSuite {
    shared: Option<PathBuf>,
    current: Option<PathBuf>,
}

impl WorkspaceSuite {
    fn test_write_read(&mut self, c: &mut TestContext) {
        let Some(dir) = self.current.clone() else {
            c.error("SetUpTest did not create a directory");
            return;
        };
        let file = dir.join("greeting.txt");
        if let Err(e) = fs::write(&file, "hello") {
            c.error(format!("write {}: {e}", file.display()));
            return;
        }
        match fs::read_to_string(&file) {
            Ok(text) => {
                c.check_eq(text.as_str(), "hello");
            }
            Err(e) => c.error(format!("read {}: {e}", file.display())),
        }
    }

    fn test_fresh_dirs(&mut self, c: &mut TestContext) {
        match (c.mk_dir(), c.mk_dir()) {
            (Ok(first), Ok(second)) => {
                c.check(first != second, "mk_dir returned the same path twice");
                let empty = fs::read_dir(&second).map(|mut d| d.next().is_none());
                c.check(matches!(empty, Ok(true)), "new directory is not empty");
            }
            (Err(e), _) | (_, Err(e)) => c.error(e),
        }
    }

    fn test_suite_dir_visible(&mut self, c: &mut TestContext) {
        match &self.shared {
            Some(dir) => {
                let marker = dir.join("suite.marker");
                c.check(marker.exists(), format!("{} missing", marker.display()));
            }
            None => c.error("SetUpSuite did not create a directory"),
        }
    }

    fn test_symlinks(&mut self, c: &mut TestContext) {
        if !cfg!(unix) {
            c.skip("symlinks need a unix host");
            return;
        }
        c.log("unix host, symlinks available");
    }

    fn test_known_issue(&mut self, c: &mut TestContext) {
        c.expect_failure("rename across work dirs is not supported");
        let from = c.mk_dir().map(|d| d.join("missing"));
        match from {
            Ok(from) => {
                if let Err(e) = fs::rename(&from, from.with_extension("moved")) {
                    c.error(e);
                }
            }
            Err(e) => c.error(e),
        }
    }
}

impl Suite for WorkspaceSuite {
    fn tests(&self) -> Vec<TestDescriptor<Self>> {
        vec![
            TestDescriptor::test("TestWriteRead", Self::test_write_read),
            TestDescriptor::test("TestFreshDirs", Self::test_fresh_dirs),
            TestDescriptor::test("TestSuiteDirVisible", Self::test_suite_dir_visible),
            TestDescriptor::test("TestSymlinks", Self::test_symlinks),
            TestDescriptor::test("TestKnownIssue", Self::test_known_issue),
        ]
    }

    fn set_up_suite(&mut self, c: &mut TestContext) {
        match c.mk_dir() {
            Ok(dir) => {
                if let Err(e) = fs::write(dir.join("suite.marker"), "") {
                    c.error(e);
                }
                self.shared = Some(dir);
            }
            Err(e) => c.error(e),
        }
    }

    fn set_up_test(&mut self, c: &mut TestContext) {
        match c.mk_dir() {
            Ok(dir) => self.current = Some(dir),
            Err(e) => c.error(e),
        }
    }

    fn tear_down_test(&mut self, _c: &mut TestContext) {
        self.current = None;
    }

    fn tear_down_suite(&mut self, _c: &mut TestContext) {
        self.shared = None;
    }
}
