//! Scoped work directories
//!
//! A [`WorkDir`] is acquired lazily on the first `mk_dir` call and
//! released when its scope ends, unless retention was requested.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

/// Creates and removes scratch directories
pub trait WorkDirProvisioner: Send + Sync + fmt::Debug {
    fn acquire(&self) -> io::Result<PathBuf>;
    fn release(&self, path: &Path) -> io::Result<()>;
}

/// Provisioner backed by the system temp directory
#[derive(Clone, Debug, Default)]
pub struct TempDirProvisioner {
    root: Option<PathBuf>,
}

impl TempDirProvisioner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create directories under `root` instead of the system temp dir
    pub fn in_dir(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
        }
    }
}

impl WorkDirProvisioner for TempDirProvisioner {
    fn acquire(&self) -> io::Result<PathBuf> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("suitecheck-");
        let dir = match &self.root {
            Some(root) => builder.tempdir_in(root)?,
            None => builder.tempdir()?,
        };
        Ok(dir.keep())
    }

    fn release(&self, path: &Path) -> io::Result<()> {
        fs::remove_dir_all(path)
    }
}

/// Work directory bound to one fixture or test scope
pub struct WorkDir {
    provisioner: Arc<dyn WorkDirProvisioner>,
    keep: bool,
    path: Option<PathBuf>,
    next_child: usize,
}

impl WorkDir {
    pub fn new(provisioner: Arc<dyn WorkDirProvisioner>, keep: bool) -> Self {
        Self {
            provisioner,
            keep,
            path: None,
            next_child: 0,
        }
    }

    /// Create a fresh, empty subdirectory
    pub fn mk_dir(&mut self) -> io::Result<PathBuf> {
        let root = match &self.path {
            Some(path) => path.clone(),
            None => {
                let path = self.provisioner.acquire()?;
                debug!("Acquired work directory {}", path.display());
                self.path = Some(path.clone());
                path
            }
        };

        let child = root.join(self.next_child.to_string());
        fs::create_dir(&child)?;
        self.next_child += 1;
        Ok(child)
    }

    /// Root of the scope, if anything was created yet
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// End the scope, returning the path when it is retained
    pub fn finish(mut self) -> Option<PathBuf> {
        let path = self.path.take()?;
        if self.keep {
            return Some(path);
        }
        self.release(&path);
        None
    }

    fn release(&self, path: &Path) {
        match self.provisioner.release(path) {
            Ok(()) => debug!("Removed work directory {}", path.display()),
            Err(e) => warn!("Failed to remove work directory {}: {}", path.display(), e),
        }
    }
}

impl Drop for WorkDir {
    fn drop(&mut self) {
        if let Some(path) = self.path.take() {
            if !self.keep {
                self.release(&path);
            }
        }
    }
}

impl fmt::Debug for WorkDir {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkDir")
            .field("path", &self.path)
            .field("keep", &self.keep)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provisioner(root: &Path) -> Arc<dyn WorkDirProvisioner> {
        Arc::new(TempDirProvisioner::in_dir(root))
    }

    #[test]
    fn test_lazy_acquire() {
        let root = tempfile::tempdir().unwrap();
        let work = WorkDir::new(provisioner(root.path()), false);
        assert!(work.path().is_none());
        assert!(work.finish().is_none());
        assert_eq!(fs::read_dir(root.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_mk_dir_creates_distinct_children() {
        let root = tempfile::tempdir().unwrap();
        let mut work = WorkDir::new(provisioner(root.path()), false);

        let a = work.mk_dir().unwrap();
        let b = work.mk_dir().unwrap();
        assert_ne!(a, b);
        assert!(a.is_dir() && b.is_dir());
        assert_eq!(a.parent(), work.path());

        let scope = work.path().unwrap().to_path_buf();
        assert!(work.finish().is_none());
        assert!(!scope.exists());
    }

    #[test]
    fn test_keep_retains_directory() {
        let root = tempfile::tempdir().unwrap();
        let mut work = WorkDir::new(provisioner(root.path()), true);
        work.mk_dir().unwrap();

        let kept = work.finish().unwrap();
        assert!(kept.is_dir());
    }

    #[test]
    fn test_drop_releases() {
        let root = tempfile::tempdir().unwrap();
        let scope = {
            let mut work = WorkDir::new(provisioner(root.path()), false);
            work.mk_dir().unwrap();
            work.path().unwrap().to_path_buf()
        };
        assert!(!scope.exists());
    }
}
