//! Advisory locking of per-dependency cache subtrees.
//!
//! Two configure runs sharing a cache directory would otherwise interleave
//! writes to the same source/build/install paths. The lock scope is one
//! `ensure()` call; concurrent resolvers serialize per dependency and
//! different dependencies proceed independently.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use fs4::fs_std::FileExt;

/// Lock file name inside a dependency's cache subtree.
pub const LOCK_FILE: &str = ".quay-lock";

/// An exclusive advisory lock over one dependency's cache subtree.
/// Released on drop, which covers every exit path including errors.
pub struct CacheLock {
    file: File,
    path: PathBuf,
}

impl CacheLock {
    /// Acquire the lock for a dependency cache directory, blocking until
    /// any concurrent holder releases it.
    pub fn acquire(dep_root: &Path) -> Result<CacheLock> {
        crate::util::fs::ensure_dir(dep_root)?;
        let path = dep_root.join(LOCK_FILE);

        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&path)
            .with_context(|| format!("failed to open lock file: {}", path.display()))?;

        file.lock_exclusive()
            .with_context(|| format!("failed to lock {}", path.display()))?;

        tracing::debug!("locked {}", path.display());
        Ok(CacheLock { file, path })
    }

    /// Path of the underlying lock file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for CacheLock {
    fn drop(&mut self) {
        if let Err(e) = FileExt::unlock(&self.file) {
            tracing::warn!("failed to unlock {}: {}", self.path.display(), e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use std::time::Duration;
    use tempfile::TempDir;

    #[test]
    fn test_lock_release_on_drop() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("gmp");

        let first = CacheLock::acquire(&root).unwrap();
        assert!(first.path().exists());
        drop(first);

        // Re-acquire after drop must not block.
        let second = CacheLock::acquire(&root).unwrap();
        drop(second);
    }

    #[test]
    fn test_concurrent_acquire_serializes() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("gsl");

        let held = CacheLock::acquire(&root).unwrap();

        let (tx, rx) = mpsc::channel();
        let thread_root = root.clone();
        let handle = std::thread::spawn(move || {
            let _lock = CacheLock::acquire(&thread_root).unwrap();
            tx.send(()).unwrap();
        });

        // The second acquire must wait while the first is held.
        assert!(rx.recv_timeout(Duration::from_millis(200)).is_err());

        drop(held);
        assert!(rx.recv_timeout(Duration::from_secs(5)).is_ok());
        handle.join().unwrap();
    }
}
