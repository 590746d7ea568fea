//! Global resolver configuration.
//!
//! The durable cache lives under a single root directory (by default
//! `download/` next to the manifest, matching the documented on-disk
//! layout `download/<dep>/<dep>-install/{include,lib}`). Everything here
//! is derived fresh per invocation; no state is carried between runs.

use std::path::{Path, PathBuf};

/// Environment variable overriding the cache root.
pub const CACHE_DIR_ENV: &str = "QUAY_CACHE_DIR";

/// Default cache directory name, relative to the manifest directory.
pub const DEFAULT_CACHE_DIR: &str = "download";

/// Global context for a resolver invocation.
#[derive(Debug, Clone)]
pub struct GlobalContext {
    /// Root of the download/build/install cache tree.
    pub cache_root: PathBuf,

    /// Parallel job count handed to native build tools (`-jN`).
    pub jobs: usize,

    /// Offline mode: cache hits succeed, anything needing the network fails.
    pub offline: bool,
}

impl GlobalContext {
    /// Create a context with an explicit cache root.
    pub fn new(cache_root: impl Into<PathBuf>) -> Self {
        GlobalContext {
            cache_root: cache_root.into(),
            jobs: default_jobs(),
            offline: false,
        }
    }

    /// Resolve the cache root for a project directory.
    ///
    /// Precedence: explicit CLI/manifest value, then `QUAY_CACHE_DIR`,
    /// then `download/` under the project directory.
    pub fn for_project(
        project_dir: &Path,
        cache_dir: Option<&Path>,
    ) -> Self {
        let cache_root = match cache_dir {
            Some(dir) if dir.is_absolute() => dir.to_path_buf(),
            Some(dir) => project_dir.join(dir),
            None => match std::env::var_os(CACHE_DIR_ENV) {
                Some(dir) => PathBuf::from(dir),
                None => project_dir.join(DEFAULT_CACHE_DIR),
            },
        };

        GlobalContext::new(cache_root)
    }

    /// Set the job count.
    pub fn with_jobs(mut self, jobs: Option<usize>) -> Self {
        if let Some(jobs) = jobs {
            self.jobs = jobs.max(1);
        }
        self
    }

    /// Set offline mode.
    pub fn with_offline(mut self, offline: bool) -> Self {
        self.offline = offline;
        self
    }

    /// Cache subtree for one dependency.
    pub fn dep_root(&self, name: &str) -> PathBuf {
        self.cache_root.join(name)
    }
}

/// Default parallelism for native build tools.
pub fn default_jobs() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_cache_root_default() {
        let ctx = GlobalContext::for_project(Path::new("/work/app"), None);
        // Environment override may be active in CI; only assert the
        // unset-variable case.
        if std::env::var_os(CACHE_DIR_ENV).is_none() {
            assert_eq!(ctx.cache_root, Path::new("/work/app/download"));
        }
        assert!(ctx.jobs >= 1);
        assert!(!ctx.offline);
    }

    #[test]
    fn test_project_cache_root_relative_override() {
        let ctx = GlobalContext::for_project(Path::new("/work/app"), Some(Path::new(".deps")));
        assert_eq!(ctx.cache_root, Path::new("/work/app/.deps"));
    }

    #[test]
    fn test_dep_root_isolation() {
        let ctx = GlobalContext::new("/cache");
        assert_eq!(ctx.dep_root("gmp"), Path::new("/cache/gmp"));
        assert_eq!(ctx.dep_root("gsl"), Path::new("/cache/gsl"));
        assert_ne!(ctx.dep_root("gmp"), ctx.dep_root("gsl"));
    }
}
