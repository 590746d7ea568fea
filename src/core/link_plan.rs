//! Link plans: the ordered set of artifacts a consumer must reference.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// The resolver's output for one dependency: everything a consuming build
/// needs to compile against and link the installed artifacts.
///
/// `libraries` preserves the descriptor's mandated link order; consumers
/// must not re-sort it (static linkers resolve symbols left to right).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkPlan {
    /// Dependency name.
    pub name: String,

    /// Resolved version.
    pub version: String,

    /// Include directories, absolute.
    pub include_dirs: Vec<PathBuf>,

    /// Library artifacts in link order, absolute.
    pub libraries: Vec<PathBuf>,

    /// Whether this plan was served from the cache fast path.
    pub from_cache: bool,
}

impl LinkPlan {
    /// Library stems (`libgmpxx.a` -> `gmpxx`), in link order.
    pub fn lib_stems(&self) -> Vec<String> {
        self.libraries
            .iter()
            .filter_map(|path| path.file_stem())
            .map(|stem| {
                let s = stem.to_string_lossy();
                s.strip_prefix("lib").unwrap_or(&s).to_string()
            })
            .collect()
    }

    /// Render conventional compiler/linker flags (`-I`, `-L`, `-l`).
    pub fn render_flags(&self) -> Vec<String> {
        let mut flags = Vec::new();
        for dir in &self.include_dirs {
            flags.push(format!("-I{}", dir.display()));
        }
        let mut lib_dirs: Vec<PathBuf> = Vec::new();
        for lib in &self.libraries {
            if let Some(parent) = lib.parent() {
                if !lib_dirs.iter().any(|d| d == parent) {
                    lib_dirs.push(parent.to_path_buf());
                }
            }
        }
        for dir in &lib_dirs {
            flags.push(format!("-L{}", dir.display()));
        }
        for stem in self.lib_stems() {
            flags.push(format!("-l{}", stem));
        }
        flags
    }

    /// Serialize as pretty JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("failed to serialize link plan")
    }
}
