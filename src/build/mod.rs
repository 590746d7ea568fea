//! Per-build-kind configure/build/install steps.
//!
//! Each [`BuildKind`] maps to one [`BuildSteps`] implementation. The steps
//! are uniform from the resolver's point of view: any non-zero exit from an
//! underlying tool is an unrecoverable error for that stage, and the only
//! parallelism is the `-jN` handed to the native build tool.

mod autotools;
mod cmake;
mod header_only;
mod make_direct;
mod manual_compile;
mod python_configure;

use std::path::Path;

use anyhow::Result;

use crate::core::descriptor::{BuildKind, DependencyDescriptor};

pub use autotools::Autotools;
pub use cmake::CMakeBuild;
pub use header_only::HeaderOnly;
pub use make_direct::MakeDirect;
pub use manual_compile::ManualCompile;
pub use python_configure::PythonConfigure;

/// Everything a stage needs: the descriptor plus the dependency's cache
/// directories and the job count.
pub struct StageContext<'a> {
    /// Descriptor being built.
    pub descriptor: &'a DependencyDescriptor,

    /// Canonical source directory.
    pub source_dir: &'a Path,

    /// Out-of-tree build directory (unused by in-tree kinds).
    pub build_dir: &'a Path,

    /// Install prefix.
    pub install_dir: &'a Path,

    /// Parallel job count for the native tool.
    pub jobs: usize,
}

/// The three stages every build kind provides.
///
/// Kinds without a given stage implement it as a no-op (header-only has no
/// configure or build; make-direct has no configure).
pub trait BuildSteps {
    /// Generate the native build system's configuration.
    fn configure(&self, ctx: &StageContext<'_>) -> Result<()>;

    /// Produce artifacts.
    fn build(&self, ctx: &StageContext<'_>) -> Result<()>;

    /// Place headers and libraries under the install prefix.
    fn install(&self, ctx: &StageContext<'_>) -> Result<()>;
}

/// Dispatch table from build kind to steps.
pub fn steps_for(kind: BuildKind) -> &'static dyn BuildSteps {
    match kind {
        BuildKind::Autotools => &Autotools,
        BuildKind::CMake => &CMakeBuild,
        BuildKind::PythonConfigure => &PythonConfigure,
        BuildKind::MakeDirect => &MakeDirect,
        BuildKind::HeaderOnly => &HeaderOnly,
        BuildKind::ManualCompile => &ManualCompile,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_kind_has_steps() {
        // Dispatch must be total; a panic here would mean a new kind was
        // added without steps.
        for kind in [
            BuildKind::Autotools,
            BuildKind::CMake,
            BuildKind::PythonConfigure,
            BuildKind::MakeDirect,
            BuildKind::HeaderOnly,
            BuildKind::ManualCompile,
        ] {
            let _ = steps_for(kind);
        }
    }
}
