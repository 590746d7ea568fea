//! Command implementations

pub mod add;
pub mod clean;
pub mod completions;
pub mod ensure;
pub mod list;
pub mod plan;

use anyhow::{anyhow, Context, Result};

use crate::cli::Cli;
use quay::core::manifest::MANIFEST_FILE;
use quay::util::diagnostic::suggestions;
use quay::{DependencyDescriptor, GlobalContext, Manifest};

/// Load the manifest named by `--manifest`, or search upward from the
/// current directory.
pub fn load_manifest(cli: &Cli) -> Result<Manifest> {
    let path = match &cli.manifest {
        Some(path) => path.clone(),
        None => {
            let cwd = std::env::current_dir().context("cannot determine current directory")?;
            Manifest::find(&cwd).ok_or_else(|| {
                anyhow!(
                    "no {} found (searched upward from {})\n{}",
                    MANIFEST_FILE,
                    cwd.display(),
                    suggestions::NO_MANIFEST
                )
            })?
        }
    };
    Manifest::load(&path)
}

/// Build the resolver context. CLI flags override the manifest's `[fetch]`
/// section, which overrides the environment/defaults.
pub fn context(cli: &Cli, manifest: &Manifest) -> GlobalContext {
    let cache_dir = cli
        .cache_dir
        .as_deref()
        .or(manifest.fetch.cache_dir.as_deref());
    GlobalContext::for_project(manifest.project_dir(), cache_dir)
        .with_jobs(cli.jobs.or(manifest.fetch.jobs))
        .with_offline(cli.offline || manifest.fetch.offline)
}

/// Descriptors named on the command line, or every manifest entry.
pub fn select_descriptors(
    manifest: &Manifest,
    names: &[String],
) -> Result<Vec<DependencyDescriptor>> {
    if names.is_empty() {
        manifest.ensure_nonempty()?;
        manifest.descriptors()
    } else {
        names.iter().map(|name| manifest.descriptor(name)).collect()
    }
}
