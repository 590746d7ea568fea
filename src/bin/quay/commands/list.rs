//! `quay list` command
//!
//! Shows the built-in catalog, and when a manifest is in reach, each
//! declared dependency with its cache status.

use anyhow::Result;

use crate::cli::{Cli, ListArgs};
use quay::core::catalog;
use quay::Resolver;

pub fn execute(_args: &ListArgs, cli: &Cli) -> Result<()> {
    println!("catalog presets:");
    for preset in catalog::all() {
        let d = preset.descriptor();
        println!(
            "  {:<14} {:<10} {:<16} {}",
            preset.id, d.version, d.build_kind, preset.summary
        );
    }

    // Manifest section is optional: `list` works outside any project.
    if let Ok(manifest) = super::load_manifest(cli) {
        let resolver = Resolver::new(super::context(cli, &manifest));
        println!();
        println!("dependencies in {}:", manifest.path.display());
        for descriptor in manifest.descriptors()? {
            let status = if resolver.is_cached(&descriptor) {
                "cached"
            } else {
                "not cached"
            };
            println!(
                "  {:<14} {:<10} {}",
                descriptor.name, descriptor.version, status
            );
        }
    }

    Ok(())
}
