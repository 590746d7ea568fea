//! `quay clean` command
//!
//! The cache has no partial invalidation: recovery from a corrupt or
//! inconsistent subtree is deleting it and re-running `quay ensure`.

use anyhow::{bail, Result};

use crate::cli::{CleanArgs, Cli};
use quay::util::fs;

pub fn execute(args: &CleanArgs, cli: &Cli) -> Result<()> {
    let manifest = super::load_manifest(cli)?;
    let ctx = super::context(cli, &manifest);

    if args.all {
        fs::remove_dir_all_if_exists(&ctx.cache_root)?;
        println!("removed {}", ctx.cache_root.display());
        return Ok(());
    }

    if args.names.is_empty() {
        bail!("specify dependency names to clean, or --all");
    }

    for name in &args.names {
        let root = ctx.dep_root(name);
        if root.exists() {
            fs::remove_dir_all_if_exists(&root)?;
            println!("removed {}", root.display());
        } else {
            println!("nothing cached for `{}`", name);
        }
    }
    Ok(())
}
