//! `quay ensure` command

use anyhow::Result;

use crate::cli::{Cli, EnsureArgs};
use quay::Resolver;

pub fn execute(args: &EnsureArgs, cli: &Cli) -> Result<()> {
    let manifest = super::load_manifest(cli)?;
    let ctx = super::context(cli, &manifest);
    let descriptors = super::select_descriptors(&manifest, &args.names)?;
    let resolver = Resolver::new(ctx);

    let mut built = 0usize;
    let mut cached = 0usize;
    for descriptor in &descriptors {
        let plan = resolver.ensure(descriptor)?;
        if plan.from_cache {
            cached += 1;
            println!("  {} {} (cached)", plan.name, plan.version);
        } else {
            built += 1;
            println!("  {} {} (built)", plan.name, plan.version);
        }
    }

    println!(
        "{} dependencies ready ({} built, {} cached)",
        built + cached,
        built,
        cached
    );
    Ok(())
}
