//! `quay plan` command
//!
//! Ensures the selected dependencies and prints what a consuming build
//! must reference, either as conventional compiler flags or as JSON.

use anyhow::Result;

use crate::cli::{Cli, PlanArgs};
use quay::{LinkPlan, Resolver};

pub fn execute(args: &PlanArgs, cli: &Cli) -> Result<()> {
    let manifest = super::load_manifest(cli)?;
    let ctx = super::context(cli, &manifest);
    let descriptors = super::select_descriptors(&manifest, &args.names)?;
    let resolver = Resolver::new(ctx);

    let plans = descriptors
        .iter()
        .map(|d| resolver.ensure(d))
        .collect::<Result<Vec<LinkPlan>>>()?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&plans)?);
    } else {
        for plan in &plans {
            println!("# {} {}", plan.name, plan.version);
            println!("{}", plan.render_flags().join(" "));
        }
    }

    Ok(())
}
