//! Quay CLI - idempotent acquisition of native C/C++ dependencies

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};
use quay::util::diagnostic::{self, ManifestParseError};
use quay::ResolveError;

fn main() {
    let cli = Cli::parse();
    let color = !cli.no_color;

    // Set up logging. Logs go to stderr so machine-readable stdout
    // (e.g. `quay plan --json`) stays clean.
    let filter = if cli.verbose {
        EnvFilter::new("quay=debug")
    } else {
        EnvFilter::new("quay=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    if let Err(e) = run(cli) {
        report(e, color);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    match &cli.command {
        Commands::Ensure(args) => commands::ensure::execute(args, &cli),
        Commands::Plan(args) => commands::plan::execute(args, &cli),
        Commands::Add(args) => commands::add::execute(args, &cli),
        Commands::List(args) => commands::list::execute(args, &cli),
        Commands::Clean(args) => commands::clean::execute(args, &cli),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}

/// Resolver failures get the rich diagnostic path; manifest parse errors
/// render through miette with the offending span; everything else falls
/// back to the anyhow chain.
fn report(err: anyhow::Error, color: bool) {
    if let Some(resolve) = err.downcast_ref::<ResolveError>() {
        diagnostic::emit(&resolve.to_diagnostic(), color);
        return;
    }
    match err.downcast::<ManifestParseError>() {
        Ok(parse) => eprintln!("{:?}", miette::Report::new(parse)),
        Err(other) => eprintln!("error: {:#}", other),
    }
}
