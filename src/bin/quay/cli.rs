//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

/// Quay - fetch, build, and cache native C/C++ dependencies
#[derive(Parser)]
#[command(name = "quay")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Path to Quay.toml (default: search upward from the current directory)
    #[arg(long, global = true)]
    pub manifest: Option<PathBuf>,

    /// Cache directory (overrides [fetch] cache-dir and QUAY_CACHE_DIR)
    #[arg(long, global = true)]
    pub cache_dir: Option<PathBuf>,

    /// Number of parallel jobs for native build tools
    #[arg(short, long, global = true)]
    pub jobs: Option<usize>,

    /// Never touch the network; only cache hits succeed
    #[arg(long, global = true)]
    pub offline: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Download, build, and install dependencies (no-op when cached)
    Ensure(EnsureArgs),

    /// Ensure dependencies and print their link plans
    Plan(PlanArgs),

    /// Add a catalog preset to Quay.toml
    Add(AddArgs),

    /// List the built-in dependency catalog
    List(ListArgs),

    /// Remove cached dependency subtrees
    Clean(CleanArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args)]
pub struct EnsureArgs {
    /// Dependencies to ensure (defaults to every manifest entry)
    pub names: Vec<String>,
}

#[derive(Args)]
pub struct PlanArgs {
    /// Dependencies to plan (defaults to every manifest entry)
    pub names: Vec<String>,

    /// Emit the plans as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct AddArgs {
    /// Catalog preset identifier (see `quay list`)
    pub preset: String,

    /// Entry name in Quay.toml (defaults to the preset identifier)
    #[arg(long)]
    pub name: Option<String>,

    /// Version override; preset URL templates re-render
    #[arg(long)]
    pub version: Option<String>,

    /// Extra build flag, appended to the preset's (repeatable).
    /// Values are raw build-tool flags, so leading hyphens are expected.
    #[arg(long = "flag", allow_hyphen_values = true)]
    pub flags: Vec<String>,
}

#[derive(Args)]
pub struct ListArgs {}

#[derive(Args)]
pub struct CleanArgs {
    /// Dependencies to remove from the cache
    pub names: Vec<String>,

    /// Remove the whole cache root
    #[arg(long)]
    pub all: bool,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}
