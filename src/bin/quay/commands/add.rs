//! `quay add` command
//!
//! Appends a `[deps.<name>]` entry referencing a catalog preset. Edits are
//! made with toml_edit so existing formatting and comments survive.

use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};
use toml_edit::{value, Array, DocumentMut, Item, Table};

use crate::cli::{AddArgs, Cli};
use quay::core::catalog;
use quay::core::manifest::MANIFEST_FILE;
use quay::util::diagnostic::suggestions;
use quay::Manifest;

pub fn execute(args: &AddArgs, cli: &Cli) -> Result<()> {
    let preset = catalog::preset(&args.preset).ok_or_else(|| {
        anyhow!("unknown preset `{}`\n{}", args.preset, suggestions::UNKNOWN_PRESET)
    })?;

    let path = manifest_path(cli)?;
    let contents = if path.is_file() {
        std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?
    } else {
        String::new()
    };
    let mut doc: DocumentMut = contents
        .parse()
        .with_context(|| format!("failed to parse {}", path.display()))?;

    let name = args.name.clone().unwrap_or_else(|| preset.id.to_string());

    let deps = doc.entry("deps").or_insert(Item::Table(Table::new()));
    let deps = deps
        .as_table_mut()
        .ok_or_else(|| anyhow!("`deps` is not a table in {}", path.display()))?;
    deps.set_implicit(true);

    if deps.contains_key(&name) {
        bail!("`{}` is already in {}", name, path.display());
    }

    let mut entry = Table::new();
    entry["preset"] = value(preset.id);
    if let Some(version) = &args.version {
        entry["version"] = value(version.as_str());
    }
    if !args.flags.is_empty() {
        let mut flags = Array::new();
        for flag in &args.flags {
            flags.push(flag.as_str());
        }
        entry["flags"] = value(flags);
    }
    deps.insert(&name, Item::Table(entry));

    std::fs::write(&path, doc.to_string())
        .with_context(|| format!("failed to write {}", path.display()))?;

    let version = args
        .version
        .clone()
        .unwrap_or_else(|| preset.descriptor().version);
    println!("added `{}` = preset `{}` {} to {}", name, preset.id, version, path.display());
    Ok(())
}

/// Manifest to edit: `--manifest`, the nearest Quay.toml, or a fresh one
/// in the current directory.
fn manifest_path(cli: &Cli) -> Result<PathBuf> {
    if let Some(path) = &cli.manifest {
        return Ok(path.clone());
    }
    let cwd = std::env::current_dir().context("cannot determine current directory")?;
    Ok(Manifest::find(&cwd).unwrap_or_else(|| cwd.join(MANIFEST_FILE)))
}
