//! Quay.toml manifest parsing and schema.
//!
//! The manifest names the dependencies a project wants resolved. An entry
//! either references a catalog preset (plus explicit, named overrides) or
//! spells out a full descriptor inline:
//!
//! ```toml
//! [fetch]
//! cache-dir = "download"
//!
//! [deps.gmp]
//! preset = "gmp"
//! version = "6.2.1"              # overrides the preset, URLs re-render
//! flags = ["--disable-assembly"] # appended to the preset's flags
//!
//! [deps.zlog]
//! version = "1.2.17"
//! urls = ["https://example.com/zlog-1.2.17.tar.gz"]
//! build = "make-direct"
//! link = ["zlog"]
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use miette::NamedSource;
use serde::Deserialize;

use crate::core::catalog;
use crate::core::descriptor::{ArchiveFormat, BuildFlag, BuildKind, DependencyDescriptor};
use crate::util::diagnostic::ManifestParseError;

/// Manifest file name.
pub const MANIFEST_FILE: &str = "Quay.toml";

/// `[fetch]` section: operator-facing resolver knobs.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Cache root, relative paths resolved against the manifest directory.
    #[serde(rename = "cache-dir")]
    pub cache_dir: Option<PathBuf>,

    /// Parallel job count for native build tools.
    pub jobs: Option<usize>,

    /// Offline mode default.
    pub offline: bool,
}

/// One `[deps.<name>]` table, as written.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DepEntry {
    /// Catalog preset to start from.
    pub preset: Option<String>,

    /// Version (overrides the preset's; URL templates re-render).
    pub version: Option<String>,

    /// Source URLs (replaces the preset's mirror list).
    pub urls: Vec<String>,

    /// Archive format; inferred from the first URL when absent.
    pub archive: Option<ArchiveFormat>,

    /// Build kind; required for inline entries.
    pub build: Option<BuildKind>,

    /// Build flags; appended to the preset's flags.
    pub flags: Vec<String>,

    /// Source-directory marker file.
    pub marker: Option<String>,

    /// Expected artifacts, relative to the install dir.
    pub artifacts: Vec<PathBuf>,

    /// Link targets in mandated order.
    pub link: Vec<String>,

    /// Archive SHA256.
    pub sha256: Option<String>,
}

impl DepEntry {
    /// Resolve this entry into a full descriptor.
    ///
    /// The manifest key becomes the descriptor name (and therefore the
    /// cache subtree), so two entries can build the same preset with
    /// different settings without sharing state.
    pub fn to_descriptor(&self, name: &str) -> Result<DependencyDescriptor> {
        let mut d = match &self.preset {
            Some(id) => {
                let preset = catalog::preset(id).ok_or_else(|| {
                    anyhow!(
                        "unknown preset `{}` for dependency `{}` (see `quay list`)",
                        id,
                        name
                    )
                })?;
                match &self.version {
                    Some(version) => preset.descriptor_with_version(version),
                    None => preset.descriptor(),
                }
            }
            None => {
                let version = self
                    .version
                    .clone()
                    .ok_or_else(|| anyhow!("dependency `{}` is missing `version`", name))?;
                let build = self
                    .build
                    .ok_or_else(|| anyhow!("dependency `{}` is missing `build`", name))?;
                DependencyDescriptor::new(name, version, build)
            }
        };

        d.name = name.to_string();

        if !self.urls.is_empty() {
            d.source_urls = self.urls.clone();
            // A preset checksum does not cover replacement URLs.
            d.sha256 = None;
            if self.archive.is_none() {
                d.archive_format = ArchiveFormat::from_url(&self.urls[0]);
            }
        }
        if let Some(archive) = self.archive {
            d.archive_format = archive;
        }
        if let Some(build) = self.build {
            d.build_kind = build;
        }
        for flag in &self.flags {
            d.build_flags.push(BuildFlag::parse(flag));
        }
        if let Some(marker) = &self.marker {
            d.source_marker = Some(marker.clone());
        }
        if !self.artifacts.is_empty() {
            d.expected_artifacts = self.artifacts.clone();
        }
        if !self.link.is_empty() {
            d.link_targets = self.link.clone();
        }
        if let Some(sha256) = &self.sha256 {
            d.sha256 = Some(sha256.clone());
        }

        d.validate()?;
        Ok(d)
    }
}

/// Parsed Quay.toml.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Manifest {
    /// Resolver configuration.
    pub fetch: FetchConfig,

    /// Dependency entries, keyed by name.
    pub deps: BTreeMap<String, DepEntry>,

    /// Manifest path on disk (not part of the schema).
    #[serde(skip)]
    pub path: PathBuf,
}

impl Manifest {
    /// Parse manifest text. Parse errors carry a labeled source span.
    pub fn parse(contents: &str, path: &Path) -> Result<Manifest> {
        let mut manifest: Manifest = toml::from_str(contents).map_err(|e| {
            let span = e.span().map(|r| (r.start, r.len()).into());
            anyhow::Error::new(ManifestParseError {
                src: NamedSource::new(path.display().to_string(), contents.to_string()),
                span,
                message: e.message().to_string(),
            })
        })?;
        manifest.path = path.to_path_buf();
        Ok(manifest)
    }

    /// Load a manifest from disk.
    pub fn load(path: &Path) -> Result<Manifest> {
        let contents = crate::util::fs::read_to_string(path)?;
        Self::parse(&contents, path)
    }

    /// Walk up from `start` looking for a Quay.toml.
    pub fn find(start: &Path) -> Option<PathBuf> {
        let mut dir = Some(start);
        while let Some(d) = dir {
            let candidate = d.join(MANIFEST_FILE);
            if candidate.is_file() {
                return Some(candidate);
            }
            dir = d.parent();
        }
        None
    }

    /// Directory containing the manifest.
    pub fn project_dir(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new("."))
    }

    /// Names of all declared dependencies.
    pub fn dep_names(&self) -> Vec<&str> {
        self.deps.keys().map(String::as_str).collect()
    }

    /// Resolve one named dependency to a descriptor.
    pub fn descriptor(&self, name: &str) -> Result<DependencyDescriptor> {
        let entry = self
            .deps
            .get(name)
            .ok_or_else(|| anyhow!("no dependency `{}` in {}", name, self.path.display()))?;
        entry
            .to_descriptor(name)
            .with_context(|| format!("invalid entry [deps.{}]", name))
    }

    /// Resolve every declared dependency, in manifest order.
    pub fn descriptors(&self) -> Result<Vec<DependencyDescriptor>> {
        let mut out = Vec::with_capacity(self.deps.len());
        for (name, entry) in &self.deps {
            out.push(
                entry
                    .to_descriptor(name)
                    .with_context(|| format!("invalid entry [deps.{}]", name))?,
            );
        }
        Ok(out)
    }

    /// Fail if the manifest declares no dependencies.
    pub fn ensure_nonempty(&self) -> Result<()> {
        if self.deps.is_empty() {
            bail!("{} declares no dependencies", self.path.display());
        }
        Ok(())
    }
}
