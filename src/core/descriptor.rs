//! Dependency descriptors.
//!
//! A [`DependencyDescriptor`] is everything the resolver needs to make one
//! third-party library available for linking: where to get it, how to build
//! it, and which artifacts prove it is already built.

use std::fmt;
use std::path::PathBuf;

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use crate::util::hash::Fingerprint;

/// Archive format of a downloaded source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArchiveFormat {
    #[serde(rename = "tar.gz")]
    TarGz,
    #[serde(rename = "tar.xz")]
    TarXz,
    #[serde(rename = "zip")]
    Zip,
    /// A single raw file (amalgamation source or single header); no
    /// extraction step, the file is copied into the source directory as-is.
    #[serde(rename = "plain")]
    Plain,
}

impl ArchiveFormat {
    /// Infer the format from a URL's file name.
    pub fn from_url(url: &str) -> ArchiveFormat {
        let path = url.split(['?', '#']).next().unwrap_or(url);
        if path.ends_with(".tar.gz") || path.ends_with(".tgz") {
            ArchiveFormat::TarGz
        } else if path.ends_with(".tar.xz") || path.ends_with(".txz") {
            ArchiveFormat::TarXz
        } else if path.ends_with(".zip") {
            ArchiveFormat::Zip
        } else {
            ArchiveFormat::Plain
        }
    }

    /// Canonical file extension for cached archives.
    pub fn extension(&self) -> &'static str {
        match self {
            ArchiveFormat::TarGz => "tar.gz",
            ArchiveFormat::TarXz => "tar.xz",
            ArchiveFormat::Zip => "zip",
            ArchiveFormat::Plain => "",
        }
    }
}

impl fmt::Display for ArchiveFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArchiveFormat::Plain => write!(f, "plain"),
            other => write!(f, "{}", other.extension()),
        }
    }
}

/// How a dependency is configured, built, and installed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BuildKind {
    /// `./configure && make && make install`
    Autotools,
    /// `cmake -S -B && cmake --build && cmake --install`
    CMake,
    /// A `configure.py` script followed by make (Botan style).
    PythonConfigure,
    /// `make` against a shipped Makefile, no configure step.
    MakeDirect,
    /// Headers only; install is a copy into `include/`.
    HeaderOnly,
    /// No build system at all: compile each source file directly and
    /// archive the objects with `ar rcs` (ALGLIB, SQLite amalgamation).
    ManualCompile,
}

impl BuildKind {
    /// Marker file whose presence in the source directory means the
    /// acquisition step can be skipped.
    pub fn default_marker(&self) -> Option<&'static str> {
        match self {
            BuildKind::Autotools => Some("configure"),
            BuildKind::CMake => Some("CMakeLists.txt"),
            BuildKind::PythonConfigure => Some("configure.py"),
            BuildKind::MakeDirect => Some("Makefile"),
            BuildKind::HeaderOnly | BuildKind::ManualCompile => None,
        }
    }
}

impl fmt::Display for BuildKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BuildKind::Autotools => "autotools",
            BuildKind::CMake => "cmake",
            BuildKind::PythonConfigure => "python-configure",
            BuildKind::MakeDirect => "make-direct",
            BuildKind::HeaderOnly => "header-only",
            BuildKind::ManualCompile => "manual-compile",
        };
        write!(f, "{}", s)
    }
}

/// A single build-configuration flag, rendered per build kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildFlag {
    /// Flag name (`--enable-cxx`, `BUILD_SHARED_LIBS`, `-O2`, ...).
    pub name: String,
    /// Optional value.
    pub value: Option<String>,
}

impl BuildFlag {
    /// Parse `name` or `name=value`.
    pub fn parse(s: &str) -> BuildFlag {
        match s.split_once('=') {
            Some((name, value)) => BuildFlag {
                name: name.to_string(),
                value: Some(value.to_string()),
            },
            None => BuildFlag {
                name: s.to_string(),
                value: None,
            },
        }
    }

    /// A bare switch flag.
    pub fn switch(name: impl Into<String>) -> BuildFlag {
        BuildFlag {
            name: name.into(),
            value: None,
        }
    }

    /// A key/value flag.
    pub fn with_value(name: impl Into<String>, value: impl Into<String>) -> BuildFlag {
        BuildFlag {
            name: name.into(),
            value: Some(value.into()),
        }
    }

    /// Render as a `./configure` / `configure.py` argument.
    pub fn as_configure_arg(&self) -> String {
        match &self.value {
            Some(v) => format!("{}={}", self.name, v),
            None => self.name.clone(),
        }
    }

    /// Render as a CMake cache define (`-Dname=value`, default `ON`).
    pub fn as_cmake_define(&self) -> String {
        format!("-D{}={}", self.name, self.value.as_deref().unwrap_or("ON"))
    }

    /// Render as a make variable assignment (`NAME=value`, default `1`).
    pub fn as_make_var(&self) -> String {
        format!("{}={}", self.name, self.value.as_deref().unwrap_or("1"))
    }

    /// Render as a raw compiler argument.
    pub fn as_compiler_arg(&self) -> String {
        self.as_configure_arg()
    }
}

impl fmt::Display for BuildFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_configure_arg())
    }
}

/// Full description of one acquirable dependency.
#[derive(Debug, Clone)]
pub struct DependencyDescriptor {
    /// Identifier; also names the cache subtree.
    pub name: String,

    /// Upstream version string (not necessarily semver).
    pub version: String,

    /// Ordered candidate download URLs, primary first.
    pub source_urls: Vec<String>,

    /// Archive format of the download.
    pub archive_format: ArchiveFormat,

    /// Build workflow.
    pub build_kind: BuildKind,

    /// Configuration flags, rendered per build kind.
    pub build_flags: Vec<BuildFlag>,

    /// File marking a completed acquisition, relative to the source dir.
    /// Defaults per build kind when `None`.
    pub source_marker: Option<String>,

    /// Paths (relative to the install dir) that must all exist for a cache
    /// hit. Derived from `link_targets` when empty.
    pub expected_artifacts: Vec<PathBuf>,

    /// Static library stems in mandated link order (e.g. `gmpxx` before
    /// `gmp` so the C++ wrapper resolves symbols from the C base).
    pub link_targets: Vec<String>,

    /// Expected SHA256 of the downloaded archive, verified when present.
    pub sha256: Option<String>,
}

impl DependencyDescriptor {
    /// Create a minimal descriptor; callers fill in the rest.
    pub fn new(name: impl Into<String>, version: impl Into<String>, build_kind: BuildKind) -> Self {
        DependencyDescriptor {
            name: name.into(),
            version: version.into(),
            source_urls: Vec::new(),
            archive_format: ArchiveFormat::TarGz,
            build_kind,
            build_flags: Vec::new(),
            source_marker: None,
            expected_artifacts: Vec::new(),
            link_targets: Vec::new(),
            sha256: None,
        }
    }

    /// Validate structural invariants before resolving.
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            bail!("dependency name must not be empty");
        }
        if !self
            .name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            bail!(
                "invalid dependency name `{}`: only [a-zA-Z0-9_-] allowed",
                self.name
            );
        }
        if self.source_urls.is_empty() {
            bail!("dependency `{}` has no source URLs", self.name);
        }
        Ok(())
    }

    /// Marker file for the source check, if any.
    pub fn effective_marker(&self) -> Option<String> {
        self.source_marker
            .clone()
            .or_else(|| self.build_kind.default_marker().map(str::to_string))
    }

    /// Cache-hit probe set, relative to the install dir.
    ///
    /// The explicit list wins; otherwise one `lib/lib<stem>.a` per link
    /// target; header-only dependencies fall back to `include/`.
    pub fn effective_artifacts(&self) -> Vec<PathBuf> {
        if !self.expected_artifacts.is_empty() {
            return self.expected_artifacts.clone();
        }
        if !self.link_targets.is_empty() {
            return self
                .link_targets
                .iter()
                .map(|stem| PathBuf::from("lib").join(format!("lib{}.a", stem)))
                .collect();
        }
        vec![PathBuf::from("include")]
    }

    /// Stem of the static library produced by manual compilation.
    pub fn lib_stem(&self) -> &str {
        self.link_targets
            .first()
            .map(String::as_str)
            .unwrap_or(&self.name)
    }

    /// Canonical file name for the cached archive.
    pub fn archive_file_name(&self) -> String {
        match self.archive_format {
            ArchiveFormat::Plain => self
                .source_urls
                .first()
                .and_then(|url| url.split(['?', '#']).next())
                .and_then(|path| path.rsplit('/').next())
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .unwrap_or_else(|| format!("{}-{}", self.name, self.version)),
            format => format!("{}-{}.{}", self.name, self.version, format.extension()),
        }
    }

    /// Fingerprint of every build-relevant field.
    ///
    /// Written to the completion stamp after a successful install; any
    /// change to the descriptor invalidates the cache entry.
    pub fn fingerprint(&self) -> String {
        let mut fp = Fingerprint::new();
        fp.update_str(&self.name)
            .update_str(&self.version)
            .update_strs(self.source_urls.iter().map(String::as_str))
            .update_str(&self.archive_format.to_string())
            .update_str(&self.build_kind.to_string());
        for flag in &self.build_flags {
            fp.update_str(&flag.name).update_opt(flag.value.as_deref());
        }
        fp.update_opt(self.source_marker.as_deref());
        for artifact in &self.expected_artifacts {
            fp.update_str(&artifact.to_string_lossy());
        }
        fp.update_strs(self.link_targets.iter().map(String::as_str))
            .update_opt(self.sha256.as_deref());
        fp.finish()
    }
}
