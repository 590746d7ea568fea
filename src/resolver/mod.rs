//! The dependency acquisition resolver.
//!
//! [`Resolver::ensure`] makes one dependency available for linking,
//! idempotently. The fast path is a pure filesystem check (completion
//! stamp plus expected artifacts); everything else runs the full
//! acquire/extract/configure/build/install pipeline under an advisory
//! lock on the dependency's cache subtree.

pub mod errors;
pub mod lock;
pub mod stamp;

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::build::{self, StageContext};
use crate::core::descriptor::DependencyDescriptor;
use crate::core::link_plan::LinkPlan;
use crate::fetch;
use crate::resolver::errors::{MirrorAttempt, ResolveError, Stage};
use crate::resolver::lock::CacheLock;
use crate::util::config::GlobalContext;
use crate::util::{fs, hash};

/// Cache paths for one dependency.
///
/// Layout: `<cache>/<name>/<name>/` holds the source tree,
/// `<cache>/<name>/<name>-install/{include,lib}` the durable artifacts.
/// Deleting `<cache>/<name>` forces a clean re-acquisition and rebuild.
#[derive(Debug, Clone)]
pub struct DepPaths {
    /// Dependency cache subtree root.
    pub root: PathBuf,
    /// Canonical source directory.
    pub src_dir: PathBuf,
    /// Out-of-tree build directory.
    pub build_dir: PathBuf,
    /// Install prefix.
    pub install_dir: PathBuf,
}

impl DepPaths {
    /// Compute the paths for a dependency under a cache root.
    pub fn new(cache_root: &Path, name: &str) -> DepPaths {
        let root = cache_root.join(name);
        DepPaths {
            src_dir: root.join(name),
            build_dir: root.join("build"),
            install_dir: root.join(format!("{}-install", name)),
            root,
        }
    }
}

/// Resolves descriptors into link plans, caching on disk.
pub struct Resolver {
    ctx: GlobalContext,
}

impl Resolver {
    /// Create a resolver over the given context.
    pub fn new(ctx: GlobalContext) -> Resolver {
        Resolver { ctx }
    }

    /// The context in use.
    pub fn context(&self) -> &GlobalContext {
        &self.ctx
    }

    /// Make `descriptor` available for linking and return its link plan.
    ///
    /// Idempotent: when the completion stamp matches the descriptor
    /// fingerprint and every expected artifact exists, no network or
    /// subprocess action is taken.
    pub fn ensure(&self, descriptor: &DependencyDescriptor) -> Result<LinkPlan> {
        descriptor.validate()?;

        let paths = DepPaths::new(&self.ctx.cache_root, &descriptor.name);
        let _lock = CacheLock::acquire(&paths.root)?;

        if self.is_cached(descriptor) {
            tracing::info!("`{}` {}: cached", descriptor.name, descriptor.version);
            return self.emit_plan(descriptor, &paths, true);
        }

        // About to mutate the entry: it is no longer committed.
        stamp::clear(&paths.install_dir)?;

        if !self.source_ready(descriptor, &paths) {
            if self.ctx.offline {
                return Err(ResolveError::Offline {
                    name: descriptor.name.clone(),
                }
                .into());
            }
            self.acquire_source(descriptor, &paths)?;
        } else {
            tracing::debug!(
                "`{}`: source already present at {}",
                descriptor.name,
                paths.src_dir.display()
            );
        }

        fs::ensure_dir(&paths.install_dir)?;
        let steps = build::steps_for(descriptor.build_kind);
        let stage_ctx = StageContext {
            descriptor,
            source_dir: &paths.src_dir,
            build_dir: &paths.build_dir,
            install_dir: &paths.install_dir,
            jobs: self.ctx.jobs,
        };

        run_stage(descriptor, Stage::Configure, || steps.configure(&stage_ctx))?;
        run_stage(descriptor, Stage::Build, || steps.build(&stage_ctx))?;
        run_stage(descriptor, Stage::Install, || steps.install(&stage_ctx))?;

        if let Some(artifact) = missing_artifact(descriptor, &paths.install_dir) {
            return Err(ResolveError::ArtifactMissing {
                name: descriptor.name.clone(),
                artifact: artifact.display().to_string(),
            }
            .into());
        }

        // Commit only after a fully successful install.
        stamp::write(&paths.install_dir, &descriptor.fingerprint())?;
        tracing::info!(
            "`{}` {}: built and installed",
            descriptor.name,
            descriptor.version
        );

        self.emit_plan(descriptor, &paths, false)
    }

    /// Whether `descriptor` would be served from the cache fast path:
    /// committed stamp matching the fingerprint, all artifacts present.
    /// Read-only probe, takes no lock.
    pub fn is_cached(&self, descriptor: &DependencyDescriptor) -> bool {
        let paths = DepPaths::new(&self.ctx.cache_root, &descriptor.name);
        stamp::is_fresh(&paths.install_dir, &descriptor.fingerprint())
            && missing_artifact(descriptor, &paths.install_dir).is_none()
    }

    /// Whether the acquisition step can be skipped.
    fn source_ready(&self, descriptor: &DependencyDescriptor, paths: &DepPaths) -> bool {
        match descriptor.effective_marker() {
            Some(marker) => paths.src_dir.join(marker).is_file(),
            None => std::fs::read_dir(&paths.src_dir)
                .map(|mut entries| entries.next().is_some())
                .unwrap_or(false),
        }
    }

    /// Download (first reachable mirror wins) and extract the source.
    fn acquire_source(&self, descriptor: &DependencyDescriptor, paths: &DepPaths) -> Result<()> {
        let archive = paths.root.join(descriptor.archive_file_name());

        // The origin that actually produced the archive, for checksum
        // reporting: a mirror URL, or the on-disk path when reused.
        let mut fetched_from = None;

        if archive.is_file() {
            tracing::debug!("reusing downloaded archive {}", archive.display());
        } else {
            let client = fetch::http_client()?;
            let mut attempts = Vec::new();

            for url in &descriptor.source_urls {
                tracing::info!("`{}`: downloading {}", descriptor.name, url);
                match fetch::download_one(&client, url, &archive) {
                    Ok(_) => {
                        fetched_from = Some(url.clone());
                        break;
                    }
                    Err(e) => {
                        tracing::warn!("mirror failed: {}: {:#}", url, e);
                        attempts.push(MirrorAttempt {
                            url: url.clone(),
                            error: format!("{:#}", e),
                        });
                    }
                }
            }

            if fetched_from.is_none() {
                return Err(ResolveError::AllMirrorsFailed {
                    name: descriptor.name.clone(),
                    manual_hint: manual_download_hint(descriptor, &archive),
                    attempts,
                }
                .into());
            }
        }

        if let Some(expected) = &descriptor.sha256 {
            let actual = hash::sha256_file(&archive)?;
            if &actual != expected {
                let origin =
                    fetched_from.unwrap_or_else(|| archive.display().to_string());
                // Poisoned download must not be reused on the next run.
                fs::remove_file_if_exists(&archive)?;
                return Err(ResolveError::ChecksumMismatch {
                    name: descriptor.name.clone(),
                    url: origin,
                    expected: expected.clone(),
                    actual,
                }
                .into());
            }
        }

        fetch::extract(&archive, descriptor.archive_format, &paths.src_dir).map_err(|source| {
            ResolveError::StageFailed {
                name: descriptor.name.clone(),
                stage: Stage::Extract,
                source,
            }
        })?;

        Ok(())
    }

    /// Build the link plan from the install directory.
    fn emit_plan(
        &self,
        descriptor: &DependencyDescriptor,
        paths: &DepPaths,
        from_cache: bool,
    ) -> Result<LinkPlan> {
        let include = paths.install_dir.join("include");
        let include_dirs = if include.is_dir() {
            vec![include]
        } else {
            Vec::new()
        };

        let lib_dir = paths.install_dir.join("lib");
        let libraries = if !descriptor.link_targets.is_empty() {
            // Mandated order, verbatim.
            descriptor
                .link_targets
                .iter()
                .map(|stem| lib_dir.join(format!("lib{}.a", stem)))
                .collect()
        } else {
            fs::glob_files(&lib_dir, &["*.a"]).unwrap_or_default()
        };

        Ok(LinkPlan {
            name: descriptor.name.clone(),
            version: descriptor.version.clone(),
            include_dirs,
            libraries,
            from_cache,
        })
    }
}

/// First expected artifact that does not exist, if any.
fn missing_artifact(descriptor: &DependencyDescriptor, install_dir: &Path) -> Option<PathBuf> {
    descriptor
        .effective_artifacts()
        .into_iter()
        .find(|rel| !install_dir.join(rel).exists())
}

/// Run one pipeline stage; a failure is fatal and carries the stage name.
fn run_stage(
    descriptor: &DependencyDescriptor,
    stage: Stage,
    f: impl FnOnce() -> Result<()>,
) -> Result<()> {
    tracing::debug!("`{}`: {} stage", descriptor.name, stage);
    f().map_err(|source| {
        ResolveError::StageFailed {
            name: descriptor.name.clone(),
            stage,
            source,
        }
        .into()
    })
}

/// Copy-pasteable fallback for when every mirror is unreachable: fetch the
/// last URL by hand into the exact path the resolver expects.
fn manual_download_hint(descriptor: &DependencyDescriptor, archive: &Path) -> String {
    let last_url = descriptor
        .source_urls
        .last()
        .map(String::as_str)
        .unwrap_or("<url>");
    format!(
        "Download manually: curl -L -o {} {}",
        archive.display(),
        last_url
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::descriptor::{ArchiveFormat, BuildKind};
    use tempfile::TempDir;

    /// Header-only descriptor backed by a plain local file, so tests stay
    /// hermetic (no network, no build tools).
    fn header_dep(name: &str, source: &Path) -> DependencyDescriptor {
        let mut d = DependencyDescriptor::new(name, "1.0.0", BuildKind::HeaderOnly);
        d.archive_format = ArchiveFormat::Plain;
        d.source_urls = vec![source.to_string_lossy().into_owned()];
        d.source_marker = Some(
            source
                .file_name()
                .unwrap()
                .to_string_lossy()
                .into_owned(),
        );
        d.expected_artifacts = vec![PathBuf::from("include")
            .join(source.file_name().unwrap())];
        d
    }

    fn resolver(tmp: &TempDir) -> Resolver {
        Resolver::new(GlobalContext::new(tmp.path().join("download")))
    }

    #[test]
    fn test_cold_cache_then_idempotent_hit() {
        let tmp = TempDir::new().unwrap();
        let header = tmp.path().join("demo.h");
        std::fs::write(&header, "#pragma once\n").unwrap();

        let d = header_dep("demo", &header);
        let r = resolver(&tmp);

        // Cold cache: full acquisition + install.
        let first = r.ensure(&d).unwrap();
        assert!(!first.from_cache);
        let installed = tmp.path().join("download/demo/demo-install/include/demo.h");
        assert!(installed.exists());

        // Second run must be served purely from the cache: removing the
        // upstream file proves no acquisition happens.
        std::fs::remove_file(&header).unwrap();
        // The cached archive copy must also not be needed for a hit.
        std::fs::remove_file(tmp.path().join("download/demo/demo.h")).unwrap();

        let second = r.ensure(&d).unwrap();
        assert!(second.from_cache);
        assert_eq!(second.include_dirs.len(), 1);
    }

    #[test]
    fn test_mirror_fallback_uses_last_reachable_url() {
        let tmp = TempDir::new().unwrap();
        let header = tmp.path().join("real.h");
        std::fs::write(&header, "#pragma once\n").unwrap();

        let mut d = header_dep("fallback", &header);
        d.source_urls = vec![
            tmp.path().join("missing-1.h").to_string_lossy().into_owned(),
            tmp.path().join("missing-2.h").to_string_lossy().into_owned(),
            header.to_string_lossy().into_owned(),
        ];
        // The canonical archive name comes from the first URL for plain
        // downloads; the installed header keeps that name.
        d.source_marker = Some("missing-1.h".to_string());
        d.expected_artifacts = vec![PathBuf::from("include/missing-1.h")];

        let plan = resolver(&tmp).ensure(&d).unwrap();
        assert!(!plan.from_cache);
        assert!(tmp
            .path()
            .join("download/fallback/fallback-install/include/missing-1.h")
            .exists());
    }

    #[test]
    fn test_all_mirrors_down_is_fatal_with_manual_hint() {
        let tmp = TempDir::new().unwrap();
        let bad1 = tmp.path().join("bad1.h");
        let bad2 = tmp.path().join("bad2.h");

        let mut d = header_dep("down", &bad1);
        d.source_urls = vec![
            bad1.to_string_lossy().into_owned(),
            bad2.to_string_lossy().into_owned(),
        ];

        let err = resolver(&tmp).ensure(&d).unwrap_err();
        match err.downcast_ref::<ResolveError>() {
            Some(ResolveError::AllMirrorsFailed {
                attempts,
                manual_hint,
                ..
            }) => {
                // Exactly one attempt per mirror, in order.
                assert_eq!(attempts.len(), 2);
                assert!(attempts[0].url.ends_with("bad1.h"));
                assert!(attempts[1].url.ends_with("bad2.h"));
                // The hint names the last URL.
                assert!(manual_hint.contains("bad2.h"));
                assert!(manual_hint.contains("curl -L -o"));
            }
            other => panic!("expected AllMirrorsFailed, got {:?}", other),
        }
    }

    #[test]
    fn test_offline_cache_miss_fails_fast() {
        let tmp = TempDir::new().unwrap();
        let header = tmp.path().join("off.h");
        std::fs::write(&header, "#pragma once\n").unwrap();

        let d = header_dep("off", &header);
        let ctx = GlobalContext::new(tmp.path().join("download")).with_offline(true);
        let err = Resolver::new(ctx).ensure(&d).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ResolveError>(),
            Some(ResolveError::Offline { .. })
        ));
    }

    #[test]
    fn test_offline_cache_hit_succeeds() {
        let tmp = TempDir::new().unwrap();
        let header = tmp.path().join("warm.h");
        std::fs::write(&header, "#pragma once\n").unwrap();

        let d = header_dep("warm", &header);
        resolver(&tmp).ensure(&d).unwrap();

        let ctx = GlobalContext::new(tmp.path().join("download")).with_offline(true);
        let plan = Resolver::new(ctx).ensure(&d).unwrap();
        assert!(plan.from_cache);
    }

    #[test]
    fn test_artifacts_without_stamp_trigger_rebuild() {
        let tmp = TempDir::new().unwrap();
        let header = tmp.path().join("partial.h");
        std::fs::write(&header, "#pragma once // v2\n").unwrap();

        let d = header_dep("partial", &header);
        let paths = DepPaths::new(&tmp.path().join("download"), "partial");

        // Simulate an interrupted prior run: the artifact exists but no
        // completion stamp was ever written.
        let stale = paths.install_dir.join("include/partial.h");
        std::fs::create_dir_all(stale.parent().unwrap()).unwrap();
        std::fs::write(&stale, "truncated garbag").unwrap();

        let plan = resolver(&tmp).ensure(&d).unwrap();
        assert!(!plan.from_cache);
        assert_eq!(
            std::fs::read_to_string(&stale).unwrap(),
            "#pragma once // v2\n"
        );
    }

    #[test]
    fn test_descriptor_change_invalidates_stamp() {
        let tmp = TempDir::new().unwrap();
        let header = tmp.path().join("bump.h");
        std::fs::write(&header, "#pragma once\n").unwrap();

        let d = header_dep("bump", &header);
        let r = resolver(&tmp);
        assert!(!r.ensure(&d).unwrap().from_cache);
        assert!(r.ensure(&d).unwrap().from_cache);

        // Same artifacts, different descriptor: must rebuild.
        let mut changed = d.clone();
        changed.version = "1.0.1".to_string();
        assert!(!r.ensure(&changed).unwrap().from_cache);
    }

    #[test]
    fn test_cache_subtree_isolation() {
        let tmp = TempDir::new().unwrap();
        let h1 = tmp.path().join("one.h");
        let h2 = tmp.path().join("two.h");
        std::fs::write(&h1, "1\n").unwrap();
        std::fs::write(&h2, "2\n").unwrap();

        let r = resolver(&tmp);
        r.ensure(&header_dep("one", &h1)).unwrap();
        r.ensure(&header_dep("two", &h2)).unwrap();

        let one = tmp.path().join("download/one");
        let two = tmp.path().join("download/two");
        assert!(one.join("one-install/include/one.h").exists());
        assert!(two.join("two-install/include/two.h").exists());
        assert!(!one.join("one-install/include/two.h").exists());
        assert!(!two.join("two-install/include/one.h").exists());
    }

    #[test]
    fn test_cached_plan_preserves_link_order() {
        let tmp = TempDir::new().unwrap();
        let cache_root = tmp.path().join("download");

        let mut d = DependencyDescriptor::new("pair", "1.0.0", BuildKind::Autotools);
        d.source_urls = vec!["https://example.invalid/pair.tar.gz".to_string()];
        d.link_targets = vec!["pairxx".to_string(), "pair".to_string()];

        // Pre-populate a committed cache entry by hand.
        let paths = DepPaths::new(&cache_root, "pair");
        let lib = paths.install_dir.join("lib");
        std::fs::create_dir_all(&lib).unwrap();
        std::fs::write(lib.join("libpairxx.a"), "!<arch>\n").unwrap();
        std::fs::write(lib.join("libpair.a"), "!<arch>\n").unwrap();
        stamp::write(&paths.install_dir, &d.fingerprint()).unwrap();

        let plan = Resolver::new(GlobalContext::new(cache_root)).ensure(&d).unwrap();
        assert!(plan.from_cache);
        assert_eq!(plan.lib_stems(), vec!["pairxx", "pair"]);
    }

    #[test]
    fn test_checksum_mismatch_removes_archive() {
        let tmp = TempDir::new().unwrap();
        let header = tmp.path().join("sum.h");
        std::fs::write(&header, "#pragma once\n").unwrap();

        let mut d = header_dep("sum", &header);
        d.sha256 = Some("0".repeat(64));

        let err = resolver(&tmp).ensure(&d).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ResolveError>(),
            Some(ResolveError::ChecksumMismatch { .. })
        ));
        assert!(!tmp.path().join("download/sum/sum.h").exists());
    }

    #[test]
    fn test_checksum_mismatch_names_serving_mirror() {
        let tmp = TempDir::new().unwrap();
        let real = tmp.path().join("real.h");
        std::fs::write(&real, "#pragma once\n").unwrap();

        // First mirror is dead; the archive comes from the second. The
        // mismatch report must name the mirror that actually served it.
        let mut d = header_dep("which", &real);
        d.source_urls = vec![
            tmp.path().join("dead.h").to_string_lossy().into_owned(),
            real.to_string_lossy().into_owned(),
        ];
        d.sha256 = Some("0".repeat(64));

        let err = resolver(&tmp).ensure(&d).unwrap_err();
        match err.downcast_ref::<ResolveError>() {
            Some(ResolveError::ChecksumMismatch { url, .. }) => {
                assert!(url.ends_with("real.h"), "reported {}", url);
            }
            other => panic!("expected ChecksumMismatch, got {:?}", other),
        }
    }
}
