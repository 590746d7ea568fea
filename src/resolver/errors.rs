//! Resolver error types and diagnostics.
//!
//! The taxonomy is deliberately small: network failures recover across the
//! mirror list and only become fatal when every mirror is exhausted;
//! build-tool failures are always fatal and never retried; cache
//! corruption is not auto-detected beyond the completion stamp and is
//! remediated manually with `quay clean`.

use std::fmt;

use thiserror::Error;

use crate::util::diagnostic::{suggestions, Diagnostic};

/// Stage of the build pipeline that runs an external tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Extract,
    Configure,
    Build,
    Install,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Stage::Extract => "extract",
            Stage::Configure => "configure",
            Stage::Build => "build",
            Stage::Install => "install",
        };
        write!(f, "{}", s)
    }
}

/// One failed download attempt.
#[derive(Debug, Clone)]
pub struct MirrorAttempt {
    /// URL tried.
    pub url: String,
    /// What went wrong.
    pub error: String,
}

/// Error during dependency resolution.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// Every mirror in the ordered list failed.
    #[error("failed to download `{name}`: all {} mirror(s) unreachable", .attempts.len())]
    AllMirrorsFailed {
        name: String,
        attempts: Vec<MirrorAttempt>,
        /// Copy-pasteable manual remediation.
        manual_hint: String,
    },

    /// The downloaded archive did not match its pinned checksum.
    #[error("checksum mismatch for `{name}` from {url}")]
    ChecksumMismatch {
        name: String,
        url: String,
        expected: String,
        actual: String,
    },

    /// A pipeline stage's tool exited non-zero. Always fatal, never
    /// retried.
    #[error("{stage} stage failed for `{name}`")]
    StageFailed {
        name: String,
        stage: Stage,
        #[source]
        source: anyhow::Error,
    },

    /// Install finished but an expected artifact is still missing; the
    /// descriptor's artifact list and the build disagree.
    #[error("`{name}` installed but expected artifact is missing: {artifact}")]
    ArtifactMissing { name: String, artifact: String },

    /// Offline mode with a cache miss.
    #[error("`{name}` is not cached and offline mode is enabled")]
    Offline { name: String },
}

impl ResolveError {
    /// Convert to a user-facing diagnostic with remediation suggestions.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            ResolveError::AllMirrorsFailed {
                name,
                attempts,
                manual_hint,
            } => {
                let mut diag = Diagnostic::error(format!(
                    "failed to download `{}`: all {} mirror(s) unreachable",
                    name,
                    attempts.len()
                ));
                for attempt in attempts {
                    diag = diag.with_context(format!("{}: {}", attempt.url, attempt.error));
                }
                diag.with_suggestion(manual_hint.clone())
                    .with_suggestion("Check proxy settings (HTTP(S)_PROXY is honored)")
            }

            ResolveError::ChecksumMismatch {
                name,
                url,
                expected,
                actual,
            } => Diagnostic::error(format!("checksum mismatch for `{}`", name))
                .with_context(format!("downloaded from {}", url))
                .with_context(format!("expected sha256 {}", expected))
                .with_context(format!("actual   sha256 {}", actual))
                .with_suggestion(format!(
                    "If the upstream archive legitimately changed, update `sha256` for [deps.{}]",
                    name
                )),

            ResolveError::StageFailed {
                name,
                stage,
                source,
            } => Diagnostic::error(format!("{} stage failed for `{}`", stage, name))
                .with_context(format!("{:#}", source))
                .with_suggestion(suggestions::CLEAN_CACHE.trim_start_matches("help: ").to_string()),

            ResolveError::ArtifactMissing { name, artifact } => {
                Diagnostic::error(format!("`{}` installed but `{}` is missing", name, artifact))
                    .with_context("the descriptor's expected artifacts and the build disagree")
                    .with_suggestion(format!(
                        "Fix `artifacts`/`link` for [deps.{}] or run `quay clean {}`",
                        name, name
                    ))
            }

            ResolveError::Offline { name } => {
                Diagnostic::error(format!("`{}` is not cached", name))
                    .with_context("offline mode is enabled; downloads are disabled")
                    .with_suggestion("Re-run without --offline to allow the download".to_string())
            }
        }
    }
}
