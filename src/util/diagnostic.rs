//! User-friendly diagnostic messages.
//!
//! Every fatal error must name the failed stage and dependency and carry a
//! copy-pasteable remediation, so an operator can recover without reading
//! source.

use std::fmt;

use miette::{Diagnostic as MietteDiagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Common suggestion messages for consistent error handling.
pub mod suggestions {
    /// Suggestion when no manifest file is found.
    pub const NO_MANIFEST: &str = "help: Create a Quay.toml, or add a dependency with `quay add <preset>`";

    /// Suggestion when a cache subtree may be inconsistent.
    pub const CLEAN_CACHE: &str = "help: Run `quay clean <name>` to force a full re-download and rebuild";

    /// Suggestion when a preset is unknown.
    pub const UNKNOWN_PRESET: &str = "help: Run `quay list` to see the built-in catalog";
}

/// A fatal diagnostic message with optional suggestions.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    /// Primary message
    pub message: String,
    /// Additional context lines
    pub context: Vec<String>,
    /// Suggested fixes
    pub suggestions: Vec<String>,
}

impl Diagnostic {
    /// Create a new error diagnostic.
    pub fn error(message: impl Into<String>) -> Self {
        Diagnostic {
            message: message.into(),
            context: Vec::new(),
            suggestions: Vec::new(),
        }
    }

    /// Add context to the diagnostic.
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context.push(context.into());
        self
    }

    /// Add a suggestion for fixing the issue.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    /// Format the diagnostic for terminal output.
    pub fn format(&self, color: bool) -> String {
        let mut output = String::new();

        let severity_str = if color {
            "\x1b[1;31merror\x1b[0m"
        } else {
            "error"
        };

        output.push_str(&format!("{}: {}\n", severity_str, self.message));

        for ctx in &self.context {
            output.push_str(&format!("  - {}\n", ctx));
        }

        if !self.suggestions.is_empty() {
            output.push('\n');
            let help_prefix = if color {
                "\x1b[1;32mhelp\x1b[0m"
            } else {
                "help"
            };
            output.push_str(&format!("{}: consider:\n", help_prefix));
            for (i, suggestion) in self.suggestions.iter().enumerate() {
                output.push_str(&format!("  {}. {}\n", i + 1, suggestion));
            }
        }

        output
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format(false))
    }
}

/// Manifest parse error with a labeled source span.
#[derive(Debug, Error, MietteDiagnostic)]
#[error("failed to parse manifest")]
#[diagnostic(
    code(quay::manifest::parse),
    help("Check the [deps.<name>] tables in Quay.toml against `quay list`")
)]
pub struct ManifestParseError {
    #[source_code]
    pub src: NamedSource<String>,
    #[label("{message}")]
    pub span: Option<SourceSpan>,
    pub message: String,
}

/// Print a diagnostic to stderr.
pub fn emit(diagnostic: &Diagnostic, color: bool) {
    eprint!("{}", diagnostic.format(color));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_formatting() {
        let diag = Diagnostic::error("failed to download `gmp`")
            .with_context("tried 2 mirror(s), all unreachable")
            .with_suggestion("Download manually: curl -L -o download/gmp/gmp-6.3.0.tar.xz <url>")
            .with_suggestion("Check proxy settings (HTTPS_PROXY is honored)");

        let output = diag.format(false);
        assert!(output.contains("error: failed to download `gmp`"));
        assert!(output.contains("all unreachable"));
        assert!(output.contains("help: consider:"));
        assert!(output.contains("1. Download manually"));
    }
}
