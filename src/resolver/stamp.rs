//! Cache completion stamps.
//!
//! Artifact existence alone cannot distinguish a finished install from an
//! interrupted one. The stamp is the commit marker: it is written only
//! after a fully successful install and contains the descriptor
//! fingerprint, so both partial installs and descriptor changes read as
//! cache misses.

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::util::fs;

/// Stamp file name, inside the install directory.
pub const STAMP_FILE: &str = ".quay-stamp";

/// Stamp path for an install directory.
pub fn stamp_path(install_dir: &Path) -> PathBuf {
    install_dir.join(STAMP_FILE)
}

/// Write the stamp after a successful install.
pub fn write(install_dir: &Path, fingerprint: &str) -> Result<()> {
    fs::write_string(&stamp_path(install_dir), &format!("{}\n", fingerprint))
}

/// Read the recorded fingerprint, if any.
pub fn read(install_dir: &Path) -> Option<String> {
    std::fs::read_to_string(stamp_path(install_dir))
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Whether the stamp exists and matches the given fingerprint.
pub fn is_fresh(install_dir: &Path, fingerprint: &str) -> bool {
    read(install_dir).as_deref() == Some(fingerprint)
}

/// Remove the stamp (marks the entry as not-built before mutating it).
pub fn clear(install_dir: &Path) -> Result<()> {
    fs::remove_file_if_exists(&stamp_path(install_dir))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_stamp_round_trip() {
        let tmp = TempDir::new().unwrap();
        let install = tmp.path().join("demo-install");

        assert!(!is_fresh(&install, "abc123"));

        write(&install, "abc123").unwrap();
        assert!(is_fresh(&install, "abc123"));
        assert_eq!(read(&install).as_deref(), Some("abc123"));

        // A descriptor change means a different fingerprint: stale.
        assert!(!is_fresh(&install, "def456"));

        clear(&install).unwrap();
        assert!(!is_fresh(&install, "abc123"));
    }

    #[test]
    fn test_empty_stamp_is_not_fresh() {
        let tmp = TempDir::new().unwrap();
        let install = tmp.path().join("demo-install");
        std::fs::create_dir_all(&install).unwrap();
        std::fs::write(stamp_path(&install), "\n").unwrap();
        assert!(read(&install).is_none());
    }
}
