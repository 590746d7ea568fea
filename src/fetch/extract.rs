//! Archive extraction and source-directory normalization.
//!
//! Extraction always goes through a staging directory; the canonical
//! source path only appears once unpacking fully succeeded. Archives that
//! wrap their contents in a single versioned top-level directory
//! (`gmp-6.3.0/`) have that wrapper hoisted away, so the marker check can
//! use stable paths like `<src>/configure`.

use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};
use flate2::read::GzDecoder;
use xz2::read::XzDecoder;

use crate::core::descriptor::ArchiveFormat;
use crate::util::fs;

/// Extract `archive` into the canonical source directory `src_dir`,
/// replacing any previous contents.
pub fn extract(archive: &Path, format: ArchiveFormat, src_dir: &Path) -> Result<()> {
    let parent = src_dir
        .parent()
        .context("source directory has no parent")?;
    fs::ensure_dir(parent)?;
    fs::remove_dir_all_if_exists(src_dir)?;

    if format == ArchiveFormat::Plain {
        // No extraction: the download itself is the source file.
        fs::ensure_dir(src_dir)?;
        let name = archive
            .file_name()
            .context("archive path has no file name")?;
        std::fs::copy(archive, src_dir.join(name))
            .with_context(|| format!("failed to copy {}", archive.display()))?;
        return Ok(());
    }

    let staging = parent.join(".extract");
    fs::remove_dir_all_if_exists(&staging)?;
    fs::ensure_dir(&staging)?;

    unpack(archive, format, &staging)
        .with_context(|| format!("failed to extract {}", archive.display()))?;

    // Hoist a single wrapping directory to the canonical path.
    match fs::sole_subdirectory(&staging)? {
        Some(wrapper) => {
            std::fs::rename(&wrapper, src_dir).with_context(|| {
                format!("failed to move sources into {}", src_dir.display())
            })?;
            fs::remove_dir_all_if_exists(&staging)?;
        }
        None => {
            std::fs::rename(&staging, src_dir).with_context(|| {
                format!("failed to move sources into {}", src_dir.display())
            })?;
        }
    }

    Ok(())
}

fn unpack(archive: &Path, format: ArchiveFormat, dest: &Path) -> Result<()> {
    let file = File::open(archive)
        .with_context(|| format!("failed to open archive: {}", archive.display()))?;

    match format {
        ArchiveFormat::TarGz => {
            let mut tar = tar::Archive::new(GzDecoder::new(file));
            tar.unpack(dest)?;
        }
        ArchiveFormat::TarXz => {
            let mut tar = tar::Archive::new(XzDecoder::new(file));
            tar.unpack(dest)?;
        }
        ArchiveFormat::Zip => {
            let mut zip = zip::ZipArchive::new(file)?;
            zip.extract(dest)?;
        }
        ArchiveFormat::Plain => unreachable!("plain downloads are not unpacked"),
    }

    Ok(())
}
