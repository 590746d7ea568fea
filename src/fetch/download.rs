//! Archive downloading.
//!
//! One attempt per call; the resolver iterates the mirror list. A failed
//! attempt never leaves a partial file behind: data is streamed to a
//! `.part` file that is renamed into place only on success.
//!
//! `file://` URLs (and bare filesystem paths) are served by copying, which
//! keeps local mirrors and hermetic tests on the same code path. Proxy
//! environment variables are honored transparently by the HTTP client.

use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use url::Url;

/// Fixed per-attempt timeout for the whole transfer. There is no backoff:
/// a slow mirror is simply skipped in favor of the next one.
pub const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(300);

/// Connection establishment timeout.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Build the blocking HTTP client used for all download attempts.
pub fn http_client() -> Result<reqwest::blocking::Client> {
    reqwest::blocking::Client::builder()
        .timeout(DOWNLOAD_TIMEOUT)
        .connect_timeout(CONNECT_TIMEOUT)
        .build()
        .context("failed to build HTTP client")
}

/// Download a single URL to `dest`. Returns the byte count.
pub fn download_one(client: &reqwest::blocking::Client, url: &str, dest: &Path) -> Result<u64> {
    if let Some(parent) = dest.parent() {
        crate::util::fs::ensure_dir(parent)?;
    }

    let part = part_path(dest);
    let result = download_to_part(client, url, &part);

    match result {
        Ok(bytes) => {
            std::fs::rename(&part, dest)
                .with_context(|| format!("failed to move download into place: {}", dest.display()))?;
            tracing::info!("downloaded {} ({} bytes)", url, bytes);
            Ok(bytes)
        }
        Err(e) => {
            // Never leave a partial file for the next run to mistake for a
            // completed download.
            let _ = std::fs::remove_file(&part);
            Err(e)
        }
    }
}

/// In-progress download path: `<dest>.part`.
fn part_path(dest: &Path) -> PathBuf {
    let mut os = dest.as_os_str().to_os_string();
    os.push(".part");
    PathBuf::from(os)
}

fn download_to_part(client: &reqwest::blocking::Client, url: &str, part: &Path) -> Result<u64> {
    match Url::parse(url) {
        Ok(parsed) if parsed.scheme() == "file" => {
            let source = parsed
                .to_file_path()
                .map_err(|_| anyhow::anyhow!("invalid file URL: {}", url))?;
            copy_local(&source, part)
        }
        Ok(parsed) if parsed.scheme() == "http" || parsed.scheme() == "https" => {
            fetch_http(client, parsed, part)
        }
        Ok(parsed) => bail!("unsupported URL scheme `{}` in {}", parsed.scheme(), url),
        // Not a URL at all; treat as a local path (operator-provided
        // manual-download fallback).
        Err(_) => copy_local(&PathBuf::from(url), part),
    }
}

fn copy_local(source: &Path, part: &Path) -> Result<u64> {
    if !source.is_file() {
        bail!("local source not found: {}", source.display());
    }
    std::fs::copy(source, part)
        .with_context(|| format!("failed to copy {}", source.display()))
}

fn fetch_http(client: &reqwest::blocking::Client, url: Url, part: &Path) -> Result<u64> {
    let mut response = client
        .get(url.clone())
        .send()
        .with_context(|| format!("request to {} failed", url))?;

    if !response.status().is_success() {
        bail!("{} answered HTTP {}", url, response.status());
    }

    let progress = match response.content_length() {
        Some(len) => {
            let pb = ProgressBar::new(len);
            pb.set_style(
                ProgressStyle::with_template("{bar:40.cyan/blue} {bytes}/{total_bytes} {msg}")
                    .expect("static progress template"),
            );
            pb.set_message(
                url.path_segments()
                    .and_then(|mut s| s.next_back())
                    .unwrap_or("download")
                    .to_string(),
            );
            pb
        }
        None => ProgressBar::hidden(),
    };

    let mut file = File::create(part)
        .with_context(|| format!("failed to create {}", part.display()))?;

    let mut total: u64 = 0;
    let mut buffer = [0u8; 64 * 1024];
    loop {
        let n = response
            .read(&mut buffer)
            .with_context(|| format!("transfer from {} interrupted", url))?;
        if n == 0 {
            break;
        }
        file.write_all(&buffer[..n])
            .with_context(|| format!("failed to write {}", part.display()))?;
        total += n as u64;
        progress.set_position(total);
    }
    progress.finish_and_clear();

    file.flush()?;
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_download_local_path() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("src.tar.gz");
        std::fs::write(&source, b"archive bytes").unwrap();

        let dest = tmp.path().join("cache/archive.tar.gz");
        let client = http_client().unwrap();
        let bytes = download_one(&client, source.to_str().unwrap(), &dest).unwrap();

        assert_eq!(bytes, 13);
        assert_eq!(std::fs::read(&dest).unwrap(), b"archive bytes");
        assert!(!super::part_path(&dest).exists());
    }

    #[test]
    fn test_download_file_url() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("header.h");
        std::fs::write(&source, "#pragma once\n").unwrap();

        let url = Url::from_file_path(&source).unwrap();
        let dest = tmp.path().join("out/header.h");
        let client = http_client().unwrap();
        download_one(&client, url.as_str(), &dest).unwrap();

        assert!(dest.exists());
    }

    #[test]
    fn test_failed_download_leaves_no_partial_file() {
        let tmp = TempDir::new().unwrap();
        let dest = tmp.path().join("cache/missing.tar.gz");
        let client = http_client().unwrap();

        let missing = tmp.path().join("does-not-exist.tar.gz");
        let err = download_one(&client, missing.to_str().unwrap(), &dest);

        assert!(err.is_err());
        assert!(!dest.exists());
        assert!(!super::part_path(&dest).exists());
    }

    #[test]
    fn test_unsupported_scheme_is_rejected() {
        let tmp = TempDir::new().unwrap();
        let dest = tmp.path().join("x");
        let client = http_client().unwrap();
        let err = download_one(&client, "ftp://example.com/x.tar.gz", &dest).unwrap_err();
        assert!(format!("{}", err).contains("unsupported URL scheme"));
    }
}
