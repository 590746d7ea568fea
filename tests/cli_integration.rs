//! CLI integration tests for Quay.
//!
//! These tests verify the full CLI workflow against local sources only:
//! descriptors point at files on disk, so no network or build toolchain is
//! needed.

use std::fs;
use std::path::Path;
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use tempfile::TempDir;

/// Get the quay binary command.
fn quay() -> Command {
    Command::cargo_bin("quay").unwrap()
}

/// Create a temporary directory for test projects.
fn temp_dir() -> TempDir {
    TempDir::new().unwrap()
}

/// Write a Quay.toml with one header-only dependency backed by a local
/// file, plus the header itself. Returns the project directory.
fn header_project(tmp: &TempDir) -> std::path::PathBuf {
    let project = tmp.path().join("app");
    fs::create_dir_all(&project).unwrap();

    let header = project.join("demo.h");
    fs::write(&header, "#pragma once\nint demo(void);\n").unwrap();

    write_manifest(&project, &[header.to_string_lossy().into_owned()]);
    project
}

fn write_manifest(project: &Path, urls: &[String]) {
    let urls = urls
        .iter()
        .map(|u| format!("\"{}\"", u))
        .collect::<Vec<_>>()
        .join(", ");
    fs::write(
        project.join("Quay.toml"),
        format!(
            r#"[deps.demo]
version = "1.0.0"
urls = [{}]
archive = "plain"
build = "header-only"
marker = "demo.h"
artifacts = ["include/demo.h"]
"#,
            urls
        ),
    )
    .unwrap();
}

// ============================================================================
// quay list
// ============================================================================

#[test]
fn test_list_shows_catalog() {
    quay()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("gmp"))
        .stdout(predicate::str::contains("sqlite3-lite"))
        .stdout(predicate::str::contains("header-only"));
}

// ============================================================================
// quay add
// ============================================================================

#[test]
fn test_add_creates_manifest_entry() {
    let tmp = temp_dir();

    quay()
        .args(["add", "gmp"])
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("added `gmp`"));

    let manifest = fs::read_to_string(tmp.path().join("Quay.toml")).unwrap();
    assert!(manifest.contains("[deps.gmp]"));
    assert!(manifest.contains("preset = \"gmp\""));
}

#[test]
fn test_add_with_name_version_and_flags() {
    let tmp = temp_dir();

    quay()
        .args([
            "add",
            "sqlite3",
            "--name",
            "sqlite3-crypto",
            "--version",
            "3.46.0",
            "--flag",
            "-DSQLITE_HAS_CODEC",
        ])
        .current_dir(tmp.path())
        .assert()
        .success();

    let manifest = fs::read_to_string(tmp.path().join("Quay.toml")).unwrap();
    assert!(manifest.contains("[deps.sqlite3-crypto]"));
    assert!(manifest.contains("preset = \"sqlite3\""));
    assert!(manifest.contains("version = \"3.46.0\""));
    assert!(manifest.contains("-DSQLITE_HAS_CODEC"));
}

#[test]
fn test_add_duplicate_entry_fails() {
    let tmp = temp_dir();

    quay().args(["add", "gsl"]).current_dir(tmp.path()).assert().success();
    quay()
        .args(["add", "gsl"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("already"));
}

#[test]
fn test_add_unknown_preset_fails() {
    let tmp = temp_dir();

    quay()
        .args(["add", "no-such-preset"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown preset"))
        .stderr(predicate::str::contains("quay list"));
}

// ============================================================================
// quay ensure
// ============================================================================

#[test]
fn test_ensure_without_manifest_fails() {
    let tmp = temp_dir();

    quay()
        .arg("ensure")
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Quay.toml"));
}

#[test]
fn test_ensure_local_header_dep_then_cached() {
    let tmp = temp_dir();
    let project = header_project(&tmp);

    quay()
        .arg("ensure")
        .current_dir(&project)
        .assert()
        .success()
        .stdout(predicate::str::contains("demo 1.0.0 (built)"));

    assert!(project
        .join("download/demo/demo-install/include/demo.h")
        .exists());

    // Second run is served from the cache.
    quay()
        .arg("ensure")
        .current_dir(&project)
        .assert()
        .success()
        .stdout(predicate::str::contains("demo 1.0.0 (cached)"));

    // `list` reports the cache status of manifest deps.
    quay()
        .arg("list")
        .current_dir(&project)
        .assert()
        .success()
        .stdout(predicate::str::contains("dependencies in"))
        .stdout(predicate::str::contains("demo"));
}

#[test]
fn test_ensure_all_mirrors_down_prints_manual_hint() {
    let tmp = temp_dir();
    let project = tmp.path().join("app");
    fs::create_dir_all(&project).unwrap();
    write_manifest(
        &project,
        &[
            project.join("missing-a.h").to_string_lossy().into_owned(),
            project.join("missing-b.h").to_string_lossy().into_owned(),
        ],
    );

    quay()
        .arg("ensure")
        .current_dir(&project)
        .assert()
        .failure()
        .stderr(predicate::str::contains("mirror(s) unreachable"))
        .stderr(predicate::str::contains("Download manually"))
        .stderr(predicate::str::contains("missing-b.h"));
}

#[test]
fn test_ensure_respects_cache_dir_flag() {
    let tmp = temp_dir();
    let project = header_project(&tmp);
    let cache = tmp.path().join("elsewhere");

    quay()
        .args(["--cache-dir", cache.to_str().unwrap(), "ensure"])
        .current_dir(&project)
        .assert()
        .success();

    assert!(cache.join("demo/demo-install/include/demo.h").exists());
    assert!(!project.join("download").exists());
}

// ============================================================================
// quay plan
// ============================================================================

#[test]
fn test_plan_prints_flags() {
    let tmp = temp_dir();
    let project = header_project(&tmp);

    quay()
        .arg("plan")
        .current_dir(&project)
        .assert()
        .success()
        .stdout(predicate::str::contains("# demo 1.0.0"))
        .stdout(predicate::str::contains("-I"));
}

#[test]
fn test_plan_json_output() {
    let tmp = temp_dir();
    let project = header_project(&tmp);

    let output = quay()
        .args(["plan", "--json"])
        .current_dir(&project)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let plans: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(plans[0]["name"], "demo");
    assert_eq!(plans[0]["version"], "1.0.0");
    assert!(plans[0]["include_dirs"][0]
        .as_str()
        .unwrap()
        .ends_with("include"));
}

// ============================================================================
// quay clean
// ============================================================================

#[test]
fn test_clean_forces_rebuild() {
    let tmp = temp_dir();
    let project = header_project(&tmp);

    quay().arg("ensure").current_dir(&project).assert().success();
    assert!(project.join("download/demo").exists());

    quay()
        .args(["clean", "demo"])
        .current_dir(&project)
        .assert()
        .success()
        .stdout(predicate::str::contains("removed"));
    assert!(!project.join("download/demo").exists());

    quay()
        .arg("ensure")
        .current_dir(&project)
        .assert()
        .success()
        .stdout(predicate::str::contains("(built)"));
}

#[test]
fn test_clean_without_names_fails() {
    let tmp = temp_dir();
    let project = header_project(&tmp);

    quay()
        .arg("clean")
        .current_dir(&project)
        .assert()
        .failure()
        .stderr(predicate::str::contains("--all"));
}

// ============================================================================
// quay completions
// ============================================================================

#[test]
fn test_completions_bash() {
    quay()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("quay"));
}
