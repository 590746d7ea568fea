//! Manual compilation for libraries shipping bare sources with no build
//! system (ALGLIB, the SQLite amalgamation): compile every translation
//! unit directly, archive the objects with `ar rcs`, and copy headers.

use std::path::PathBuf;

use anyhow::{bail, Result};
use walkdir::WalkDir;

use crate::build::{BuildSteps, StageContext};
use crate::util::fs;
use crate::util::process::{find_ar, find_c_compiler, find_cxx_compiler, ProcessBuilder};

/// Source patterns searched, shallow then one level deep: the amalgamation
/// drops `sqlite3.c` at the root, ALGLIB keeps its units under `src/`.
const SOURCE_PATTERNS: &[&str] = &["*.c", "*.cc", "*.cpp", "src/*.c", "src/*.cc", "src/*.cpp"];

/// Direct-compile workflow. Build flags are raw compiler arguments.
pub struct ManualCompile;

impl BuildSteps for ManualCompile {
    fn configure(&self, _ctx: &StageContext<'_>) -> Result<()> {
        Ok(())
    }

    fn build(&self, ctx: &StageContext<'_>) -> Result<()> {
        let sources = fs::glob_files(ctx.source_dir, SOURCE_PATTERNS)?;
        if sources.is_empty() {
            bail!(
                "no C/C++ sources found under {}",
                ctx.source_dir.display()
            );
        }

        fs::ensure_dir(ctx.build_dir)?;

        for (index, source) in sources.iter().enumerate() {
            let is_c = source.extension().is_some_and(|e| e == "c");
            let compiler = if is_c {
                find_c_compiler().ok_or_else(|| anyhow::anyhow!("no C compiler found in PATH"))?
            } else {
                find_cxx_compiler()
                    .ok_or_else(|| anyhow::anyhow!("no C++ compiler found in PATH"))?
            };

            let stem = source
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "unit".to_string());
            let object = ctx.build_dir.join(format!("{}-{}.o", index, stem));

            let mut cmd = ProcessBuilder::new(compiler);
            for flag in &ctx.descriptor.build_flags {
                cmd = cmd.arg(flag.as_compiler_arg());
            }
            cmd.arg("-I")
                .arg(ctx.source_dir)
                .arg("-c")
                .arg(source)
                .arg("-o")
                .arg(&object)
                .exec_and_check()?;
        }

        Ok(())
    }

    fn install(&self, ctx: &StageContext<'_>) -> Result<()> {
        let objects = objects_in(ctx.build_dir)?;
        if objects.is_empty() {
            bail!("no objects to archive in {}", ctx.build_dir.display());
        }

        let lib_dir = ctx.install_dir.join("lib");
        fs::ensure_dir(&lib_dir)?;

        let ar = find_ar().ok_or_else(|| anyhow::anyhow!("`ar` not found in PATH"))?;
        let archive = lib_dir.join(format!("lib{}.a", ctx.descriptor.lib_stem()));
        fs::remove_file_if_exists(&archive)?;

        ProcessBuilder::new(ar)
            .arg("rcs")
            .arg(&archive)
            .args(&objects)
            .exec_and_check()?;

        copy_headers(ctx)?;
        Ok(())
    }
}

fn objects_in(build_dir: &std::path::Path) -> Result<Vec<PathBuf>> {
    let mut objects = fs::glob_files(build_dir, &["*.o"])?;
    objects.sort();
    Ok(objects)
}

/// Copy every header under the source tree into `include/`, preserving
/// relative paths.
fn copy_headers(ctx: &StageContext<'_>) -> Result<()> {
    let include_dir = ctx.install_dir.join("include");
    fs::ensure_dir(&include_dir)?;

    for entry in WalkDir::new(ctx.source_dir).into_iter().filter_map(|e| e.ok()) {
        if !entry.file_type().is_file() {
            continue;
        }
        let is_header = entry
            .path()
            .extension()
            .is_some_and(|e| e == "h" || e == "hpp");
        if !is_header {
            continue;
        }
        let rel = entry
            .path()
            .strip_prefix(ctx.source_dir)
            .expect("walkdir stays under its root");
        let dest = include_dir.join(rel);
        if let Some(parent) = dest.parent() {
            fs::ensure_dir(parent)?;
        }
        std::fs::copy(entry.path(), &dest)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::descriptor::{BuildFlag, BuildKind, DependencyDescriptor};
    use tempfile::TempDir;

    /// End-to-end compile of a two-unit library. Skipped when no toolchain
    /// is available (CI images without cc/ar).
    #[test]
    fn test_compile_and_archive() {
        if find_c_compiler().is_none() || find_ar().is_none() {
            return;
        }

        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("src");
        let build = tmp.path().join("build");
        let install = tmp.path().join("install");
        std::fs::create_dir_all(&src).unwrap();
        std::fs::write(src.join("add.c"), "int add(int a, int b) { return a + b; }\n").unwrap();
        std::fs::write(src.join("add.h"), "int add(int a, int b);\n").unwrap();

        let mut d = DependencyDescriptor::new("demo", "1.0.0", BuildKind::ManualCompile);
        d.source_urls = vec!["https://example.com/demo.tar.gz".to_string()];
        d.build_flags = vec![BuildFlag::switch("-O2"), BuildFlag::switch("-fPIC")];
        d.link_targets = vec!["demo".to_string()];

        let ctx = StageContext {
            descriptor: &d,
            source_dir: &src,
            build_dir: &build,
            install_dir: &install,
            jobs: 1,
        };

        ManualCompile.configure(&ctx).unwrap();
        ManualCompile.build(&ctx).unwrap();
        ManualCompile.install(&ctx).unwrap();

        assert!(install.join("lib/libdemo.a").exists());
        assert!(install.join("include/add.h").exists());
    }

    #[test]
    fn test_build_fails_without_sources() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("src");
        std::fs::create_dir_all(&src).unwrap();

        let mut d = DependencyDescriptor::new("empty", "1.0.0", BuildKind::ManualCompile);
        d.source_urls = vec!["https://example.com/empty.tar.gz".to_string()];

        let ctx = StageContext {
            descriptor: &d,
            source_dir: &src,
            build_dir: &tmp.path().join("build"),
            install_dir: &tmp.path().join("install"),
            jobs: 1,
        };

        assert!(ManualCompile.build(&ctx).is_err());
    }
}
