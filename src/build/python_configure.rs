//! `configure.py`-driven builds (Botan style): a Python configure script
//! generates a Makefile in the source tree, then make builds and installs.

use anyhow::{bail, Result};

use crate::build::{BuildSteps, StageContext};
use crate::util::process::{find_executable, find_python, ProcessBuilder};

/// Python-configure workflow. Builds in-tree; the build directory is the
/// source directory because that is where `configure.py` writes its
/// Makefile.
pub struct PythonConfigure;

impl BuildSteps for PythonConfigure {
    fn configure(&self, ctx: &StageContext<'_>) -> Result<()> {
        let script = ctx.source_dir.join("configure.py");
        if !script.is_file() {
            bail!(
                "no configure.py in {} (incomplete source tree?)",
                ctx.source_dir.display()
            );
        }

        let python = find_python()
            .ok_or_else(|| anyhow::anyhow!("no python3 interpreter found in PATH"))?;

        let mut cmd = ProcessBuilder::new(python)
            .cwd(ctx.source_dir)
            .arg(&script)
            .arg(format!("--prefix={}", ctx.install_dir.display()));
        for flag in &ctx.descriptor.build_flags {
            cmd = cmd.arg(flag.as_configure_arg());
        }
        cmd.exec_and_check()?;
        Ok(())
    }

    fn build(&self, ctx: &StageContext<'_>) -> Result<()> {
        make(ctx)?.arg(format!("-j{}", ctx.jobs)).exec_and_check()?;
        Ok(())
    }

    fn install(&self, ctx: &StageContext<'_>) -> Result<()> {
        make(ctx)?.arg("install").exec_and_check()?;
        Ok(())
    }
}

fn make(ctx: &StageContext<'_>) -> Result<ProcessBuilder> {
    let make = find_executable("make")
        .ok_or_else(|| anyhow::anyhow!("`make` not found in PATH"))?;
    Ok(ProcessBuilder::new(make).cwd(ctx.source_dir))
}
