//! Autotools builds: `./configure && make && make install`.

use anyhow::{bail, Result};

use crate::build::{BuildSteps, StageContext};
use crate::util::fs;
use crate::util::process::{find_executable, ProcessBuilder};

/// Classic autotools workflow, configured out-of-tree with an absolute
/// `--prefix` so `make install` lands inside the cache.
pub struct Autotools;

impl BuildSteps for Autotools {
    fn configure(&self, ctx: &StageContext<'_>) -> Result<()> {
        let configure = ctx.source_dir.join("configure");
        if !configure.is_file() {
            bail!(
                "no configure script in {} (incomplete source tree?)",
                ctx.source_dir.display()
            );
        }

        fs::ensure_dir(ctx.build_dir)?;

        let mut cmd = ProcessBuilder::new(&configure)
            .cwd(ctx.build_dir)
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
    Ok(ProcessBuilder::new(make).cwd(ctx.build_dir))
}
