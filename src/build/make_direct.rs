//! Direct make builds: a shipped Makefile, no configure step (OpenBLAS
//! style). Flags are make variable assignments; install passes `PREFIX`.

use anyhow::{bail, Result};

use crate::build::{BuildSteps, StageContext};
use crate::util::process::{find_executable, ProcessBuilder};

/// Plain make workflow against the source tree's own Makefile.
pub struct MakeDirect;

impl BuildSteps for MakeDirect {
    fn configure(&self, ctx: &StageContext<'_>) -> Result<()> {
        // No configure stage; just sanity-check the tree.
        if !ctx.source_dir.join("Makefile").is_file()
            && !ctx.source_dir.join("makefile").is_file()
        {
            bail!("no Makefile in {}", ctx.source_dir.display());
        }
        Ok(())
    }

    fn build(&self, ctx: &StageContext<'_>) -> Result<()> {
        let mut cmd = make(ctx)?.arg(format!("-j{}", ctx.jobs));
        for flag in &ctx.descriptor.build_flags {
            cmd = cmd.arg(flag.as_make_var());
        }
        cmd.exec_and_check()?;
        Ok(())
    }

    fn install(&self, ctx: &StageContext<'_>) -> Result<()> {
        let mut cmd = make(ctx)?
            .arg("install")
            .arg(format!("PREFIX={}", ctx.install_dir.display()));
        for flag in &ctx.descriptor.build_flags {
            cmd = cmd.arg(flag.as_make_var());
        }
        cmd.exec_and_check()?;
        Ok(())
    }
}

fn make(ctx: &StageContext<'_>) -> Result<ProcessBuilder> {
    let make = find_executable("make")
        .ok_or_else(|| anyhow::anyhow!("`make` not found in PATH"))?;
    Ok(ProcessBuilder::new(make).cwd(ctx.source_dir))
}
