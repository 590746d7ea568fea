//! Header-only dependencies: nothing to configure or build, install is a
//! copy of the source tree into the include path.

use anyhow::Result;

use crate::build::{BuildSteps, StageContext};
use crate::util::fs;

/// Header-only workflow. For a single-file download the "tree" is exactly
/// that header; for archives the whole unpacked tree is published under
/// `include/` so nested layouts like `Eigen/Core` keep their paths.
pub struct HeaderOnly;

impl BuildSteps for HeaderOnly {
    fn configure(&self, _ctx: &StageContext<'_>) -> Result<()> {
        Ok(())
    }

    fn build(&self, _ctx: &StageContext<'_>) -> Result<()> {
        Ok(())
    }

    fn install(&self, ctx: &StageContext<'_>) -> Result<()> {
        let include_dir = ctx.install_dir.join("include");
        fs::ensure_dir(&include_dir)?;
        fs::copy_dir_all(ctx.source_dir, &include_dir)?;
        Ok(())
    }
}
