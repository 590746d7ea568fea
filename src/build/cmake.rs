//! CMake builds: `cmake -S -B`, `cmake --build`, `cmake --install`.

use anyhow::Result;

use crate::build::{BuildSteps, StageContext};
use crate::util::fs;
use crate::util::process::{find_executable, ProcessBuilder};

/// CMake workflow. Always a static Release build into the cache prefix;
/// descriptor flags become `-D` cache defines.
pub struct CMakeBuild;

impl BuildSteps for CMakeBuild {
    fn configure(&self, ctx: &StageContext<'_>) -> Result<()> {
        fs::ensure_dir(ctx.build_dir)?;

        let mut cmd = cmake()?
            .arg("-S")
            .arg(ctx.source_dir)
            .arg("-B")
            .arg(ctx.build_dir)
            .arg("-DCMAKE_BUILD_TYPE=Release")
            .arg(format!(
                "-DCMAKE_INSTALL_PREFIX={}",
                ctx.install_dir.display()
            ))
            .arg("-DCMAKE_POSITION_INDEPENDENT_CODE=ON");
        for flag in &ctx.descriptor.build_flags {
            cmd = cmd.arg(flag.as_cmake_define());
        }
        cmd.exec_and_check()?;
        Ok(())
    }

    fn build(&self, ctx: &StageContext<'_>) -> Result<()> {
        cmake()?
            .arg("--build")
            .arg(ctx.build_dir)
            .arg("--parallel")
            .arg(ctx.jobs.to_string())
            .exec_and_check()?;
        Ok(())
    }

    fn install(&self, ctx: &StageContext<'_>) -> Result<()> {
        cmake()?
            .arg("--install")
            .arg(ctx.build_dir)
            .exec_and_check()?;
        Ok(())
    }
}

fn cmake() -> Result<ProcessBuilder> {
    let cmake = find_executable("cmake")
        .ok_or_else(|| anyhow::anyhow!("`cmake` not found in PATH"))?;
    Ok(ProcessBuilder::new(cmake))
}
