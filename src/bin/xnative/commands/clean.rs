//! `xnative clean` command

use anyhow::Result;

use crate::cli::{CleanArgs, GlobalArgs};
use xnative::core::CLEAN_TASK;
use xnative::util::process::{CommandRunner, DryRunRunner, SystemRunner};

pub fn execute(global: &GlobalArgs, args: CleanArgs) -> Result<()> {
    let build = super::load_build(global, vec![CLEAN_TASK.to_string()])?;

    let runner: &dyn CommandRunner = if args.dry_run {
        &DryRunRunner
    } else {
        &SystemRunner
    };
    build.execute(runner)?;

    if !args.dry_run {
        eprintln!("     Removed {}", build.project.build_dir().display());
    }

    Ok(())
}
