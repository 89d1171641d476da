//! `xnative build` command

use std::io::IsTerminal;
use std::time::Instant;

use anyhow::Result;

use crate::cli::{BuildArgs, GlobalArgs};
use xnative::util::diagnostic::emit;
use xnative::util::process::{CommandRunner, DryRunRunner, SystemRunner};
use xnative::util::Diagnostic;

pub fn execute(global: &GlobalArgs, args: BuildArgs) -> Result<()> {
    let start = Instant::now();
    let build = super::load_build(global, args.tasks)?;

    if !build.has_native_source() {
        emit(
            &Diagnostic::warning(format!(
                "no native source configured for `{}`; lifecycle tasks are not registered",
                build.project.name()
            ))
            .with_suggestion("Set `source` under [native] to the project's CMakeLists.txt"),
            !global.no_color && std::io::stderr().is_terminal(),
        );
    }

    let runner: &dyn CommandRunner = if args.dry_run {
        &DryRunRunner
    } else {
        &SystemRunner
    };
    let ran = build.execute(runner)?;

    eprintln!(
        "    Finished {} task(s) in {:.2}s ({} backend)",
        ran.len(),
        start.elapsed().as_secs_f64(),
        build.facade.backend_kind()
    );

    Ok(())
}
