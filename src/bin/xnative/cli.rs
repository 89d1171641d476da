//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// xnative - Drive an external native (CMake) build from a project manifest
#[derive(Parser)]
#[command(name = "xnative")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by every command.
#[derive(Args)]
pub struct GlobalArgs {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Path to XNative.toml (defaults to searching upward from cwd)
    #[arg(long, global = true, env = "XNATIVE_MANIFEST_PATH")]
    pub manifest_path: Option<PathBuf>,

    /// Set a project property, e.g. `-P cmake.executable=/opt/cmake/bin/cmake`
    #[arg(short = 'P', long = "property", value_name = "KEY=VALUE", global = true)]
    pub properties: Vec<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run native build tasks (default: postExternalNativeBuild)
    Build(BuildArgs),

    /// Run the clean task, including the external native clean
    Clean(CleanArgs),

    /// List the project's tasks and their dependencies
    Tasks(TasksArgs),
}

#[derive(Args)]
pub struct BuildArgs {
    /// Tasks to run
    pub tasks: Vec<String>,

    /// Print commands instead of running them
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Args)]
pub struct CleanArgs {
    /// Print what would be removed instead of removing it
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Args)]
pub struct TasksArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_build_with_properties() {
        let cli = Cli::try_parse_from([
            "xnative",
            "-v",
            "build",
            "assembleDebug",
            "-P",
            "cmake.executable=cmake",
            "--dry-run",
        ])
        .unwrap();

        assert!(cli.global.verbose);
        assert_eq!(cli.global.properties, ["cmake.executable=cmake"]);
        match cli.command {
            Commands::Build(args) => {
                assert_eq!(args.tasks, ["assembleDebug"]);
                assert!(args.dry_run);
            }
            _ => panic!("expected build"),
        }
    }

    #[test]
    fn test_parse_tasks_json() {
        let cli = Cli::try_parse_from(["xnative", "tasks", "--json"]).unwrap();
        assert!(matches!(cli.command, Commands::Tasks(TasksArgs { json: true })));
    }
}
