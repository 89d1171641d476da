//! xnative CLI - external native build driver

use std::io::IsTerminal;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use xnative::util::diagnostic::{emit, suggestions};
use xnative::util::Diagnostic;

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();
    let color = !cli.global.no_color && std::io::stderr().is_terminal();
    let verbose = cli.global.verbose;
    let is_build = matches!(cli.command, Commands::Build(_));

    if let Err(e) = run(cli) {
        let mut diag = Diagnostic::from_error(&e);
        if diag.suggestions.is_empty() && is_build && !verbose {
            diag = diag.with_suggestion(suggestions::BUILD_FAILED.trim_start_matches("help: "));
        }
        emit(&diag, color);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    // Set up logging
    let filter = if cli.global.verbose {
        EnvFilter::new("xnative=debug")
    } else {
        EnvFilter::new("xnative=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    // Execute command
    match cli.command {
        Commands::Build(args) => commands::build::execute(&cli.global, args),
        Commands::Clean(args) => commands::clean::execute(&cli.global, args),
        Commands::Tasks(args) => commands::tasks::execute(&cli.global, args),
    }
}
