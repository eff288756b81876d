use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod core;
mod matching;
mod parsing;
mod utils;

fn main() -> anyhow::Result<ExitCode> {
    let cli = cli::Cli::parse();

    // Initialize logging based on verbosity flag
    let filter = if cli.verbose {
        EnvFilter::new("checklist_reconciler=debug,info")
    } else {
        EnvFilter::new("checklist_reconciler=warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        cli::Commands::Reconcile(args) => {
            if !cli::reconcile::run(args, cli.format, cli.verbose)? {
                return Ok(ExitCode::FAILURE);
            }
        }
        cli::Commands::Duplicates(args) => {
            cli::duplicates::run(args, cli.format, cli.verbose)?;
        }
        cli::Commands::Sections(args) => {
            cli::sections::run(args, cli.format, cli.verbose)?;
        }
        cli::Commands::Applicability(args) => {
            cli::applicability::run(args, cli.format, cli.verbose)?;
        }
        cli::Commands::Find(args) => {
            cli::find::run(args, cli.format, cli.verbose)?;
        }
    }

    Ok(ExitCode::SUCCESS)
}
