//! Quarry CLI - run predator/prey worlds with one process per agent.

mod commands;
mod config;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use std::io;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "quarry")]
#[command(author, version, about = "Quarry - predator/prey grid simulation", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// More log output on stderr (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a world until hunters or prey are wiped out
    Run(commands::run::RunArgs),

    /// Build a world-view message from typed fields and write it to stdout
    Compose,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Run(args) => {
            let config = config::Config::load()?;
            commands::run::run(args, &config)
        }
        Commands::Compose => commands::compose::run(),
    }
}

/// Logs go to stderr; stdout carries the grid or the composed message.
fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(io::stderr)
        .init();
}
