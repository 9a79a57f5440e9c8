//! Shared entry point for the hunter and prey programs.
//!
//! The coordinator starts each agent as `<program> <width> <height>` with
//! standard input and output connected to its channel. Logs go to stderr.

use crate::runtime::{AgentRuntime, ThinkDelay};
use anyhow::{Context, Result};
use clap::Parser;
use quarry_core::types::{MapSize, Role};
use std::io;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(about = "Quarry agent - answers world views with move requests on stdio")]
pub struct AgentArgs {
    /// Map width
    pub width: i32,

    /// Map height
    pub height: i32,

    /// Lower bound of the pause between turns, in milliseconds
    #[arg(long, env = "QUARRY_THINK_MIN_MS", default_value = "10")]
    pub think_min_ms: u64,

    /// Upper bound of the pause between turns, in milliseconds
    #[arg(long, env = "QUARRY_THINK_MAX_MS", default_value = "90")]
    pub think_max_ms: u64,
}

/// Parse arguments and serve the coordinator on stdio until it hangs up.
pub fn main(role: Role) -> Result<()> {
    let args = AgentArgs::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let size = MapSize::new(args.width, args.height);
    let runtime = AgentRuntime::new(role, size)
        .with_think_delay(ThinkDelay::between_millis(args.think_min_ms, args.think_max_ms));

    let turns = runtime
        .run(io::stdin().lock(), io::stdout().lock())
        .with_context(|| format!("{} agent on {} map failed", role, size))?;

    info!(%role, turns, "coordinator closed the channel");
    Ok(())
}
