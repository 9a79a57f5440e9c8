//! Run a world to completion.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use quarry_core::types::Role;
use quarry_core::world::World;
use quarry_runtime::rules::DeathCause;
use quarry_runtime::{run_world, Discard, GridPrinter, RunConfig, RunOutcome, RunReport};
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::error;

use crate::config::Config;

#[derive(Args, Debug)]
pub struct RunArgs {
    /// World description file (default: standard input)
    pub world: Option<PathBuf>,

    /// Hunter agent program
    #[arg(long)]
    pub hunter: Option<PathBuf>,

    /// Prey agent program
    #[arg(long)]
    pub prey: Option<PathBuf>,

    /// Stop after this many dispatch cycles even if no side has won
    #[arg(long)]
    pub max_cycles: Option<u64>,

    /// Do not print the grid
    #[arg(long)]
    pub no_render: bool,

    /// Write a JSON run report to this file
    #[arg(long)]
    pub report: Option<PathBuf>,
}

pub fn run(args: RunArgs, config: &Config) -> Result<()> {
    let world = load_world(args.world.as_deref())?;
    let programs = config.agent_programs(args.hunter, args.prey)?;
    let render = config.run.render && !args.no_render;
    let run_config = RunConfig {
        max_cycles: args.max_cycles.or(config.run.max_cycles),
        render_initial: render,
    };

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start the event loop")?;

    let result = if render {
        runtime.block_on(run_world(world, programs, run_config, GridPrinter::stdout()))
    } else {
        runtime.block_on(run_world(world, programs, run_config, Discard))
    };
    let report = result.map_err(|e| {
        error!("Simulation aborted: {}", e);
        e
    })?;

    print_summary(&report);

    if let Some(path) = args.report {
        let json = serde_json::to_string_pretty(&report).context("Failed to serialize report")?;
        std::fs::write(&path, json)
            .with_context(|| format!("Failed to write report: {}", path.display()))?;
        eprintln!("  Report: {}", path.display().to_string().cyan());
    }

    Ok(())
}

fn load_world(path: Option<&Path>) -> Result<World> {
    let (source, text) = match path {
        Some(path) => (
            path.display().to_string(),
            std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read world: {}", path.display()))?,
        ),
        None => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read world from stdin")?;
            ("stdin".to_string(), text)
        }
    };
    text.parse()
        .with_context(|| format!("Invalid world description in {}", source))
}

/// The summary goes to stderr; stdout carries only the grid.
fn print_summary(report: &RunReport) {
    eprintln!();
    match report.outcome {
        RunOutcome::Stable { winner } => {
            let verdict = match winner {
                Some(Role::Hunter) => "hunters win".red().bold(),
                Some(Role::Prey) => "prey win".green().bold(),
                None => "nobody left".yellow().bold(),
            };
            eprintln!(
                "{} Stable after {} cycles: {}",
                "✓".green().bold(),
                report.cycles.to_string().cyan(),
                verdict
            );
        }
        RunOutcome::CycleLimit => eprintln!(
            "{} Stopped at the cycle limit after {} cycles",
            "!".yellow().bold(),
            report.cycles.to_string().cyan()
        ),
    }
    eprintln!(
        "  Requests: {}  Renders: {}",
        report.requests.to_string().cyan(),
        report.renders.to_string().cyan()
    );

    for death in &report.deaths {
        let how = match death.cause {
            DeathCause::Eaten { by } => format!("eaten by {}", by),
            DeathCause::Fed { hunter } => format!("walked into {}", hunter),
            DeathCause::Exhausted => "ran out of energy".to_string(),
            DeathCause::Disconnected => "agent disconnected".to_string(),
        };
        eprintln!("  {} {} {}", "✗".red(), death.unit, how);
    }
    for s in &report.survivors {
        eprintln!(
            "  {} {} {} at {} with energy {}",
            "•".green(),
            s.role,
            s.unit,
            s.position,
            s.energy.to_string().yellow()
        );
    }
}
