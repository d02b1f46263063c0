//! Command-line front end for the Granary simulation.
//!
//! A single-session, turn-by-turn loop: each `advance` runs one tick and
//! prints the events it produced. The event log is unbounded since the
//! process is short-lived.
//!
//! # Startup Sequence
//!
//! 1. Initialize structured logging (tracing, default level `warn`)
//! 2. Load configuration (`--config`, else `granary.yaml`, else defaults)
//! 3. Resolve the seed (`--seed`, else `world.seed`, 0 = from the clock)
//! 4. Resume from `--snapshot` if the file exists
//! 5. Read commands from stdin until `quit` or end of input

mod command;
mod error;
mod render;

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use granary_core::state::seed_or_clock;
use granary_core::{
    FileSnapshotStore, SimulationConfig, SimulationState, SnapshotStore, resume_or_start,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::command::{Command, USAGE};

#[derive(Parser, Debug)]
#[command(name = "granary")]
#[command(about = "Run the Granary city simulation one tick at a time", long_about = None)]
struct Args {
    /// Random seed (0 = derive from the clock); overrides `world.seed`
    #[arg(short, long)]
    seed: Option<u64>,

    /// Path to a YAML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Snapshot file to resume from and save to on `quit`
    #[arg(long)]
    snapshot: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    // 1. Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    // 2. Load configuration.
    let mut config =
        SimulationConfig::load(args.config.as_deref()).context("loading configuration")?;
    config.events.capacity = None;

    // 3. Resolve the seed.
    let seed = seed_or_clock(args.seed.unwrap_or(config.world.seed));
    info!(seed, "Configuration loaded");

    // 4. Resume or start the world.
    let store = args.snapshot.map(FileSnapshotStore::new);
    let mut sim = match &store {
        Some(store) => resume_or_start(store, config, seed)
            .with_context(|| format!("resuming from {}", store.path().display()))?,
        None => SimulationState::new(config, seed),
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    writeln!(out, "Granary (seed {seed}). Type `help` for commands.")?;
    writeln!(out, "{}", render::status(&sim))?;

    // 5. Command loop.
    for line in io::stdin().lock().lines() {
        let line = line.context("reading stdin")?;
        match line.parse::<Command>() {
            Ok(Command::Advance) => {
                let summary = sim.advance()?;
                writeln!(out, "{}", render::tick_report(&summary))?;
            }
            Ok(Command::Status) => writeln!(out, "{}", render::status(&sim))?,
            Ok(Command::Help) => writeln!(out, "{USAGE}")?,
            Ok(Command::Empty) => {}
            Ok(Command::Quit) => break,
            Err(e) => writeln!(out, "{e}")?,
        }
    }

    if let Some(mut store) = store {
        match store.save(&sim.snapshot()) {
            Ok(stored) => writeln!(
                out,
                "World saved to {} (day {}).",
                store.path().display(),
                stored.snapshot.world.day
            )?,
            Err(e) => warn!(path = %store.path().display(), error = %e, "Failed to save world"),
        }
    }
    writeln!(out, "Farewell.")?;
    Ok(())
}
