//! Dashboard binary for the Granary simulation.
//!
//! # Startup Sequence
//!
//! 1. Initialize structured logging (tracing)
//! 2. Load configuration (`--config`, else `granary.yaml`, else defaults)
//! 3. Resolve the seed (`--seed`, else `world.seed`, 0 = from the clock)
//! 4. Resume the saved world if a snapshot path is configured
//! 5. Serve HTTP until `Ctrl-C`

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use granary_core::state::seed_or_clock;
use granary_core::{FileSnapshotStore, SimulationConfig, SimulationState, resume_or_start};
use granary_dashboard::{AppState, ServerConfig, start_server};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "granary-dashboard")]
#[command(about = "Serve the Granary city simulation over HTTP", long_about = None)]
struct Args {
    /// Path to a YAML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Random seed (0 = derive from the clock); overrides `world.seed`
    #[arg(short, long)]
    seed: Option<u64>,

    /// Address to bind; overrides `dashboard.host`
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on; overrides `dashboard.port` and `GRANARY_PORT`
    #[arg(short, long)]
    port: Option<u16>,

    /// Snapshot file to resume from and save to; overrides
    /// `dashboard.snapshot_path`
    #[arg(long)]
    snapshot: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    let args = Args::parse();

    // 2. Load configuration.
    let mut config =
        SimulationConfig::load(args.config.as_deref()).context("loading configuration")?;
    if let Some(host) = args.host {
        config.dashboard.host = host;
    }
    if let Some(port) = args.port {
        config.dashboard.port = port;
    }

    // 3. Resolve the seed.
    let seed = seed_or_clock(args.seed.unwrap_or(config.world.seed));
    info!(
        seed,
        host = %config.dashboard.host,
        port = config.dashboard.port,
        event_capacity = ?config.events.capacity,
        "Configuration loaded"
    );

    // 4. Resume or start the world.
    let snapshot_path = args
        .snapshot
        .or_else(|| config.dashboard.snapshot_path.as_ref().map(PathBuf::from));
    let server_config = ServerConfig::from(&config.dashboard);

    let app_state = match snapshot_path {
        Some(path) => {
            let store = FileSnapshotStore::new(path);
            let sim = resume_or_start(&store, config, seed)
                .with_context(|| format!("resuming from {}", store.path().display()))?;
            info!(path = %store.path().display(), day = sim.day(), "Snapshot persistence enabled");
            AppState::new(sim).with_store(Box::new(store))
        }
        None => AppState::new(SimulationState::new(config, seed)),
    };

    // 5. Serve.
    start_server(&server_config, Arc::new(app_state)).await?;
    Ok(())
}
