//! Shared application state for the dashboard server.
//!
//! [`AppState`] holds the one simulation behind a single mutex. Every
//! handler takes the lock for its whole duration, so an action and the tick
//! that follows it are never interleaved with another request.

use granary_core::{SimulationState, SnapshotStore};
use tokio::sync::Mutex;
use tracing::{info, warn};

/// Events shown by default on the status page and in `/api/state`.
pub const DEFAULT_RECENT_EVENTS: usize = 20;

/// Snapshot store shared by the handlers.
pub type SharedStore = Mutex<Box<dyn SnapshotStore + Send>>;

/// Shared state for the Axum application.
///
/// Wrapped in [`Arc`](std::sync::Arc) and injected via Axum's `State`
/// extractor.
pub struct AppState {
    /// The simulation.
    pub sim: Mutex<SimulationState>,
    /// Where to persist the world after each action, if anywhere.
    pub store: Option<SharedStore>,
    /// Number of recent events returned with the state.
    pub recent_events: usize,
}

impl AppState {
    /// Wrap a simulation with no persistence.
    pub fn new(sim: SimulationState) -> Self {
        Self {
            sim: Mutex::new(sim),
            store: None,
            recent_events: DEFAULT_RECENT_EVENTS,
        }
    }

    /// Persist the world to `store` after every action.
    #[must_use]
    pub fn with_store(mut self, store: Box<dyn SnapshotStore + Send>) -> Self {
        self.store = Some(Mutex::new(store));
        self
    }

    /// Save `sim` to the configured store, if any.
    ///
    /// Failures are logged and swallowed: the in-memory world stays
    /// authoritative and the next action retries the save.
    pub async fn persist(&self, sim: &SimulationState) {
        let Some(store) = &self.store else {
            return;
        };
        let mut store = store.lock().await;
        match store.save(&sim.snapshot()) {
            Ok(stored) => info!(day = sim.day(), saved_at = %stored.saved_at, "World persisted"),
            Err(e) => warn!(error = %e, "Failed to persist world snapshot"),
        }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("persistent", &self.store.is_some())
            .field("recent_events", &self.recent_events)
            .finish_non_exhaustive()
    }
}
