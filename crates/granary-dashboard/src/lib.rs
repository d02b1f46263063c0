//! Web dashboard for the Granary simulation.
//!
//! This crate provides an Axum HTTP server over one shared
//! [`SimulationState`]:
//!
//! - **HTML status page** (`GET /`) with the world, contracts, recent
//!   events, and buttons for every player action
//! - **JSON API** for reading state and events and for submitting actions
//!
//! # Architecture
//!
//! There is no background scheduler. Time only moves when a client posts
//! an action: the handler applies it and runs exactly one tick, holding the
//! simulation mutex throughout. When a snapshot store is configured the
//! world is saved after every action.
//!
//! [`SimulationState`]: granary_core::SimulationState

pub mod error;
pub mod handlers;
pub mod router;
pub mod server;
pub mod state;

// Re-export primary types for convenience.
pub use error::DashboardError;
pub use router::build_router;
pub use server::{ServerConfig, ServerError, start_server};
pub use state::AppState;
