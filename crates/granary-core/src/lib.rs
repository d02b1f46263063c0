//! Tick engine for the Granary simulation.
//!
//! This crate owns the half-day tick that drives a city's grain supply,
//! civic unrest, faction contracts, and narrative log. Everything is
//! synchronous; the front ends decide how to share the state.
//!
//! # Modules
//!
//! - [`clock`] -- Day counter and Morning/Evening subphase.
//! - [`config`] -- Configuration loading from `granary.yaml` into
//!   strongly-typed structs.
//! - [`tiers`] -- Grain and unrest tier thresholds.
//! - [`market`] -- Price multipliers and market restriction.
//! - [`contracts`] -- [`ContractLedger`]: issuance, player responses, and
//!   resolution rolls.
//! - [`faction`] -- City Authority and Merchant League rules.
//! - [`unrest`] -- Unrest accumulation and the critical streak.
//! - [`event_log`] -- Bounded FIFO narrative log.
//! - [`state`] -- [`SimulationState`], the aggregate every tick mutates.
//! - [`tick`] -- The fixed per-tick sequence.
//! - [`actions`] -- Player actions applied before a tick.
//! - [`snapshot`] -- Snapshot documents and stores.
//!
//! [`ContractLedger`]: contracts::ContractLedger
//! [`SimulationState`]: state::SimulationState

pub mod actions;
pub mod clock;
pub mod config;
pub mod contracts;
pub mod event_log;
pub mod faction;
pub mod market;
pub mod snapshot;
pub mod state;
pub mod tick;
pub mod tiers;
pub mod unrest;

pub use actions::{ActionError, ActionOutcome, ActionReport, PlayerAction};
pub use config::{ConfigError, SimulationConfig};
pub use snapshot::{
    FileSnapshotStore, MemorySnapshotStore, SnapshotError, SnapshotStore, StoredSnapshot,
    resume_or_start,
};
pub use state::SimulationState;
pub use tick::{TickError, TickSummary};
