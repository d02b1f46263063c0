//! Shared type definitions for the Granary simulation.
//!
//! This crate is the single source of truth for the types passed between the
//! engine and its two front ends. Types flow to `TypeScript` via `ts-rs` for
//! the dashboard.
//!
//! # Modules
//!
//! - [`ids`] -- Sequential identifier wrappers for contracts and events
//! - [`enums`] -- Tiers, subphases, contract kinds and statuses, event kinds,
//!   factions, and player actions
//! - [`structs`] -- World, contract, event, and snapshot structs

pub mod enums;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{
    ActionKind, ContractKind, ContractStatus, EventKind, Faction, GrainTier, Subphase,
    UnknownAction, UnrestTier,
};
pub use ids::{ContractId, EventId};
pub use structs::{Contract, Event, Severity, World, WorldSnapshot};
