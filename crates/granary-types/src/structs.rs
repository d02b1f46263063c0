//! Core entity structs for the Granary simulation.
//!
//! Covers the [`World`] scalar state, [`Contract`] and [`Event`] entities,
//! and the [`WorldSnapshot`] that bundles them for the dashboard and for
//! persistence.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{ContractKind, ContractStatus, EventKind, GrainTier, Subphase, UnrestTier};
use crate::ids::{ContractId, EventId};

// ---------------------------------------------------------------------------
// Severity
// ---------------------------------------------------------------------------

/// How loudly an event should be shown, from 1 (routine) to 5 (alarming).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(transparent)]
#[ts(export, export_to = "bindings/")]
pub struct Severity(u8);

impl Severity {
    /// Lowest severity.
    pub const MIN: Self = Self(1);
    /// Highest severity.
    pub const MAX: Self = Self(5);

    /// Create a severity, clamping the value into `1..=5`.
    pub const fn new(value: u8) -> Self {
        if value < Self::MIN.0 {
            Self::MIN
        } else if value > Self::MAX.0 {
            Self::MAX
        } else {
            Self(value)
        }
    }

    /// Return the numeric level.
    pub const fn level(self) -> u8 {
        self.0
    }
}

impl core::fmt::Display for Severity {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// World
// ---------------------------------------------------------------------------

/// Scalar state of the city.
///
/// Tiers are not stored: [`WorldSnapshot`] carries them for display, but
/// the engine always derives them from `grain` and `unrest`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct World {
    /// Day number, starting at 1.
    pub day: u64,
    /// Current half of the day.
    pub subphase: Subphase,
    /// Grain in store. Never negative.
    pub grain: i64,
    /// Civic unrest, always within `0..=100`.
    pub unrest: i64,
    /// Ticks of market restriction remaining.
    pub restricted_markets: u32,
    /// Consecutive ticks ending at the Critical grain tier.
    pub critical_streak: u32,
    /// Whether the streak penalty already fired during the current streak.
    pub critical_penalty_applied: bool,
}

// ---------------------------------------------------------------------------
// Contract
// ---------------------------------------------------------------------------

/// A time-boxed obligation issued by a faction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Contract {
    /// Unique identifier.
    pub id: ContractId,
    /// What kind of obligation this is.
    pub kind: ContractKind,
    /// Ticks left before the contract fails.
    pub deadline: i32,
    /// Lifecycle state.
    pub status: ContractStatus,
    /// Day the contract was issued.
    pub issued_day: u64,
    /// Subphase the contract was issued in.
    pub issued_subphase: Subphase,
}

impl Contract {
    /// Whether the contract is still open (Issued, Accepted, or Ignored).
    pub const fn is_active(&self) -> bool {
        !self.status.is_terminal()
    }
}

// ---------------------------------------------------------------------------
// Event
// ---------------------------------------------------------------------------

/// An immutable narrative entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Event {
    /// Unique identifier.
    pub id: EventId,
    /// Day the event happened.
    pub day: u64,
    /// Subphase the event happened in.
    pub subphase: Subphase,
    /// Category.
    pub kind: EventKind,
    /// Display severity.
    pub severity: Severity,
    /// Narrative text.
    pub text: String,
}

impl core::fmt::Display for Event {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "[Day {} {}] ({}) {}",
            self.day, self.subphase, self.severity, self.text
        )
    }
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// Serializable picture of everything the engine owns.
///
/// Produced for the dashboard on every request and written to the
/// snapshot store. The derived tiers are informational; on restore the
/// engine recomputes them from the scalars.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct WorldSnapshot {
    /// Scalar world state.
    pub world: World,
    /// Grain tier derived from `world.grain`.
    pub grain_tier: GrainTier,
    /// Unrest tier derived from `world.unrest`.
    pub unrest_tier: UnrestTier,
    /// Every contract ever issued, oldest first.
    pub contracts: Vec<Contract>,
    /// Retained events, oldest first.
    pub events: Vec<Event>,
    /// Identifier the next contract will receive.
    pub next_contract_id: ContractId,
    /// Identifier the next event will receive.
    pub next_event_id: EventId,
}
