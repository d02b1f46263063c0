//! Enumeration types for the Granary simulation.
//!
//! Every tier, status, and event category is a closed enumeration so that a
//! new variant shows up as a non-exhaustive `match` at compile time rather
//! than as an unrecognized string at runtime.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Tiers
// ---------------------------------------------------------------------------

/// Ordinal bucket describing how much grain the city holds.
///
/// Ordered from safest to most dangerous, so `Stable < Critical`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum GrainTier {
    /// More than 200 units in store.
    Stable,
    /// 101 to 200 units.
    Tight,
    /// 41 to 100 units.
    Scarce,
    /// 40 units or fewer.
    Critical,
}

impl fmt::Display for GrainTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Stable => "Stable",
            Self::Tight => "Tight",
            Self::Scarce => "Scarce",
            Self::Critical => "Critical",
        };
        f.write_str(label)
    }
}

/// Ordinal bucket describing the mood of the streets.
///
/// Ordered from calmest to most violent, so `Calm < Rioting`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum UnrestTier {
    /// Unrest of 10 or less.
    Calm,
    /// Unrest from 11 to 30.
    Uneasy,
    /// Unrest from 31 to 60.
    Unstable,
    /// Unrest above 60.
    Rioting,
}

impl fmt::Display for UnrestTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Calm => "Calm",
            Self::Uneasy => "Uneasy",
            Self::Unstable => "Unstable",
            Self::Rioting => "Rioting",
        };
        f.write_str(label)
    }
}

// ---------------------------------------------------------------------------
// Time
// ---------------------------------------------------------------------------

/// Half of a simulated day. One tick toggles the subphase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum Subphase {
    /// First half of the day.
    Morning,
    /// Second half of the day.
    Evening,
}

impl fmt::Display for Subphase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Morning => f.write_str("Morning"),
            Self::Evening => f.write_str("Evening"),
        }
    }
}

// ---------------------------------------------------------------------------
// Contracts
// ---------------------------------------------------------------------------

/// The kind of obligation a faction issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum ContractKind {
    /// City Authority relief shipment, issued under riots or famine.
    Emergency,
    /// Merchant League grain run past the tolls, issued under scarcity.
    Smuggling,
}

impl fmt::Display for ContractKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Emergency => f.write_str("Emergency"),
            Self::Smuggling => f.write_str("Smuggling"),
        }
    }
}

/// Lifecycle state of a contract.
///
/// ```text
/// Issued --> Accepted --> Fulfilled | Failed
///    |  \--> Ignored  --> Fulfilled | Failed
///    \------------------> Fulfilled | Failed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum ContractStatus {
    /// Offered by a faction, no player response yet.
    Issued,
    /// Taken on by the player; eligible for delivery and a resolution bonus.
    Accepted,
    /// Declined by the player; still resolves on its own.
    Ignored,
    /// Completed successfully. Terminal.
    Fulfilled,
    /// Deadline ran out. Terminal.
    Failed,
}

impl ContractStatus {
    /// Whether the contract can no longer change.
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Fulfilled | Self::Failed)
    }
}

impl fmt::Display for ContractStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Issued => "Issued",
            Self::Accepted => "Accepted",
            Self::Ignored => "Ignored",
            Self::Fulfilled => "Fulfilled",
            Self::Failed => "Failed",
        };
        f.write_str(label)
    }
}

// ---------------------------------------------------------------------------
// Factions
// ---------------------------------------------------------------------------

/// A rule-driven, non-player actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum Faction {
    /// Issues emergency relief and restricts markets.
    CityAuthority,
    /// Offers smuggling runs when grain is short.
    MerchantLeague,
}

impl fmt::Display for Faction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CityAuthority => f.write_str("City Authority"),
            Self::MerchantLeague => f.write_str("Merchant League"),
        }
    }
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// Category of a narrative event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum EventKind {
    /// A faction made a move (declared an emergency, offered a run).
    Faction,
    /// A new contract was put on the board.
    ContractIssued,
    /// A contract ran out of time.
    ContractFailed,
    /// The City Authority restricted market trading.
    MarketRestriction,
    /// The grain tier moved.
    GrainTier,
    /// The unrest tier moved.
    UnrestTier,
    /// A player accepted, ignored, delivered, or investigated.
    Player,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Faction => "faction",
            Self::ContractIssued => "contract",
            Self::ContractFailed => "contract_failed",
            Self::MarketRestriction => "market",
            Self::GrainTier => "grain",
            Self::UnrestTier => "unrest",
            Self::Player => "player",
        };
        f.write_str(label)
    }
}

// ---------------------------------------------------------------------------
// Player actions
// ---------------------------------------------------------------------------

/// An action submitted through the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum ActionKind {
    /// Run one tick with no other effect.
    Advance,
    /// Take on an issued contract.
    Accept,
    /// Decline an issued contract.
    Ignore,
    /// Calm the streets a little.
    Investigate,
    /// Attempt immediate fulfillment of an accepted contract.
    Deliver,
}

impl ActionKind {
    /// Whether the action refers to a specific contract.
    pub const fn targets_contract(self) -> bool {
        matches!(self, Self::Accept | Self::Ignore | Self::Deliver)
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Advance => "advance",
            Self::Accept => "accept",
            Self::Ignore => "ignore",
            Self::Investigate => "investigate",
            Self::Deliver => "deliver",
        };
        f.write_str(label)
    }
}

/// Error returned when parsing an unknown action name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown action `{0}` (expected advance, accept, ignore, investigate or deliver)")]
pub struct UnknownAction(pub String);

impl FromStr for ActionKind {
    type Err = UnknownAction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "advance" => Ok(Self::Advance),
            "accept" => Ok(Self::Accept),
            "ignore" => Ok(Self::Ignore),
            "investigate" => Ok(Self::Investigate),
            "deliver" => Ok(Self::Deliver),
            _ => Err(UnknownAction(s.to_owned())),
        }
    }
}
