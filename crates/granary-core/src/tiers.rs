//! Tier classification.
//!
//! Pure threshold functions that bucket the raw grain and unrest scalars.
//! Boundary values fall into the safer tier: exactly 200 grain is Tight,
//! exactly 10 unrest is Calm.

use granary_types::{GrainTier, UnrestTier};

/// Grain above this is Stable.
pub const GRAIN_STABLE_ABOVE: i64 = 200;
/// Grain above this (and at most [`GRAIN_STABLE_ABOVE`]) is Tight.
pub const GRAIN_TIGHT_ABOVE: i64 = 100;
/// Grain above this (and at most [`GRAIN_TIGHT_ABOVE`]) is Scarce.
pub const GRAIN_SCARCE_ABOVE: i64 = 40;

/// Unrest at or below this is Calm.
pub const UNREST_CALM_MAX: i64 = 10;
/// Unrest at or below this (and above [`UNREST_CALM_MAX`]) is Uneasy.
pub const UNREST_UNEASY_MAX: i64 = 30;
/// Unrest at or below this (and above [`UNREST_UNEASY_MAX`]) is Unstable.
pub const UNREST_UNSTABLE_MAX: i64 = 60;

/// Classify a grain supply.
pub const fn grain_tier(supply: i64) -> GrainTier {
    if supply > GRAIN_STABLE_ABOVE {
        GrainTier::Stable
    } else if supply > GRAIN_TIGHT_ABOVE {
        GrainTier::Tight
    } else if supply > GRAIN_SCARCE_ABOVE {
        GrainTier::Scarce
    } else {
        GrainTier::Critical
    }
}

/// Classify an unrest value.
pub const fn unrest_tier(value: i64) -> UnrestTier {
    if value <= UNREST_CALM_MAX {
        UnrestTier::Calm
    } else if value <= UNREST_UNEASY_MAX {
        UnrestTier::Uneasy
    } else if value <= UNREST_UNSTABLE_MAX {
        UnrestTier::Unstable
    } else {
        UnrestTier::Rioting
    }
}
