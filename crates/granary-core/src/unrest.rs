//! Unrest accumulation and the critical-streak penalty.
//!
//! Per tick, unrest moves by:
//!
//! - `+price_pressure` when the effective market multiplier is at least 2.0
//! - `+critical_streak_penalty` on the tick the critical streak penalty fires
//! - `+failure_penalty` per failed contract
//! - `-fulfillment_relief` per fulfilled contract (tick resolutions and
//!   player deliveries since the previous tick)
//!
//! and is then clamped into `0..=100`.

use granary_types::GrainTier;
use rust_decimal::Decimal;

use crate::config::UnrestConfig;
use crate::market;

/// Lowest possible unrest.
pub const UNREST_MIN: i64 = 0;
/// Highest possible unrest.
pub const UNREST_MAX: i64 = 100;

/// Clamp a raw value into the unrest range.
pub const fn clamp(value: i64) -> i64 {
    if value < UNREST_MIN {
        UNREST_MIN
    } else if value > UNREST_MAX {
        UNREST_MAX
    } else {
        value
    }
}

/// Everything the accumulator folds into the next unrest value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnrestInputs {
    /// Unrest before this tick's adjustment.
    pub current: i64,
    /// Restriction-adjusted market multiplier from final grain.
    pub effective_multiplier: Decimal,
    /// Whether the critical streak penalty fired this tick.
    pub streak_penalty: bool,
    /// Contracts fulfilled (auto-resolved plus delivered).
    pub fulfilled: u32,
    /// Contracts failed.
    pub failed: u32,
}

/// Compute the next unrest value.
pub fn accumulate(inputs: UnrestInputs, config: &UnrestConfig) -> i64 {
    let mut next = inputs.current;

    if market::is_under_pressure(inputs.effective_multiplier) {
        next = next.saturating_add(config.price_pressure);
    }
    if inputs.streak_penalty {
        next = next.saturating_add(config.critical_streak_penalty);
    }
    next = next.saturating_add(config.failure_penalty.saturating_mul(i64::from(inputs.failed)));
    next = next.saturating_sub(
        config
            .fulfillment_relief
            .saturating_mul(i64::from(inputs.fulfilled)),
    );

    clamp(next)
}

/// Tracks consecutive Critical ticks and the one-shot penalty.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CriticalStreak {
    /// Consecutive ticks ending at Critical.
    pub count: u32,
    /// Whether the penalty already fired during this streak.
    pub penalty_applied: bool,
}

impl CriticalStreak {
    /// Record the grain tier a tick ended on.
    ///
    /// Returns `true` exactly once per streak: on the tick the streak first
    /// reaches `threshold`. Any non-Critical tick resets the streak and
    /// re-arms the penalty.
    pub fn observe(&mut self, tier: GrainTier, threshold: u32) -> bool {
        if tier != GrainTier::Critical {
            self.count = 0;
            self.penalty_applied = false;
            return false;
        }
        self.count = self.count.saturating_add(1);
        if self.count >= threshold && !self.penalty_applied {
            self.penalty_applied = true;
            return true;
        }
        false
    }
}
