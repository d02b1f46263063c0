//! Market price multiplier.
//!
//! The multiplier is never used to price goods. It only decides whether the
//! market is expensive enough to push unrest up. Values are exact
//! [`Decimal`]s so the `>= 2.0` pressure check never rests on float
//! rounding.

use granary_types::GrainTier;
use rust_decimal::Decimal;

/// Discount applied while markets are restricted.
const RESTRICTION_DISCOUNT: Decimal = Decimal::from_parts(5, 0, 0, false, 1);

/// Lowest effective multiplier.
const FLOOR: Decimal = Decimal::ONE;

/// Effective multiplier at or above which unrest rises.
pub const PRESSURE_THRESHOLD: Decimal = Decimal::TWO;

/// Base multiplier for a grain tier.
pub const fn multiplier(tier: GrainTier) -> Decimal {
    match tier {
        GrainTier::Stable => Decimal::ONE,
        GrainTier::Tight => Decimal::from_parts(15, 0, 0, false, 1),
        GrainTier::Scarce => Decimal::TWO,
        GrainTier::Critical => Decimal::from_parts(3, 0, 0, false, 0),
    }
}

/// Multiplier after the market restriction discount, floored at 1.0.
pub fn effective_multiplier(tier: GrainTier, restricted: bool) -> Decimal {
    let base = multiplier(tier);
    if restricted {
        base.checked_sub(RESTRICTION_DISCOUNT)
            .unwrap_or(FLOOR)
            .max(FLOOR)
    } else {
        base
    }
}

/// Whether an effective multiplier is high enough to agitate the city.
pub fn is_under_pressure(effective: Decimal) -> bool {
    effective >= PRESSURE_THRESHOLD
}
