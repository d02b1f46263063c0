//! Tick cycle: the fixed sequence that advances the city by one half-day.
//!
//! Each tick runs these steps, in this order, against a single
//! [`SimulationState`]:
//!
//! 1. **Clock** -- advance Morning to Evening, or Evening to the next
//!    day's Morning.
//! 2. **Consumption** -- subtract the base draw plus a uniform jitter.
//! 3. **Shocks** -- roll a shortage, then roll a relief shipment which only
//!    lands while grain is not Stable. Both rolls are always drawn.
//! 4. **Tiers** -- classify grain and unrest. These tiers feed steps 5
//!    and 6.
//! 5. **Factions** -- apply the City Authority and Merchant League rules.
//! 6. **Contracts** -- roll every active contract; failures are logged.
//! 7. **Restriction** -- count the market restriction down by one.
//! 8. **Market** -- compute the effective multiplier from final grain.
//! 9. **Critical streak** -- count consecutive Critical ticks.
//! 10. **Unrest** -- fold pressure, streak penalty, failures and
//!     fulfillments into unrest.
//! 11. **Grain narration** -- log a grain tier change against the tier
//!     the tick started on.
//! 12. **Unrest narration** -- likewise for unrest.
//! 13. **Return** -- hand back a [`TickSummary`].
//!
//! Given the same starting state and seed the sequence of random draws is
//! identical, so ticks are reproducible.

use granary_types::{ContractKind, Event, EventKind, GrainTier, Severity, Subphase, UnrestTier};
use rand::Rng;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, info};

use crate::config::EconomyConfig;
use crate::contracts::TickResolution;
use crate::faction::{self, FactionContext};
use crate::market;
use crate::state::{SimulationState, clamp_grain};
use crate::tiers;
use crate::unrest::{self, UnrestInputs};

/// Exclusive upper bound of a percentage roll.
const ROLL_RANGE: u32 = 100;

/// Errors that can occur during tick execution.
#[derive(Debug, thiserror::Error)]
pub enum TickError {
    /// A clock operation failed.
    #[error("clock error: {source}")]
    Clock {
        /// The underlying clock error.
        #[from]
        source: crate::clock::ClockError,
    },
}

/// Summary of a single tick's execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TickSummary {
    /// Day after the clock advanced.
    pub day: u64,
    /// Subphase after the clock advanced.
    pub subphase: Subphase,
    /// Events recorded this tick, in order.
    pub events: Vec<Event>,
    /// Grain eaten by the city.
    pub consumed: i64,
    /// Whether a shortage struck.
    pub shortage: bool,
    /// Whether a relief shipment landed.
    pub relief: bool,
    /// Contracts fulfilled, including player deliveries since the last tick.
    pub fulfilled: u32,
    /// Contracts failed.
    pub failed: u32,
    /// Restriction-adjusted market multiplier.
    pub effective_multiplier: Decimal,
    /// Whether the critical streak penalty fired.
    pub critical_penalty: bool,
    /// Grain at the end of the tick.
    pub grain: i64,
    /// Unrest at the end of the tick.
    pub unrest: i64,
    /// Grain tier at the end of the tick.
    pub grain_tier: GrainTier,
    /// Unrest tier at the end of the tick.
    pub unrest_tier: UnrestTier,
}

/// Result of the consumption and shock steps.
struct EconomyResult {
    consumed: i64,
    shortage: bool,
    relief: bool,
}

/// Execute one complete tick of the simulation.
///
/// # Errors
///
/// Returns [`TickError::Clock`] if the day counter would overflow. The
/// state is left untouched in that case.
pub fn run_tick(state: &mut SimulationState) -> Result<TickSummary, TickError> {
    let start_grain_tier = state.grain_tier();
    let start_unrest_tier = state.unrest_tier();

    // --- Step 1: Clock ---
    state.clock.advance()?;
    let day = state.clock.day();
    let subphase = state.clock.subphase();
    debug!(day, %subphase, "Tick started");

    // --- Steps 2-3: Consumption and shocks ---
    let economy = phase_economy(state);

    // --- Step 4: Tiers ---
    let grain_tier = state.grain_tier();
    let unrest_tier = state.unrest_tier();

    // --- Step 5: Factions ---
    let mut events = faction::evaluate(
        FactionContext {
            grain_tier,
            unrest_tier,
            day,
            subphase,
        },
        &state.config.contracts,
        &mut state.contracts,
        &mut state.restricted_markets,
        &mut state.events,
    );

    // --- Step 6: Contracts ---
    let resolution = phase_contracts(state, grain_tier, day, subphase, &mut events);

    // --- Step 7: Restriction countdown ---
    state.restricted_markets = state.restricted_markets.saturating_sub(1);

    // --- Step 8: Market ---
    let final_grain_tier = state.grain_tier();
    let effective_multiplier =
        market::effective_multiplier(final_grain_tier, state.restricted_markets > 0);

    // --- Step 9: Critical streak ---
    let critical_penalty = state
        .streak
        .observe(final_grain_tier, state.config.unrest.critical_streak_ticks);
    if critical_penalty {
        info!(day, %subphase, streak = state.streak.count, "Critical streak penalty applied");
    }

    // --- Step 10: Unrest ---
    let delivered = std::mem::take(&mut state.delivered_since_tick);
    let fulfilled = resolution.fulfilled.saturating_add(delivered);
    state.unrest = unrest::accumulate(
        UnrestInputs {
            current: state.unrest,
            effective_multiplier,
            streak_penalty: critical_penalty,
            fulfilled,
            failed: resolution.failed,
        },
        &state.config.unrest,
    );
    let final_unrest_tier = state.unrest_tier();

    // --- Steps 11-12: Narration ---
    if final_grain_tier != start_grain_tier {
        events.push(state.events.record(
            day,
            subphase,
            EventKind::GrainTier,
            grain_severity(final_grain_tier),
            grain_tier_text(start_grain_tier, final_grain_tier),
        ));
    }
    if final_unrest_tier != start_unrest_tier {
        events.push(state.events.record(
            day,
            subphase,
            EventKind::UnrestTier,
            unrest_severity(final_unrest_tier),
            unrest_tier_text(final_unrest_tier),
        ));
    }

    info!(
        day,
        %subphase,
        grain = state.grain,
        unrest = state.unrest,
        grain_tier = %final_grain_tier,
        unrest_tier = %final_unrest_tier,
        fulfilled,
        failed = resolution.failed,
        events = events.len(),
        "Tick complete"
    );

    // --- Step 13: Return ---
    Ok(TickSummary {
        day,
        subphase,
        events,
        consumed: economy.consumed,
        shortage: economy.shortage,
        relief: economy.relief,
        fulfilled,
        failed: resolution.failed,
        effective_multiplier,
        critical_penalty,
        grain: state.grain,
        unrest: state.unrest,
        grain_tier: final_grain_tier,
        unrest_tier: final_unrest_tier,
    })
}

/// Steps 2 and 3: consumption, then shortage and relief shocks.
fn phase_economy(state: &mut SimulationState) -> EconomyResult {
    let EconomyConfig {
        base_consumption,
        consumption_jitter,
        shortage_chance_pct,
        shortage_amount,
        relief_chance_pct,
        relief_amount,
    } = state.config.economy;

    let jitter = state.rng.random_range(0..=consumption_jitter.max(0));
    let consumed = base_consumption.saturating_add(jitter);
    state.grain = clamp_grain(state.grain.saturating_sub(consumed));

    let shortage = state.rng.random_range(0..ROLL_RANGE) < shortage_chance_pct;
    if shortage {
        state.grain = clamp_grain(state.grain.saturating_sub(shortage_amount));
        debug!(amount = shortage_amount, grain = state.grain, "Shortage");
    }

    let relief_roll = state.rng.random_range(0..ROLL_RANGE);
    let relief = relief_roll < relief_chance_pct
        && tiers::grain_tier(state.grain) != GrainTier::Stable;
    if relief {
        state.grain = clamp_grain(state.grain.saturating_add(relief_amount));
        debug!(amount = relief_amount, grain = state.grain, "Relief shipment");
    }

    EconomyResult {
        consumed,
        shortage,
        relief,
    }
}

/// Step 6: roll contracts, credit rewards, and log failures.
fn phase_contracts(
    state: &mut SimulationState,
    tier: GrainTier,
    day: u64,
    subphase: Subphase,
    events: &mut Vec<Event>,
) -> TickResolution {
    let resolution = state
        .contracts
        .resolve_tick(&state.config.contracts, tier, &mut state.rng);
    state.grain = clamp_grain(state.grain.saturating_add(resolution.grain_delivered));

    for (id, kind) in resolution.failures() {
        events.push(state.events.record(
            day,
            subphase,
            EventKind::ContractFailed,
            Severity::new(4),
            format!("Contract #{id} failed: {}", failure_text(kind)),
        ));
    }
    resolution
}

const fn failure_text(kind: ContractKind) -> &'static str {
    match kind {
        ContractKind::Emergency => "no relief shipment reached the city in time.",
        ContractKind::Smuggling => "the smugglers never made it past the toll gates.",
    }
}

/// Severity of a grain tier change, by the tier entered.
pub const fn grain_severity(tier: GrainTier) -> Severity {
    match tier {
        GrainTier::Stable => Severity::new(1),
        GrainTier::Tight => Severity::new(2),
        GrainTier::Scarce => Severity::new(3),
        GrainTier::Critical => Severity::new(5),
    }
}

/// Severity of an unrest tier change, by the tier entered.
pub const fn unrest_severity(tier: UnrestTier) -> Severity {
    match tier {
        UnrestTier::Calm => Severity::new(1),
        UnrestTier::Uneasy => Severity::new(2),
        UnrestTier::Unstable => Severity::new(3),
        UnrestTier::Rioting => Severity::new(5),
    }
}

/// Narration for a grain tier change from `from` to `to`.
///
/// Leaving Critical, or leaving Scarce for any other tier, reads as relief.
pub fn grain_tier_text(from: GrainTier, to: GrainTier) -> String {
    let easing =
        from == GrainTier::Critical || (from == GrainTier::Scarce && to != GrainTier::Scarce);
    let line = if easing {
        "Carts roll through the gates again and the granaries breathe a little easier."
    } else {
        match to {
            GrainTier::Stable => "The granaries are full and bread is cheap in every quarter.",
            GrainTier::Tight => "Grain runs tight. Bakers ration their flour and prices creep up.",
            GrainTier::Scarce => "Grain is scarce. Queues stretch around the market halls.",
            GrainTier::Critical => {
                "The granaries are nearly empty. Hunger stalks the lower wards."
            }
        }
    };
    format!("{line} (grain: {to})")
}

/// Narration for entering an unrest tier.
pub fn unrest_tier_text(to: UnrestTier) -> String {
    let line = match to {
        UnrestTier::Calm => "The streets settle. Shutters open and the criers go quiet.",
        UnrestTier::Uneasy => "Grumbling fills the taverns and the watch doubles its patrols.",
        UnrestTier::Unstable => "Crowds gather at the granary doors, shouting for bread.",
        UnrestTier::Rioting => "Riots! Stalls burn and the watch falls back to the citadel.",
    };
    format!("{line} (unrest: {to})")
}
