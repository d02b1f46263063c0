//! Faction rules.
//!
//! The City Authority and the Merchant League are not agents; their whole
//! behaviour is the three rules below, evaluated once per tick against the
//! tiers computed after grain consumption and shocks:
//!
//! 1. Unrest at Unstable or worse, or grain Critical, and no open Emergency
//!    contract: the City Authority issues one.
//! 2. Rioting and markets not already restricted: the City Authority
//!    restricts markets for [`RESTRICTION_TICKS`] ticks.
//! 3. Grain Scarce or worse and no open Smuggling contract: the Merchant
//!    League issues one.
//!
//! The rules are independent; any combination may fire on the same tick.

use granary_types::{
    ContractKind, Event, EventKind, Faction, GrainTier, Severity, Subphase, UnrestTier,
};
use tracing::debug;

use crate::config::ContractConfig;
use crate::contracts::{ContractLedger, deadline_for};
use crate::event_log::EventLog;

/// Ticks a market restriction lasts when imposed.
pub const RESTRICTION_TICKS: u32 = 2;

/// Inputs the faction rules read.
#[derive(Debug, Clone, Copy)]
pub struct FactionContext {
    /// Grain tier after consumption and shocks.
    pub grain_tier: GrainTier,
    /// Unrest tier at the start of the tick.
    pub unrest_tier: UnrestTier,
    /// Day to stamp on events and contracts.
    pub day: u64,
    /// Subphase to stamp on events and contracts.
    pub subphase: Subphase,
}

/// Whether the City Authority wants an emergency contract.
pub const fn wants_emergency(grain: GrainTier, unrest: UnrestTier) -> bool {
    matches!(unrest, UnrestTier::Unstable | UnrestTier::Rioting)
        || matches!(grain, GrainTier::Critical)
}

/// Whether the City Authority wants to restrict markets.
pub const fn wants_restriction(unrest: UnrestTier, restricted_markets: u32) -> bool {
    matches!(unrest, UnrestTier::Rioting) && restricted_markets == 0
}

/// Whether the Merchant League wants a smuggling contract.
pub const fn wants_smuggling(grain: GrainTier) -> bool {
    matches!(grain, GrainTier::Scarce | GrainTier::Critical)
}

/// Apply the faction rules and return the events they produced, in order.
pub fn evaluate(
    ctx: FactionContext,
    config: &ContractConfig,
    ledger: &mut ContractLedger,
    restricted_markets: &mut u32,
    log: &mut EventLog,
) -> Vec<Event> {
    let mut events = Vec::new();

    if wants_emergency(ctx.grain_tier, ctx.unrest_tier) {
        let deadline = deadline_for(config, ContractKind::Emergency);
        if let Some(id) = ledger.issue(ContractKind::Emergency, deadline, ctx.day, ctx.subphase) {
            debug!(faction = %Faction::CityAuthority, %id, "Emergency declared");
            events.push(log.record(
                ctx.day,
                ctx.subphase,
                EventKind::Faction,
                Severity::new(4),
                "The City Authority declares a grain emergency and calls for relief shipments.",
            ));
            events.push(log.record(
                ctx.day,
                ctx.subphase,
                EventKind::ContractIssued,
                Severity::new(3),
                format!(
                    "Contract #{id} posted: emergency relief shipment, {deadline} ticks to deliver."
                ),
            ));
        }
    }

    if wants_restriction(ctx.unrest_tier, *restricted_markets) {
        *restricted_markets = RESTRICTION_TICKS;
        debug!(faction = %Faction::CityAuthority, ticks = RESTRICTION_TICKS, "Markets restricted");
        events.push(log.record(
            ctx.day,
            ctx.subphase,
            EventKind::MarketRestriction,
            Severity::new(4),
            "The City Authority restricts the markets: prices capped, stalls under guard.",
        ));
    }

    if wants_smuggling(ctx.grain_tier) {
        let deadline = deadline_for(config, ContractKind::Smuggling);
        if let Some(id) = ledger.issue(ContractKind::Smuggling, deadline, ctx.day, ctx.subphase) {
            debug!(faction = %Faction::MerchantLeague, %id, "Smuggling run offered");
            events.push(log.record(
                ctx.day,
                ctx.subphase,
                EventKind::Faction,
                Severity::new(3),
                "The Merchant League offers to run grain past the toll gates, for a price.",
            ));
            events.push(log.record(
                ctx.day,
                ctx.subphase,
                EventKind::ContractIssued,
                Severity::new(2),
                format!("Contract #{id} posted: smuggling run, {deadline} ticks to deliver."),
            ));
        }
    }

    events
}
