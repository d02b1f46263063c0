//! Plain-text rendering of ticks and world state.

use std::fmt::Write as _;

use granary_core::{SimulationState, TickSummary, market};

/// Describe one tick: its events, oldest first, then a one-line status.
pub fn tick_report(summary: &TickSummary) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "--- Day {}, {} ---", summary.day, summary.subphase);
    if summary.events.is_empty() {
        out.push_str("  (no events today)\n");
    }
    for event in &summary.events {
        let _ = writeln!(out, "  ({}) {}", event.severity, event.text);
    }
    let _ = write!(
        out,
        "  grain {} ({}), unrest {} ({}), prices x{}",
        summary.grain,
        summary.grain_tier,
        summary.unrest,
        summary.unrest_tier,
        summary.effective_multiplier,
    );
    out
}

/// Describe the current world and every contract, oldest first.
pub fn status(sim: &SimulationState) -> String {
    let mut out = String::new();
    let grain_tier = sim.grain_tier();
    let multiplier = market::effective_multiplier(grain_tier, sim.restricted_markets() > 0);

    let _ = writeln!(out, "Day {}, {}", sim.day(), sim.subphase());
    let _ = writeln!(out, "  grain   {} ({grain_tier})", sim.grain());
    let _ = writeln!(out, "  unrest  {} ({})", sim.unrest(), sim.unrest_tier());
    let _ = write!(
        out,
        "  prices  x{multiplier}, markets restricted for {} ticks",
        sim.restricted_markets()
    );

    let mut contracts = sim.contracts().iter().peekable();
    if contracts.peek().is_none() {
        out.push_str("\n  no contracts yet");
    }
    for c in contracts {
        let _ = write!(
            out,
            "\n  contract #{} {} [{}], deadline {}",
            c.id, c.kind, c.status, c.deadline
        );
    }
    out
}
