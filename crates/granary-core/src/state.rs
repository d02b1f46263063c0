//! The simulation aggregate.
//!
//! [`SimulationState`] owns everything that changes: the clock, the grain
//! and unrest scalars, the contract ledger, the event log, and the random
//! generator. Front ends hold exactly one of these and mutate it only
//! through [`SimulationState::advance`] and [`SimulationState::submit`]. The
//! shared dashboard wraps it in a single mutex.
//!
//! Tiers are never stored. [`SimulationState::grain_tier`] and
//! [`SimulationState::unrest_tier`] classify the current scalars on every
//! call.

use granary_types::{ContractKind, GrainTier, Subphase, UnrestTier, World, WorldSnapshot};
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::actions::{self, ActionReport, PlayerAction};
use crate::clock::WorldClock;
use crate::config::SimulationConfig;
use crate::contracts::ContractLedger;
use crate::event_log::EventLog;
use crate::snapshot::SnapshotError;
use crate::tick::{self, TickError, TickSummary};
use crate::tiers;
use crate::unrest::{self, CriticalStreak};

/// Clamp a raw grain value so it is never negative.
pub const fn clamp_grain(value: i64) -> i64 {
    if value < 0 { 0 } else { value }
}

/// Pick a seed: the requested one, or one derived from the wall clock when
/// the request is 0.
///
/// Engines always take an explicit seed; this helper is for front ends that
/// expose "0 = random" to their users.
pub fn seed_or_clock(requested: u64) -> u64 {
    if requested != 0 {
        return requested;
    }
    let nanos = chrono::Utc::now()
        .timestamp_nanos_opt()
        .unwrap_or_default()
        .unsigned_abs();
    nanos.max(1)
}

/// The single mutable aggregate driven by the tick orchestrator.
#[derive(Debug)]
pub struct SimulationState {
    pub(crate) clock: WorldClock,
    pub(crate) grain: i64,
    pub(crate) unrest: i64,
    pub(crate) restricted_markets: u32,
    pub(crate) streak: CriticalStreak,
    pub(crate) contracts: ContractLedger,
    pub(crate) events: EventLog,
    pub(crate) rng: StdRng,
    pub(crate) config: SimulationConfig,
    /// Player deliveries that succeeded since the last tick; folded into
    /// the next tick's fulfilled count.
    pub(crate) delivered_since_tick: u32,
    seed: u64,
}

impl SimulationState {
    /// Create a fresh world: day 1 Morning, starting grain and unrest from
    /// `config`, no contracts, an empty log.
    pub fn new(config: SimulationConfig, seed: u64) -> Self {
        Self {
            clock: WorldClock::new(),
            grain: clamp_grain(config.world.starting_grain),
            unrest: unrest::clamp(config.world.starting_unrest),
            restricted_markets: 0,
            streak: CriticalStreak::default(),
            contracts: ContractLedger::new(),
            events: EventLog::new(config.events.capacity),
            rng: StdRng::seed_from_u64(seed),
            config,
            delivered_since_tick: 0,
            seed,
        }
    }

    /// Resume from a snapshot with a fresh generator seeded by `seed`.
    ///
    /// The snapshot's stored tiers are ignored; tiers are recomputed from
    /// the scalars.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::Invalid`] if the snapshot holds values the
    /// engine could never have produced (day 0, negative grain, unrest out
    /// of range, two open contracts of one kind).
    pub fn restore(
        snapshot: WorldSnapshot,
        config: SimulationConfig,
        seed: u64,
    ) -> Result<Self, SnapshotError> {
        let WorldSnapshot {
            world,
            contracts,
            events,
            next_contract_id,
            next_event_id,
            ..
        } = snapshot;

        let clock = WorldClock::from_parts(world.day, world.subphase).map_err(|e| {
            SnapshotError::Invalid {
                reason: e.to_string(),
            }
        })?;
        if world.grain < 0 {
            return Err(SnapshotError::Invalid {
                reason: format!("negative grain {}", world.grain),
            });
        }
        if unrest::clamp(world.unrest) != world.unrest {
            return Err(SnapshotError::Invalid {
                reason: format!("unrest {} outside 0..=100", world.unrest),
            });
        }
        for kind in [ContractKind::Emergency, ContractKind::Smuggling] {
            let open = contracts
                .iter()
                .filter(|c| c.kind == kind && c.is_active())
                .count();
            if open > 1 {
                return Err(SnapshotError::Invalid {
                    reason: format!("{open} open {kind} contracts"),
                });
            }
        }

        Ok(Self {
            clock,
            grain: world.grain,
            unrest: world.unrest,
            restricted_markets: world.restricted_markets,
            streak: CriticalStreak {
                count: world.critical_streak,
                penalty_applied: world.critical_penalty_applied,
            },
            contracts: ContractLedger::restore(contracts, next_contract_id),
            events: EventLog::restore(events, next_event_id, config.events.capacity),
            rng: StdRng::seed_from_u64(seed),
            config,
            delivered_since_tick: 0,
            seed,
        })
    }

    /// Run one tick.
    ///
    /// # Errors
    ///
    /// Returns [`TickError`] only on clock overflow.
    pub fn advance(&mut self) -> Result<TickSummary, TickError> {
        tick::run_tick(self)
    }

    /// Apply a player action, then run exactly one tick.
    ///
    /// # Errors
    ///
    /// Returns [`TickError`] only on clock overflow.
    pub fn submit(&mut self, action: PlayerAction) -> Result<ActionReport, TickError> {
        actions::submit(self, action)
    }

    /// Serializable copy of the whole aggregate (minus the generator).
    pub fn snapshot(&self) -> WorldSnapshot {
        WorldSnapshot {
            world: self.world(),
            grain_tier: self.grain_tier(),
            unrest_tier: self.unrest_tier(),
            contracts: self.contracts.to_vec(),
            events: self.events.to_vec(),
            next_contract_id: self.contracts.next_id(),
            next_event_id: self.events.next_id(),
        }
    }

    /// Scalar world state.
    pub const fn world(&self) -> World {
        World {
            day: self.clock.day(),
            subphase: self.clock.subphase(),
            grain: self.grain,
            unrest: self.unrest,
            restricted_markets: self.restricted_markets,
            critical_streak: self.streak.count,
            critical_penalty_applied: self.streak.penalty_applied,
        }
    }

    /// Current day.
    pub const fn day(&self) -> u64 {
        self.clock.day()
    }

    /// Current subphase.
    pub const fn subphase(&self) -> Subphase {
        self.clock.subphase()
    }

    /// Grain in store.
    pub const fn grain(&self) -> i64 {
        self.grain
    }

    /// Current unrest.
    pub const fn unrest(&self) -> i64 {
        self.unrest
    }

    /// Grain tier of the current supply.
    pub const fn grain_tier(&self) -> GrainTier {
        tiers::grain_tier(self.grain)
    }

    /// Unrest tier of the current value.
    pub const fn unrest_tier(&self) -> UnrestTier {
        tiers::unrest_tier(self.unrest)
    }

    /// Ticks of market restriction remaining.
    pub const fn restricted_markets(&self) -> u32 {
        self.restricted_markets
    }

    /// Critical streak tracker.
    pub const fn critical_streak(&self) -> CriticalStreak {
        self.streak
    }

    /// The contract ledger.
    pub const fn contracts(&self) -> &ContractLedger {
        &self.contracts
    }

    /// The event log.
    pub const fn events(&self) -> &EventLog {
        &self.events
    }

    /// Active configuration.
    pub const fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Seed the generator was created with.
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Player deliveries awaiting the next tick's unrest fold.
    pub const fn pending_deliveries(&self) -> u32 {
        self.delivered_since_tick
    }

    /// Overwrite the grain supply, clamped at 0.
    ///
    /// For operators, scenario setup, and tests; normal play changes grain
    /// only through ticks and deliveries.
    pub const fn set_grain(&mut self, grain: i64) {
        self.grain = clamp_grain(grain);
    }

    /// Overwrite unrest, clamped into `0..=100`.
    pub const fn set_unrest(&mut self, unrest: i64) {
        self.unrest = unrest::clamp(unrest);
    }

    /// Overwrite the market restriction countdown.
    pub const fn set_restricted_markets(&mut self, ticks: u32) {
        self.restricted_markets = ticks;
    }
}
