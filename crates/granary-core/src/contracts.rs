//! Contract ledger: issuance, player responses, and resolution rolls.
//!
//! Contracts are never removed. Once a contract reaches `Fulfilled` or
//! `Failed` the ledger refuses to touch it again, so the full history stays
//! available to the front ends.
//!
//! # Invariant
//!
//! At most one contract per [`ContractKind`] is active (Issued, Accepted,
//! or Ignored) at any time. [`ContractLedger::issue`] enforces this by
//! returning `None` instead of creating a duplicate.

use granary_types::{Contract, ContractId, ContractKind, ContractStatus, GrainTier, Subphase};
use rand::Rng;
use tracing::debug;

use crate::config::ContractConfig;

/// Exclusive upper bound of a percentage roll.
const ROLL_RANGE: u32 = 100;

/// How a single contract came out of a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// The roll succeeded and the reward was granted.
    Fulfilled {
        /// The contract.
        id: ContractId,
        /// Its kind.
        kind: ContractKind,
        /// Grain delivered.
        reward: i64,
    },
    /// The roll failed but time remains.
    Pending {
        /// The contract.
        id: ContractId,
        /// Ticks left after this one.
        deadline: i32,
    },
    /// The roll failed and the deadline ran out.
    Failed {
        /// The contract.
        id: ContractId,
        /// Its kind.
        kind: ContractKind,
    },
}

/// Aggregate result of resolving every active contract for one tick.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickResolution {
    /// Per-contract outcomes in ledger order.
    pub outcomes: Vec<Resolution>,
    /// Contracts fulfilled this tick.
    pub fulfilled: u32,
    /// Contracts failed this tick.
    pub failed: u32,
    /// Total grain delivered by fulfilled contracts.
    pub grain_delivered: i64,
}

impl TickResolution {
    /// Contracts that failed this tick, in ledger order.
    pub fn failures(&self) -> impl Iterator<Item = (ContractId, ContractKind)> + '_ {
        self.outcomes.iter().filter_map(|r| match r {
            Resolution::Failed { id, kind } => Some((*id, *kind)),
            Resolution::Fulfilled { .. } | Resolution::Pending { .. } => None,
        })
    }
}

/// Result of an immediate delivery attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// The contract does not exist or is not Accepted.
    NotDeliverable,
    /// The roll succeeded; the contract is Fulfilled.
    Delivered {
        /// Kind of the delivered contract.
        kind: ContractKind,
        /// Grain delivered.
        reward: i64,
    },
    /// The roll failed; the contract stays Accepted with its deadline intact.
    Missed {
        /// Kind of the contract.
        kind: ContractKind,
    },
}

/// Chance, in percent, that a contract with `status` succeeds at `tier`.
pub fn success_chance(config: &ContractConfig, tier: GrainTier, status: ContractStatus) -> u32 {
    let base = match tier {
        GrainTier::Stable => config.success_pct.stable,
        GrainTier::Tight => config.success_pct.tight,
        GrainTier::Scarce => config.success_pct.scarce,
        GrainTier::Critical => config.success_pct.critical,
    };
    match status {
        ContractStatus::Accepted => base
            .saturating_add(config.accepted_bonus_pct)
            .min(config.success_cap_pct),
        ContractStatus::Issued
        | ContractStatus::Ignored
        | ContractStatus::Fulfilled
        | ContractStatus::Failed => base,
    }
}

/// Initial deadline for a contract kind.
pub const fn deadline_for(config: &ContractConfig, kind: ContractKind) -> i32 {
    match kind {
        ContractKind::Emergency => config.emergency_deadline,
        ContractKind::Smuggling => config.smuggling_deadline,
    }
}

/// Grain granted when a contract of `kind` is fulfilled.
pub const fn reward_for(config: &ContractConfig, kind: ContractKind) -> i64 {
    match kind {
        ContractKind::Emergency => config.emergency_reward,
        ContractKind::Smuggling => config.smuggling_reward,
    }
}

/// Owner of every contract ever issued.
#[derive(Debug, Clone)]
pub struct ContractLedger {
    contracts: Vec<Contract>,
    next_id: ContractId,
}

impl ContractLedger {
    /// Create an empty ledger.
    pub const fn new() -> Self {
        Self {
            contracts: Vec::new(),
            next_id: ContractId::FIRST,
        }
    }

    /// Rebuild a ledger from persisted contracts.
    ///
    /// `next_id` is raised past the highest persisted identifier if needed.
    pub fn restore(contracts: Vec<Contract>, next_id: ContractId) -> Self {
        let floor = contracts
            .iter()
            .map(|c| c.id.next())
            .max()
            .unwrap_or(ContractId::FIRST);
        Self {
            contracts,
            next_id: next_id.max(floor),
        }
    }

    /// Issue a new contract unless one of the same kind is still active.
    ///
    /// Returns the new identifier, or `None` when the issue was suppressed.
    pub fn issue(
        &mut self,
        kind: ContractKind,
        deadline: i32,
        day: u64,
        subphase: Subphase,
    ) -> Option<ContractId> {
        if self.has_active(kind) {
            debug!(?kind, "Contract issue suppressed: one already active");
            return None;
        }
        let id = self.next_id;
        self.next_id = id.next();
        self.contracts.push(Contract {
            id,
            kind,
            deadline,
            status: ContractStatus::Issued,
            issued_day: day,
            issued_subphase: subphase,
        });
        debug!(%id, ?kind, deadline, "Contract issued");
        Some(id)
    }

    /// Whether an active contract of `kind` exists.
    pub fn has_active(&self, kind: ContractKind) -> bool {
        self.active_of(kind).is_some()
    }

    /// The active contract of `kind`, if any.
    pub fn active_of(&self, kind: ContractKind) -> Option<&Contract> {
        self.contracts
            .iter()
            .find(|c| c.kind == kind && c.is_active())
    }

    /// Look up a contract by identifier.
    pub fn get(&self, id: ContractId) -> Option<&Contract> {
        self.contracts.iter().find(|c| c.id == id)
    }

    fn get_mut(&mut self, id: ContractId) -> Option<&mut Contract> {
        self.contracts.iter_mut().find(|c| c.id == id)
    }

    /// Every contract, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Contract> {
        self.contracts.iter()
    }

    /// Active contracts, oldest first.
    pub fn active(&self) -> impl Iterator<Item = &Contract> {
        self.contracts.iter().filter(|c| c.is_active())
    }

    /// Copy of every contract, oldest first.
    pub fn to_vec(&self) -> Vec<Contract> {
        self.contracts.clone()
    }

    /// Identifier the next issued contract will receive.
    pub const fn next_id(&self) -> ContractId {
        self.next_id
    }

    /// Move an Issued contract to Accepted. Returns the contract kind on
    /// success, `None` if the contract is unknown or not Issued.
    pub fn accept(&mut self, id: ContractId) -> Option<ContractKind> {
        self.respond(id, ContractStatus::Accepted)
    }

    /// Move an Issued contract to Ignored. Returns the contract kind on
    /// success, `None` if the contract is unknown or not Issued.
    pub fn ignore(&mut self, id: ContractId) -> Option<ContractKind> {
        self.respond(id, ContractStatus::Ignored)
    }

    fn respond(&mut self, id: ContractId, to: ContractStatus) -> Option<ContractKind> {
        let contract = self.get_mut(id)?;
        if contract.status != ContractStatus::Issued {
            return None;
        }
        contract.status = to;
        debug!(%id, status = ?to, "Contract status changed by player");
        Some(contract.kind)
    }

    /// Attempt immediate fulfillment of an Accepted contract.
    ///
    /// Draws one roll only when the contract is deliverable. A missed roll
    /// leaves the contract Accepted and does not touch its deadline.
    pub fn deliver(
        &mut self,
        id: ContractId,
        config: &ContractConfig,
        tier: GrainTier,
        rng: &mut impl Rng,
    ) -> Delivery {
        let Some(contract) = self.get_mut(id) else {
            return Delivery::NotDeliverable;
        };
        if contract.status != ContractStatus::Accepted {
            return Delivery::NotDeliverable;
        }
        let chance = success_chance(config, tier, contract.status);
        let roll = rng.random_range(0..ROLL_RANGE);
        if roll < chance {
            contract.status = ContractStatus::Fulfilled;
            debug!(%id, roll, chance, "Contract delivered");
            Delivery::Delivered {
                kind: contract.kind,
                reward: reward_for(config, contract.kind),
            }
        } else {
            debug!(%id, roll, chance, "Delivery missed");
            Delivery::Missed {
                kind: contract.kind,
            }
        }
    }

    /// Roll every active contract once.
    ///
    /// A success fulfills the contract and grants its reward; its deadline
    /// is left alone. A failure burns one tick of deadline and fails the
    /// contract when nothing is left.
    pub fn resolve_tick(
        &mut self,
        config: &ContractConfig,
        tier: GrainTier,
        rng: &mut impl Rng,
    ) -> TickResolution {
        let mut resolution = TickResolution::default();

        for contract in self.contracts.iter_mut().filter(|c| c.is_active()) {
            let chance = success_chance(config, tier, contract.status);
            let roll = rng.random_range(0..ROLL_RANGE);

            if roll < chance {
                let reward = reward_for(config, contract.kind);
                contract.status = ContractStatus::Fulfilled;
                resolution.fulfilled = resolution.fulfilled.saturating_add(1);
                resolution.grain_delivered = resolution.grain_delivered.saturating_add(reward);
                resolution.outcomes.push(Resolution::Fulfilled {
                    id: contract.id,
                    kind: contract.kind,
                    reward,
                });
                debug!(id = %contract.id, roll, chance, "Contract fulfilled");
                continue;
            }

            contract.deadline = contract.deadline.saturating_sub(1);
            if contract.deadline <= 0 {
                contract.status = ContractStatus::Failed;
                resolution.failed = resolution.failed.saturating_add(1);
                resolution.outcomes.push(Resolution::Failed {
                    id: contract.id,
                    kind: contract.kind,
                });
                debug!(id = %contract.id, roll, chance, "Contract failed");
            } else {
                resolution.outcomes.push(Resolution::Pending {
                    id: contract.id,
                    deadline: contract.deadline,
                });
            }
        }

        resolution
    }
}

impl Default for ContractLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::config::TierChances;

    fn config_with(pct: u32) -> ContractConfig {
        ContractConfig {
            success_pct: TierChances::flat(pct),
            ..ContractConfig::default()
        }
    }

    fn issue(ledger: &mut ContractLedger, kind: ContractKind) -> Option<ContractId> {
        let deadline = deadline_for(&ContractConfig::default(), kind);
        ledger.issue(kind, deadline, 1, Subphase::Morning)
    }

    #[test]
    fn chances_by_tier_and_status() {
        let config = ContractConfig::default();
        assert_eq!(success_chance(&config, GrainTier::Stable, ContractStatus::Issued), 70);
        assert_eq!(success_chance(&config, GrainTier::Tight, ContractStatus::Ignored), 55);
        assert_eq!(success_chance(&config, GrainTier::Scarce, ContractStatus::Accepted), 55);
        assert_eq!(success_chance(&config, GrainTier::Critical, ContractStatus::Accepted), 40);
        // 70 + 15 = 85, under the 95 cap.
        assert_eq!(success_chance(&config, GrainTier::Stable, ContractStatus::Accepted), 85);
    }

    #[test]
    fn accepted_bonus_is_capped() {
        let config = config_with(90);
        assert_eq!(success_chance(&config, GrainTier::Stable, ContractStatus::Accepted), 95);
    }

    #[test]
    fn issue_is_deduplicated_per_kind() {
        let mut ledger = ContractLedger::new();
        assert_eq!(issue(&mut ledger, ContractKind::Emergency), Some(ContractId(1)));
        assert_eq!(issue(&mut ledger, ContractKind::Emergency), None);
        assert_eq!(issue(&mut ledger, ContractKind::Smuggling), Some(ContractId(2)));
        assert_eq!(ledger.active().count(), 2);
    }

    #[test]
    fn issue_allowed_again_after_terminal() {
        let mut ledger = ContractLedger::new();
        let mut rng = StdRng::seed_from_u64(1);
        issue(&mut ledger, ContractKind::Emergency);
        let always = config_with(100);
        let res = ledger.resolve_tick(&always, GrainTier::Stable, &mut rng);
        assert_eq!(res.fulfilled, 1);
        assert_eq!(issue(&mut ledger, ContractKind::Emergency), Some(ContractId(2)));
    }

    #[test]
    fn accept_and_ignore_only_from_issued() {
        let mut ledger = ContractLedger::new();
        let id = issue(&mut ledger, ContractKind::Smuggling).unwrap();
        assert_eq!(ledger.accept(id), Some(ContractKind::Smuggling));
        assert_eq!(ledger.accept(id), None);
        assert_eq!(ledger.ignore(id), None);
        assert_eq!(ledger.get(id).unwrap().status, ContractStatus::Accepted);
        assert_eq!(ledger.accept(ContractId(99)), None);
    }

    #[test]
    fn success_grants_reward_without_touching_deadline() {
        let mut ledger = ContractLedger::new();
        let mut rng = StdRng::seed_from_u64(3);
        let id = issue(&mut ledger, ContractKind::Emergency).unwrap();
        let res = ledger.resolve_tick(&config_with(100), GrainTier::Critical, &mut rng);
        assert_eq!(res.fulfilled, 1);
        assert_eq!(res.grain_delivered, 60);
        let contract = ledger.get(id).unwrap();
        assert_eq!(contract.status, ContractStatus::Fulfilled);
        assert_eq!(contract.deadline, 4);
    }

    #[test]
    fn failure_counts_down_then_fails_on_same_tick() {
        let mut ledger = ContractLedger::new();
        let mut rng = StdRng::seed_from_u64(5);
        let never = config_with(0);
        let id = issue(&mut ledger, ContractKind::Smuggling).unwrap();

        for expected in [2, 1] {
            let res = ledger.resolve_tick(&never, GrainTier::Scarce, &mut rng);
            assert_eq!(res.failed, 0);
            assert_eq!(ledger.get(id).unwrap().deadline, expected);
        }

        let res = ledger.resolve_tick(&never, GrainTier::Scarce, &mut rng);
        assert_eq!(res.failed, 1);
        assert_eq!(res.failures().collect::<Vec<_>>(), [(id, ContractKind::Smuggling)]);
        let contract = ledger.get(id).unwrap();
        assert_eq!(contract.status, ContractStatus::Failed);
        assert_eq!(contract.deadline, 0);

        // Terminal contracts are left alone afterwards.
        let res = ledger.resolve_tick(&never, GrainTier::Scarce, &mut rng);
        assert!(res.outcomes.is_empty());
        assert_eq!(ledger.get(id).unwrap().deadline, 0);
    }

    #[test]
    fn ignored_contracts_still_resolve() {
        let mut ledger = ContractLedger::new();
        let mut rng = StdRng::seed_from_u64(9);
        let id = issue(&mut ledger, ContractKind::Smuggling).unwrap();
        ledger.ignore(id);
        let res = ledger.resolve_tick(&config_with(100), GrainTier::Tight, &mut rng);
        assert_eq!(res.fulfilled, 1);
    }

    #[test]
    fn deliver_requires_accepted() {
        let mut ledger = ContractLedger::new();
        let mut rng = StdRng::seed_from_u64(11);
        let config = config_with(100);
        let id = issue(&mut ledger, ContractKind::Emergency).unwrap();
        assert_eq!(
            ledger.deliver(id, &config, GrainTier::Tight, &mut rng),
            Delivery::NotDeliverable
        );
        ledger.accept(id);
        assert_eq!(
            ledger.deliver(id, &config, GrainTier::Tight, &mut rng),
            Delivery::Delivered {
                kind: ContractKind::Emergency,
                reward: 60
            }
        );
        assert_eq!(
            ledger.deliver(id, &config, GrainTier::Tight, &mut rng),
            Delivery::NotDeliverable
        );
    }

    #[test]
    fn missed_delivery_is_a_free_retry() {
        let mut ledger = ContractLedger::new();
        let mut rng = StdRng::seed_from_u64(13);
        let config = ContractConfig {
            accepted_bonus_pct: 0,
            ..config_with(0)
        };
        let id = issue(&mut ledger, ContractKind::Emergency).unwrap();
        ledger.accept(id);
        assert_eq!(
            ledger.deliver(id, &config, GrainTier::Stable, &mut rng),
            Delivery::Missed {
                kind: ContractKind::Emergency
            }
        );
        let contract = ledger.get(id).unwrap();
        assert_eq!(contract.status, ContractStatus::Accepted);
        assert_eq!(contract.deadline, 4);
    }

    #[test]
    fn restore_keeps_ids_unique() {
        let mut source = ContractLedger::new();
        issue(&mut source, ContractKind::Emergency);
        issue(&mut source, ContractKind::Smuggling);
        let mut ledger = ContractLedger::restore(source.to_vec(), ContractId(1));
        assert_eq!(ledger.next_id(), ContractId(3));
        assert_eq!(issue(&mut ledger, ContractKind::Emergency), None);
    }
}
