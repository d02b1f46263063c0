//! Player actions.
//!
//! An action is applied against the current state and then exactly one
//! tick runs. Actions that do not apply (unknown contract, wrong status)
//! change nothing and record nothing; the tick still runs. Input that cannot
//! describe an action at all is rejected earlier by
//! [`PlayerAction::from_parts`].

use granary_types::{ActionKind, ContractId, Event, EventKind, Severity};
use tracing::debug;

use crate::contracts::Delivery;
use crate::state::{SimulationState, clamp_grain};
use crate::tick::{self, TickError, TickSummary};
use crate::unrest;

/// Input that does not describe an action.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ActionError {
    /// A contract action arrived without a contract id.
    #[error("action `{action}` requires a contract_id")]
    MissingContract {
        /// The action that was requested.
        action: ActionKind,
    },
}

/// A validated player action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerAction {
    /// Do nothing; just tick.
    Advance,
    /// Take on an Issued contract.
    Accept(ContractId),
    /// Decline an Issued contract.
    Ignore(ContractId),
    /// Send agents into the streets to cool tempers.
    Investigate,
    /// Attempt immediate fulfillment of an Accepted contract.
    Deliver(ContractId),
}

impl PlayerAction {
    /// Build an action from its kind and an optional contract id.
    ///
    /// A contract id passed with an action that does not use one is
    /// ignored.
    ///
    /// # Errors
    ///
    /// Returns [`ActionError::MissingContract`] when a contract action has
    /// no id.
    pub fn from_parts(kind: ActionKind, contract: Option<ContractId>) -> Result<Self, ActionError> {
        let require = || contract.ok_or(ActionError::MissingContract { action: kind });
        Ok(match kind {
            ActionKind::Advance => Self::Advance,
            ActionKind::Investigate => Self::Investigate,
            ActionKind::Accept => Self::Accept(require()?),
            ActionKind::Ignore => Self::Ignore(require()?),
            ActionKind::Deliver => Self::Deliver(require()?),
        })
    }

    /// The kind of this action.
    pub const fn kind(self) -> ActionKind {
        match self {
            Self::Advance => ActionKind::Advance,
            Self::Accept(_) => ActionKind::Accept,
            Self::Ignore(_) => ActionKind::Ignore,
            Self::Investigate => ActionKind::Investigate,
            Self::Deliver(_) => ActionKind::Deliver,
        }
    }
}

/// What applying an action did, before the tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    /// The action took effect and recorded this event.
    Applied(Event),
    /// Advance: nothing to apply.
    Passed,
    /// The action did not apply to the current state.
    Ignored,
}

impl ActionOutcome {
    /// The event the action recorded, if any.
    pub const fn event(&self) -> Option<&Event> {
        match self {
            Self::Applied(event) => Some(event),
            Self::Passed | Self::Ignored => None,
        }
    }
}

/// Result of [`submit`]: the action outcome and the tick that followed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionReport {
    /// What the action itself did.
    pub outcome: ActionOutcome,
    /// The tick run afterwards.
    pub tick: TickSummary,
}

/// Apply `action` to `state` without ticking.
pub fn apply_action(state: &mut SimulationState, action: PlayerAction) -> ActionOutcome {
    let day = state.clock.day();
    let subphase = state.clock.subphase();

    let applied = match action {
        PlayerAction::Advance => return ActionOutcome::Passed,
        PlayerAction::Accept(id) => state.contracts.accept(id).map(|kind| {
            (
                Severity::new(1),
                format!("You take on contract #{id}, the {kind} run."),
            )
        }),
        PlayerAction::Ignore(id) => state.contracts.ignore(id).map(|kind| {
            (
                Severity::new(1),
                format!("You let contract #{id}, the {kind} run, go by."),
            )
        }),
        PlayerAction::Investigate => {
            let relief = state.config.unrest.investigate_relief;
            state.unrest = unrest::clamp(state.unrest.saturating_sub(relief));
            Some((
                Severity::new(1),
                "Your agents walk the markets and talk down the ringleaders. Tempers cool a little."
                    .to_owned(),
            ))
        }
        PlayerAction::Deliver(id) => {
            let tier = state.grain_tier();
            match state
                .contracts
                .deliver(id, &state.config.contracts, tier, &mut state.rng)
            {
                Delivery::NotDeliverable => None,
                Delivery::Delivered { kind, reward } => {
                    state.grain = clamp_grain(state.grain.saturating_add(reward));
                    state.delivered_since_tick = state.delivered_since_tick.saturating_add(1);
                    Some((
                        Severity::new(2),
                        format!(
                            "You deliver on contract #{id}, the {kind} run: {reward} grain reaches the granaries."
                        ),
                    ))
                }
                Delivery::Missed { kind } => Some((
                    Severity::new(2),
                    format!(
                        "Your shipment for contract #{id}, the {kind} run, falls through. There is still time to try again."
                    ),
                )),
            }
        }
    };

    match applied {
        Some((severity, text)) => {
            debug!(action = %action.kind(), "Player action applied");
            ActionOutcome::Applied(
                state
                    .events
                    .record(day, subphase, EventKind::Player, severity, text),
            )
        }
        None => {
            debug!(action = %action.kind(), "Player action ignored");
            ActionOutcome::Ignored
        }
    }
}

/// Apply `action`, then run exactly one tick.
///
/// # Errors
///
/// Returns [`TickError`] if the tick fails. The action has already been
/// applied at that point.
pub fn submit(
    state: &mut SimulationState,
    action: PlayerAction,
) -> Result<ActionReport, TickError> {
    let outcome = apply_action(state, action);
    let tick = tick::run_tick(state)?;
    Ok(ActionReport { outcome, tick })
}
