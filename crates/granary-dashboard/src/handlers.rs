//! HTTP endpoint handlers for the dashboard server.
//!
//! Every handler locks the shared [`SimulationState`] for its whole
//! duration.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/` | HTML status page with action buttons |
//! | `GET` | `/api/state` | World, tiers, contracts, recent events |
//! | `GET` | `/api/events` | Most recent events (`?limit=N&since=ID`) |
//! | `GET` | `/api/contracts` | Contracts (`?status=active\|all`) |
//! | `GET` | `/api/contracts/{id}` | Single contract |
//! | `POST` | `/api/action` | Apply an action, then tick once |

use std::fmt::Write as _;
use std::str::FromStr;
use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::QueryRejection;
use axum::extract::{FromRequest, Path, Query, Request, State};
use axum::http::header::CONTENT_TYPE;
use axum::response::{Html, IntoResponse, Redirect, Response};
use granary_core::{ActionOutcome, PlayerAction, SimulationState, market};
use granary_types::{
    ActionKind, Contract, ContractId, Event, EventId, GrainTier, UnrestTier, World,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::DashboardError;
use crate::state::AppState;

/// Default page size for `GET /api/events`.
const DEFAULT_EVENT_LIMIT: usize = 50;

// ---------------------------------------------------------------------------
// Request and response bodies
// ---------------------------------------------------------------------------

/// Query parameters for the `GET /api/events` endpoint.
#[derive(Debug, Deserialize)]
pub struct EventsQuery {
    /// Maximum number of events to return, newest last (default 50).
    pub limit: Option<usize>,
    /// Only return events with an id greater than this.
    pub since: Option<u64>,
}

/// Query parameters for the `GET /api/contracts` endpoint.
#[derive(Debug, Deserialize)]
pub struct ContractsQuery {
    /// `active` or `all` (default `all`).
    pub status: Option<String>,
}

/// A contract id as submitted: a JSON number or a form string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ContractIdInput {
    /// Numeric id.
    Number(u64),
    /// Textual id, possibly empty.
    Text(String),
}

/// Body of `POST /api/action`, as either a form or JSON.
#[derive(Debug, Clone, Deserialize)]
pub struct ActionRequest {
    /// One of `advance`, `accept`, `ignore`, `investigate`, `deliver`.
    pub action: String,
    /// Target contract for `accept`, `ignore`, and `deliver`.
    #[serde(default)]
    pub contract_id: Option<ContractIdInput>,
}

impl ActionRequest {
    /// Validate into a [`PlayerAction`].
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError::InvalidAction`] for an unknown action, a
    /// non-numeric contract id, or a contract action without an id.
    pub fn into_action(self) -> Result<PlayerAction, DashboardError> {
        let kind = ActionKind::from_str(&self.action)
            .map_err(|e| DashboardError::InvalidAction(e.to_string()))?;
        let contract = match self.contract_id {
            None => None,
            Some(ContractIdInput::Number(n)) => Some(ContractId(n)),
            Some(ContractIdInput::Text(text)) => {
                let text = text.trim().trim_start_matches('#');
                if text.is_empty() {
                    None
                } else {
                    let n = text.parse::<u64>().map_err(|e| {
                        DashboardError::InvalidAction(format!("contract_id `{text}`: {e}"))
                    })?;
                    Some(ContractId(n))
                }
            }
        };
        PlayerAction::from_parts(kind, contract)
            .map_err(|e| DashboardError::InvalidAction(e.to_string()))
    }
}

/// The world as served by `GET /api/state`.
#[derive(Debug, Clone, Serialize)]
pub struct StateResponse {
    /// Scalar world state.
    pub world: World,
    /// Current grain tier.
    pub grain_tier: GrainTier,
    /// Current unrest tier.
    pub unrest_tier: UnrestTier,
    /// Market multiplier after any restriction.
    pub effective_multiplier: Decimal,
    /// Every contract, oldest first.
    pub contracts: Vec<Contract>,
    /// The most recent events, oldest first.
    pub recent_events: Vec<Event>,
}

impl StateResponse {
    /// Project the simulation for display.
    pub fn from_state(sim: &SimulationState, recent: usize) -> Self {
        let grain_tier = sim.grain_tier();
        Self {
            world: sim.world(),
            grain_tier,
            unrest_tier: sim.unrest_tier(),
            effective_multiplier: market::effective_multiplier(
                grain_tier,
                sim.restricted_markets() > 0,
            ),
            contracts: sim.contracts().to_vec(),
            recent_events: sim.events().recent(recent),
        }
    }
}

/// Label for an [`ActionOutcome`] in JSON responses.
const fn outcome_label(outcome: &ActionOutcome) -> &'static str {
    match outcome {
        ActionOutcome::Applied(_) => "applied",
        ActionOutcome::Passed => "passed",
        ActionOutcome::Ignored => "ignored",
    }
}

// ---------------------------------------------------------------------------
// GET / -- HTML status page
// ---------------------------------------------------------------------------

/// Serve the status page: world metrics, contracts with their buttons, and
/// the recent event feed.
pub async fn index(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let sim = state.sim.lock().await;
    let view = StateResponse::from_state(&sim, state.recent_events);
    drop(sim);
    Html(render_index(&view))
}

fn render_index(view: &StateResponse) -> String {
    let world = &view.world;

    let mut contracts = String::new();
    for c in &view.contracts {
        let buttons = if c.is_active() {
            let mut b = String::new();
            for action in ["accept", "ignore", "deliver"] {
                let _ = write!(
                    b,
                    r#"<form method="post" action="/api/action"><input type="hidden" name="action" value="{action}"><input type="hidden" name="contract_id" value="{id}"><button>{action}</button></form>"#,
                    id = c.id,
                );
            }
            b
        } else {
            String::new()
        };
        let _ = write!(
            contracts,
            "<tr><td>#{}</td><td>{}</td><td>{}</td><td>{}</td><td>Day {} {}</td><td class=\"actions\">{buttons}</td></tr>",
            c.id, c.kind, c.status, c.deadline, c.issued_day, c.issued_subphase,
        );
    }
    if contracts.is_empty() {
        contracts.push_str(r#"<tr><td colspan="6" class="muted">No contracts yet.</td></tr>"#);
    }

    let mut events = String::new();
    for e in view.recent_events.iter().rev() {
        let _ = write!(
            events,
            "<li class=\"sev{}\"><span class=\"muted\">Day {} {}</span> {}</li>",
            e.severity,
            e.day,
            e.subphase,
            escape_html(&e.text),
        );
    }
    if events.is_empty() {
        events.push_str(r#"<li class="muted">The city is quiet.</li>"#);
    }

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <title>Granary</title>
    <style>
        body {{
            background: #0d1117;
            color: #c9d1d9;
            font-family: 'Cascadia Code', 'Fira Code', 'Consolas', monospace;
            padding: 2rem;
            max-width: 900px;
            margin: 0 auto;
        }}
        h1 {{ color: #e3b341; margin-bottom: 0.25rem; }}
        .muted {{ color: #8b949e; }}
        .metric {{
            display: inline-block;
            background: #161b22;
            border: 1px solid #30363d;
            border-radius: 6px;
            padding: 1rem 1.5rem;
            margin: 0.5rem 0.5rem 0.5rem 0;
            min-width: 120px;
        }}
        .metric .label {{ color: #8b949e; font-size: 0.85rem; }}
        .metric .value {{ color: #e3b341; font-size: 1.5rem; font-weight: bold; }}
        table {{ width: 100%; border-collapse: collapse; }}
        td {{ border-top: 1px solid #30363d; padding: 0.4rem; }}
        form {{ display: inline; }}
        button {{ background: #21262d; color: #c9d1d9; border: 1px solid #30363d; border-radius: 4px; margin-right: 0.3rem; }}
        ul {{ list-style: none; padding: 0; }}
        li {{ padding: 0.3rem 0; }}
        .sev4, .sev5 {{ color: #f85149; }}
        .sev3 {{ color: #e3b341; }}
        hr {{ border: none; border-top: 1px solid #30363d; margin: 1.5rem 0; }}
    </style>
</head>
<body>
    <h1>Granary</h1>
    <p class="muted">Day {day}, {subphase}</p>

    <div>
        <div class="metric"><div class="label">Grain</div><div class="value">{grain}</div><div class="label">{grain_tier}</div></div>
        <div class="metric"><div class="label">Unrest</div><div class="value">{unrest}</div><div class="label">{unrest_tier}</div></div>
        <div class="metric"><div class="label">Prices</div><div class="value">x{multiplier}</div><div class="label">restricted {restricted}</div></div>
    </div>

    <p>
        <form method="post" action="/api/action"><input type="hidden" name="action" value="advance"><button>advance</button></form>
        <form method="post" action="/api/action"><input type="hidden" name="action" value="investigate"><button>investigate</button></form>
    </p>

    <hr>
    <h2>Contracts</h2>
    <table>{contracts}</table>

    <hr>
    <h2>Events</h2>
    <ul>{events}</ul>
</body>
</html>"#,
        day = world.day,
        subphase = world.subphase,
        grain = world.grain,
        grain_tier = view.grain_tier,
        unrest = world.unrest,
        unrest_tier = view.unrest_tier,
        multiplier = view.effective_multiplier,
        restricted = world.restricted_markets,
    )
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}

// ---------------------------------------------------------------------------
// GET /api/state
// ---------------------------------------------------------------------------

/// Return the world, tiers, contracts, and recent events.
pub async fn get_state(State(state): State<Arc<AppState>>) -> Json<StateResponse> {
    let sim = state.sim.lock().await;
    Json(StateResponse::from_state(&sim, state.recent_events))
}

// ---------------------------------------------------------------------------
// GET /api/events
// ---------------------------------------------------------------------------

/// Return the most recent events, oldest first.
///
/// # Query Parameters
///
/// - `limit`: Maximum number of events (default 50).
/// - `since`: Only events newer than this event id.
pub async fn list_events(
    State(state): State<Arc<AppState>>,
    query: Result<Query<EventsQuery>, QueryRejection>,
) -> Result<impl IntoResponse, DashboardError> {
    let Query(params) = query.map_err(|e| DashboardError::InvalidQuery(e.body_text()))?;
    let limit = params.limit.unwrap_or(DEFAULT_EVENT_LIMIT);

    let sim = state.sim.lock().await;
    let events = match params.since {
        Some(id) => {
            let mut newer = sim.events().since(EventId(id));
            let excess = newer.len().saturating_sub(limit);
            newer.drain(..excess);
            newer
        }
        None => sim.events().recent(limit),
    };

    Ok(Json(serde_json::json!({
        "count": events.len(),
        "events": events,
    })))
}

// ---------------------------------------------------------------------------
// GET /api/contracts
// ---------------------------------------------------------------------------

/// List contracts, optionally only the active ones.
///
/// # Query Parameters
///
/// - `status`: `active` | `all` (default: `all`)
pub async fn list_contracts(
    State(state): State<Arc<AppState>>,
    query: Result<Query<ContractsQuery>, QueryRejection>,
) -> Result<impl IntoResponse, DashboardError> {
    let Query(params) = query.map_err(|e| DashboardError::InvalidQuery(e.body_text()))?;
    let active_only = match params.status.as_deref() {
        None | Some("all") => false,
        Some("active") => true,
        Some(other) => {
            return Err(DashboardError::InvalidQuery(format!(
                "status must be `active` or `all`, got `{other}`"
            )));
        }
    };

    let sim = state.sim.lock().await;
    let contracts: Vec<&Contract> = sim
        .contracts()
        .iter()
        .filter(|c| !active_only || c.is_active())
        .collect();

    Ok(Json(serde_json::json!({
        "count": contracts.len(),
        "contracts": contracts,
    })))
}

/// Return a single contract.
pub async fn get_contract(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> Result<impl IntoResponse, DashboardError> {
    let sim = state.sim.lock().await;
    let contract = sim
        .contracts()
        .get(ContractId(id))
        .ok_or_else(|| DashboardError::NotFound(format!("contract {id}")))?;
    Ok(Json(serde_json::to_value(contract)?))
}

// ---------------------------------------------------------------------------
// POST /api/action
// ---------------------------------------------------------------------------

/// Apply a player action, then run exactly one tick.
///
/// Accepts `application/json` or a url-encoded form. Form posts (from the
/// status page) are answered with a redirect back to `/`; JSON posts get
/// the action outcome, the tick summary, and the new state.
pub async fn post_action(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Response, DashboardError> {
    let is_json = request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("application/json"));

    let body = if is_json {
        let Json(body) = Json::<ActionRequest>::from_request(request, &())
            .await
            .map_err(|e| DashboardError::InvalidAction(e.body_text()))?;
        body
    } else {
        let axum::Form(body) = axum::Form::<ActionRequest>::from_request(request, &())
            .await
            .map_err(|e| DashboardError::InvalidAction(e.body_text()))?;
        body
    };
    let action = body.into_action()?;

    let mut sim = state.sim.lock().await;
    let report = sim.submit(action)?;
    info!(
        action = %action.kind(),
        outcome = outcome_label(&report.outcome),
        day = report.tick.day,
        subphase = %report.tick.subphase,
        "Action handled"
    );
    state.persist(&sim).await;

    if !is_json {
        return Ok(Redirect::to("/").into_response());
    }

    let view = StateResponse::from_state(&sim, state.recent_events);
    Ok(Json(serde_json::json!({
        "action": action.kind(),
        "outcome": outcome_label(&report.outcome),
        "action_event": report.outcome.event(),
        "tick": report.tick,
        "state": view,
    }))
    .into_response())
}
