//! Axum router construction for the dashboard.
//!
//! Assembles all routes into a single [`Router`] with CORS middleware
//! enabled for cross-origin access to the JSON API.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Build the complete Axum router for the dashboard.
///
/// The router includes:
/// - `GET /` -- HTML status page
/// - `GET /api/state` -- world, tiers, contracts, recent events
/// - `GET /api/events` -- recent events
/// - `GET /api/contracts` -- list contracts
/// - `GET /api/contracts/{id}` -- single contract
/// - `POST /api/action` -- apply an action and tick once
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Status page
        .route("/", get(handlers::index))
        // Read API
        .route("/api/state", get(handlers::get_state))
        .route("/api/events", get(handlers::list_events))
        .route("/api/contracts", get(handlers::list_contracts))
        .route("/api/contracts/{id}", get(handlers::get_contract))
        // Write API
        .route("/api/action", post(handlers::post_action))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
