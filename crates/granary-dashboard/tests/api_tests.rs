//! Integration tests for the dashboard endpoints.
//!
//! Tests use Axum's `Router` directly via `tower::ServiceExt` without
//! starting a TCP server. This validates handler logic and routing
//! without needing a live network connection.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use granary_core::config::TierChances;
use granary_core::{MemorySnapshotStore, SimulationConfig, SimulationState};
use granary_dashboard::router::build_router;
use granary_dashboard::state::AppState;
use serde_json::Value;
use tower::ServiceExt;

/// A world with fixed consumption and no shocks.
fn quiet_config() -> SimulationConfig {
    let mut config = SimulationConfig::default();
    config.economy = config.economy.without_shocks();
    config.economy.consumption_jitter = 0;
    config.contracts.success_pct = TierChances::flat(0);
    config.contracts.accepted_bonus_pct = 0;
    config
}

fn make_test_state() -> Arc<AppState> {
    Arc::new(AppState::new(SimulationState::new(quiet_config(), 7)))
}

/// A state whose first tick posts a smuggling contract (id 1).
fn make_scarce_state() -> Arc<AppState> {
    let mut sim = SimulationState::new(quiet_config(), 7);
    sim.set_grain(100);
    Arc::new(AppState::new(sim))
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn get(router: &Router, path: &str) -> (StatusCode, Value) {
    let response = router
        .clone()
        .oneshot(Request::get(path).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    (status, body_to_json(response.into_body()).await)
}

async fn post_json(router: &Router, body: &Value) -> (StatusCode, Value) {
    let response = router
        .clone()
        .oneshot(
            Request::post("/api/action")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    (status, body_to_json(response.into_body()).await)
}

// =========================================================================
// Reads
// =========================================================================

#[tokio::test]
async fn test_index_returns_html() {
    let router = build_router(make_test_state());

    let response = router
        .oneshot(Request::get("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response
        .headers()
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap();
    assert!(content_type.contains("text/html"));
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let html = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(html.contains("Day 1, Morning"));
    assert!(html.contains(r#"value="investigate""#));
}

#[tokio::test]
async fn test_get_state_of_fresh_world() {
    let router = build_router(make_test_state());
    let (status, json) = get(&router, "/api/state").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["world"]["day"], 1);
    assert_eq!(json["world"]["subphase"], "Morning");
    assert_eq!(json["world"]["grain"], 300);
    assert_eq!(json["grain_tier"], "Stable");
    assert_eq!(json["unrest_tier"], "Calm");
    assert_eq!(json["contracts"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_events_limit() {
    let state = make_scarce_state();
    let router = build_router(Arc::clone(&state));
    // 100 - 18 stays Scarce: faction event plus contract-issued event.
    post_json(&router, &serde_json::json!({ "action": "advance" })).await;

    let (status, json) = get(&router, "/api/events?limit=1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["count"], 1);
    assert_eq!(json["events"][0]["kind"], "ContractIssued");

    let (status, json) = get(&router, "/api/events").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["count"], 2);

    let first_id = json["events"][0]["id"].as_u64().unwrap();
    let (_, json) = get(&router, &format!("/api/events?since={first_id}")).await;
    assert_eq!(json["count"], 1);
    assert_eq!(json["events"][0]["kind"], "ContractIssued");
}

#[tokio::test]
async fn test_events_bad_limit_is_rejected() {
    let router = build_router(make_test_state());
    let (status, json) = get(&router, "/api/events?limit=lots").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["status"], 400);
}

#[tokio::test]
async fn test_contracts_listing_and_lookup() {
    let router = build_router(make_scarce_state());
    post_json(&router, &serde_json::json!({ "action": "advance" })).await;

    let (status, json) = get(&router, "/api/contracts?status=active").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["count"], 1);
    assert_eq!(json["contracts"][0]["kind"], "Smuggling");

    let (status, json) = get(&router, "/api/contracts/1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "Issued");

    let (status, _) = get(&router, "/api/contracts/99").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = get(&router, "/api/contracts?status=closed").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_contracts_malformed_query_is_json_error() {
    let router = build_router(make_test_state());
    let (status, json) = get(&router, "/api/contracts?status=all&status=active").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["status"], 400);
    assert!(json["error"].is_string());
}

// =========================================================================
// Actions
// =========================================================================

#[tokio::test]
async fn test_advance_ticks_once() {
    let router = build_router(make_test_state());
    let (status, json) = post_json(&router, &serde_json::json!({ "action": "advance" })).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["outcome"], "passed");
    assert_eq!(json["tick"]["subphase"], "Evening");
    assert_eq!(json["state"]["world"]["grain"], 282);
}

#[tokio::test]
async fn test_investigate_lowers_unrest_then_ticks() {
    let mut sim = SimulationState::new(quiet_config(), 7);
    sim.set_unrest(20);
    let router = build_router(Arc::new(AppState::new(sim)));

    let (status, json) =
        post_json(&router, &serde_json::json!({ "action": "investigate" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["outcome"], "applied");
    assert_eq!(json["action_event"]["kind"], "Player");
    assert_eq!(json["state"]["world"]["unrest"], 15);
}

#[tokio::test]
async fn test_form_post_redirects_to_index() {
    let state = make_scarce_state();
    let router = build_router(Arc::clone(&state));
    post_json(&router, &serde_json::json!({ "action": "advance" })).await;

    let response = router
        .clone()
        .oneshot(
            Request::post("/api/action")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from("action=accept&contract_id=1"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/");

    let (_, json) = get(&router, "/api/contracts/1").await;
    assert_eq!(json["status"], "Accepted");
}

#[tokio::test]
async fn test_unknown_contract_is_ignored_but_ticks() {
    let router = build_router(make_test_state());
    let (status, json) = post_json(
        &router,
        &serde_json::json!({ "action": "deliver", "contract_id": 41 }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["outcome"], "ignored");
    assert!(json["action_event"].is_null());
    assert_eq!(json["tick"]["day"], 1);
    assert_eq!(json["tick"]["subphase"], "Evening");
}

#[tokio::test]
async fn test_malformed_actions_leave_world_untouched() {
    let state = make_test_state();
    let router = build_router(Arc::clone(&state));

    let bad_bodies = [
        serde_json::json!({ "action": "bake" }),
        serde_json::json!({ "action": "accept" }),
        serde_json::json!({ "action": "ignore", "contract_id": "seven" }),
        serde_json::json!({ "contract_id": 1 }),
    ];
    for body in &bad_bodies {
        let (status, json) = post_json(&router, body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "body {body}");
        assert_eq!(json["status"], 400);
    }

    let response = router
        .clone()
        .oneshot(
            Request::post("/api/action")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let sim = state.sim.lock().await;
    assert_eq!(sim.day(), 1);
    assert_eq!(sim.subphase(), granary_types::Subphase::Morning);
    assert!(sim.events().is_empty());
}

#[tokio::test]
async fn test_actions_are_persisted() {
    let sim = SimulationState::new(quiet_config(), 7);
    let state = Arc::new(AppState::new(sim).with_store(Box::new(MemorySnapshotStore::new())));
    let router = build_router(Arc::clone(&state));

    post_json(&router, &serde_json::json!({ "action": "advance" })).await;
    post_json(&router, &serde_json::json!({ "action": "advance" })).await;

    let store = state.store.as_ref().unwrap().lock().await;
    let stored = store.load().unwrap().unwrap();
    assert_eq!(stored.snapshot.world.day, 2);
    assert_eq!(stored.snapshot.world.subphase, granary_types::Subphase::Morning);
}
