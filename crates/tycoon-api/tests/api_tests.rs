//! Integration tests for the action API endpoints.
//!
//! Tests use Axum's `Router` directly via `tower::ServiceExt` without
//! starting a TCP server. The world is seeded in memory and time comes
//! from a manual clock.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::{TimeZone, Utc};
use serde_json::{Value, json};
use tokio::sync::Mutex;
use tower::ServiceExt;

use tycoon_api::router::build_router;
use tycoon_api::state::AppState;
use tycoon_core::ManualClock;
use tycoon_economy::seed::seed_world;
use tycoon_economy::{EconomyConfig, NewPlayer, World, register};
use tycoon_types::{PlayerId, RegionId, Resource};

struct Fixture {
    state: Arc<AppState>,
    ana: PlayerId,
    home: RegionId,
}

async fn fixture() -> Fixture {
    let start = Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap();
    let config = EconomyConfig::default();
    let mut world = World::new();
    seed_world(&mut world, &config, start);
    let home = *world.regions.keys().next().unwrap();
    let ana = register(
        &mut world,
        &NewPlayer {
            username: "ana".to_owned(),
            region_id: home,
        },
        start,
        &config,
    )
    .unwrap();

    let state = Arc::new(AppState::new(
        Arc::new(Mutex::new(world)),
        Arc::new(config),
        Arc::new(ManualClock::new(start)),
    ));
    Fixture { state, ana, home }
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn post(path: &str, body: &Value) -> Request<Body> {
    Request::post(path)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(path: &str) -> Request<Body> {
    Request::get(path).body(Body::empty()).unwrap()
}

// =========================================================================
// Read views
// =========================================================================

#[tokio::test]
async fn health_reports_counts() {
    let f = fixture().await;
    let regions = f.state.world.lock().await.regions.len();

    let response = build_router(f.state).oneshot(get("/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["players"], 1);
    assert_eq!(json["regions"], regions);
}

#[tokio::test]
async fn player_profile_includes_warehouse_and_starter_vehicle() {
    let f = fixture().await;
    let path = format!("/api/players/{}", f.ana);

    let response = build_router(f.state).oneshot(get(&path)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["player"]["username"], "ana");
    assert_eq!(json["player"]["energy"], 200);
    assert_eq!(json["vehicles"].as_array().unwrap().len(), 1);
    assert_eq!(json["max_fleet"], 1);
    assert!(json["journey"].is_null());
}

#[tokio::test]
async fn unknown_player_is_not_found() {
    let f = fixture().await;
    let path = format!("/api/players/{}", PlayerId::new());

    let response = build_router(f.state).oneshot(get(&path)).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["status"], 404);
}

#[tokio::test]
async fn malformed_player_id_is_bad_request() {
    let f = fixture().await;

    let response = build_router(f.state)
        .oneshot(get("/api/players/not-a-uuid"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn regions_list_state_companies() {
    let f = fixture().await;
    let regions = f.state.world.lock().await.regions.len();

    let response = build_router(f.state)
        .oneshot(get("/api/regions"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["count"], regions);
    for entry in json["regions"].as_array().unwrap() {
        assert_eq!(entry["companies"].as_array().unwrap().len(), 2);
    }
}

#[tokio::test]
async fn history_shows_pending_registration() {
    let f = fixture().await;
    let path = format!("/api/players/{}/history?limit=5", f.ana);

    let response = build_router(f.state).oneshot(get(&path)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["count"], 1);
    assert_eq!(json["history"][0]["action"], "REGISTRATION");
}

#[tokio::test]
async fn order_book_filters_and_rejects_bad_queries() {
    let f = fixture().await;
    let router = build_router(f.state);

    let response = router
        .clone()
        .oneshot(get("/api/market/orders?side=SELL&resource=iron"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["count"], 0);

    let response = router
        .oneshot(get("/api/market/orders?side=SIDEWAYS"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// =========================================================================
// Actions
// =========================================================================

#[tokio::test]
async fn registration_creates_a_player_and_rejects_duplicates() {
    let f = fixture().await;
    let router = build_router(Arc::clone(&f.state));
    let body = json!({ "username": "bia", "region_id": f.home });

    let response = router
        .clone()
        .oneshot(post("/api/players", &body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["success"], true);
    assert!(json["reference"].is_string());
    assert_eq!(f.state.world.lock().await.players.len(), 2);

    let response = router.oneshot(post("/api/players", &body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["success"], false);
}

#[tokio::test]
async fn malformed_body_is_bad_request() {
    let f = fixture().await;
    let path = format!("/api/players/{}/train", f.ana);

    let response = build_router(f.state)
        .oneshot(post(&path, &json!({ "skill": "juggling" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["success"], false);
}

#[tokio::test]
async fn training_succeeds_once_then_conflicts() {
    let f = fixture().await;
    let router = build_router(Arc::clone(&f.state));
    let path = format!("/api/players/{}/train", f.ana);
    let body = json!({ "skill": "education" });

    let response = router.clone().oneshot(post(&path, &body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["success"], true);

    // The handler asked for a save.
    tokio::time::timeout(Duration::from_millis(100), f.state.persist.notified())
        .await
        .unwrap();

    let response = router.oneshot(post(&path, &body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn mining_validates_energy_and_spends_it() {
    let f = fixture().await;
    let company = f
        .state
        .world
        .lock()
        .await
        .state_company(f.home, Resource::Gold)
        .unwrap();
    let router = build_router(Arc::clone(&f.state));
    let path = format!("/api/players/{}/mine-gold", f.ana);

    let response = router
        .clone()
        .oneshot(post(&path, &json!({ "company_id": company, "energy": 15 })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(f.state.world.lock().await.player(f.ana).unwrap().energy, 200);

    let response = router
        .oneshot(post(&path, &json!({ "company_id": company, "energy": 10 })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(f.state.world.lock().await.player(f.ana).unwrap().energy < 200);
}

#[tokio::test]
async fn cancelling_an_unknown_order_is_not_found() {
    let f = fixture().await;
    let path = format!(
        "/api/players/{}/market/orders/{}/cancel",
        f.ana,
        uuid::Uuid::new_v4()
    );

    let response = build_router(f.state)
        .oneshot(Request::post(&path).body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
