//! Axum router construction for the action API.
//!
//! Assembles all routes (REST + `WebSocket`) into a single [`Router`]
//! with CORS middleware enabled for the browser client.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;
use crate::ws;

/// Build the complete Axum router.
///
/// See [`handlers`] for the endpoint table. `GET /ws/jobs` streams job
/// reports.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health))
        .route("/ws/jobs", get(ws::ws_jobs))
        // Read views
        .route("/api/regions", get(handlers::list_regions))
        .route("/api/market/orders", get(handlers::list_orders))
        .route("/api/players/{id}", get(handlers::get_player))
        .route("/api/players/{id}/history", get(handlers::get_history))
        // Actions
        .route("/api/players", post(handlers::register_player))
        .route("/api/players/{id}/mine-gold", post(handlers::mine_gold))
        .route("/api/players/{id}/mine-iron", post(handlers::mine_iron))
        .route("/api/players/{id}/travel", post(handlers::travel))
        .route("/api/players/{id}/residency", post(handlers::request_residency))
        .route(
            "/api/players/{id}/residency/cancel",
            post(handlers::cancel_residency),
        )
        .route("/api/players/{id}/companies", post(handlers::open_company))
        .route(
            "/api/players/{id}/companies/{company_id}/rate",
            post(handlers::adjust_company_rate),
        )
        .route("/api/players/{id}/transport", post(handlers::start_transport))
        .route("/api/players/{id}/train", post(handlers::train_skill))
        .route(
            "/api/players/{id}/warehouse/upgrade",
            post(handlers::start_upgrade),
        )
        .route(
            "/api/players/{id}/warehouse/vehicles",
            post(handlers::buy_vehicle),
        )
        .route("/api/players/{id}/fields", post(handlers::create_field))
        .route(
            "/api/players/{id}/fields/{field_id}/plant",
            post(handlers::plant_crop),
        )
        .route(
            "/api/players/{id}/market/sell",
            post(handlers::create_sell_order),
        )
        .route(
            "/api/players/{id}/market/buy",
            post(handlers::create_buy_order),
        )
        .route(
            "/api/players/{id}/market/orders/{order_id}/fill",
            post(handlers::fill_order),
        )
        .route(
            "/api/players/{id}/market/orders/{order_id}/cancel",
            post(handlers::cancel_order),
        )
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
