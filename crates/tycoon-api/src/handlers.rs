//! REST endpoint handlers for the action API.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/api/players` | Register a player |
//! | `POST` | `/api/players/{id}/mine-gold` | Mine gold |
//! | `POST` | `/api/players/{id}/mine-iron` | Mine iron into a pickup |
//! | `POST` | `/api/players/{id}/travel` | Start a journey |
//! | `POST` | `/api/players/{id}/residency` | Request a residence move |
//! | `POST` | `/api/players/{id}/residency/cancel` | Withdraw the request |
//! | `POST` | `/api/players/{id}/companies` | Open a private company |
//! | `POST` | `/api/players/{id}/companies/{company_id}/rate` | Change profit share |
//! | `POST` | `/api/players/{id}/transport` | Haul a pickup home |
//! | `POST` | `/api/players/{id}/train` | Train a skill |
//! | `POST` | `/api/players/{id}/warehouse/upgrade` | Upgrade a warehouse track |
//! | `POST` | `/api/players/{id}/warehouse/vehicles` | Buy a vehicle |
//! | `POST` | `/api/players/{id}/fields` | Open a farm field |
//! | `POST` | `/api/players/{id}/fields/{field_id}/plant` | Plant corn |
//! | `POST` | `/api/players/{id}/market/sell` | Post a sell order |
//! | `POST` | `/api/players/{id}/market/buy` | Post a buy order |
//! | `POST` | `/api/players/{id}/market/orders/{order_id}/fill` | Take an order |
//! | `POST` | `/api/players/{id}/market/orders/{order_id}/cancel` | Cancel an own order |
//! | `GET` | `/api/players/{id}` | Player profile |
//! | `GET` | `/api/players/{id}/history` | Action history, newest first |
//! | `GET` | `/api/regions` | Regions with residents and companies |
//! | `GET` | `/api/market/orders` | Order book |
//! | `GET` | `/health` | Liveness |

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use tycoon_economy::actions::warehouse::{capacity_tons, max_fleet};
use tycoon_economy::market::order_book;
use tycoon_economy::progression::xp_needed_for_next_level;
use tycoon_economy::{Action, ActionOutcome, NewPlayer, OrderFilter, TripRequest, World};
use tycoon_economy::{perform, register};
use tycoon_types::{
    CompanyId, FieldId, HistoryEntry, OrderId, OrderStatus, PlayerId, Resource, Skill,
    VehicleType, WarehouseTrack,
};

use crate::error::ApiError;
use crate::state::AppState;

/// Default number of history entries returned.
const DEFAULT_HISTORY_LIMIT: usize = 50;

/// Upper bound on history entries per request.
const MAX_HISTORY_LIMIT: usize = 200;

// ---------------------------------------------------------------------------
// Request and response bodies
// ---------------------------------------------------------------------------

/// Answer to every successful action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionResponse {
    /// Always `true`; failures use the error body.
    pub success: bool,
    /// Message for the player.
    pub message: String,
    /// Id of the record the action created, if any.
    pub reference: Option<Uuid>,
}

impl From<ActionOutcome> for ActionResponse {
    fn from(outcome: ActionOutcome) -> Self {
        Self {
            success: true,
            message: outcome.message,
            reference: outcome.reference,
        }
    }
}

/// Body of the mining endpoints.
#[derive(Debug, Deserialize)]
pub struct MineRequest {
    /// Company to mine at.
    pub company_id: CompanyId,
    /// Energy to spend.
    pub energy: u32,
}

/// Body of the travel and residency endpoints.
#[derive(Debug, Deserialize)]
pub struct DestinationRequest {
    /// Target region.
    pub destination: tycoon_types::RegionId,
}

/// Body of `POST /api/players/{id}/companies`.
#[derive(Debug, Deserialize)]
pub struct OpenCompanyRequest {
    /// Company name.
    pub name: String,
    /// What it produces.
    pub product: Resource,
    /// Initial profit share.
    pub profit_rate: Decimal,
}

/// Body of the company rate endpoint.
#[derive(Debug, Deserialize)]
pub struct RateRequest {
    /// New profit share.
    pub rate: Decimal,
}

/// Body of `POST /api/players/{id}/transport`.
#[derive(Debug, Deserialize)]
pub struct TransportRequest {
    /// Region where the goods wait.
    pub region_id: tycoon_types::RegionId,
    /// Resource to haul.
    pub resource: Resource,
    /// Trips per vehicle.
    pub trips: Vec<TripRequest>,
}

/// Body of `POST /api/players/{id}/train`.
#[derive(Debug, Deserialize)]
pub struct TrainRequest {
    /// Skill to train.
    pub skill: Skill,
}

/// Body of `POST /api/players/{id}/warehouse/upgrade`.
#[derive(Debug, Deserialize)]
pub struct UpgradeRequest {
    /// Track to upgrade.
    pub track: WarehouseTrack,
}

/// Body of `POST /api/players/{id}/warehouse/vehicles`.
#[derive(Debug, Deserialize)]
pub struct VehicleRequest {
    /// Catalog model.
    pub vehicle_type: VehicleType,
}

/// Body of `POST /api/players/{id}/fields`.
#[derive(Debug, Deserialize)]
pub struct FieldRequest {
    /// Field name.
    pub name: String,
    /// Owner's cut of other players' harvests.
    pub profit_rate: Decimal,
}

/// Body of the planting endpoint.
#[derive(Debug, Deserialize)]
pub struct PlantRequest {
    /// Energy to spend.
    pub energy: u32,
}

/// Body of the sell and buy endpoints.
#[derive(Debug, Deserialize)]
pub struct OrderRequest {
    /// Resource traded.
    pub resource: Resource,
    /// Quantity.
    pub quantity: Decimal,
    /// Price per unit.
    pub price: Decimal,
}

/// Body of the fill endpoint.
#[derive(Debug, Deserialize)]
pub struct FillRequest {
    /// Quantity to take.
    pub quantity: Decimal,
}

/// Query parameters for `GET /api/players/{id}/history`.
#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    /// Maximum entries to return (default 50, at most 200).
    pub limit: Option<usize>,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn parse_uuid(s: &str) -> Result<Uuid, ApiError> {
    s.parse::<Uuid>()
        .map_err(|e| ApiError::InvalidUuid(format!("{s}: {e}")))
}

fn bad_body(rejection: JsonRejection) -> ApiError {
    ApiError::BadRequest(rejection.body_text())
}

/// Run `action` for the player named in the path and request a save.
async fn act(
    state: &AppState,
    player: &str,
    action: Action,
) -> Result<Json<ActionResponse>, ApiError> {
    let player = PlayerId::from(parse_uuid(player)?);
    let now = state.clock.now();
    let outcome = {
        let mut world = state.world.lock().await;
        perform(&mut world, player, &action, now, &state.config)?
    };
    state.request_persist();
    Ok(Json(ActionResponse::from(outcome)))
}

// ---------------------------------------------------------------------------
// POST /api/players -- registration
// ---------------------------------------------------------------------------

/// Register a player in a starting region.
pub async fn register_player(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<NewPlayer>, JsonRejection>,
) -> Result<(StatusCode, Json<ActionResponse>), ApiError> {
    let Json(request) = payload.map_err(bad_body)?;
    let now = state.clock.now();
    let id = {
        let mut world = state.world.lock().await;
        register(&mut world, &request, now, &state.config)?
    };
    state.request_persist();
    Ok((
        StatusCode::CREATED,
        Json(ActionResponse {
            success: true,
            message: format!("welcome, {}", request.username),
            reference: Some(id.into_inner()),
        }),
    ))
}

// ---------------------------------------------------------------------------
// POST /api/players/{id}/... -- actions
// ---------------------------------------------------------------------------

/// Mine gold at a company in the player's current region.
pub async fn mine_gold(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    payload: Result<Json<MineRequest>, JsonRejection>,
) -> Result<Json<ActionResponse>, ApiError> {
    let Json(body) = payload.map_err(bad_body)?;
    let action = Action::MineGold {
        company_id: body.company_id,
        energy: body.energy,
    };
    act(&state, &id, action).await
}

/// Mine iron into a pickup.
pub async fn mine_iron(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    payload: Result<Json<MineRequest>, JsonRejection>,
) -> Result<Json<ActionResponse>, ApiError> {
    let Json(body) = payload.map_err(bad_body)?;
    let action = Action::MineIron {
        company_id: body.company_id,
        energy: body.energy,
    };
    act(&state, &id, action).await
}

/// Start a journey.
pub async fn travel(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    payload: Result<Json<DestinationRequest>, JsonRejection>,
) -> Result<Json<ActionResponse>, ApiError> {
    let Json(body) = payload.map_err(bad_body)?;
    act(
        &state,
        &id,
        Action::Travel {
            destination: body.destination,
        },
    )
    .await
}

/// Request a residence move.
pub async fn request_residency(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    payload: Result<Json<DestinationRequest>, JsonRejection>,
) -> Result<Json<ActionResponse>, ApiError> {
    let Json(body) = payload.map_err(bad_body)?;
    act(
        &state,
        &id,
        Action::RequestResidency {
            destination: body.destination,
        },
    )
    .await
}

/// Withdraw the pending residency request.
pub async fn cancel_residency(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ActionResponse>, ApiError> {
    act(&state, &id, Action::CancelResidency).await
}

/// Open a private company.
pub async fn open_company(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    payload: Result<Json<OpenCompanyRequest>, JsonRejection>,
) -> Result<Json<ActionResponse>, ApiError> {
    let Json(body) = payload.map_err(bad_body)?;
    let action = Action::OpenCompany {
        name: body.name,
        product: body.product,
        profit_rate: body.profit_rate,
    };
    act(&state, &id, action).await
}

/// Change an owned company's profit share.
pub async fn adjust_company_rate(
    State(state): State<Arc<AppState>>,
    Path((id, company_id)): Path<(String, String)>,
    payload: Result<Json<RateRequest>, JsonRejection>,
) -> Result<Json<ActionResponse>, ApiError> {
    let Json(body) = payload.map_err(bad_body)?;
    let action = Action::AdjustCompanyRate {
        company_id: CompanyId::from(parse_uuid(&company_id)?),
        rate: body.rate,
    };
    act(&state, &id, action).await
}

/// Send vehicles to collect a pickup.
pub async fn start_transport(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    payload: Result<Json<TransportRequest>, JsonRejection>,
) -> Result<Json<ActionResponse>, ApiError> {
    let Json(body) = payload.map_err(bad_body)?;
    let action = Action::StartTransport {
        region_id: body.region_id,
        resource: body.resource,
        trips: body.trips,
    };
    act(&state, &id, action).await
}

/// Train a skill one level.
pub async fn train_skill(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    payload: Result<Json<TrainRequest>, JsonRejection>,
) -> Result<Json<ActionResponse>, ApiError> {
    let Json(body) = payload.map_err(bad_body)?;
    act(&state, &id, Action::TrainSkill { skill: body.skill }).await
}

/// Upgrade a warehouse track one level.
pub async fn start_upgrade(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    payload: Result<Json<UpgradeRequest>, JsonRejection>,
) -> Result<Json<ActionResponse>, ApiError> {
    let Json(body) = payload.map_err(bad_body)?;
    act(&state, &id, Action::StartUpgrade { track: body.track }).await
}

/// Buy a vehicle.
pub async fn buy_vehicle(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    payload: Result<Json<VehicleRequest>, JsonRejection>,
) -> Result<Json<ActionResponse>, ApiError> {
    let Json(body) = payload.map_err(bad_body)?;
    let action = Action::BuyVehicle {
        vehicle_type: body.vehicle_type,
    };
    act(&state, &id, action).await
}

/// Open a farm field.
pub async fn create_field(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    payload: Result<Json<FieldRequest>, JsonRejection>,
) -> Result<Json<ActionResponse>, ApiError> {
    let Json(body) = payload.map_err(bad_body)?;
    let action = Action::CreateField {
        name: body.name,
        profit_rate: body.profit_rate,
    };
    act(&state, &id, action).await
}

/// Plant corn on a field.
pub async fn plant_crop(
    State(state): State<Arc<AppState>>,
    Path((id, field_id)): Path<(String, String)>,
    payload: Result<Json<PlantRequest>, JsonRejection>,
) -> Result<Json<ActionResponse>, ApiError> {
    let Json(body) = payload.map_err(bad_body)?;
    let action = Action::PlantCrop {
        field_id: FieldId::from(parse_uuid(&field_id)?),
        energy: body.energy,
    };
    act(&state, &id, action).await
}

/// Post a sell order.
pub async fn create_sell_order(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    payload: Result<Json<OrderRequest>, JsonRejection>,
) -> Result<Json<ActionResponse>, ApiError> {
    let Json(body) = payload.map_err(bad_body)?;
    let action = Action::CreateSellOrder {
        resource: body.resource,
        quantity: body.quantity,
        price: body.price,
    };
    act(&state, &id, action).await
}

/// Post a buy order.
pub async fn create_buy_order(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    payload: Result<Json<OrderRequest>, JsonRejection>,
) -> Result<Json<ActionResponse>, ApiError> {
    let Json(body) = payload.map_err(bad_body)?;
    let action = Action::CreateBuyOrder {
        resource: body.resource,
        quantity: body.quantity,
        price: body.price,
    };
    act(&state, &id, action).await
}

/// Take part or all of another player's order.
pub async fn fill_order(
    State(state): State<Arc<AppState>>,
    Path((id, order_id)): Path<(String, String)>,
    payload: Result<Json<FillRequest>, JsonRejection>,
) -> Result<Json<ActionResponse>, ApiError> {
    let Json(body) = payload.map_err(bad_body)?;
    let action = Action::FillOrder {
        order_id: OrderId::from(parse_uuid(&order_id)?),
        quantity: body.quantity,
    };
    act(&state, &id, action).await
}

/// Cancel an own active order.
pub async fn cancel_order(
    State(state): State<Arc<AppState>>,
    Path((id, order_id)): Path<(String, String)>,
) -> Result<Json<ActionResponse>, ApiError> {
    let action = Action::CancelOrder {
        order_id: OrderId::from(parse_uuid(&order_id)?),
    };
    act(&state, &id, action).await
}

// ---------------------------------------------------------------------------
// GET /api/players/{id} -- profile
// ---------------------------------------------------------------------------

/// Return the player with warehouse, fleet, pickups, timers and holdings.
pub async fn get_player(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let player_id = PlayerId::from(parse_uuid(&id)?);
    let world = state.world.lock().await;
    Ok(Json(player_view(&world, player_id, &state)?))
}

fn player_view(
    world: &World,
    player_id: PlayerId,
    state: &AppState,
) -> Result<serde_json::Value, ApiError> {
    let player = world.player(player_id)?;
    let warehouse = world.warehouse_of(player_id)?;
    let timers = &world.timers;

    let vehicles: Vec<_> = world.vehicles_of(warehouse.id).collect();
    let pickups: Vec<_> = timers
        .pickups()
        .filter(|p| p.player_id == player_id)
        .collect();
    let plantings: Vec<_> = timers
        .plantings()
        .filter(|p| p.player_id == player_id)
        .collect();
    let transports: Vec<_> = timers
        .transports()
        .filter(|t| t.player_id == player_id)
        .collect();
    let companies: Vec<_> = world
        .companies
        .values()
        .filter(|c| c.ownership.owner() == Some(player_id))
        .collect();
    let fields: Vec<_> = world
        .fields
        .values()
        .filter(|f| f.owner == player_id)
        .collect();
    let orders: Vec<_> = world
        .orders
        .values()
        .filter(|o| o.creator == player_id && o.status == OrderStatus::Active)
        .collect();

    Ok(serde_json::json!({
        "player": player,
        "available_money": world.available_money(player_id)?,
        "next_level_xp": xp_needed_for_next_level(player.level, &state.config.progression),
        "warehouse": warehouse,
        "capacity_tons": capacity_tons(warehouse.capacity_level, &state.config.warehouse)?,
        "max_fleet": max_fleet(warehouse.fleet_level),
        "vehicles": vehicles,
        "pickups": pickups,
        "journey": timers.journey(player_id),
        "training": timers.training(player_id),
        "residency_request": timers.residency_request(player_id),
        "plantings": plantings,
        "transports": transports,
        "companies": companies,
        "fields": fields,
        "orders": orders,
    }))
}

// ---------------------------------------------------------------------------
// GET /api/players/{id}/history
// ---------------------------------------------------------------------------

/// Return the player's history, newest first.
///
/// Entries not yet saved come first, then the persisted archive.
pub async fn get_history(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    query: Result<Query<HistoryQuery>, QueryRejection>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let Query(params) = query.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let player_id = PlayerId::from(parse_uuid(&id)?);
    let limit = params
        .limit
        .unwrap_or(DEFAULT_HISTORY_LIMIT)
        .min(MAX_HISTORY_LIMIT);

    let mut entries: Vec<HistoryEntry> = {
        let world = state.world.lock().await;
        world.player(player_id)?;
        world
            .history
            .iter()
            .rev()
            .filter(|e| e.player_id == player_id)
            .take(limit)
            .cloned()
            .collect()
    };
    let remaining = limit.saturating_sub(entries.len());
    if remaining > 0 {
        let archive = state.history.read().await;
        entries.extend(archive.for_player(player_id, remaining));
    }

    Ok(Json(serde_json::json!({
        "count": entries.len(),
        "history": entries,
    })))
}

// ---------------------------------------------------------------------------
// GET /api/regions
// ---------------------------------------------------------------------------

/// List every region with its resident count and companies.
pub async fn list_regions(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let world = state.world.lock().await;
    let regions: Vec<serde_json::Value> = world
        .regions
        .values()
        .map(|region| {
            let companies: Vec<_> = world
                .companies
                .values()
                .filter(|c| c.region_id == region.id)
                .collect();
            serde_json::json!({
                "region": region,
                "residents": world.residents_of(region.id).count(),
                "companies": companies,
            })
        })
        .collect();

    Json(serde_json::json!({
        "count": regions.len(),
        "regions": regions,
    }))
}

// ---------------------------------------------------------------------------
// GET /api/market/orders
// ---------------------------------------------------------------------------

/// Return the order book, cheapest first.
///
/// # Query Parameters
///
/// - `resource`: `gold` | `iron` | `corn`
/// - `side`: `SELL` | `BUY`
/// - `status`: `ACTIVE` | `COMPLETED` | `CANCELLED` | `EXPIRED`
pub async fn list_orders(
    State(state): State<Arc<AppState>>,
    query: Result<Query<OrderFilter>, QueryRejection>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let Query(filter) = query.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let world = state.world.lock().await;
    let orders = order_book(&world, filter);
    Ok(Json(serde_json::json!({
        "count": orders.len(),
        "orders": orders,
    })))
}

// ---------------------------------------------------------------------------
// GET /health
// ---------------------------------------------------------------------------

/// Liveness check.
pub async fn health(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let world = state.world.lock().await;
    Json(serde_json::json!({
        "status": "ok",
        "players": world.players.len(),
        "regions": world.regions.len(),
    }))
}
