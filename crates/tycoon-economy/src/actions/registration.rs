//! New player registration.
//!
//! A new player starts with the configured wallet and full energy in the
//! chosen region, which becomes both the current and the residence
//! region. They also receive a warehouse there with the cheapest vehicle
//! in the catalog.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use tycoon_types::{
    Account, EntryKind, HistoryAction, Player, PlayerId, RegionId, Vehicle, VehicleId, Warehouse,
    WarehouseId,
};

use crate::config::EconomyConfig;
use crate::error::ActionError;
use crate::world::World;

/// Longest accepted username.
pub const MAX_USERNAME_LEN: usize = 32;

/// Registration payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPlayer {
    /// Unique display name.
    pub username: String,
    /// Starting region.
    pub region_id: RegionId,
}

/// Create a player, their warehouse and their starter vehicle.
#[allow(clippy::too_many_lines)]
pub fn register_player(
    world: &mut World,
    request: &NewPlayer,
    now: DateTime<Utc>,
    config: &EconomyConfig,
) -> Result<PlayerId, ActionError> {
    let username = request.username.trim();
    if username.is_empty() || username.chars().count() > MAX_USERNAME_LEN {
        return Err(ActionError::rejected(format!(
            "username must be 1 to {MAX_USERNAME_LEN} characters"
        )));
    }
    if world.player_by_username(username).is_some() {
        return Err(ActionError::conflict(format!(
            "username {username} is already taken"
        )));
    }
    let region = world.region(request.region_id)?;
    let region_name = region.name.clone();

    let id = PlayerId::new();
    world.players.insert(
        id,
        Player {
            id,
            username: username.to_owned(),
            money: Decimal::ZERO,
            reserved_money: Decimal::ZERO,
            gold: Decimal::ZERO,
            energy: config.player.max_energy,
            level: 1,
            xp: Decimal::ZERO,
            work_xp: Decimal::ZERO,
            education: 0,
            health: 0,
            philanthropy: 0,
            current_region: request.region_id,
            residence_region: request.region_id,
            last_status_update: now,
            created_at: now,
        },
    );
    let wallet = (Account::World, Account::Player(id));
    world.move_money(
        now,
        EntryKind::Yield,
        wallet,
        config.player.starting_money,
        "registration",
    )?;
    world.move_gold(
        now,
        EntryKind::Yield,
        wallet,
        config.player.starting_gold,
        "registration",
    )?;

    let warehouse_id = WarehouseId::new();
    world.warehouses.insert(
        warehouse_id,
        Warehouse {
            id: warehouse_id,
            player_id: id,
            region_id: request.region_id,
            capacity_level: 1,
            fleet_level: 1,
            specialization_level: 1,
            stock: BTreeMap::new(),
        },
    );

    if let Some(spec) = config.warehouse.starter_vehicle() {
        let vehicle_id = VehicleId::new();
        world.vehicles.insert(
            vehicle_id,
            Vehicle {
                id: vehicle_id,
                warehouse_id,
                vehicle_type: spec.vehicle_type,
                capacity: spec.capacity,
                speed: spec.speed,
                cost_per_ton_km: spec.cost_per_ton_km,
                validity_days: spec.validity_days,
                purchased_at: now,
            },
        );
    }

    world.log(
        id,
        HistoryAction::Registration,
        format!("Registered in {region_name}"),
        config.player.starting_money,
        config.player.starting_gold,
        now,
    );
    Ok(id)
}
