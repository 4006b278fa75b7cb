//! Fixtures shared by unit tests.

use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;

use tycoon_types::{
    Company, CompanyId, Ownership, Player, PlayerId, Region, RegionId, Resource, Vehicle,
    VehicleId, VehicleType, Warehouse, WarehouseId,
};

use crate::config::EconomyConfig;
use crate::world::World;

/// A fixed instant so tests are reproducible.
pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap()
}

/// Add a region at the given coordinates with stock reserves and indices.
pub fn add_region_at(world: &mut World, name: &str, lat: Decimal, lon: Decimal) -> RegionId {
    let config = EconomyConfig::default();
    let id = RegionId::new();
    world.regions.insert(
        id,
        Region {
            id,
            name: name.to_owned(),
            latitude: lat,
            longitude: lon,
            gold_reserve: config.region.gold_reserve_max,
            gold_reserve_max: config.region.gold_reserve_max,
            iron_reserve: config.region.iron_reserve_max,
            iron_reserve_max: config.region.iron_reserve_max,
            education_index: Decimal::ZERO,
            health_index: Decimal::ZERO,
            philanthropy_index: Decimal::ZERO,
            development_index: Decimal::ONE,
            tax_rate: config.region.initial_tax_rate,
        },
    );
    id
}

/// Add a region at Belo Horizonte's coordinates.
pub fn add_region(world: &mut World, name: &str) -> RegionId {
    add_region_at(
        world,
        name,
        Decimal::new(-1992, 2),
        Decimal::new(-4394, 2),
    )
}

/// Add a player with the stock wallet and an empty warehouse, living and
/// standing in `region`.
pub fn add_player(world: &mut World, username: &str, region: RegionId) -> PlayerId {
    let config = EconomyConfig::default();
    let id = PlayerId::new();
    world.players.insert(
        id,
        Player {
            id,
            username: username.to_owned(),
            money: config.player.starting_money,
            reserved_money: Decimal::ZERO,
            gold: config.player.starting_gold,
            energy: config.player.max_energy,
            level: 1,
            xp: Decimal::ZERO,
            work_xp: Decimal::ZERO,
            education: 0,
            health: 0,
            philanthropy: 0,
            current_region: region,
            residence_region: region,
            last_status_update: now(),
            created_at: now(),
        },
    );
    let warehouse = WarehouseId::new();
    world.warehouses.insert(
        warehouse,
        Warehouse {
            id: warehouse,
            player_id: id,
            region_id: region,
            capacity_level: 1,
            fleet_level: 1,
            specialization_level: 1,
            stock: std::collections::BTreeMap::new(),
        },
    );
    id
}

/// Add a company with a 10% profit rate.
pub fn add_company(
    world: &mut World,
    region: RegionId,
    product: Resource,
    ownership: Ownership,
) -> CompanyId {
    let id = CompanyId::new();
    world.companies.insert(
        id,
        Company {
            id,
            name: format!("{product} company"),
            region_id: region,
            ownership,
            product,
            profit_rate: Decimal::new(10, 2),
            cash: Decimal::ZERO,
            rate_changed_at: None,
            created_at: now(),
        },
    );
    id
}

/// Park a catalog vehicle at the player's warehouse.
pub fn add_vehicle(world: &mut World, player: PlayerId, vehicle_type: VehicleType) -> VehicleId {
    let config = EconomyConfig::default();
    let warehouse = world.warehouse_of(player).unwrap().id;
    let spec = config.warehouse.vehicle(vehicle_type).unwrap().clone();
    let id = VehicleId::new();
    world.vehicles.insert(
        id,
        Vehicle {
            id,
            warehouse_id: warehouse,
            vehicle_type,
            capacity: spec.capacity,
            speed: spec.speed,
            cost_per_ton_km: spec.cost_per_ton_km,
            validity_days: spec.validity_days,
            purchased_at: now(),
        },
    );
    id
}

/// Put goods straight into the player's warehouse stock.
pub fn stock(world: &mut World, player: PlayerId, resource: Resource, quantity: Decimal) {
    let warehouse = world.warehouse_of(player).unwrap().id;
    world.stock_mut(warehouse, resource).unwrap().quantity = quantity;
}
