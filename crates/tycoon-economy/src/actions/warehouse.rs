//! Warehouse upgrades and vehicle purchases.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use tycoon_ledger::TransferParams;
use tycoon_types::{
    Account, ActiveTraining, Asset, EntryKind, HistoryAction, PlayerId, Resource, TrainingTarget,
    Vehicle, VehicleId, VehicleType, Warehouse, WarehouseTrack,
};

use crate::arith::{add, after_minutes, mul, negate, pow, round2, round_i64, sub};
use crate::config::{EconomyConfig, WarehouseConfig};
use crate::error::ActionError;
use crate::world::World;

use super::ActionOutcome;

/// Level of `track` on `warehouse`.
pub const fn track_level(warehouse: &Warehouse, track: WarehouseTrack) -> u32 {
    match track {
        WarehouseTrack::Capacity => warehouse.capacity_level,
        WarehouseTrack::Fleet => warehouse.fleet_level,
        WarehouseTrack::Specialization => warehouse.specialization_level,
    }
}

/// Mutable level of `track` on `warehouse`.
pub const fn track_level_mut(warehouse: &mut Warehouse, track: WarehouseTrack) -> &mut u32 {
    match track {
        WarehouseTrack::Capacity => &mut warehouse.capacity_level,
        WarehouseTrack::Fleet => &mut warehouse.fleet_level,
        WarehouseTrack::Specialization => &mut warehouse.specialization_level,
    }
}

/// Storage in tons at capacity `level`.
pub fn capacity_tons(level: u32, config: &WarehouseConfig) -> Result<Decimal, ActionError> {
    let steps = Decimal::from(level.saturating_sub(1));
    let factor = add(Decimal::ONE, mul(steps, config.capacity_growth)?)?;
    Ok(mul(config.base_capacity_tons, factor)?.round())
}

/// Vehicles a warehouse may hold at fleet `level`.
pub const fn max_fleet(level: u32) -> u32 {
    if level < 5 {
        return 1;
    }
    match level.checked_div(5) {
        Some(n) => n.saturating_add(1),
        None => 1,
    }
}

/// Price of one upgrade step away from `level`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpgradeCost {
    /// Money charged.
    pub money: Decimal,
    /// Gold charged.
    pub gold: Decimal,
    /// Build time.
    pub minutes: i64,
}

/// Cost of upgrading a track currently at `level`.
pub fn upgrade_cost(level: u32, config: &WarehouseConfig) -> Result<UpgradeCost, ActionError> {
    let growth = pow(config.upgrade_growth, level.saturating_sub(1))?;
    Ok(UpgradeCost {
        money: round2(mul(config.upgrade_base_money, growth)?),
        gold: round2(mul(config.upgrade_base_gold, growth)?),
        minutes: round_i64(mul(config.upgrade_base_minutes, growth)?)?,
    })
}

/// Start upgrading `track` one level. Shares the player's training slot.
pub fn start_upgrade(
    world: &mut World,
    player_id: PlayerId,
    track: WarehouseTrack,
    now: DateTime<Utc>,
    config: &EconomyConfig,
) -> Result<ActionOutcome, ActionError> {
    let gold = world.player(player_id)?.gold;
    let level = track_level(world.warehouse_of(player_id)?, track);
    if world.timers.training(player_id).is_some() {
        return Err(ActionError::conflict(
            "you are already training or upgrading",
        ));
    }
    let target_level = level.checked_add(1).ok_or(ActionError::ArithmeticOverflow {
        context: "warehouse level",
    })?;
    let cost = upgrade_cost(level, &config.warehouse)?;
    if world.available_money(player_id)? < cost.money {
        return Err(ActionError::rejected(format!(
            "not enough money: the upgrade costs {}",
            cost.money
        )));
    }
    if gold < cost.gold {
        return Err(ActionError::rejected(format!(
            "not enough gold: the upgrade costs {}",
            cost.gold
        )));
    }

    let to_world = (Account::Player(player_id), Account::World);
    world.move_money(now, EntryKind::Purchase, to_world, cost.money, "warehouse_upgrade")?;
    world.move_gold(now, EntryKind::Purchase, to_world, cost.gold, "warehouse_upgrade")?;
    world.timers.start_training(ActiveTraining {
        player_id,
        target: TrainingTarget::Warehouse(track),
        target_level,
        started_at: now,
        ends_at: after_minutes(now, cost.minutes)?,
    })?;

    world.log(
        player_id,
        HistoryAction::WarehouseUpgrade,
        format!("Started {} upgrade to level {target_level}", track.label()),
        negate(cost.money),
        negate(cost.gold),
        now,
    );
    Ok(ActionOutcome::message(format!(
        "Upgrading {} to level {target_level}. Ready in {} minutes.",
        track.label(),
        cost.minutes
    )))
}

/// Buy a catalog vehicle, paying money, gold and warehouse iron.
#[allow(clippy::too_many_lines)]
pub fn buy_vehicle(
    world: &mut World,
    player_id: PlayerId,
    vehicle_type: VehicleType,
    now: DateTime<Utc>,
    config: &EconomyConfig,
) -> Result<ActionOutcome, ActionError> {
    let spec = config
        .warehouse
        .vehicle(vehicle_type)
        .ok_or_else(|| ActionError::rejected(format!("{} is not for sale", vehicle_type.code())))?
        .clone();
    let gold = world.player(player_id)?.gold;
    let warehouse = world.warehouse_of(player_id)?;
    let warehouse_id = warehouse.id;

    let fleet = world.vehicles_of(warehouse_id).count();
    let limit = max_fleet(warehouse.fleet_level);
    if u32::try_from(fleet).unwrap_or(u32::MAX) >= limit {
        return Err(ActionError::rejected(format!(
            "your fleet is full ({limit} vehicles)"
        )));
    }
    if warehouse.specialization_level < spec.required_specialization {
        return Err(ActionError::rejected(format!(
            "{} needs specialization level {}",
            vehicle_type.code(),
            spec.required_specialization
        )));
    }
    if world.available_money(player_id)? < spec.money_cost {
        return Err(ActionError::rejected(format!(
            "not enough money: {} needed",
            spec.money_cost
        )));
    }
    if gold < spec.gold_cost {
        return Err(ActionError::rejected(format!(
            "not enough gold: {} needed",
            spec.gold_cost
        )));
    }
    if world.available_stock(player_id, Resource::Iron)? < spec.iron_cost {
        return Err(ActionError::rejected(format!(
            "not enough iron in the warehouse: {} t needed",
            spec.iron_cost
        )));
    }

    let to_world = (Account::Player(player_id), Account::World);
    world.move_money(now, EntryKind::Purchase, to_world, spec.money_cost, "vehicle_purchase")?;
    world.move_gold(now, EntryKind::Purchase, to_world, spec.gold_cost, "vehicle_purchase")?;
    let iron = world.stock_mut(warehouse_id, Resource::Iron)?;
    iron.quantity = sub(iron.quantity, spec.iron_cost)?;
    world.journal.record(TransferParams {
        at: now,
        kind: EntryKind::Purchase,
        asset: Asset::Goods(Resource::Iron),
        quantity: spec.iron_cost,
        from: Account::Warehouse(warehouse_id),
        to: Account::World,
        reason: "vehicle_purchase",
    })?;

    let id = VehicleId::new();
    world.vehicles.insert(
        id,
        Vehicle {
            id,
            warehouse_id,
            vehicle_type,
            capacity: spec.capacity,
            speed: spec.speed,
            cost_per_ton_km: spec.cost_per_ton_km,
            validity_days: spec.validity_days,
            purchased_at: now,
        },
    );

    world.log(
        player_id,
        HistoryAction::VehiclePurchase,
        format!(
            "Bought a {} for {} money, {} gold and {} t of iron",
            vehicle_type.code(),
            spec.money_cost,
            spec.gold_cost,
            spec.iron_cost
        ),
        negate(spec.money_cost),
        negate(spec.gold_cost),
        now,
    );
    Ok(ActionOutcome::created(
        format!(
            "{} purchased. Valid for {} days.",
            vehicle_type.code(),
            spec.validity_days
        ),
        id,
    ))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]
mod tests {
    use chrono::Duration;
    use rust_decimal_macros::dec;

    use tycoon_ledger::reconcile;

    use crate::testing::{add_player, add_region, add_vehicle, now, stock};
    use crate::world::balance_deltas;

    use super::*;

    fn rich(world: &mut World) -> PlayerId {
        let region = add_region(world, "Belo Horizonte");
        let player = add_player(world, "ana", region);
        let p = world.player_mut(player).unwrap();
        p.money = dec!(1000000);
        p.gold = dec!(100);
        player
    }

    #[test]
    fn capacity_and_fleet_curves() {
        let config = WarehouseConfig::default();
        assert_eq!(capacity_tons(1, &config).unwrap(), dec!(1000));
        assert_eq!(capacity_tons(3, &config).unwrap(), dec!(1100));
        assert_eq!(max_fleet(1), 1);
        assert_eq!(max_fleet(4), 1);
        assert_eq!(max_fleet(5), 2);
        assert_eq!(max_fleet(12), 3);
    }

    #[test]
    fn upgrade_cost_grows_from_level_one() {
        let config = WarehouseConfig::default();
        let first = upgrade_cost(1, &config).unwrap();
        assert_eq!((first.money, first.gold, first.minutes), (dec!(10000), dec!(20), 30));
        let second = upgrade_cost(2, &config).unwrap();
        assert_eq!((second.money, second.gold, second.minutes), (dec!(12000), dec!(24), 36));
    }

    #[test]
    fn upgrade_shares_the_training_slot() {
        let config = EconomyConfig::default();
        let mut world = World::new();
        let player = rich(&mut world);

        assert!(start_upgrade(&mut world, player, WarehouseTrack::Fleet, now(), &config).is_ok());
        let slot = world.timers.training(player).unwrap();
        assert_eq!(slot.target, TrainingTarget::Warehouse(WarehouseTrack::Fleet));
        assert_eq!(slot.target_level, 2);
        assert_eq!(slot.ends_at, now() + Duration::minutes(30));

        let p = world.player(player).unwrap();
        assert_eq!((p.money, p.gold), (dec!(990000), dec!(80)));

        let again = start_upgrade(&mut world, player, WarehouseTrack::Capacity, now(), &config);
        assert!(matches!(again, Err(ActionError::Conflict { .. })));
    }

    #[test]
    fn vehicle_purchase_spends_money_gold_and_iron() {
        let config = EconomyConfig::default();
        let mut world = World::new();
        let player = rich(&mut world);
        stock(&mut world, player, Resource::Iron, dec!(30));
        let before = world.balances().unwrap();

        assert!(buy_vehicle(&mut world, player, VehicleType::LightTruck, now(), &config).is_ok());
        let warehouse = world.warehouse_of(player).unwrap().id;
        assert_eq!(world.vehicles_of(warehouse).count(), 1);
        assert_eq!(world.available_stock(player, Resource::Iron).unwrap(), dec!(5));

        let observed = balance_deltas(&before, &world.balances().unwrap()).unwrap();
        let result = reconcile(world.journal.entries(), &observed);
        assert!(result.is_balanced(), "{result:?}");
    }

    #[test]
    fn full_fleet_and_low_specialization_are_rejected() {
        let config = EconomyConfig::default();
        let mut world = World::new();
        let player = rich(&mut world);
        stock(&mut world, player, Resource::Iron, dec!(1000));

        add_vehicle(&mut world, player, VehicleType::LightTruck);
        let full = buy_vehicle(&mut world, player, VehicleType::LightTruck, now(), &config);
        assert!(matches!(full, Err(ActionError::Rejected { .. })));

        world.warehouse_of_mut(player).unwrap().fleet_level = 5;
        let heavy = buy_vehicle(&mut world, player, VehicleType::Toco, now(), &config);
        assert!(matches!(heavy, Err(ActionError::Rejected { .. })));

        world.warehouse_of_mut(player).unwrap().specialization_level = 5;
        assert!(buy_vehicle(&mut world, player, VehicleType::Toco, now(), &config).is_ok());
    }

    #[test]
    fn missing_iron_is_rejected() {
        let config = EconomyConfig::default();
        let mut world = World::new();
        let player = rich(&mut world);
        let result = buy_vehicle(&mut world, player, VehicleType::LightTruck, now(), &config);
        assert!(matches!(result, Err(ActionError::Rejected { .. })));
        assert_eq!(world.player(player).unwrap().money, dec!(1000000));
    }
}
