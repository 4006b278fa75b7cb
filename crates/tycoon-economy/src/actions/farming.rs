//! Corn farming.
//!
//! A player opens a field in their current region, and anyone may plant
//! on it. A field holds a few concurrent plantings and rests after a fixed
//! number of uses. When a planting is due, the tick harvests it. The field
//! owner takes a cut of other players' harvests, and both shares wait at
//! the field as pickups.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::debug;

use tycoon_types::{
    Account, ActivePlanting, Asset, EntryKind, Field, FieldId, HistoryAction, PickupKey,
    PlantingId, PlayerId, Resource,
};

use crate::arith::{add, after_hours, after_minutes, div, mul, negate, sub};
use crate::config::EconomyConfig;
use crate::error::ActionError;
use crate::progression::discounted_energy;
use crate::world::World;

use super::{ActionOutcome, validate_energy};

/// Whether `field` refuses new plantings.
pub const fn is_resting(field: &Field) -> bool {
    field.rest_until.is_some() || field.uses_remaining == 0
}

/// Open a field in the player's current region.
pub fn create_field(
    world: &mut World,
    player_id: PlayerId,
    name: &str,
    profit_rate: Decimal,
    now: DateTime<Utc>,
    config: &EconomyConfig,
) -> Result<ActionOutcome, ActionError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ActionError::rejected("field name cannot be empty"));
    }
    let limits = &config.company;
    if profit_rate < limits.min_rate || profit_rate > limits.max_rate {
        return Err(ActionError::rejected(format!(
            "profit rate must be between {} and {}",
            limits.min_rate, limits.max_rate
        )));
    }
    let region_id = world.player(player_id)?.current_region;
    let cost = config.farming.field_cost_money;
    if world.available_money(player_id)? < cost {
        return Err(ActionError::rejected(format!(
            "not enough money: a field costs {cost}"
        )));
    }
    world.move_money(
        now,
        EntryKind::Purchase,
        (Account::Player(player_id), Account::World),
        cost,
        "field_purchase",
    )?;

    let id = FieldId::new();
    world.fields.insert(
        id,
        Field {
            id,
            name: name.to_owned(),
            owner: player_id,
            region_id,
            profit_rate,
            uses_remaining: config.farming.max_uses,
            rest_until: None,
        },
    );
    world.log(
        player_id,
        HistoryAction::FieldCreated,
        format!("Opened field {name}"),
        negate(cost),
        Decimal::ZERO,
        now,
    );
    Ok(ActionOutcome::created(format!("Field {name} opened."), id))
}

/// Corn a planting of `energy` yields in a region with `education_index`.
pub fn corn_yield(
    energy: u32,
    education_index: Decimal,
    config: &EconomyConfig,
) -> Result<Decimal, ActionError> {
    let tens = div(Decimal::from(energy), Decimal::TEN)?;
    let bonus = add(Decimal::ONE, div(education_index, Decimal::TEN)?)?;
    mul(mul(config.farming.corn_per_10_energy, tens)?, bonus)
}

/// Plant corn on a field, paying seed money and energy up front.
pub fn plant_crop(
    world: &mut World,
    player_id: PlayerId,
    field_id: FieldId,
    energy: u32,
    now: DateTime<Utc>,
    config: &EconomyConfig,
) -> Result<ActionOutcome, ActionError> {
    let farming = &config.farming;
    let player = world.player(player_id)?;
    validate_energy(player.energy, energy, config)?;
    let field = world.field(field_id)?;
    if is_resting(field) {
        return Err(ActionError::rejected(format!(
            "field {} is resting",
            field.name
        )));
    }
    if world.timers.plantings_on(field_id) >= farming.max_slots {
        return Err(ActionError::rejected(format!(
            "field {} has no free slot",
            field.name
        )));
    }
    let cost = mul(
        farming.cost_per_10_energy,
        div(Decimal::from(energy), Decimal::TEN)?,
    )?;
    if world.available_money(player_id)? < cost {
        return Err(ActionError::rejected(format!(
            "not enough money: planting costs {cost}"
        )));
    }
    let field_name = field.name.clone();
    let corn = corn_yield(energy, world.region(field.region_id)?.education_index, config)?;

    world.move_money(
        now,
        EntryKind::Purchase,
        (Account::Player(player_id), Account::World),
        cost,
        "planting",
    )?;
    let player = world.player_mut(player_id)?;
    let spent = discounted_energy(player, energy, &config.skills)?;
    player.energy = player
        .energy
        .checked_sub(spent)
        .ok_or_else(|| ActionError::rejected("not enough energy"))?;

    let field = world.field_mut(field_id)?;
    field.uses_remaining = field.uses_remaining.saturating_sub(1);

    let ends_at = after_minutes(now, farming.grow_minutes)?;
    let id = PlantingId::new();
    world.timers.plant(ActivePlanting {
        id,
        player_id,
        field_id,
        quantity: corn,
        ends_at,
    });

    world.log(
        player_id,
        HistoryAction::Planting,
        format!("Planted {corn} t of corn on {field_name} spending {spent} energy"),
        negate(cost),
        Decimal::ZERO,
        now,
    );
    Ok(ActionOutcome::created(
        format!(
            "Planted {corn} t of corn. Harvest in {} minutes.",
            farming.grow_minutes
        ),
        id,
    ))
}

/// Harvest a due planting: split the corn, credit the pickups, grant work
/// XP and start the field's rest when its uses run out.
pub fn harvest(
    world: &mut World,
    planting: &ActivePlanting,
    now: DateTime<Utc>,
    config: &EconomyConfig,
) -> Result<(), ActionError> {
    let farming = &config.farming;
    let field = world.field(planting.field_id)?.clone();
    let owner_cut = if planting.player_id == field.owner {
        Decimal::ZERO
    } else {
        mul(planting.quantity, field.profit_rate)?
    };
    let share = sub(planting.quantity, owner_cut)?;
    let expires_at = after_minutes(now, config.mining.pickup_expiry_minutes)?;

    for (player_id, amount) in [(planting.player_id, share), (field.owner, owner_cut)] {
        if amount <= Decimal::ZERO {
            continue;
        }
        let key = PickupKey {
            player_id,
            region_id: field.region_id,
            resource: Resource::Corn,
        };
        world.timers.deposit(key, amount, expires_at)?;
        world.journal.record_yield(
            now,
            Asset::Goods(Resource::Corn),
            amount,
            Account::Pickup(player_id),
            "harvest",
        )?;
    }

    let work_xp = div(
        mul(farming.xp_per_10_energy, planting.quantity)?,
        farming.corn_per_10_energy,
    )?;
    if let Some(planter) = world.players.get_mut(&planting.player_id) {
        planter.work_xp = add(planter.work_xp, work_xp)?;
    }

    if field.uses_remaining == 0 && field.rest_until.is_none() {
        let rest_until = after_hours(now, farming.rest_hours)?;
        world.field_mut(field.id)?.rest_until = Some(rest_until);
    }

    world.log(
        planting.player_id,
        HistoryAction::Harvest,
        format!("Harvested {share} t of corn on {}", field.name),
        Decimal::ZERO,
        Decimal::ZERO,
        now,
    );
    if owner_cut > Decimal::ZERO {
        world.log(
            field.owner,
            HistoryAction::HarvestFee,
            format!("Received {owner_cut} t of corn from a harvest on {}", field.name),
            Decimal::ZERO,
            Decimal::ZERO,
            now,
        );
    }
    debug!(
        planting_id = %planting.id,
        field_id = %field.id,
        %share,
        %owner_cut,
        "planting harvested"
    );
    Ok(())
}

/// Restore uses on every field whose rest has ended. Returns how many
/// fields were reset.
pub fn reset_rested_fields(world: &mut World, now: DateTime<Utc>, config: &EconomyConfig) -> usize {
    let mut reset = 0_usize;
    for field in world.fields.values_mut() {
        if field.rest_until.is_some_and(|until| until <= now) {
            field.rest_until = None;
            field.uses_remaining = config.farming.max_uses;
            reset = reset.saturating_add(1);
        }
    }
    reset
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]
mod tests {
    use chrono::Duration;
    use rust_decimal_macros::dec;

    use crate::testing::{add_player, add_region, now};

    use super::*;

    fn setup(world: &mut World) -> (PlayerId, PlayerId, FieldId) {
        let config = EconomyConfig::default();
        let region = add_region(world, "Belo Horizonte");
        let owner = add_player(world, "ana", region);
        let farmer = add_player(world, "bia", region);
        world.player_mut(owner).unwrap().money = dec!(60000);
        let outcome = create_field(world, owner, "Milharal", dec!(0.25), now(), &config).unwrap();
        (owner, farmer, FieldId::from(outcome.reference.unwrap()))
    }

    #[test]
    fn yield_grows_with_education_index() {
        let config = EconomyConfig::default();
        assert_eq!(corn_yield(50, dec!(0), &config).unwrap(), dec!(10));
        assert_eq!(corn_yield(50, dec!(0.5), &config).unwrap(), dec!(10.5));
    }

    #[test]
    fn create_field_charges_and_starts_fresh() {
        let mut world = World::new();
        let (owner, _, field) = setup(&mut world);
        let field = world.field(field).unwrap();
        assert_eq!(field.owner, owner);
        assert_eq!(field.uses_remaining, 10);
        assert_eq!(world.player(owner).unwrap().money, dec!(10000));
    }

    #[test]
    fn planting_pays_and_uses_a_slot() {
        let config = EconomyConfig::default();
        let mut world = World::new();
        let (_, farmer, field) = setup(&mut world);

        assert!(plant_crop(&mut world, farmer, field, 30, now(), &config).is_ok());
        let p = world.player(farmer).unwrap();
        assert_eq!((p.money, p.energy), (dec!(700), 170));
        assert_eq!(world.field(field).unwrap().uses_remaining, 9);
        assert_eq!(world.timers.plantings_on(field), 1);

        assert!(plant_crop(&mut world, farmer, field, 10, now(), &config).is_ok());
        let third = plant_crop(&mut world, farmer, field, 10, now(), &config);
        assert!(matches!(third, Err(ActionError::Rejected { .. })));
        assert_eq!(world.timers.plantings_on(field), 2);
    }

    #[test]
    fn harvest_splits_between_planter_and_owner() {
        let config = EconomyConfig::default();
        let mut world = World::new();
        let (owner, farmer, field) = setup(&mut world);
        assert!(plant_crop(&mut world, farmer, field, 50, now(), &config).is_ok());

        let later = now() + Duration::minutes(60);
        let due = world.timers.take_due_plantings(later);
        assert_eq!(due.len(), 1);
        for planting in &due {
            harvest(&mut world, planting, later, &config).unwrap();
        }

        let region = world.field(field).unwrap().region_id;
        let corn = |player| PickupKey {
            player_id: player,
            region_id: region,
            resource: Resource::Corn,
        };
        assert_eq!(world.timers.pickup(&corn(farmer)).unwrap().quantity, dec!(7.5));
        assert_eq!(world.timers.pickup(&corn(owner)).unwrap().quantity, dec!(2.5));
        assert_eq!(world.player(farmer).unwrap().work_xp, dec!(25));
    }

    #[test]
    fn exhausted_field_rests_then_resets() {
        let config = EconomyConfig::default();
        let mut world = World::new();
        let (owner, _, field) = setup(&mut world);
        world.field_mut(field).unwrap().uses_remaining = 1;
        world.player_mut(owner).unwrap().money = dec!(1000);

        assert!(plant_crop(&mut world, owner, field, 10, now(), &config).is_ok());
        assert!(is_resting(world.field(field).unwrap()));
        assert!(plant_crop(&mut world, owner, field, 10, now(), &config).is_err());

        let later = now() + Duration::minutes(60);
        for planting in world.timers.take_due_plantings(later) {
            harvest(&mut world, &planting, later, &config).unwrap();
        }
        let rest_until = world.field(field).unwrap().rest_until.unwrap();
        assert_eq!(rest_until, later + Duration::hours(12));

        assert_eq!(reset_rested_fields(&mut world, rest_until - Duration::seconds(1), &config), 0);
        assert_eq!(reset_rested_fields(&mut world, rest_until, &config), 1);
        let reset = world.field(field).unwrap();
        assert_eq!((reset.uses_remaining, reset.rest_until), (10, None));
    }
}
