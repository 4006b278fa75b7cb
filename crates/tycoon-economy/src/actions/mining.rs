//! Gold and iron mining.
//!
//! Output and XP are computed from the requested energy; only the energy
//! actually deducted is discounted by health. Gold pays out immediately,
//! split between the player, the region's tax and the company's profit
//! share. Iron lands in a pickup record at the mine and must be hauled
//! home with a transport.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::debug;

use tycoon_types::{
    Account, Asset, Company, CompanyId, EntryKind, HistoryAction, Ownership, PickupKey, Player,
    PlayerId, Region, Resource,
};

use crate::arith::{add, after_minutes, div, mul, round2, sub, sub_floor_zero};
use crate::config::EconomyConfig;
use crate::error::ActionError;
use crate::progression::{discounted_energy, effective_tax_rate, grant_xp};
use crate::world::World;

use super::{ActionOutcome, validate_energy};

/// Money and gold split of one gold mining action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GoldSplit {
    /// Money generated before fees.
    pub gross_money: Decimal,
    /// Money withheld as tax.
    pub tax_money: Decimal,
    /// Money paid as the company's share.
    pub profit_money: Decimal,
    /// Money kept by the player, never negative.
    pub net_money: Decimal,
    /// Gold generated before fees.
    pub gross_gold: Decimal,
    /// Gold withheld as tax.
    pub tax_gold: Decimal,
    /// Gold paid as the company's share.
    pub profit_gold: Decimal,
    /// Gold kept by the player, never negative.
    pub net_gold: Decimal,
}

/// Money produced per 10 energy at the given work XP, before the global
/// reduction factor.
pub fn money_production(work_xp: Decimal, config: &EconomyConfig) -> Result<Decimal, ActionError> {
    let m = &config.mining;
    let progress = mul(div(work_xp, m.xp_max_level)?, m.production_curve)?;
    mul(m.base_production, add(Decimal::ONE, progress)?)
}

/// Compute the gold mining split for `player` at `company`.
pub fn gold_split(
    player: &Player,
    region: &Region,
    company: &Company,
    energy: u32,
    config: &EconomyConfig,
) -> Result<GoldSplit, ActionError> {
    let m = &config.mining;
    let energy = Decimal::from(energy);
    let tax_rate = effective_tax_rate(player, region.tax_rate, &config.skills)?;

    let tenths = div(energy, Decimal::TEN)?;
    let gross_money = round2(mul(
        mul(money_production(player.work_xp, config)?, tenths)?,
        m.money_reduction_factor,
    )?);
    let tax_money = round2(mul(gross_money, tax_rate)?);
    let profit_money = round2(mul(gross_money, company.profit_rate)?);
    let net_money = sub_floor_zero(sub(gross_money, tax_money)?, profit_money)?;

    let gross_gold = mul(m.gold_per_energy, energy)?;
    let tax_gold = mul(gross_gold, tax_rate)?;
    let profit_gold = mul(gross_gold, company.profit_rate)?;
    let net_gold = sub_floor_zero(sub(gross_gold, tax_gold)?, profit_gold)?;

    Ok(GoldSplit {
        gross_money,
        tax_money,
        profit_money,
        net_money,
        gross_gold,
        tax_gold,
        profit_gold,
        net_gold,
    })
}

/// Check the shared preconditions and return snapshots of the player,
/// region and company.
fn prepare(
    world: &World,
    player_id: PlayerId,
    company_id: CompanyId,
    energy: u32,
    product: Resource,
    config: &EconomyConfig,
) -> Result<(Player, Region, Company), ActionError> {
    let player = world.player(player_id)?.clone();
    if world.timers.journey(player_id).is_some() {
        return Err(ActionError::rejected("you cannot work while travelling"));
    }
    validate_energy(player.energy, energy, config)?;

    let region = world.region(player.current_region)?.clone();
    let reserve = match product {
        Resource::Iron => region.iron_reserve,
        Resource::Gold | Resource::Corn => region.gold_reserve,
    };
    if reserve <= Decimal::ZERO {
        return Err(ActionError::rejected(format!(
            "the {product} reserve of {} is exhausted",
            region.name
        )));
    }

    let company = world.company(company_id)?.clone();
    if company.product != product || company.region_id != region.id {
        return Err(ActionError::rejected(format!(
            "{} does not mine {product} in your current region",
            company.name
        )));
    }
    Ok((player, region, company))
}

/// Deduct energy, grant work and general XP, and re-check level.
fn apply_work(
    world: &mut World,
    player_id: PlayerId,
    energy: u32,
    config: &EconomyConfig,
) -> Result<(u32, u32), ActionError> {
    let m = &config.mining;
    let requested = Decimal::from(energy);
    let player = world.player_mut(player_id)?;
    let spent = discounted_energy(player, energy, &config.skills)?;
    player.energy = player
        .energy
        .checked_sub(spent)
        .ok_or_else(|| ActionError::rejected("not enough energy"))?;
    player.work_xp = add(player.work_xp, mul(m.work_xp_per_energy, requested)?)?;
    let levels = grant_xp(
        player,
        mul(m.general_xp_per_energy, requested)?,
        &config.skills,
        &config.progression,
    )?;
    Ok((spent, levels))
}

/// Mine gold at a gold company in the player's current region.
pub fn mine_gold(
    world: &mut World,
    player_id: PlayerId,
    company_id: CompanyId,
    energy: u32,
    now: DateTime<Utc>,
    config: &EconomyConfig,
) -> Result<ActionOutcome, ActionError> {
    let (player, region, company) =
        prepare(world, player_id, company_id, energy, Resource::Gold, config)?;
    let split = gold_split(&player, &region, &company, energy, config)?;

    let depletion = mul(config.mining.reserve_depletion_per_energy, Decimal::from(energy))?;
    let region_mut = world.region_mut(region.id)?;
    region_mut.gold_reserve = sub_floor_zero(region_mut.gold_reserve, depletion)?;

    let (spent, levels) = apply_work(world, player_id, energy, config)?;

    let me = Account::Player(player_id);
    world.move_money(now, EntryKind::Yield, (Account::World, me), split.net_money, "mining")?;
    world.move_gold(now, EntryKind::Yield, (Account::World, me), split.net_gold, "mining")?;

    match company.ownership {
        Ownership::Private(owner) => {
            let owner = Account::Player(owner);
            world.move_money(
                now,
                EntryKind::Profit,
                (Account::World, owner),
                split.profit_money,
                "company_profit",
            )?;
            world.move_gold(
                now,
                EntryKind::Profit,
                (Account::World, owner),
                split.profit_gold,
                "company_profit",
            )?;
        }
        Ownership::StateOwned => {
            world.move_money(
                now,
                EntryKind::Profit,
                (Account::World, Account::Company(company.id)),
                split.profit_money,
                "company_profit",
            )?;
        }
    }

    if let Some(treasury) = world.state_company(region.id, Resource::Gold) {
        world.move_money(
            now,
            EntryKind::Tax,
            (Account::World, Account::Company(treasury)),
            split.tax_money,
            "mining_tax",
        )?;
    }

    world.log(
        player_id,
        HistoryAction::Mining,
        format!(
            "Mined gold at {} spending {spent} energy: +{} money, +{} gold (tax {}, company {})",
            company.name, split.net_money, split.net_gold, split.tax_money, split.profit_money
        ),
        split.net_money,
        split.net_gold,
        now,
    );
    debug!(
        player_id = %player_id,
        company_id = %company.id,
        gross_money = %split.gross_money,
        net_money = %split.net_money,
        net_gold = %split.net_gold,
        levels,
        "gold mined"
    );

    let mut message = format!(
        "You earned {} money and {} gold.",
        split.net_money,
        split.net_gold.round_dp(4)
    );
    if levels > 0 {
        message.push_str(" Level up!");
    }
    Ok(ActionOutcome::message(message))
}

/// Iron produced for a requested energy spend in `region`.
pub fn iron_yield(
    region: &Region,
    energy: u32,
    config: &EconomyConfig,
) -> Result<Decimal, ActionError> {
    let base = mul(config.mining.iron_per_energy, Decimal::from(energy))?;
    let bonus = add(Decimal::ONE, div(region.development_index, Decimal::TEN)?)?;
    mul(base, bonus)
}

/// Mine iron at an iron company in the player's current region. The ore
/// waits at the mine as a pickup.
pub fn mine_iron(
    world: &mut World,
    player_id: PlayerId,
    company_id: CompanyId,
    energy: u32,
    now: DateTime<Utc>,
    config: &EconomyConfig,
) -> Result<ActionOutcome, ActionError> {
    let (_, region, company) =
        prepare(world, player_id, company_id, energy, Resource::Iron, config)?;
    let ore = iron_yield(&region, energy, config)?;

    let depletion = mul(config.mining.reserve_depletion_per_energy, Decimal::from(energy))?;
    let region_mut = world.region_mut(region.id)?;
    region_mut.iron_reserve = sub_floor_zero(region_mut.iron_reserve, depletion)?;

    let key = PickupKey {
        player_id,
        region_id: region.id,
        resource: Resource::Iron,
    };
    let expires_at = after_minutes(now, config.mining.pickup_expiry_minutes)?;
    world.timers.deposit(key, ore, expires_at)?;
    world.journal.record_yield(
        now,
        Asset::Goods(Resource::Iron),
        ore,
        Account::Pickup(player_id),
        "mining",
    )?;

    let (spent, levels) = apply_work(world, player_id, energy, config)?;

    world.log(
        player_id,
        HistoryAction::Mining,
        format!(
            "Mined {ore} t of iron at {} spending {spent} energy; awaiting transport in {}",
            company.name, region.name
        ),
        Decimal::ZERO,
        Decimal::ZERO,
        now,
    );
    debug!(player_id = %player_id, region_id = %region.id, %ore, levels, "iron mined");

    let mut message = format!(
        "You mined {ore} t of iron. It waits in {} for transport.",
        region.name
    );
    if levels > 0 {
        message.push_str(" Level up!");
    }
    Ok(ActionOutcome::message(message))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal_macros::dec;

    use tycoon_ledger::reconcile;

    use crate::actions::{Action, perform};
    use crate::testing::{add_company, add_player, add_region, now};
    use crate::world::balance_deltas;

    use super::*;

    #[test]
    fn gold_scenario_without_skills() {
        let config = EconomyConfig::default();
        let mut world = World::new();
        let region = add_region(&mut world, "Belo Horizonte");
        let treasury = add_company(&mut world, region, Resource::Gold, Ownership::StateOwned);
        world.company_mut(treasury).unwrap().profit_rate = dec!(0.30);
        let player = add_player(&mut world, "ana", region);

        let action = Action::MineGold {
            company_id: treasury,
            energy: 10,
        };
        let outcome = perform(&mut world, player, &action, now(), &config);
        assert!(outcome.is_ok());

        let p = world.player(player).unwrap();
        assert_eq!(p.energy, 190);
        // gross = 5000 * 1 * (10 / 10) * 0.1 = 500; net = 500 * (1 - 0.05 - 0.30)
        assert_eq!(p.money, dec!(1000) + dec!(325));
        assert_eq!(p.gold, dec!(5) + dec!(0.65));
        assert_eq!(p.work_xp, dec!(1));
        assert_eq!(p.xp, dec!(100));

        let r = world.region(region).unwrap();
        assert_eq!(r.gold_reserve, dec!(9999.0));

        // Profit (150) and tax (25) both land in the state company.
        assert_eq!(world.company(treasury).unwrap().cash, dec!(175));
        assert_eq!(world.history.len(), 1);
    }

    #[test]
    fn private_owner_receives_profit_share() {
        let config = EconomyConfig::default();
        let mut world = World::new();
        let region = add_region(&mut world, "Belo Horizonte");
        let owner = add_player(&mut world, "owner", region);
        let company = add_company(&mut world, region, Resource::Gold, Ownership::Private(owner));
        let miner = add_player(&mut world, "miner", region);

        let result = mine_gold(&mut world, miner, company, 20, now(), &config);
        assert!(result.is_ok());

        // gross 1000, profit 10%
        let o = world.player(owner).unwrap();
        assert_eq!(o.money, dec!(1100));
        assert_eq!(o.gold, dec!(5) + dec!(0.2));
        assert_eq!(world.company(company).unwrap().cash, Decimal::ZERO);
    }

    #[test]
    fn health_discounts_energy_but_not_output() {
        let config = EconomyConfig::default();
        let mut world = World::new();
        let region = add_region(&mut world, "Belo Horizonte");
        let company = add_company(&mut world, region, Resource::Gold, Ownership::StateOwned);
        let player = add_player(&mut world, "ana", region);
        world.player_mut(player).unwrap().health = 15;

        assert!(mine_gold(&mut world, player, company, 10, now(), &config).is_ok());
        let p = world.player(player).unwrap();
        assert_eq!(p.energy, 191);
        assert_eq!(p.work_xp, dec!(1));
    }

    #[test]
    fn rejects_bad_energy_without_side_effects() {
        let config = EconomyConfig::default();
        let mut world = World::new();
        let region = add_region(&mut world, "Belo Horizonte");
        let company = add_company(&mut world, region, Resource::Gold, Ownership::StateOwned);
        let player = add_player(&mut world, "ana", region);
        let before = world.clone();

        for energy in [0, 5, 15, 210] {
            let action = Action::MineGold {
                company_id: company,
                energy,
            };
            let result = perform(&mut world, player, &action, now(), &config);
            assert!(matches!(result, Err(ActionError::Rejected { .. })), "{energy}");
        }
        assert_eq!(world, before);
    }

    #[test]
    fn rejects_exhausted_reserve_and_foreign_company() {
        let config = EconomyConfig::default();
        let mut world = World::new();
        let home = add_region(&mut world, "Belo Horizonte");
        let away = add_region(&mut world, "Vale do Rio Doce");
        let foreign = add_company(&mut world, away, Resource::Gold, Ownership::StateOwned);
        let local = add_company(&mut world, home, Resource::Gold, Ownership::StateOwned);
        let player = add_player(&mut world, "ana", home);

        assert!(mine_gold(&mut world, player, foreign, 10, now(), &config).is_err());

        world.region_mut(home).unwrap().gold_reserve = Decimal::ZERO;
        assert!(mine_gold(&mut world, player, local, 10, now(), &config).is_err());
    }

    #[test]
    fn iron_goes_to_pickup_and_merges() {
        let config = EconomyConfig::default();
        let mut world = World::new();
        let region = add_region(&mut world, "Belo Horizonte");
        let mine = add_company(&mut world, region, Resource::Iron, Ownership::StateOwned);
        let player = add_player(&mut world, "ana", region);

        assert!(mine_iron(&mut world, player, mine, 10, now(), &config).is_ok());
        assert!(mine_iron(&mut world, player, mine, 20, now(), &config).is_ok());

        let key = PickupKey {
            player_id: player,
            region_id: region,
            resource: Resource::Iron,
        };
        // development 1.0: 1.5 * energy * 1.1
        let pickup = world.timers.pickup(&key).unwrap();
        assert_eq!(pickup.quantity, dec!(16.5) + dec!(33.0));
        assert_eq!(world.player(player).unwrap().money, dec!(1000));
        assert_eq!(world.region(region).unwrap().iron_reserve, dec!(9997.0));
    }

    #[test]
    fn mining_is_journaled_exactly() {
        let config = EconomyConfig::default();
        let mut world = World::new();
        let region = add_region(&mut world, "Belo Horizonte");
        let owner = add_player(&mut world, "owner", region);
        let company = add_company(&mut world, region, Resource::Gold, Ownership::Private(owner));
        add_company(&mut world, region, Resource::Gold, Ownership::StateOwned);
        let iron = add_company(&mut world, region, Resource::Iron, Ownership::StateOwned);
        let miner = add_player(&mut world, "miner", region);
        world.player_mut(miner).unwrap().work_xp = dec!(5000);

        let before = world.balances().unwrap();
        assert!(mine_gold(&mut world, miner, company, 30, now(), &config).is_ok());
        assert!(mine_iron(&mut world, miner, iron, 10, now(), &config).is_ok());
        let after = world.balances().unwrap();

        let observed = balance_deltas(&before, &after).unwrap();
        let result = reconcile(world.journal.entries(), &observed);
        assert!(result.is_balanced(), "{result:?}");
    }
}
