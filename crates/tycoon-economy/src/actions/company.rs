//! Private companies.
//!
//! Every fifth level a player may found one more company in their
//! residence region. Each further company costs 25% more than the last.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use tycoon_types::{
    Account, Company, CompanyId, EntryKind, HistoryAction, Ownership, PlayerId, Resource,
};

use crate::arith::{after_hours, mul, negate, pow, round2};
use crate::config::{CompanyConfig, EconomyConfig};
use crate::error::ActionError;
use crate::world::World;

use super::ActionOutcome;

/// Request to found a company.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewCompany<'a> {
    /// Company name.
    pub name: &'a str,
    /// Gold or iron.
    pub product: Resource,
    /// Initial profit share.
    pub profit_rate: Decimal,
}

/// Gold and money price of the next company after `owned` ones.
pub fn company_cost(owned: usize, config: &CompanyConfig) -> Result<(Decimal, Decimal), ActionError> {
    let n = u32::try_from(owned).unwrap_or(u32::MAX);
    let growth = pow(config.cost_growth, n)?;
    Ok((
        round2(mul(config.base_gold_cost, growth)?),
        round2(mul(config.base_money_cost, growth)?),
    ))
}

/// Companies a player of `level` may own.
pub const fn max_companies(level: u32, config: &CompanyConfig) -> u32 {
    if level < config.levels_per_company {
        return 0;
    }
    match level.checked_div(config.levels_per_company) {
        Some(n) => n,
        None => 0,
    }
}

fn check_rate(rate: Decimal, config: &CompanyConfig) -> Result<(), ActionError> {
    if rate < config.min_rate || rate > config.max_rate {
        return Err(ActionError::rejected(format!(
            "profit rate must be between {} and {}",
            config.min_rate, config.max_rate
        )));
    }
    Ok(())
}

/// Found a private company in the player's residence region.
pub fn open_company(
    world: &mut World,
    player_id: PlayerId,
    request: &NewCompany<'_>,
    now: DateTime<Utc>,
    config: &EconomyConfig,
) -> Result<ActionOutcome, ActionError> {
    let cfg = &config.company;
    let name = request.name.trim();
    if name.is_empty() {
        return Err(ActionError::rejected("company name cannot be empty"));
    }
    if request.product == Resource::Corn {
        return Err(ActionError::rejected("companies produce gold or iron"));
    }

    let player = world.player(player_id)?;
    let region_id = player.residence_region;
    let level = player.level;
    let gold = player.gold;
    if level < cfg.levels_per_company {
        return Err(ActionError::rejected(format!(
            "you need level {} to open a company",
            cfg.levels_per_company
        )));
    }
    let owned = world.companies_owned_by(player_id);
    if u32::try_from(owned).unwrap_or(u32::MAX) >= max_companies(level, cfg) {
        return Err(ActionError::rejected(
            "you own the maximum number of companies for your level",
        ));
    }
    check_rate(request.profit_rate, cfg)?;

    let (gold_cost, money_cost) = company_cost(owned, cfg)?;
    if gold < gold_cost {
        return Err(ActionError::rejected(format!(
            "not enough gold: {gold_cost} needed"
        )));
    }
    if world.available_money(player_id)? < money_cost {
        return Err(ActionError::rejected(format!(
            "not enough money: {money_cost} needed"
        )));
    }

    let to_world = (Account::Player(player_id), Account::World);
    world.move_gold(now, EntryKind::Purchase, to_world, gold_cost, "company_purchase")?;
    world.move_money(now, EntryKind::Purchase, to_world, money_cost, "company_purchase")?;

    let id = CompanyId::new();
    world.companies.insert(
        id,
        Company {
            id,
            name: name.to_owned(),
            region_id,
            ownership: Ownership::Private(player_id),
            product: request.product,
            profit_rate: request.profit_rate,
            cash: Decimal::ZERO,
            rate_changed_at: None,
            created_at: now,
        },
    );

    world.log(
        player_id,
        HistoryAction::CompanyPurchase,
        format!("Opened {} company {name}", request.product),
        negate(money_cost),
        negate(gold_cost),
        now,
    );
    Ok(ActionOutcome::created(format!("Company {name} opened."), id))
}

/// Change the profit share of a company the player owns.
pub fn adjust_company_rate(
    world: &mut World,
    player_id: PlayerId,
    company_id: CompanyId,
    rate: Decimal,
    now: DateTime<Utc>,
    config: &EconomyConfig,
) -> Result<ActionOutcome, ActionError> {
    let cfg = &config.company;
    world.player(player_id)?;
    let company = world.company(company_id)?;
    match company.ownership {
        Ownership::StateOwned => {
            return Err(ActionError::rejected(
                "state-owned company rates cannot be changed",
            ));
        }
        Ownership::Private(owner) if owner != player_id => {
            return Err(ActionError::rejected("you do not own this company"));
        }
        Ownership::Private(_) => {}
    }
    if let Some(changed) = company.rate_changed_at {
        let ready_at = after_hours(changed, cfg.rate_cooldown_hours)?;
        if now < ready_at {
            let minutes = ready_at.signed_duration_since(now).num_minutes();
            return Err(ActionError::rejected(format!(
                "the rate can change again in {minutes} minutes"
            )));
        }
    }
    check_rate(rate, cfg)?;

    let company = world.company_mut(company_id)?;
    let old = company.profit_rate;
    company.profit_rate = rate;
    company.rate_changed_at = Some(now);
    let name = company.name.clone();

    world.log(
        player_id,
        HistoryAction::CompanyRateChanged,
        format!("Changed {name} profit rate from {old} to {rate}"),
        Decimal::ZERO,
        Decimal::ZERO,
        now,
    );
    Ok(ActionOutcome::message(format!(
        "Profit rate of {name} set to {rate}."
    )))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]
mod tests {
    use chrono::Duration;
    use rust_decimal_macros::dec;

    use crate::testing::{add_company, add_player, add_region, now};

    use super::*;

    fn founder(world: &mut World) -> PlayerId {
        let region = add_region(world, "Belo Horizonte");
        let player = add_player(world, "ana", region);
        let p = world.player_mut(player).unwrap();
        p.level = 10;
        p.money = dec!(10000000);
        p.gold = dec!(1000);
        player
    }

    fn request(name: &str) -> NewCompany<'_> {
        NewCompany {
            name,
            product: Resource::Gold,
            profit_rate: dec!(0.2),
        }
    }

    #[test]
    fn cost_grows_by_a_quarter() {
        let config = CompanyConfig::default();
        assert_eq!(company_cost(0, &config).unwrap(), (dec!(100), dec!(2000000)));
        assert_eq!(company_cost(1, &config).unwrap(), (dec!(125), dec!(2500000)));
        assert_eq!(company_cost(2, &config).unwrap(), (dec!(156.25), dec!(3125000)));
    }

    #[test]
    fn max_companies_by_level() {
        let config = CompanyConfig::default();
        assert_eq!(max_companies(4, &config), 0);
        assert_eq!(max_companies(5, &config), 1);
        assert_eq!(max_companies(14, &config), 2);
    }

    #[test]
    fn level_ten_opens_two_then_stops() {
        let config = EconomyConfig::default();
        let mut world = World::new();
        let player = founder(&mut world);

        assert!(open_company(&mut world, player, &request("Um"), now(), &config).is_ok());
        assert!(open_company(&mut world, player, &request("Dois"), now(), &config).is_ok());
        let third = open_company(&mut world, player, &request("Tres"), now(), &config);
        assert!(matches!(third, Err(ActionError::Rejected { .. })));

        let p = world.player(player).unwrap();
        assert_eq!(p.money, dec!(10000000) - dec!(4500000));
        assert_eq!(p.gold, dec!(1000) - dec!(225));
        assert_eq!(world.companies_owned_by(player), 2);
    }

    #[test]
    fn low_level_is_rejected() {
        let config = EconomyConfig::default();
        let mut world = World::new();
        let player = founder(&mut world);
        world.player_mut(player).unwrap().level = 4;
        let result = open_company(&mut world, player, &request("Um"), now(), &config);
        assert!(matches!(result, Err(ActionError::Rejected { .. })));
    }

    #[test]
    fn rate_change_respects_cooldown() {
        let config = EconomyConfig::default();
        let mut world = World::new();
        let player = founder(&mut world);
        assert!(open_company(&mut world, player, &request("Um"), now(), &config).is_ok());
        let company = world
            .companies
            .values()
            .find(|c| c.ownership.owner() == Some(player))
            .unwrap()
            .id;

        assert!(adjust_company_rate(&mut world, player, company, dec!(0.5), now(), &config).is_ok());
        let soon = now() + Duration::hours(5);
        assert!(adjust_company_rate(&mut world, player, company, dec!(0.4), soon, &config).is_err());
        let later = now() + Duration::hours(6);
        assert!(adjust_company_rate(&mut world, player, company, dec!(0.4), later, &config).is_ok());
        assert_eq!(world.company(company).unwrap().profit_rate, dec!(0.4));
    }

    #[test]
    fn state_company_and_bad_rate_are_rejected() {
        let config = EconomyConfig::default();
        let mut world = World::new();
        let player = founder(&mut world);
        let region = world.player(player).unwrap().current_region;
        let state = add_company(&mut world, region, Resource::Gold, Ownership::StateOwned);
        assert!(adjust_company_rate(&mut world, player, state, dec!(0.5), now(), &config).is_err());

        assert!(open_company(&mut world, player, &request("Um"), now(), &config).is_ok());
        let own = world
            .companies
            .values()
            .find(|c| c.ownership.owner() == Some(player))
            .unwrap()
            .id;
        assert!(adjust_company_rate(&mut world, player, own, dec!(1.5), now(), &config).is_err());
    }
}
