//! Regional indices, tax and reserves.
//!
//! A region's education, health and philanthropy indices are its
//! residents' share of the global skill totals. The development index
//! scales the combined share to `[1, 10]`, and the tax rate follows it
//! down a step table.

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use tycoon_types::RegionId;

use crate::arith::{add, div, mul};
use crate::config::RegionConfig;
use crate::error::ActionError;
use crate::world::World;

const MIN_DEVELOPMENT: Decimal = Decimal::ONE;
const MAX_DEVELOPMENT: Decimal = Decimal::TEN;

#[derive(Debug, Clone, Copy, Default)]
struct SkillTotals {
    education: Decimal,
    health: Decimal,
    philanthropy: Decimal,
}

impl SkillTotals {
    fn add(&mut self, education: u32, health: u32, philanthropy: u32) -> Result<(), ActionError> {
        self.education = add(self.education, Decimal::from(education))?;
        self.health = add(self.health, Decimal::from(health))?;
        self.philanthropy = add(self.philanthropy, Decimal::from(philanthropy))?;
        Ok(())
    }

    fn all(&self) -> Result<Decimal, ActionError> {
        add(add(self.education, self.health)?, self.philanthropy)
    }
}

fn share(part: Decimal, whole: Decimal) -> Result<Decimal, ActionError> {
    if whole.is_zero() {
        return Ok(Decimal::ZERO);
    }
    div(part, whole)
}

/// Tax rate for a development index.
pub fn tax_for_development(development: Decimal, config: &RegionConfig) -> Decimal {
    let rounded = development.round();
    config
        .tax_steps
        .iter()
        .find(|step| rounded >= Decimal::from(step.min_development))
        .map_or(config.base_tax_rate, |step| step.rate)
}

/// Recompute every region's indices and tax rate from current residents.
///
/// A pure function of player state: running it twice changes nothing.
pub fn recompute_indices(world: &mut World, config: &RegionConfig) -> Result<(), ActionError> {
    let mut global = SkillTotals::default();
    let mut local: BTreeMap<RegionId, SkillTotals> = BTreeMap::new();
    for player in world.players.values() {
        global.add(player.education, player.health, player.philanthropy)?;
        local
            .entry(player.residence_region)
            .or_default()
            .add(player.education, player.health, player.philanthropy)?;
    }
    let global_all = global.all()?;

    for region in world.regions.values_mut() {
        let totals = local.get(&region.id).copied().unwrap_or_default();
        region.education_index = share(totals.education, global.education)?;
        region.health_index = share(totals.health, global.health)?;
        region.philanthropy_index = share(totals.philanthropy, global.philanthropy)?;
        region.development_index = if global_all.is_zero() {
            MIN_DEVELOPMENT
        } else {
            mul(div(totals.all()?, global_all)?, Decimal::TEN)?
                .clamp(MIN_DEVELOPMENT, MAX_DEVELOPMENT)
        };
        region.tax_rate = tax_for_development(region.development_index, config);
    }
    Ok(())
}

/// Refill every region's gold and iron reserves. Returns how many regions
/// had anything to refill.
pub fn replenish(world: &mut World) -> usize {
    let mut refilled = 0_usize;
    for region in world.regions.values_mut() {
        if region.gold_reserve < region.gold_reserve_max
            || region.iron_reserve < region.iron_reserve_max
        {
            refilled = refilled.saturating_add(1);
        }
        region.gold_reserve = region.gold_reserve_max;
        region.iron_reserve = region.iron_reserve_max;
    }
    refilled
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal_macros::dec;

    use crate::testing::{add_player, add_region};

    use super::*;

    #[test]
    fn tax_steps_follow_rounded_development() {
        let config = RegionConfig::default();
        assert_eq!(tax_for_development(dec!(10), &config), dec!(0.01));
        assert_eq!(tax_for_development(dec!(9.5), &config), dec!(0.01));
        assert_eq!(tax_for_development(dec!(6.6), &config), dec!(0.05));
        assert_eq!(tax_for_development(dec!(4), &config), dec!(0.10));
        assert_eq!(tax_for_development(dec!(2.2), &config), dec!(0.15));
        assert_eq!(tax_for_development(dec!(1), &config), dec!(0.20));
    }

    #[test]
    fn indices_are_resident_shares() {
        let config = RegionConfig::default();
        let mut world = World::new();
        let capital = add_region(&mut world, "Belo Horizonte");
        let interior = add_region(&mut world, "Montes Claros");
        let ana = add_player(&mut world, "ana", capital);
        let bia = add_player(&mut world, "bia", interior);
        {
            let p = world.player_mut(ana).unwrap();
            p.education = 3;
            p.health = 1;
        }
        world.player_mut(bia).unwrap().education = 1;

        recompute_indices(&mut world, &config).unwrap();
        let c = world.region(capital).unwrap();
        assert_eq!(c.education_index, dec!(0.75));
        assert_eq!(c.health_index, dec!(1));
        assert_eq!(c.philanthropy_index, dec!(0));
        assert_eq!(c.development_index, dec!(8));
        assert_eq!(c.tax_rate, dec!(0.05));

        let i = world.region(interior).unwrap();
        // 1/5 of all skill points: 2.0 development.
        assert_eq!(i.development_index, dec!(2));
        assert_eq!(i.tax_rate, dec!(0.15));
    }

    #[test]
    fn recompute_is_idempotent() {
        let config = RegionConfig::default();
        let mut world = World::new();
        let region = add_region(&mut world, "Belo Horizonte");
        let other = add_region(&mut world, "Montes Claros");
        let ana = add_player(&mut world, "ana", region);
        add_player(&mut world, "bia", other);
        world.player_mut(ana).unwrap().philanthropy = 7;

        recompute_indices(&mut world, &config).unwrap();
        let once = world.regions.clone();
        recompute_indices(&mut world, &config).unwrap();
        assert_eq!(world.regions, once);
    }

    #[test]
    fn no_skills_means_minimum_development() {
        let config = RegionConfig::default();
        let mut world = World::new();
        let region = add_region(&mut world, "Belo Horizonte");
        add_player(&mut world, "ana", region);
        recompute_indices(&mut world, &config).unwrap();
        let r = world.region(region).unwrap();
        assert_eq!((r.development_index, r.tax_rate), (dec!(1), dec!(0.20)));
    }

    #[test]
    fn replenish_refills_both_reserves() {
        let mut world = World::new();
        let region = add_region(&mut world, "Belo Horizonte");
        world.region_mut(region).unwrap().gold_reserve = dec!(12);
        world.region_mut(region).unwrap().iron_reserve = dec!(0);

        assert_eq!(replenish(&mut world), 1);
        let r = world.region(region).unwrap();
        assert_eq!((r.gold_reserve, r.iron_reserve), (dec!(10000), dec!(10000)));
        assert_eq!(replenish(&mut world), 0);
    }
}
