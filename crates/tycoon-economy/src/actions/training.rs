//! Skill training.
//!
//! Training a skill from level `L` costs `base × growth^L` money and
//! takes `round(base_minutes × growth^L)` minutes. A player holds at most
//! one training or warehouse upgrade at a time.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use tycoon_types::{
    Account, ActiveTraining, EntryKind, HistoryAction, Player, PlayerId, Skill, TrainingTarget,
};

use crate::arith::{after_minutes, mul, negate, pow, round2, round_i64};
use crate::config::{EconomyConfig, TrainingConfig};
use crate::error::ActionError;
use crate::world::World;

use super::ActionOutcome;

/// Current level of `skill` for `player`.
pub const fn skill_level(player: &Player, skill: Skill) -> u32 {
    match skill {
        Skill::Education => player.education,
        Skill::Health => player.health,
        Skill::Philanthropy => player.philanthropy,
    }
}

/// Mutable level of `skill` for `player`.
pub const fn skill_level_mut(player: &mut Player, skill: Skill) -> &mut u32 {
    match skill {
        Skill::Education => &mut player.education,
        Skill::Health => &mut player.health,
        Skill::Philanthropy => &mut player.philanthropy,
    }
}

/// Money cost and minutes to train from `level` to `level + 1`.
pub fn training_cost(level: u32, config: &TrainingConfig) -> Result<(Decimal, i64), ActionError> {
    let growth = pow(config.growth, level)?;
    let cost = round2(mul(config.base_cost, growth)?);
    let minutes = round_i64(mul(config.base_minutes, growth)?)?;
    Ok((cost, minutes))
}

/// Start training `skill` one level up.
pub fn train_skill(
    world: &mut World,
    player_id: PlayerId,
    skill: Skill,
    now: DateTime<Utc>,
    config: &EconomyConfig,
) -> Result<ActionOutcome, ActionError> {
    let level = skill_level(world.player(player_id)?, skill);
    if world.timers.training(player_id).is_some() {
        return Err(ActionError::conflict(
            "you are already training or upgrading",
        ));
    }
    let target_level = level.checked_add(1).ok_or(ActionError::ArithmeticOverflow {
        context: "skill level",
    })?;
    let (cost, minutes) = training_cost(level, &config.training)?;
    if world.available_money(player_id)? < cost {
        return Err(ActionError::rejected(format!(
            "not enough money: training costs {cost}"
        )));
    }
    world.move_money(
        now,
        EntryKind::Purchase,
        (Account::Player(player_id), Account::World),
        cost,
        "training",
    )?;
    world.timers.start_training(ActiveTraining {
        player_id,
        target: TrainingTarget::Skill(skill),
        target_level,
        started_at: now,
        ends_at: after_minutes(now, minutes)?,
    })?;

    world.log(
        player_id,
        HistoryAction::Training,
        format!("Started {} training to level {target_level}", skill.label()),
        negate(cost),
        Decimal::ZERO,
        now,
    );
    Ok(ActionOutcome::message(format!(
        "Training {} to level {target_level}. Ready in {minutes} minutes.",
        skill.label()
    )))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]
mod tests {
    use chrono::Duration;
    use rust_decimal_macros::dec;

    use crate::testing::{add_player, add_region, now};

    use super::*;

    #[test]
    fn cost_and_time_grow_by_a_fifth() {
        let config = TrainingConfig::default();
        assert_eq!(training_cost(0, &config).unwrap(), (dec!(1000), 10));
        assert_eq!(training_cost(1, &config).unwrap(), (dec!(1200), 12));
        assert_eq!(training_cost(3, &config).unwrap(), (dec!(1728), 17));
    }

    #[test]
    fn training_charges_and_occupies_slot() {
        let config = EconomyConfig::default();
        let mut world = World::new();
        let region = add_region(&mut world, "Belo Horizonte");
        let player = add_player(&mut world, "ana", region);
        world.player_mut(player).unwrap().money = dec!(3000);

        assert!(train_skill(&mut world, player, Skill::Health, now(), &config).is_ok());
        let training = world.timers.training(player).unwrap();
        assert_eq!(training.target, TrainingTarget::Skill(Skill::Health));
        assert_eq!(training.target_level, 1);
        assert_eq!(training.ends_at, now() + Duration::minutes(10));
        assert_eq!(world.player(player).unwrap().money, dec!(2000));
        // The level only rises on completion.
        assert_eq!(world.player(player).unwrap().health, 0);

        let again = train_skill(&mut world, player, Skill::Education, now(), &config);
        assert!(matches!(again, Err(ActionError::Conflict { .. })));
        assert_eq!(world.player(player).unwrap().money, dec!(2000));
    }

    #[test]
    fn poor_player_is_rejected() {
        let config = EconomyConfig::default();
        let mut world = World::new();
        let region = add_region(&mut world, "Belo Horizonte");
        let player = add_player(&mut world, "ana", region);
        world.player_mut(player).unwrap().education = 5;

        let result = train_skill(&mut world, player, Skill::Education, now(), &config);
        assert!(matches!(result, Err(ActionError::Rejected { .. })));
        assert!(world.timers.training(player).is_none());
    }
}
