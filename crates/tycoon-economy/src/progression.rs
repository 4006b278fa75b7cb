//! Skill bonuses and level progression.
//!
//! Skills feed three capped linear bonuses: health discounts energy
//! costs, education boosts general XP, philanthropy discounts tax.
//! Levels follow a geometric XP curve and are re-checked after every
//! XP grant.

use rust_decimal::Decimal;
use tycoon_types::Player;

use crate::arith::{add, ceil_u32, mul, pow, round2, sub};
use crate::config::{ProgressionConfig, SkillConfig};
use crate::error::ActionError;

/// `min(cap, level * per_level)`.
fn capped_bonus(level: u32, per_level: Decimal, cap: Decimal) -> Result<Decimal, ActionError> {
    Ok(mul(Decimal::from(level), per_level)?.min(cap))
}

/// Fraction of energy cost waived by the player's health.
pub fn energy_discount(player: &Player, skills: &SkillConfig) -> Result<Decimal, ActionError> {
    capped_bonus(player.health, skills.health_per_level, skills.max_energy_discount)
}

/// Multiplier applied to general XP grants.
pub fn xp_multiplier(player: &Player, skills: &SkillConfig) -> Result<Decimal, ActionError> {
    add(
        Decimal::ONE,
        capped_bonus(player.education, skills.education_per_level, skills.max_xp_bonus)?,
    )
}

/// Fraction of regional tax waived by the player's philanthropy.
pub fn tax_discount(player: &Player, skills: &SkillConfig) -> Result<Decimal, ActionError> {
    capped_bonus(
        player.philanthropy,
        skills.philanthropy_per_level,
        skills.max_tax_discount,
    )
}

/// Tax rate a player actually pays on a nominal regional rate.
pub fn effective_tax_rate(
    player: &Player,
    nominal: Decimal,
    skills: &SkillConfig,
) -> Result<Decimal, ActionError> {
    mul(nominal, sub(Decimal::ONE, tax_discount(player, skills)?)?)
}

/// Energy actually deducted for a requested spend.
///
/// Output formulas use the requested amount; only the deduction is
/// discounted.
pub fn discounted_energy(
    player: &Player,
    requested: u32,
    skills: &SkillConfig,
) -> Result<u32, ActionError> {
    let factor = sub(Decimal::ONE, energy_discount(player, skills)?)?;
    ceil_u32(mul(Decimal::from(requested), factor)?)
}

/// XP needed to advance from `level` to `level + 1`.
///
/// Returns `None` when the threshold no longer fits in a decimal, which
/// makes that level unreachable.
pub fn xp_needed_for_next_level(level: u32, config: &ProgressionConfig) -> Option<Decimal> {
    let factor = pow(config.multiplier, level).ok()?;
    config.base_xp.checked_mul(factor).map(|t| t.round())
}

/// Raise the player's level while their XP covers the next threshold.
///
/// Returns the number of levels gained.
pub fn check_level_up(player: &mut Player, config: &ProgressionConfig) -> u32 {
    let mut gained: u32 = 0;
    while let Some(needed) = xp_needed_for_next_level(player.level, config) {
        if player.xp < needed {
            break;
        }
        let Some(next) = player.level.checked_add(1) else {
            break;
        };
        player.level = next;
        gained = gained.saturating_add(1);
    }
    gained
}

/// Grant general XP scaled by the education bonus, then re-check level.
pub fn grant_xp(
    player: &mut Player,
    base: Decimal,
    skills: &SkillConfig,
    progression: &ProgressionConfig,
) -> Result<u32, ActionError> {
    let boosted = round2(mul(base, xp_multiplier(player, skills)?)?);
    player.xp = add(player.xp, boosted)?;
    Ok(check_level_up(player, progression))
}
