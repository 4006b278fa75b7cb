//! Residency requests.
//!
//! A request waits out a delay shortened by the destination's
//! philanthropy index, then the tick moves the player's residence. A
//! region accepts at most half of all players as residents.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use tycoon_types::{HistoryAction, PlayerId, RegionId, ResidencyRequest};

use crate::arith::{after_seconds, ceil_u32, mul, round_i64, sub};
use crate::config::{EconomyConfig, ResidencyConfig};
use crate::error::ActionError;
use crate::world::World;

use super::ActionOutcome;

/// Seconds a request to `destination` waits before approval.
pub fn wait_seconds(
    philanthropy_index: Decimal,
    config: &ResidencyConfig,
) -> Result<i64, ActionError> {
    let discount = philanthropy_index
        .min(config.max_wait_discount)
        .max(Decimal::ZERO);
    let factor = sub(Decimal::ONE, discount)?;
    let base = mul(Decimal::from(config.base_wait_minutes), Decimal::from(60))?;
    round_i64(mul(base, factor)?)
}

/// Largest resident population a region accepts.
pub fn resident_limit(total_players: usize, config: &ResidencyConfig) -> Result<u32, ActionError> {
    ceil_u32(mul(Decimal::from(total_players), config.max_resident_share)?)
}

/// Ask to move residence to `destination`.
pub fn request_residency(
    world: &mut World,
    player_id: PlayerId,
    destination: RegionId,
    now: DateTime<Utc>,
    config: &EconomyConfig,
) -> Result<ActionOutcome, ActionError> {
    let player = world.player(player_id)?;
    if player.residence_region == destination {
        return Err(ActionError::rejected("you already live in that region"));
    }
    let region = world.region(destination)?;
    let region_name = region.name.clone();
    let philanthropy = region.philanthropy_index;

    if world.timers.residency_request(player_id).is_some() {
        return Err(ActionError::conflict(
            "you already have a pending residency request",
        ));
    }

    let limit = resident_limit(world.players.len(), &config.residency)?;
    let residents = world.residents_of(destination).count();
    if u32::try_from(residents).unwrap_or(u32::MAX) >= limit {
        return Err(ActionError::rejected(format!(
            "{region_name} has reached its resident limit"
        )));
    }

    let wait = wait_seconds(philanthropy, &config.residency)?;
    let approves_at = after_seconds(now, wait)?;
    world.timers.request_residency(ResidencyRequest {
        player_id,
        destination,
        requested_at: now,
        approves_at,
    })?;

    world.log(
        player_id,
        HistoryAction::ResidencyRequest,
        format!("Requested residency in {region_name}"),
        Decimal::ZERO,
        Decimal::ZERO,
        now,
    );
    let minutes = wait.checked_div(60).unwrap_or_default();
    Ok(ActionOutcome::message(format!(
        "Residency request for {region_name} sent. Approval in {minutes} minutes."
    )))
}

/// Withdraw the pending residency request.
pub fn cancel_residency(
    world: &mut World,
    player_id: PlayerId,
    now: DateTime<Utc>,
) -> Result<ActionOutcome, ActionError> {
    world.player(player_id)?;
    let request = world
        .timers
        .cancel_residency(player_id)
        .ok_or_else(|| ActionError::rejected("no pending residency request"))?;
    let region_name = world
        .regions
        .get(&request.destination)
        .map_or_else(|| request.destination.to_string(), |r| r.name.clone());

    world.log(
        player_id,
        HistoryAction::ResidencyCancel,
        format!("Cancelled residency request for {region_name}"),
        Decimal::ZERO,
        Decimal::ZERO,
        now,
    );
    Ok(ActionOutcome::message("Residency request cancelled."))
}
