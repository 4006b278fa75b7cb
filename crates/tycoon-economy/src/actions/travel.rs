//! Journeys between regions.
//!
//! Distance is the great-circle distance shortened by the origin's
//! development: a developed region has better roads. Duration is whole
//! hours rounded up.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use tycoon_types::{Account, ActiveJourney, EntryKind, HistoryAction, PlayerId, Region, RegionId};

use crate::arith::{after_hours, ceil_u32, div, mul, negate, round2, sub};
use crate::config::{EconomyConfig, TravelConfig};
use crate::error::ActionError;
use crate::geo::region_distance_km;
use crate::world::World;

use super::ActionOutcome;

/// Effective distance, duration and fare of a journey.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TripQuote {
    /// Distance after the development speed-up, in km.
    pub distance_km: Decimal,
    /// Whole hours on the road.
    pub hours: u32,
    /// Fare in money.
    pub cost: Decimal,
}

/// Quote a journey from `origin` to `destination`.
pub fn quote(
    origin: &Region,
    destination: &Region,
    config: &TravelConfig,
) -> Result<TripQuote, ActionError> {
    let raw = region_distance_km(origin, destination)?;
    let speed_up = sub(
        Decimal::ONE,
        div(origin.development_index, Decimal::ONE_HUNDRED)?,
    )?;
    let distance_km = round2(mul(raw, speed_up)?);
    let hours = ceil_u32(div(distance_km, config.km_per_hour)?)?;
    let cost = round2(mul(distance_km, config.cost_per_km)?);
    Ok(TripQuote {
        distance_km,
        hours,
        cost,
    })
}

/// Start a journey to `destination`, paying the fare up front.
pub fn travel(
    world: &mut World,
    player_id: PlayerId,
    destination: RegionId,
    now: DateTime<Utc>,
    config: &EconomyConfig,
) -> Result<ActionOutcome, ActionError> {
    let player = world.player(player_id)?;
    if player.level < config.travel.min_level {
        return Err(ActionError::rejected(format!(
            "you need level {} to travel",
            config.travel.min_level
        )));
    }
    let origin_id = player.current_region;
    if destination == origin_id {
        return Err(ActionError::rejected("you are already in that region"));
    }
    if world.timers.journey(player_id).is_some() {
        return Err(ActionError::conflict("you are already travelling"));
    }

    let origin = world.region(origin_id)?;
    let target = world.region(destination)?;
    let trip = quote(origin, target, &config.travel)?;
    let target_name = target.name.clone();

    if world.available_money(player_id)? < trip.cost {
        return Err(ActionError::rejected(format!(
            "not enough money: the trip costs {}",
            trip.cost
        )));
    }
    world.move_money(
        now,
        EntryKind::Fare,
        (Account::Player(player_id), Account::World),
        trip.cost,
        "travel",
    )?;

    let ends_at = after_hours(now, i64::from(trip.hours))?;
    world.timers.start_journey(ActiveJourney {
        player_id,
        origin: origin_id,
        destination,
        cost: trip.cost,
        started_at: now,
        ends_at,
    })?;

    world.log(
        player_id,
        HistoryAction::Travel,
        format!(
            "Travelling {} km to {target_name} for {} hours",
            trip.distance_km, trip.hours
        ),
        negate(trip.cost),
        Decimal::ZERO,
        now,
    );
    Ok(ActionOutcome::message(format!(
        "Journey to {target_name} started. Duration: {} hours.",
        trip.hours
    )))
}
