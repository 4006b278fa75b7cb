//! Freight from a pickup to the player's warehouse.
//!
//! The player assigns trips to vehicles. Each vehicle runs its trips back
//! to back starting now, and each trip carries up to the vehicle's
//! capacity until the pickup is used up. Freight for every scheduled trip
//! is charged up front. Whatever the trips cannot carry stays at the
//! pickup with a fresh expiry.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use tycoon_types::{
    Account, ActiveTransport, EntryKind, HistoryAction, PickupKey, PlayerId, RegionId, Resource,
    TransportId, Vehicle, VehicleId,
};

use crate::arith::{add, after_hours, after_minutes, ceil_u32, div, mul, negate, round2, sub};
use crate::config::{EconomyConfig, TransportConfig};
use crate::error::ActionError;
use crate::geo::region_distance_km;
use crate::world::World;

use super::ActionOutcome;

/// Trips requested for one vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripRequest {
    /// Vehicle from the player's fleet.
    pub vehicle_id: VehicleId,
    /// Number of back-to-back trips.
    pub trips: u32,
}

/// Minutes one trip of `vehicle` takes over `distance_km`.
pub fn trip_minutes(
    vehicle: &Vehicle,
    distance_km: Decimal,
    config: &TransportConfig,
) -> Result<u32, ActionError> {
    let floor = config.local_trip_minutes;
    let base = if distance_km < config.local_distance_km {
        floor
    } else {
        let hours = div(distance_km, config.base_speed_kmh)?;
        // Out and back.
        let round_trip = mul(mul(hours, Decimal::TWO)?, Decimal::from(60))?;
        ceil_u32(round_trip)?.max(floor)
    };
    if vehicle.speed <= Decimal::ZERO {
        return Err(ActionError::internal(format!(
            "vehicle {} has no speed",
            vehicle.id
        )));
    }
    Ok(ceil_u32(div(Decimal::from(base), vehicle.speed)?)?.max(floor))
}

/// Freight charged for one trip of `vehicle` over `distance_km`.
pub fn trip_fare(
    vehicle: &Vehicle,
    distance_km: Decimal,
    config: &TransportConfig,
) -> Result<Decimal, ActionError> {
    if distance_km < config.local_distance_km {
        return Ok(config.local_freight_fee);
    }
    Ok(round2(mul(
        mul(vehicle.cost_per_ton_km, vehicle.capacity)?,
        distance_km,
    )?))
}

/// Dispatch vehicles to haul the player's pickup of `resource` in
/// `region_id` to their warehouse.
#[allow(clippy::too_many_lines)]
pub fn start_transport(
    world: &mut World,
    player_id: PlayerId,
    (region_id, resource): (RegionId, Resource),
    requests: &[TripRequest],
    now: DateTime<Utc>,
    config: &EconomyConfig,
) -> Result<ActionOutcome, ActionError> {
    let cfg = &config.transport;
    world.player(player_id)?;
    let key = PickupKey {
        player_id,
        region_id,
        resource,
    };
    let pool = world
        .timers
        .pickup(&key)
        .map(|p| p.quantity)
        .filter(|q| *q > Decimal::ZERO)
        .ok_or_else(|| ActionError::rejected("no goods waiting for transport there"))?;
    if requests.is_empty() {
        return Err(ActionError::rejected("choose at least one vehicle"));
    }

    let warehouse = world.warehouse_of(player_id)?;
    let warehouse_id = warehouse.id;
    let distance = region_distance_km(world.region(region_id)?, world.region(warehouse.region_id)?)?;

    let mut remaining = pool;
    let mut total_fare = Decimal::ZERO;
    let mut scheduled: Vec<ActiveTransport> = Vec::new();
    let mut used: BTreeSet<VehicleId> = BTreeSet::new();

    for request in requests {
        if remaining <= Decimal::ZERO {
            break;
        }
        let vehicle = world.vehicle(request.vehicle_id)?;
        if vehicle.warehouse_id != warehouse_id {
            return Err(ActionError::rejected(format!(
                "vehicle {} is not in your fleet",
                vehicle.id
            )));
        }
        if world.timers.vehicle_busy(vehicle.id) || !used.insert(vehicle.id) {
            debug!(vehicle_id = %vehicle.id, "vehicle busy, skipped");
            continue;
        }
        let minutes = i64::from(trip_minutes(vehicle, distance, cfg)?);
        let fare = trip_fare(vehicle, distance, cfg)?;

        let mut departs_at = now;
        for _ in 0..request.trips {
            if remaining <= Decimal::ZERO {
                break;
            }
            let load = remaining.min(vehicle.capacity);
            let arrives_at = after_minutes(departs_at, minutes)?;
            scheduled.push(ActiveTransport {
                id: TransportId::new(),
                player_id,
                vehicle_id: vehicle.id,
                warehouse_id,
                origin: region_id,
                resource,
                quantity: load,
                fare,
                departs_at,
                arrives_at,
            });
            remaining = sub(remaining, load)?;
            total_fare = add(total_fare, fare)?;
            departs_at = arrives_at;
        }
    }

    if scheduled.is_empty() {
        return Err(ActionError::rejected("no available vehicle could take a trip"));
    }
    if world.available_money(player_id)? < total_fare {
        return Err(ActionError::rejected(format!(
            "not enough money: freight costs {total_fare}"
        )));
    }
    world.move_money(
        now,
        EntryKind::Freight,
        (Account::Player(player_id), Account::World),
        total_fare,
        "freight",
    )?;

    let carried = sub(pool, remaining.max(Decimal::ZERO))?;
    if remaining <= Decimal::ZERO {
        world.timers.remove_pickup(&key);
    } else {
        let expires_at = after_hours(now, cfg.remainder_expiry_hours)?;
        if let Some(pickup) = world.timers.pickup_mut(&key) {
            pickup.quantity = remaining;
            pickup.expires_at = expires_at;
        }
    }

    let trips = scheduled.len();
    let last_arrival = scheduled.iter().map(|t| t.arrives_at).max().unwrap_or(now);
    for transport in scheduled {
        world.timers.dispatch(transport);
    }

    world.log(
        player_id,
        HistoryAction::FreightCharged,
        format!("Dispatched {trips} trips carrying {carried} t of {resource} over {distance} km"),
        negate(total_fare),
        Decimal::ZERO,
        now,
    );
    let mut message = format!(
        "{trips} trips scheduled for {carried} t of {resource}. Freight: {total_fare}. Last arrival at {}.",
        last_arrival.format("%H:%M")
    );
    if remaining > Decimal::ZERO {
        message.push_str(&format!(" {remaining} t stay behind."));
    }
    Ok(ActionOutcome::message(message))
}
