//! Tick processor: the recurring jobs that advance the world between
//! player actions.
//!
//! [`core_status_update`] runs every minute and resolves, in this order:
//!
//! 1. **Energy** -- regenerate energy from whole elapsed minutes.
//! 2. **Plantings** -- harvest ripe crops into pickups.
//! 3. **Trainings** -- apply finished skill trainings and warehouse upgrades.
//! 4. **Journeys** -- move arriving players.
//! 5. **Residency** -- approve due residency requests.
//! 6. **Transports** -- deliver arrived cargo into warehouses.
//! 7. **Indices** -- recompute regional indices and tax rates.
//! 8. **Pickups** -- destroy goods left past their expiry.
//! 9. **Fields** -- end field rest periods.
//! 10. **Orders** -- expire market orders and refund their escrow.
//!
//! The order matters: the index recompute sees residences approved and
//! levels gained earlier in the same pass.
//!
//! [`resource_replenishment`] refills every region's reserves and
//! [`vehicle_validity_check`] scraps vehicles past their validity.
//!
//! Each job runs inside a single [`World::atomically`] boundary. An error
//! in any phase discards the whole pass and is returned to the scheduler,
//! which waits for the next interval.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use tycoon_economy::actions::farming;
use tycoon_economy::actions::training::skill_level_mut;
use tycoon_economy::actions::warehouse::track_level_mut;
use tycoon_economy::arith::{add, after_days, after_minutes, floor_u32, mul};
use tycoon_economy::progression::grant_xp;
use tycoon_economy::{ActionError, EconomyConfig, World, market, regions};
use tycoon_ledger::TransferParams;
use tycoon_types::{Account, Asset, EntryKind, HistoryAction, RegionId, TrainingTarget, VehicleId};

/// Errors that can occur during a job run.
#[derive(Debug, thiserror::Error)]
pub enum TickError {
    /// A phase failed; nothing from this run was kept.
    #[error("{phase} failed: {source}")]
    Phase {
        /// The phase that failed.
        phase: &'static str,
        /// The underlying error.
        source: ActionError,
    },
}

impl TickError {
    /// Name of the phase that failed.
    pub const fn phase(&self) -> &'static str {
        match self {
            Self::Phase { phase, .. } => *phase,
        }
    }
}

fn in_phase(phase: &'static str) -> impl Fn(ActionError) -> TickError {
    move |source| TickError::Phase { phase, source }
}

/// What one `core_status_update` run resolved.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoreStatusReport {
    /// Players who regained energy.
    pub energy_regenerated: usize,
    /// Plantings harvested.
    pub harvests: usize,
    /// Trainings and upgrades completed.
    pub trainings_completed: usize,
    /// Journeys completed.
    pub journeys_completed: usize,
    /// Residency requests approved.
    pub residencies_approved: usize,
    /// Transport trips delivered.
    pub transports_delivered: usize,
    /// Pickups destroyed after expiry.
    pub pickups_expired: usize,
    /// Fields whose rest ended.
    pub fields_reset: usize,
    /// Market orders expired.
    pub orders_expired: usize,
}

/// What one `resource_replenishment` run did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplenishReport {
    /// Regions whose reserves were below maximum.
    pub regions_refilled: usize,
}

/// What one `vehicle_validity_check` run did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleReport {
    /// Vehicles scrapped.
    pub vehicles_expired: usize,
}

/// Run the per-minute bundle of timer resolutions as one unit.
pub fn core_status_update(
    world: &mut World,
    now: DateTime<Utc>,
    config: &EconomyConfig,
) -> Result<CoreStatusReport, TickError> {
    world.atomically(|w| run_core_status(w, now, config))
}

fn run_core_status(
    world: &mut World,
    now: DateTime<Utc>,
    config: &EconomyConfig,
) -> Result<CoreStatusReport, TickError> {
    let energy_regenerated =
        regenerate_energy(world, now, config).map_err(in_phase("energy regeneration"))?;
    let harvests = complete_plantings(world, now, config).map_err(in_phase("planting harvest"))?;
    let trainings_completed =
        complete_trainings(world, now, config).map_err(in_phase("training completion"))?;
    let journeys_completed =
        complete_journeys(world, now).map_err(in_phase("journey completion"))?;
    let residencies_approved =
        approve_residency(world, now).map_err(in_phase("residency approval"))?;
    let transports_delivered =
        deliver_transports(world, now).map_err(in_phase("transport delivery"))?;
    regions::recompute_indices(world, &config.region).map_err(in_phase("index recompute"))?;
    let pickups_expired = expire_pickups(world, now).map_err(in_phase("pickup expiry"))?;
    let fields_reset = farming::reset_rested_fields(world, now, config);
    let orders_expired =
        market::expire_due_orders(world, now).map_err(in_phase("order expiry"))?;

    Ok(CoreStatusReport {
        energy_regenerated,
        harvests,
        trainings_completed,
        journeys_completed,
        residencies_approved,
        transports_delivered,
        pickups_expired,
        fields_reset,
        orders_expired,
    })
}

/// Refill every region's gold and iron reserves.
pub fn resource_replenishment(
    world: &mut World,
    now: DateTime<Utc>,
) -> Result<ReplenishReport, TickError> {
    world.atomically(|w| {
        let regions_refilled = regions::replenish(w);
        debug!(at = %now, regions_refilled, "reserves replenished");
        Ok(ReplenishReport { regions_refilled })
    })
}

/// Scrap every vehicle whose validity has run out.
///
/// A scrapped vehicle's trip already on the road still arrives.
pub fn vehicle_validity_check(
    world: &mut World,
    now: DateTime<Utc>,
) -> Result<VehicleReport, TickError> {
    world.atomically(|w| expire_vehicles(w, now).map_err(in_phase("vehicle validity")))
}

// ---------------------------------------------------------------------------
// Phases
// ---------------------------------------------------------------------------

fn regenerate_energy(
    world: &mut World,
    now: DateTime<Utc>,
    config: &EconomyConfig,
) -> Result<usize, ActionError> {
    let max = config.player.max_energy;
    let health: BTreeMap<RegionId, Decimal> = world
        .regions
        .values()
        .map(|r| (r.id, r.health_index))
        .collect();

    let mut regenerated: usize = 0;
    for player in world.players.values_mut() {
        if player.energy >= max {
            player.last_status_update = now;
            continue;
        }
        let minutes = now
            .signed_duration_since(player.last_status_update)
            .num_minutes();
        if minutes <= 0 {
            continue;
        }
        let bonus = add(
            Decimal::ONE,
            health.get(&player.current_region).copied().unwrap_or_default(),
        )?;
        let per_minute = mul(config.player.energy_per_minute, bonus)?;
        let gained = floor_u32(mul(Decimal::from(minutes), per_minute)?)?;
        if gained == 0 {
            continue;
        }
        player.energy = player.energy.saturating_add(gained).min(max);
        player.last_status_update = if player.energy >= max {
            now
        } else {
            // Carry the partial minute into the next tick.
            after_minutes(player.last_status_update, minutes)?
        };
        regenerated = regenerated.saturating_add(1);
    }
    Ok(regenerated)
}

fn complete_plantings(
    world: &mut World,
    now: DateTime<Utc>,
    config: &EconomyConfig,
) -> Result<usize, ActionError> {
    let due = world.timers.take_due_plantings(now);
    for planting in &due {
        farming::harvest(world, planting, now, config)?;
    }
    Ok(due.len())
}

fn complete_trainings(
    world: &mut World,
    now: DateTime<Utc>,
    config: &EconomyConfig,
) -> Result<usize, ActionError> {
    let due = world.timers.take_due_trainings(now);
    for training in &due {
        let label = match training.target {
            TrainingTarget::Skill(skill) => {
                *skill_level_mut(world.player_mut(training.player_id)?, skill) =
                    training.target_level;
                skill.label()
            }
            TrainingTarget::Warehouse(track) => {
                *track_level_mut(world.warehouse_of_mut(training.player_id)?, track) =
                    training.target_level;
                track.label()
            }
        };
        let player = world.player_mut(training.player_id)?;
        let levels = grant_xp(
            player,
            config.training.completion_xp,
            &config.skills,
            &config.progression,
        )?;
        world.log(
            training.player_id,
            HistoryAction::TrainingCompleted,
            format!("{label} reached level {}", training.target_level),
            Decimal::ZERO,
            Decimal::ZERO,
            now,
        );
        debug!(
            player_id = %training.player_id,
            target = label,
            level = training.target_level,
            levels_gained = levels,
            "training completed"
        );
    }
    Ok(due.len())
}

fn complete_journeys(world: &mut World, now: DateTime<Utc>) -> Result<usize, ActionError> {
    let due = world.timers.take_due_journeys(now);
    for journey in &due {
        world.player_mut(journey.player_id)?.current_region = journey.destination;
        let name = world.region(journey.destination)?.name.clone();
        world.log(
            journey.player_id,
            HistoryAction::TravelCompleted,
            format!("Arrived in {name}"),
            Decimal::ZERO,
            Decimal::ZERO,
            now,
        );
    }
    Ok(due.len())
}

fn approve_residency(world: &mut World, now: DateTime<Utc>) -> Result<usize, ActionError> {
    let due = world.timers.take_due_residency(now);
    for request in &due {
        world.player_mut(request.player_id)?.residence_region = request.destination;
        let name = world.region(request.destination)?.name.clone();
        world.log(
            request.player_id,
            HistoryAction::ResidencyApproved,
            format!("Now a resident of {name}"),
            Decimal::ZERO,
            Decimal::ZERO,
            now,
        );
    }
    Ok(due.len())
}

fn deliver_transports(world: &mut World, now: DateTime<Utc>) -> Result<usize, ActionError> {
    let due = world.timers.take_due_transports(now);
    for trip in &due {
        let stock = world.stock_mut(trip.warehouse_id, trip.resource)?;
        stock.quantity = add(stock.quantity, trip.quantity)?;
        world.journal.record(TransferParams {
            at: now,
            kind: EntryKind::Delivery,
            asset: Asset::Goods(trip.resource),
            quantity: trip.quantity,
            from: Account::Pickup(trip.player_id),
            to: Account::Warehouse(trip.warehouse_id),
            reason: "transport_delivery",
        })?;
        world.log(
            trip.player_id,
            HistoryAction::TransportCompleted,
            format!("{} t of {} delivered to the warehouse", trip.quantity, trip.resource),
            Decimal::ZERO,
            Decimal::ZERO,
            now,
        );
    }
    Ok(due.len())
}

fn expire_pickups(world: &mut World, now: DateTime<Utc>) -> Result<usize, ActionError> {
    let expired = world.timers.take_expired_pickups(now);
    for pickup in &expired {
        world.journal.record_decay(
            now,
            Asset::Goods(pickup.resource),
            pickup.quantity,
            Account::Pickup(pickup.player_id),
            "pickup_expired",
        )?;
        debug!(
            player_id = %pickup.player_id,
            region_id = %pickup.region_id,
            resource = %pickup.resource,
            quantity = %pickup.quantity,
            "pickup expired"
        );
    }
    Ok(expired.len())
}

fn expire_vehicles(world: &mut World, now: DateTime<Utc>) -> Result<VehicleReport, ActionError> {
    let mut expired: Vec<VehicleId> = Vec::new();
    for vehicle in world.vehicles.values() {
        let valid_until = after_days(vehicle.purchased_at, i64::from(vehicle.validity_days))?;
        if valid_until <= now {
            expired.push(vehicle.id);
        }
    }
    for id in &expired {
        let Some(vehicle) = world.vehicles.remove(id) else {
            continue;
        };
        let owner = world
            .warehouses
            .get(&vehicle.warehouse_id)
            .map(|w| w.player_id);
        if let Some(owner) = owner {
            world.log(
                owner,
                HistoryAction::VehicleExpired,
                format!(
                    "{} scrapped after {} days",
                    vehicle.vehicle_type.code(),
                    vehicle.validity_days
                ),
                Decimal::ZERO,
                Decimal::ZERO,
                now,
            );
        }
        debug!(vehicle_id = %id, "vehicle expired");
    }
    Ok(VehicleReport {
        vehicles_expired: expired.len(),
    })
}
