//! The registry of time-bounded task records.
//!
//! Journeys, trainings and residency requests are keyed by player, so the
//! at-most-one-per-player rule is a property of the map itself: a second
//! insert is refused with [`ActionError::Conflict`]. Plantings and
//! transports are keyed by their own ids. Pickups are keyed by
//! (player, region, resource) and merge on insert.
//!
//! Every record implements [`Scheduled`]; [`take_due`] is the single
//! due-query the tick processor uses for each kind.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tycoon_types::{
    ActiveJourney, ActivePlanting, ActiveTraining, ActiveTransport, FieldId, Pickup, PickupKey,
    PlantingId, PlayerId, ResidencyRequest, Scheduled, TransportId, VehicleId,
};

use crate::arith::add;
use crate::error::ActionError;

/// Remove and return every record in `map` whose deadline is at or before
/// `now`, in key order.
pub fn take_due<K: Ord + Copy, T: Scheduled>(
    map: &mut BTreeMap<K, T>,
    now: DateTime<Utc>,
) -> Vec<T> {
    let due: Vec<K> = map
        .iter()
        .filter(|(_, record)| record.is_due(now))
        .map(|(key, _)| *key)
        .collect();
    due.into_iter().filter_map(|key| map.remove(&key)).collect()
}

/// All active timers in the world.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimerRegistry {
    journeys: BTreeMap<PlayerId, ActiveJourney>,
    trainings: BTreeMap<PlayerId, ActiveTraining>,
    residency: BTreeMap<PlayerId, ResidencyRequest>,
    plantings: BTreeMap<PlantingId, ActivePlanting>,
    transports: BTreeMap<TransportId, ActiveTransport>,
    pickups: BTreeMap<PickupKey, Pickup>,
}

impl TimerRegistry {
    /// Create an empty registry.
    pub const fn new() -> Self {
        Self {
            journeys: BTreeMap::new(),
            trainings: BTreeMap::new(),
            residency: BTreeMap::new(),
            plantings: BTreeMap::new(),
            transports: BTreeMap::new(),
            pickups: BTreeMap::new(),
        }
    }

    // -----------------------------------------------------------------------
    // Journeys
    // -----------------------------------------------------------------------

    /// Register a journey; fails if the player is already travelling.
    pub fn start_journey(&mut self, journey: ActiveJourney) -> Result<(), ActionError> {
        if self.journeys.contains_key(&journey.player_id) {
            return Err(ActionError::conflict("a journey is already in progress"));
        }
        self.journeys.insert(journey.player_id, journey);
        Ok(())
    }

    /// The player's journey in progress, if any.
    pub fn journey(&self, player: PlayerId) -> Option<&ActiveJourney> {
        self.journeys.get(&player)
    }

    /// All journeys in progress.
    pub fn journeys(&self) -> impl Iterator<Item = &ActiveJourney> {
        self.journeys.values()
    }

    /// Remove and return finished journeys.
    pub fn take_due_journeys(&mut self, now: DateTime<Utc>) -> Vec<ActiveJourney> {
        take_due(&mut self.journeys, now)
    }

    // -----------------------------------------------------------------------
    // Trainings
    // -----------------------------------------------------------------------

    /// Register a training or upgrade; fails if one is already running.
    pub fn start_training(&mut self, training: ActiveTraining) -> Result<(), ActionError> {
        if self.trainings.contains_key(&training.player_id) {
            return Err(ActionError::conflict("a training is already in progress"));
        }
        self.trainings.insert(training.player_id, training);
        Ok(())
    }

    /// The player's training in progress, if any.
    pub fn training(&self, player: PlayerId) -> Option<&ActiveTraining> {
        self.trainings.get(&player)
    }

    /// All trainings in progress.
    pub fn trainings(&self) -> impl Iterator<Item = &ActiveTraining> {
        self.trainings.values()
    }

    /// Remove and return finished trainings.
    pub fn take_due_trainings(&mut self, now: DateTime<Utc>) -> Vec<ActiveTraining> {
        take_due(&mut self.trainings, now)
    }

    // -----------------------------------------------------------------------
    // Residency
    // -----------------------------------------------------------------------

    /// Register a residency request; fails if one is pending.
    pub fn request_residency(&mut self, request: ResidencyRequest) -> Result<(), ActionError> {
        if self.residency.contains_key(&request.player_id) {
            return Err(ActionError::conflict(
                "a residency request is already pending",
            ));
        }
        self.residency.insert(request.player_id, request);
        Ok(())
    }

    /// The player's pending residency request, if any.
    pub fn residency_request(&self, player: PlayerId) -> Option<&ResidencyRequest> {
        self.residency.get(&player)
    }

    /// All pending residency requests.
    pub fn residency_requests(&self) -> impl Iterator<Item = &ResidencyRequest> {
        self.residency.values()
    }

    /// Withdraw the player's pending request.
    pub fn cancel_residency(&mut self, player: PlayerId) -> Option<ResidencyRequest> {
        self.residency.remove(&player)
    }

    /// Remove and return approved requests.
    pub fn take_due_residency(&mut self, now: DateTime<Utc>) -> Vec<ResidencyRequest> {
        take_due(&mut self.residency, now)
    }

    // -----------------------------------------------------------------------
    // Plantings
    // -----------------------------------------------------------------------

    /// Register a planting.
    pub fn plant(&mut self, planting: ActivePlanting) {
        self.plantings.insert(planting.id, planting);
    }

    /// Number of crops growing on a field.
    pub fn plantings_on(&self, field: FieldId) -> usize {
        self.plantings
            .values()
            .filter(|p| p.field_id == field)
            .count()
    }

    /// All growing crops.
    pub fn plantings(&self) -> impl Iterator<Item = &ActivePlanting> {
        self.plantings.values()
    }

    /// Remove and return ripe plantings.
    pub fn take_due_plantings(&mut self, now: DateTime<Utc>) -> Vec<ActivePlanting> {
        take_due(&mut self.plantings, now)
    }

    // -----------------------------------------------------------------------
    // Transports
    // -----------------------------------------------------------------------

    /// Register a scheduled trip.
    pub fn dispatch(&mut self, transport: ActiveTransport) {
        self.transports.insert(transport.id, transport);
    }

    /// Whether the vehicle has any trip that has not arrived yet.
    pub fn vehicle_busy(&self, vehicle: VehicleId) -> bool {
        self.transports.values().any(|t| t.vehicle_id == vehicle)
    }

    /// All scheduled trips.
    pub fn transports(&self) -> impl Iterator<Item = &ActiveTransport> {
        self.transports.values()
    }

    /// Remove and return arrived trips.
    pub fn take_due_transports(&mut self, now: DateTime<Utc>) -> Vec<ActiveTransport> {
        take_due(&mut self.transports, now)
    }

    // -----------------------------------------------------------------------
    // Pickups
    // -----------------------------------------------------------------------

    /// Add goods to the (player, region, resource) pickup, creating it if
    /// needed. The expiry is replaced by `expires_at`.
    pub fn deposit(
        &mut self,
        key: PickupKey,
        quantity: Decimal,
        expires_at: DateTime<Utc>,
    ) -> Result<(), ActionError> {
        if let Some(existing) = self.pickups.get_mut(&key) {
            existing.quantity = add(existing.quantity, quantity)?;
            existing.expires_at = expires_at;
            return Ok(());
        }
        self.pickups.insert(
            key,
            Pickup {
                player_id: key.player_id,
                region_id: key.region_id,
                resource: key.resource,
                quantity,
                expires_at,
            },
        );
        Ok(())
    }

    /// A pickup record by key.
    pub fn pickup(&self, key: &PickupKey) -> Option<&Pickup> {
        self.pickups.get(key)
    }

    /// Mutable access to a pickup record.
    pub fn pickup_mut(&mut self, key: &PickupKey) -> Option<&mut Pickup> {
        self.pickups.get_mut(key)
    }

    /// Remove a pickup record.
    pub fn remove_pickup(&mut self, key: &PickupKey) -> Option<Pickup> {
        self.pickups.remove(key)
    }

    /// All pickups.
    pub fn pickups(&self) -> impl Iterator<Item = &Pickup> {
        self.pickups.values()
    }

    /// Remove and return expired pickups.
    pub fn take_expired_pickups(&mut self, now: DateTime<Utc>) -> Vec<Pickup> {
        take_due(&mut self.pickups, now)
    }

    // -----------------------------------------------------------------------
    // Restore
    // -----------------------------------------------------------------------

    /// Total number of records across every kind.
    pub fn len(&self) -> usize {
        self.journeys
            .len()
            .saturating_add(self.trainings.len())
            .saturating_add(self.residency.len())
            .saturating_add(self.plantings.len())
            .saturating_add(self.transports.len())
            .saturating_add(self.pickups.len())
    }

    /// Whether no timer of any kind exists.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Insert a stored pickup verbatim. Fails on a duplicate key.
    pub fn restore_pickup(&mut self, pickup: Pickup) -> Result<(), ActionError> {
        let key = pickup.key();
        if self.pickups.contains_key(&key) {
            return Err(ActionError::conflict("duplicate pickup record"));
        }
        self.pickups.insert(key, pickup);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::arithmetic_side_effects)]
mod tests {
    use chrono::Duration;
    use rust_decimal_macros::dec;
    use tycoon_types::{RegionId, Resource, Skill, TrainingTarget};

    use super::*;

    fn training(player: PlayerId, now: DateTime<Utc>) -> ActiveTraining {
        ActiveTraining {
            player_id: player,
            target: TrainingTarget::Skill(Skill::Health),
            target_level: 1,
            started_at: now,
            ends_at: now + Duration::minutes(10),
        }
    }

    #[test]
    fn second_training_conflicts() {
        let mut registry = TimerRegistry::new();
        let player = PlayerId::new();
        let now = Utc::now();
        assert!(registry.start_training(training(player, now)).is_ok());
        let second = registry.start_training(training(player, now));
        assert!(matches!(second, Err(ActionError::Conflict { .. })));
        assert_eq!(registry.trainings().count(), 1);
    }

    #[test]
    fn take_due_only_removes_elapsed() {
        let mut registry = TimerRegistry::new();
        let now = Utc::now();
        let early = PlayerId::new();
        let late = PlayerId::new();
        let mut first = training(early, now);
        first.ends_at = now - Duration::minutes(1);
        assert!(registry.start_training(first).is_ok());
        assert!(registry.start_training(training(late, now)).is_ok());

        let due = registry.take_due_trainings(now);
        assert_eq!(due.len(), 1);
        assert_eq!(due.first().map(|t| t.player_id), Some(early));
        assert!(registry.training(late).is_some());
    }

    #[test]
    fn pickups_merge_and_refresh_expiry() {
        let mut registry = TimerRegistry::new();
        let now = Utc::now();
        let key = PickupKey {
            player_id: PlayerId::new(),
            region_id: RegionId::new(),
            resource: Resource::Iron,
        };
        assert!(registry.deposit(key, dec!(15), now).is_ok());
        let later = now + Duration::minutes(15);
        assert!(registry.deposit(key, dec!(7.5), later).is_ok());

        let pickup = registry.pickup(&key);
        assert_eq!(pickup.map(|p| p.quantity), Some(dec!(22.5)));
        assert_eq!(pickup.map(|p| p.expires_at), Some(later));
        assert_eq!(registry.len(), 1);
    }
}
