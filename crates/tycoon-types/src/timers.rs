//! Time-bounded task records resolved by the tick processor.
//!
//! Every timer implements [`Scheduled`], which exposes the deadline used by
//! the single due-query in the economy crate. Exclusivity (one journey, one
//! training and one residency request per player) is a property of how the
//! registry keys these records, not of the records themselves.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{Resource, TrainingTarget};
use crate::ids::{FieldId, PlantingId, PlayerId, RegionId, TransportId, VehicleId, WarehouseId};

/// A record with a completion or expiry deadline.
pub trait Scheduled {
    /// The instant at or after which the record is due.
    fn deadline(&self) -> DateTime<Utc>;

    /// Whether the record is due at `now`.
    fn is_due(&self, now: DateTime<Utc>) -> bool {
        now >= self.deadline()
    }
}

/// A player travelling between regions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ActiveJourney {
    /// Travelling player.
    pub player_id: PlayerId,
    /// Region the journey started in.
    pub origin: RegionId,
    /// Region the player arrives in.
    pub destination: RegionId,
    /// Fare paid.
    #[ts(as = "String")]
    pub cost: Decimal,
    /// Departure time.
    pub started_at: DateTime<Utc>,
    /// Arrival time.
    pub ends_at: DateTime<Utc>,
}

impl Scheduled for ActiveJourney {
    fn deadline(&self) -> DateTime<Utc> {
        self.ends_at
    }
}

/// A skill training or warehouse upgrade in progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ActiveTraining {
    /// Training player.
    pub player_id: PlayerId,
    /// Skill or warehouse track being raised.
    pub target: TrainingTarget,
    /// Level applied on completion.
    pub target_level: u32,
    /// Start time.
    pub started_at: DateTime<Utc>,
    /// Completion time.
    pub ends_at: DateTime<Utc>,
}

impl Scheduled for ActiveTraining {
    fn deadline(&self) -> DateTime<Utc> {
        self.ends_at
    }
}

/// A crop growing on a field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ActivePlanting {
    /// Unique planting identifier.
    pub id: PlantingId,
    /// Planter.
    pub player_id: PlayerId,
    /// Field planted on.
    pub field_id: FieldId,
    /// Corn produced at harvest.
    #[ts(as = "String")]
    pub quantity: Decimal,
    /// Harvest time.
    pub ends_at: DateTime<Utc>,
}

impl Scheduled for ActivePlanting {
    fn deadline(&self) -> DateTime<Utc> {
        self.ends_at
    }
}

/// One vehicle trip hauling goods from a pickup point to a warehouse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ActiveTransport {
    /// Unique trip identifier.
    pub id: TransportId,
    /// Player who dispatched the trip.
    pub player_id: PlayerId,
    /// Vehicle making the trip.
    pub vehicle_id: VehicleId,
    /// Destination warehouse.
    pub warehouse_id: WarehouseId,
    /// Pickup region.
    pub origin: RegionId,
    /// Cargo resource.
    pub resource: Resource,
    /// Cargo quantity.
    #[ts(as = "String")]
    pub quantity: Decimal,
    /// Fare charged for this trip.
    #[ts(as = "String")]
    pub fare: Decimal,
    /// Departure time.
    pub departs_at: DateTime<Utc>,
    /// Arrival time.
    pub arrives_at: DateTime<Utc>,
}

impl Scheduled for ActiveTransport {
    fn deadline(&self) -> DateTime<Utc> {
        self.arrives_at
    }
}

/// A pending request to change residence region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ResidencyRequest {
    /// Requesting player.
    pub player_id: PlayerId,
    /// Requested residence.
    pub destination: RegionId,
    /// Request time.
    pub requested_at: DateTime<Utc>,
    /// Approval time.
    pub approves_at: DateTime<Utc>,
}

impl Scheduled for ResidencyRequest {
    fn deadline(&self) -> DateTime<Utc> {
        self.approves_at
    }
}

/// Goods waiting at a region for a player to haul them away.
///
/// Keyed by (player, region, resource); repeated deposits merge into one
/// record and refresh its expiry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Pickup {
    /// Owner of the goods.
    pub player_id: PlayerId,
    /// Where the goods lie.
    pub region_id: RegionId,
    /// Resource type.
    pub resource: Resource,
    /// Quantity waiting.
    #[ts(as = "String")]
    pub quantity: Decimal,
    /// When the goods are lost.
    pub expires_at: DateTime<Utc>,
}

impl Scheduled for Pickup {
    fn deadline(&self) -> DateTime<Utc> {
        self.expires_at
    }
}

/// Composite key of a [`Pickup`] record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PickupKey {
    /// Owner of the goods.
    pub player_id: PlayerId,
    /// Where the goods lie.
    pub region_id: RegionId,
    /// Resource type.
    pub resource: Resource,
}

impl Pickup {
    /// The registry key of this record.
    pub const fn key(&self) -> PickupKey {
        PickupKey {
            player_id: self.player_id,
            region_id: self.region_id,
            resource: self.resource,
        }
    }
}

#[cfg(test)]
#[allow(clippy::arithmetic_side_effects)]
mod tests {
    use chrono::Duration;

    use super::*;

    #[test]
    fn due_at_and_after_deadline() {
        let now = Utc::now();
        let request = ResidencyRequest {
            player_id: PlayerId::new(),
            destination: RegionId::new(),
            requested_at: now,
            approves_at: now + Duration::minutes(5),
        };
        assert!(!request.is_due(now));
        assert!(request.is_due(now + Duration::minutes(5)));
        assert!(request.is_due(now + Duration::minutes(6)));
    }

    #[test]
    fn pickup_key_matches_fields() {
        let pickup = Pickup {
            player_id: PlayerId::new(),
            region_id: RegionId::new(),
            resource: Resource::Iron,
            quantity: Decimal::ONE,
            expires_at: Utc::now(),
        };
        let key = pickup.key();
        assert_eq!(key.player_id, pickup.player_id);
        assert_eq!(key.region_id, pickup.region_id);
        assert_eq!(key.resource, Resource::Iron);
    }
}
