//! Row structs for every table and their conversion into domain types.
//!
//! Conversions are fallible: a row with an unknown enum name or a negative
//! counter becomes [`DbError::Corrupt`] instead of a silently wrong value.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use tycoon_types::{
    ActiveJourney, ActivePlanting, ActiveTraining, ActiveTransport, Company, CompanyId, Field,
    FieldId, HistoryEntry, HistoryEntryId, LedgerEntry, LedgerEntryId, MarketOrder, OrderId,
    Ownership, Pickup, PlantingId, Player, PlayerId, Region, RegionId, ResidencyRequest,
    StockEntry, TransportId, Vehicle, VehicleId, Warehouse, WarehouseId,
};

use crate::codec::{from_int, from_json, from_text};
use crate::error::DbError;

/// A row from the `regions` table.
#[derive(Debug, Clone, sqlx::FromRow)]
#[allow(missing_docs)]
pub struct RegionRow {
    pub id: Uuid,
    pub name: String,
    pub latitude: Decimal,
    pub longitude: Decimal,
    pub gold_reserve: Decimal,
    pub gold_reserve_max: Decimal,
    pub iron_reserve: Decimal,
    pub iron_reserve_max: Decimal,
    pub education_index: Decimal,
    pub health_index: Decimal,
    pub philanthropy_index: Decimal,
    pub development_index: Decimal,
    pub tax_rate: Decimal,
}

impl From<RegionRow> for Region {
    fn from(row: RegionRow) -> Self {
        Self {
            id: RegionId::from(row.id),
            name: row.name,
            latitude: row.latitude,
            longitude: row.longitude,
            gold_reserve: row.gold_reserve,
            gold_reserve_max: row.gold_reserve_max,
            iron_reserve: row.iron_reserve,
            iron_reserve_max: row.iron_reserve_max,
            education_index: row.education_index,
            health_index: row.health_index,
            philanthropy_index: row.philanthropy_index,
            development_index: row.development_index,
            tax_rate: row.tax_rate,
        }
    }
}

/// A row from the `players` table.
#[derive(Debug, Clone, sqlx::FromRow)]
#[allow(missing_docs)]
pub struct PlayerRow {
    pub id: Uuid,
    pub username: String,
    pub money: Decimal,
    pub reserved_money: Decimal,
    pub gold: Decimal,
    pub energy: i32,
    pub level: i32,
    pub xp: Decimal,
    pub work_xp: Decimal,
    pub education: i32,
    pub health: i32,
    pub philanthropy: i32,
    pub current_region: Uuid,
    pub residence_region: Uuid,
    pub last_status_update: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<PlayerRow> for Player {
    type Error = DbError;

    fn try_from(row: PlayerRow) -> Result<Self, Self::Error> {
        const TABLE: &str = "players";
        Ok(Self {
            id: PlayerId::from(row.id),
            username: row.username,
            money: row.money,
            reserved_money: row.reserved_money,
            gold: row.gold,
            energy: from_int(TABLE, row.energy)?,
            level: from_int(TABLE, row.level)?,
            xp: row.xp,
            work_xp: row.work_xp,
            education: from_int(TABLE, row.education)?,
            health: from_int(TABLE, row.health)?,
            philanthropy: from_int(TABLE, row.philanthropy)?,
            current_region: RegionId::from(row.current_region),
            residence_region: RegionId::from(row.residence_region),
            last_status_update: row.last_status_update,
            created_at: row.created_at,
        })
    }
}

/// A row from the `companies` table.
#[derive(Debug, Clone, sqlx::FromRow)]
#[allow(missing_docs)]
pub struct CompanyRow {
    pub id: Uuid,
    pub name: String,
    pub region_id: Uuid,
    pub owner_id: Option<Uuid>,
    pub product: String,
    pub profit_rate: Decimal,
    pub cash: Decimal,
    pub rate_changed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<CompanyRow> for Company {
    type Error = DbError;

    fn try_from(row: CompanyRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: CompanyId::from(row.id),
            name: row.name,
            region_id: RegionId::from(row.region_id),
            ownership: row
                .owner_id
                .map_or(Ownership::StateOwned, |owner| {
                    Ownership::Private(PlayerId::from(owner))
                }),
            product: from_text("companies", &row.product)?,
            profit_rate: row.profit_rate,
            cash: row.cash,
            rate_changed_at: row.rate_changed_at,
            created_at: row.created_at,
        })
    }
}

/// A row from the `warehouses` table. Stock is loaded separately.
#[derive(Debug, Clone, sqlx::FromRow)]
#[allow(missing_docs)]
pub struct WarehouseRow {
    pub id: Uuid,
    pub player_id: Uuid,
    pub region_id: Uuid,
    pub capacity_level: i32,
    pub fleet_level: i32,
    pub specialization_level: i32,
}

impl TryFrom<WarehouseRow> for Warehouse {
    type Error = DbError;

    fn try_from(row: WarehouseRow) -> Result<Self, Self::Error> {
        const TABLE: &str = "warehouses";
        Ok(Self {
            id: WarehouseId::from(row.id),
            player_id: PlayerId::from(row.player_id),
            region_id: RegionId::from(row.region_id),
            capacity_level: from_int(TABLE, row.capacity_level)?,
            fleet_level: from_int(TABLE, row.fleet_level)?,
            specialization_level: from_int(TABLE, row.specialization_level)?,
            stock: std::collections::BTreeMap::new(),
        })
    }
}

/// A row from the `warehouse_stock` table.
#[derive(Debug, Clone, sqlx::FromRow)]
#[allow(missing_docs)]
pub struct StockRow {
    pub warehouse_id: Uuid,
    pub resource: String,
    pub quantity: Decimal,
    pub reserved: Decimal,
}

impl StockRow {
    /// The owning warehouse, resource and stock entry.
    pub fn into_parts(
        self,
    ) -> Result<(WarehouseId, tycoon_types::Resource, StockEntry), DbError> {
        Ok((
            WarehouseId::from(self.warehouse_id),
            from_text("warehouse_stock", &self.resource)?,
            StockEntry {
                quantity: self.quantity,
                reserved: self.reserved,
            },
        ))
    }
}

/// A row from the `vehicles` table.
#[derive(Debug, Clone, sqlx::FromRow)]
#[allow(missing_docs)]
pub struct VehicleRow {
    pub id: Uuid,
    pub warehouse_id: Uuid,
    pub vehicle_type: String,
    pub capacity: Decimal,
    pub speed: Decimal,
    pub cost_per_ton_km: Decimal,
    pub validity_days: i32,
    pub purchased_at: DateTime<Utc>,
}

impl TryFrom<VehicleRow> for Vehicle {
    type Error = DbError;

    fn try_from(row: VehicleRow) -> Result<Self, Self::Error> {
        const TABLE: &str = "vehicles";
        Ok(Self {
            id: VehicleId::from(row.id),
            warehouse_id: WarehouseId::from(row.warehouse_id),
            vehicle_type: from_text(TABLE, &row.vehicle_type)?,
            capacity: row.capacity,
            speed: row.speed,
            cost_per_ton_km: row.cost_per_ton_km,
            validity_days: from_int(TABLE, row.validity_days)?,
            purchased_at: row.purchased_at,
        })
    }
}

/// A row from the `fields` table.
#[derive(Debug, Clone, sqlx::FromRow)]
#[allow(missing_docs)]
pub struct FieldRow {
    pub id: Uuid,
    pub name: String,
    pub owner_id: Uuid,
    pub region_id: Uuid,
    pub profit_rate: Decimal,
    pub uses_remaining: i32,
    pub rest_until: Option<DateTime<Utc>>,
}

impl TryFrom<FieldRow> for Field {
    type Error = DbError;

    fn try_from(row: FieldRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: FieldId::from(row.id),
            name: row.name,
            owner: PlayerId::from(row.owner_id),
            region_id: RegionId::from(row.region_id),
            profit_rate: row.profit_rate,
            uses_remaining: from_int("fields", row.uses_remaining)?,
            rest_until: row.rest_until,
        })
    }
}

/// A row from the `market_orders` table.
#[derive(Debug, Clone, sqlx::FromRow)]
#[allow(missing_docs)]
pub struct OrderRow {
    pub id: Uuid,
    pub creator_id: Uuid,
    pub region_id: Uuid,
    pub side: String,
    pub resource: String,
    pub quantity: Decimal,
    pub remaining: Decimal,
    pub price: Decimal,
    pub tax_rate: Decimal,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl TryFrom<OrderRow> for MarketOrder {
    type Error = DbError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        const TABLE: &str = "market_orders";
        Ok(Self {
            id: OrderId::from(row.id),
            creator: PlayerId::from(row.creator_id),
            region_id: RegionId::from(row.region_id),
            side: from_text(TABLE, &row.side)?,
            resource: from_text(TABLE, &row.resource)?,
            quantity: row.quantity,
            remaining: row.remaining,
            price: row.price,
            tax_rate: row.tax_rate,
            status: from_text(TABLE, &row.status)?,
            created_at: row.created_at,
            expires_at: row.expires_at,
        })
    }
}

// =========================================================================
// Timers
// =========================================================================

/// A row from the `active_journeys` table.
#[derive(Debug, Clone, sqlx::FromRow)]
#[allow(missing_docs)]
pub struct JourneyRow {
    pub player_id: Uuid,
    pub origin: Uuid,
    pub destination: Uuid,
    pub cost: Decimal,
    pub started_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
}

impl From<JourneyRow> for ActiveJourney {
    fn from(row: JourneyRow) -> Self {
        Self {
            player_id: PlayerId::from(row.player_id),
            origin: RegionId::from(row.origin),
            destination: RegionId::from(row.destination),
            cost: row.cost,
            started_at: row.started_at,
            ends_at: row.ends_at,
        }
    }
}

/// A row from the `active_trainings` table.
#[derive(Debug, Clone, sqlx::FromRow)]
#[allow(missing_docs)]
pub struct TrainingRow {
    pub player_id: Uuid,
    pub target: serde_json::Value,
    pub target_level: i32,
    pub started_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
}

impl TryFrom<TrainingRow> for ActiveTraining {
    type Error = DbError;

    fn try_from(row: TrainingRow) -> Result<Self, Self::Error> {
        const TABLE: &str = "active_trainings";
        Ok(Self {
            player_id: PlayerId::from(row.player_id),
            target: from_json(TABLE, row.target)?,
            target_level: from_int(TABLE, row.target_level)?,
            started_at: row.started_at,
            ends_at: row.ends_at,
        })
    }
}

/// A row from the `residency_requests` table.
#[derive(Debug, Clone, sqlx::FromRow)]
#[allow(missing_docs)]
pub struct ResidencyRow {
    pub player_id: Uuid,
    pub destination: Uuid,
    pub requested_at: DateTime<Utc>,
    pub approves_at: DateTime<Utc>,
}

impl From<ResidencyRow> for ResidencyRequest {
    fn from(row: ResidencyRow) -> Self {
        Self {
            player_id: PlayerId::from(row.player_id),
            destination: RegionId::from(row.destination),
            requested_at: row.requested_at,
            approves_at: row.approves_at,
        }
    }
}

/// A row from the `active_plantings` table.
#[derive(Debug, Clone, sqlx::FromRow)]
#[allow(missing_docs)]
pub struct PlantingRow {
    pub id: Uuid,
    pub player_id: Uuid,
    pub field_id: Uuid,
    pub quantity: Decimal,
    pub ends_at: DateTime<Utc>,
}

impl From<PlantingRow> for ActivePlanting {
    fn from(row: PlantingRow) -> Self {
        Self {
            id: PlantingId::from(row.id),
            player_id: PlayerId::from(row.player_id),
            field_id: FieldId::from(row.field_id),
            quantity: row.quantity,
            ends_at: row.ends_at,
        }
    }
}

/// A row from the `active_transports` table.
#[derive(Debug, Clone, sqlx::FromRow)]
#[allow(missing_docs)]
pub struct TransportRow {
    pub id: Uuid,
    pub player_id: Uuid,
    pub vehicle_id: Uuid,
    pub warehouse_id: Uuid,
    pub origin: Uuid,
    pub resource: String,
    pub quantity: Decimal,
    pub fare: Decimal,
    pub departs_at: DateTime<Utc>,
    pub arrives_at: DateTime<Utc>,
}

impl TryFrom<TransportRow> for ActiveTransport {
    type Error = DbError;

    fn try_from(row: TransportRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: TransportId::from(row.id),
            player_id: PlayerId::from(row.player_id),
            vehicle_id: VehicleId::from(row.vehicle_id),
            warehouse_id: WarehouseId::from(row.warehouse_id),
            origin: RegionId::from(row.origin),
            resource: from_text("active_transports", &row.resource)?,
            quantity: row.quantity,
            fare: row.fare,
            departs_at: row.departs_at,
            arrives_at: row.arrives_at,
        })
    }
}

/// A row from the `pickups` table.
#[derive(Debug, Clone, sqlx::FromRow)]
#[allow(missing_docs)]
pub struct PickupRow {
    pub player_id: Uuid,
    pub region_id: Uuid,
    pub resource: String,
    pub quantity: Decimal,
    pub expires_at: DateTime<Utc>,
}

impl TryFrom<PickupRow> for Pickup {
    type Error = DbError;

    fn try_from(row: PickupRow) -> Result<Self, Self::Error> {
        Ok(Self {
            player_id: PlayerId::from(row.player_id),
            region_id: RegionId::from(row.region_id),
            resource: from_text("pickups", &row.resource)?,
            quantity: row.quantity,
            expires_at: row.expires_at,
        })
    }
}

// =========================================================================
// Logs
// =========================================================================

/// A row from the `history` table.
#[derive(Debug, Clone, sqlx::FromRow)]
#[allow(missing_docs)]
pub struct HistoryRow {
    pub id: Uuid,
    pub player_id: Uuid,
    pub action: String,
    pub description: String,
    pub money_delta: Decimal,
    pub gold_delta: Decimal,
    pub at: DateTime<Utc>,
}

impl TryFrom<HistoryRow> for HistoryEntry {
    type Error = DbError;

    fn try_from(row: HistoryRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: HistoryEntryId::from(row.id),
            player_id: PlayerId::from(row.player_id),
            action: from_text("history", &row.action)?,
            description: row.description,
            money_delta: row.money_delta,
            gold_delta: row.gold_delta,
            at: row.at,
        })
    }
}

/// A row from the `ledger` table.
#[derive(Debug, Clone, sqlx::FromRow)]
#[allow(missing_docs)]
pub struct LedgerRow {
    pub id: Uuid,
    pub kind: String,
    pub asset: serde_json::Value,
    pub quantity: Decimal,
    pub from_account: serde_json::Value,
    pub to_account: serde_json::Value,
    pub reason: String,
    pub at: DateTime<Utc>,
}

impl TryFrom<LedgerRow> for LedgerEntry {
    type Error = DbError;

    fn try_from(row: LedgerRow) -> Result<Self, Self::Error> {
        const TABLE: &str = "ledger";
        Ok(Self {
            id: LedgerEntryId::from(row.id),
            kind: from_text(TABLE, &row.kind)?,
            asset: from_json(TABLE, row.asset)?,
            quantity: row.quantity,
            from: from_json(TABLE, row.from_account)?,
            to: from_json(TABLE, row.to_account)?,
            reason: row.reason,
            at: row.at,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;
    use rust_decimal_macros::dec;
    use tycoon_types::{Account, Asset, EntryKind, Resource};

    use super::*;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap()
    }

    #[test]
    fn company_without_owner_is_state_owned() {
        let row = CompanyRow {
            id: Uuid::new_v4(),
            name: "Mina Estatal".to_owned(),
            region_id: Uuid::new_v4(),
            owner_id: None,
            product: "gold".to_owned(),
            profit_rate: dec!(0.1),
            cash: Decimal::ZERO,
            rate_changed_at: None,
            created_at: at(),
        };
        let company = Company::try_from(row).unwrap();
        assert!(company.ownership.is_state_owned());
        assert_eq!(company.product, Resource::Gold);
    }

    #[test]
    fn negative_energy_is_rejected() {
        let row = PlayerRow {
            id: Uuid::new_v4(),
            username: "ana".to_owned(),
            money: dec!(100),
            reserved_money: Decimal::ZERO,
            gold: Decimal::ZERO,
            energy: -5,
            level: 1,
            xp: Decimal::ZERO,
            work_xp: Decimal::ZERO,
            education: 0,
            health: 0,
            philanthropy: 0,
            current_region: Uuid::new_v4(),
            residence_region: Uuid::new_v4(),
            last_status_update: at(),
            created_at: at(),
        };
        let err = Player::try_from(row).unwrap_err();
        assert!(matches!(err, DbError::Corrupt { table: "players", .. }));
    }

    #[test]
    fn ledger_row_decodes_tagged_columns() {
        let player = PlayerId::new();
        let row = LedgerRow {
            id: Uuid::new_v4(),
            kind: "ESCROW_LOCK".to_owned(),
            asset: serde_json::to_value(Asset::Money).unwrap(),
            quantity: dec!(12.5),
            from_account: serde_json::to_value(Account::Player(player)).unwrap(),
            to_account: serde_json::to_value(Account::Escrow(player)).unwrap(),
            reason: "sell order".to_owned(),
            at: at(),
        };
        let entry = LedgerEntry::try_from(row).unwrap();
        assert_eq!(entry.kind, EntryKind::EscrowLock);
        assert_eq!(entry.from, Account::Player(player));
        assert_eq!(entry.to, Account::Escrow(player));
    }
}
