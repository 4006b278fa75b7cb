//! Core entity structs for the Tycoon simulation.
//!
//! These are plain data. Invariants (energy range, non-negative wallets,
//! reserve caps) are enforced by the economy crate that mutates them.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{
    Account, Asset, EntryKind, HistoryAction, OrderSide, OrderStatus, Ownership, Resource,
    VehicleType,
};
use crate::ids::{
    CompanyId, FieldId, HistoryEntryId, LedgerEntryId, OrderId, PlayerId, RegionId, VehicleId,
    WarehouseId,
};

// ---------------------------------------------------------------------------
// Player
// ---------------------------------------------------------------------------

/// A registered player and their wallet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Player {
    /// Unique player identifier.
    pub id: PlayerId,
    /// Unique login name.
    pub username: String,
    /// Spendable money, including the part reserved by open buy orders.
    #[ts(as = "String")]
    pub money: Decimal,
    /// Money locked by open buy orders (principal plus pre-computed tax).
    #[ts(as = "String")]
    pub reserved_money: Decimal,
    /// Gold balance.
    #[ts(as = "String")]
    pub gold: Decimal,
    /// Current energy, always within `0..=max_energy`.
    pub energy: u32,
    /// Player level.
    pub level: u32,
    /// General experience.
    #[ts(as = "String")]
    pub xp: Decimal,
    /// Work experience, which drives mining productivity.
    #[ts(as = "String")]
    pub work_xp: Decimal,
    /// Education skill level.
    pub education: u32,
    /// Health skill level.
    pub health: u32,
    /// Philanthropy skill level.
    pub philanthropy: u32,
    /// Region the player is physically in.
    pub current_region: RegionId,
    /// Region the player is registered as a resident of.
    pub residence_region: RegionId,
    /// Reference point for energy regeneration.
    pub last_status_update: DateTime<Utc>,
    /// Registration time.
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Region
// ---------------------------------------------------------------------------

/// A map region with mineral reserves and residency-derived indices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Region {
    /// Unique region identifier.
    pub id: RegionId,
    /// Display name.
    pub name: String,
    /// Latitude in degrees.
    #[ts(as = "String")]
    pub latitude: Decimal,
    /// Longitude in degrees.
    #[ts(as = "String")]
    pub longitude: Decimal,
    /// Remaining gold ore.
    #[ts(as = "String")]
    pub gold_reserve: Decimal,
    /// Gold ore cap restored by replenishment.
    #[ts(as = "String")]
    pub gold_reserve_max: Decimal,
    /// Remaining iron ore.
    #[ts(as = "String")]
    pub iron_reserve: Decimal,
    /// Iron ore cap restored by replenishment.
    #[ts(as = "String")]
    pub iron_reserve_max: Decimal,
    /// Share of global resident education, 0 to 1.
    #[ts(as = "String")]
    pub education_index: Decimal,
    /// Share of global resident health, 0 to 1.
    #[ts(as = "String")]
    pub health_index: Decimal,
    /// Share of global resident philanthropy, 0 to 1.
    #[ts(as = "String")]
    pub philanthropy_index: Decimal,
    /// Development index, 1 to 10.
    #[ts(as = "String")]
    pub development_index: Decimal,
    /// Nominal tax rate derived from development.
    #[ts(as = "String")]
    pub tax_rate: Decimal,
}

// ---------------------------------------------------------------------------
// Company
// ---------------------------------------------------------------------------

/// A mining company located in one region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Company {
    /// Unique company identifier.
    pub id: CompanyId,
    /// Display name.
    pub name: String,
    /// Region the company operates in.
    pub region_id: RegionId,
    /// State-owned or private with an owner.
    pub ownership: Ownership,
    /// What the company extracts.
    pub product: Resource,
    /// Share of each mining yield kept as profit, 0.01 to 0.99.
    #[ts(as = "String")]
    pub profit_rate: Decimal,
    /// Company cash (state-owned profit and collected tax).
    #[ts(as = "String")]
    pub cash: Decimal,
    /// Last time the profit rate was changed.
    pub rate_changed_at: Option<DateTime<Utc>>,
    /// Foundation time.
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Warehouse and fleet
// ---------------------------------------------------------------------------

/// On-hand and escrowed quantity of one resource in a warehouse.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct StockEntry {
    /// Quantity physically stored.
    #[ts(as = "String")]
    pub quantity: Decimal,
    /// Quantity locked by open sell orders.
    #[ts(as = "String")]
    pub reserved: Decimal,
}

/// A player's warehouse. Exactly one per player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Warehouse {
    /// Unique warehouse identifier.
    pub id: WarehouseId,
    /// Owning player.
    pub player_id: PlayerId,
    /// Region the warehouse stands in.
    pub region_id: RegionId,
    /// Capacity track level.
    pub capacity_level: u32,
    /// Fleet track level.
    pub fleet_level: u32,
    /// Specialization track level.
    pub specialization_level: u32,
    /// Stock per resource.
    pub stock: BTreeMap<Resource, StockEntry>,
}

/// A vehicle belonging to a warehouse fleet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Vehicle {
    /// Unique vehicle identifier.
    pub id: VehicleId,
    /// Warehouse the vehicle is attached to.
    pub warehouse_id: WarehouseId,
    /// Catalog model.
    pub vehicle_type: VehicleType,
    /// Load capacity in tons.
    #[ts(as = "String")]
    pub capacity: Decimal,
    /// Speed multiplier (1.0 = base speed).
    #[ts(as = "String")]
    pub speed: Decimal,
    /// Operating cost per ton per kilometre.
    #[ts(as = "String")]
    pub cost_per_ton_km: Decimal,
    /// Days after purchase before the vehicle is scrapped.
    pub validity_days: u32,
    /// Purchase time.
    pub purchased_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Farming
// ---------------------------------------------------------------------------

/// A player-owned farm field other players may plant on for a fee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Field {
    /// Unique field identifier.
    pub id: FieldId,
    /// Display name.
    pub name: String,
    /// Owning player.
    pub owner: PlayerId,
    /// Region the field is in.
    pub region_id: RegionId,
    /// Owner's cut of harvests planted by others.
    #[ts(as = "String")]
    pub profit_rate: Decimal,
    /// Plantings left before the field must rest.
    pub uses_remaining: u32,
    /// End of the current rest period, if resting.
    pub rest_until: Option<DateTime<Utc>>,
}

// ---------------------------------------------------------------------------
// Market
// ---------------------------------------------------------------------------

/// An escrow-backed limit order on the player market.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct MarketOrder {
    /// Unique order identifier.
    pub id: OrderId,
    /// Player who placed the order.
    pub creator: PlayerId,
    /// Tax jurisdiction and delivery point snapshot at creation.
    pub region_id: RegionId,
    /// Buy or sell.
    pub side: OrderSide,
    /// Traded resource.
    pub resource: Resource,
    /// Original quantity.
    #[ts(as = "String")]
    pub quantity: Decimal,
    /// Unfilled quantity, within `0..=quantity`.
    #[ts(as = "String")]
    pub remaining: Decimal,
    /// Unit price.
    #[ts(as = "String")]
    pub price: Decimal,
    /// Creator's effective tax rate when the order was placed. Escrow and
    /// tax for every fill are computed from it.
    #[ts(as = "String")]
    pub tax_rate: Decimal,
    /// Lifecycle status.
    pub status: OrderStatus,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Time after which the tick processor expires the order.
    pub expires_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// History and journal
// ---------------------------------------------------------------------------

/// An immutable record of something that happened to a player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct HistoryEntry {
    /// Unique entry identifier.
    pub id: HistoryEntryId,
    /// Player the entry belongs to.
    pub player_id: PlayerId,
    /// Category.
    pub action: HistoryAction,
    /// Human-readable description.
    pub description: String,
    /// Net change to the player's money.
    #[ts(as = "String")]
    pub money_delta: Decimal,
    /// Net change to the player's gold.
    #[ts(as = "String")]
    pub gold_delta: Decimal,
    /// When it happened.
    pub at: DateTime<Utc>,
}

/// A double-entry journal record of one balance movement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct LedgerEntry {
    /// Unique entry identifier.
    pub id: LedgerEntryId,
    /// Category.
    pub kind: EntryKind,
    /// What moved.
    pub asset: Asset,
    /// Quantity moved, strictly positive.
    #[ts(as = "String")]
    pub quantity: Decimal,
    /// Debited account.
    pub from: Account,
    /// Credited account.
    pub to: Account,
    /// Short reason code.
    pub reason: String,
    /// When it was recorded.
    pub at: DateTime<Utc>,
}
