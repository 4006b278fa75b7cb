//! Enumeration types for the Tycoon simulation.
//!
//! Every value that the game used to carry as a free-form tag (company
//! type, order side, training kind, history code) is a closed enum here so
//! that handlers match on it exhaustively.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Resources
// ---------------------------------------------------------------------------

/// A tradeable or mineable resource.
///
/// Gold is credited straight to the player's wallet when mined; iron and
/// corn are bulk goods that must be hauled to a warehouse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum Resource {
    /// Gold ore, produced by gold mines.
    Gold,
    /// Iron ore, produced by iron mines and used to build vehicles.
    Iron,
    /// Corn, harvested from farm fields.
    Corn,
}

impl Resource {
    /// All resource variants in a stable order.
    pub const ALL: [Self; 3] = [Self::Gold, Self::Iron, Self::Corn];
}

impl core::fmt::Display for Resource {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            Self::Gold => "gold",
            Self::Iron => "iron",
            Self::Corn => "corn",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// Companies
// ---------------------------------------------------------------------------

/// Who owns a company and therefore who receives its profit share.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(tag = "kind", content = "owner", rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum Ownership {
    /// Public company created by seeding. Profit stays in company cash.
    StateOwned,
    /// Player-founded company. Profit is paid to the owner.
    Private(crate::ids::PlayerId),
}

impl Ownership {
    /// Return the owning player, if the company is private.
    pub const fn owner(&self) -> Option<crate::ids::PlayerId> {
        match self {
            Self::StateOwned => None,
            Self::Private(owner) => Some(*owner),
        }
    }

    /// Whether the company is state-owned.
    pub const fn is_state_owned(&self) -> bool {
        matches!(self, Self::StateOwned)
    }
}

// ---------------------------------------------------------------------------
// Market
// ---------------------------------------------------------------------------

/// Side of a limit order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export, export_to = "bindings/")]
pub enum OrderSide {
    /// Creator escrows goods and asks for money.
    Sell,
    /// Creator escrows money (plus tax) and asks for goods.
    Buy,
}

/// Lifecycle status of a market order.
///
/// The only legal transitions are from [`OrderStatus::Active`] to one of
/// the three terminal states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export, export_to = "bindings/")]
pub enum OrderStatus {
    /// Open and fillable.
    Active,
    /// Fully filled.
    Completed,
    /// Withdrawn by its creator.
    Cancelled,
    /// Swept by the tick processor after its expiry time.
    Expired,
}

impl OrderStatus {
    /// Whether this status is final.
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Active)
    }
}

// ---------------------------------------------------------------------------
// Skills and upgrades
// ---------------------------------------------------------------------------

/// Trainable player skill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum Skill {
    /// Boosts general XP gain and farm yields in the player's region.
    Education,
    /// Discounts energy costs and speeds regional energy regeneration.
    Health,
    /// Discounts taxes and shortens residency waits in the region.
    Philanthropy,
}

impl Skill {
    /// All skills in a stable order.
    pub const ALL: [Self; 3] = [Self::Education, Self::Health, Self::Philanthropy];

    /// Lowercase name for messages.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Education => "education",
            Self::Health => "health",
            Self::Philanthropy => "philanthropy",
        }
    }
}

/// Independently leveled warehouse upgrade track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum WarehouseTrack {
    /// Storage capacity in tons.
    Capacity,
    /// Number of vehicle slots.
    Fleet,
    /// Unlocks heavier vehicle types.
    Specialization,
}

impl WarehouseTrack {
    /// Lowercase name for messages.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Capacity => "capacity",
            Self::Fleet => "fleet",
            Self::Specialization => "specialization",
        }
    }
}

/// What an active training record will raise when it completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(tag = "kind", content = "target", rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum TrainingTarget {
    /// A player skill.
    Skill(Skill),
    /// A warehouse upgrade track.
    Warehouse(WarehouseTrack),
}

// ---------------------------------------------------------------------------
// Vehicles
// ---------------------------------------------------------------------------

/// Purchasable vehicle model. Catalog stats live in the economy config.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum VehicleType {
    /// Light 3/4 truck, the starter vehicle.
    #[serde(rename = "caminhao_3_4")]
    LightTruck,
    /// Two-axle "toco" truck.
    #[serde(rename = "toco")]
    Toco,
    /// Three-axle truck.
    #[serde(rename = "truck")]
    Truck,
    /// Semi-trailer.
    #[serde(rename = "carreta")]
    Carreta,
    /// B-train double trailer.
    #[serde(rename = "bitrem")]
    Bitrem,
    /// Road train.
    #[serde(rename = "rodotrem")]
    Rodotrem,
}

impl VehicleType {
    /// All vehicle types ordered by required specialization level.
    pub const ALL: [Self; 6] = [
        Self::LightTruck,
        Self::Toco,
        Self::Truck,
        Self::Carreta,
        Self::Bitrem,
        Self::Rodotrem,
    ];

    /// Stable catalog code used in configuration and storage.
    pub const fn code(self) -> &'static str {
        match self {
            Self::LightTruck => "caminhao_3_4",
            Self::Toco => "toco",
            Self::Truck => "truck",
            Self::Carreta => "carreta",
            Self::Bitrem => "bitrem",
            Self::Rodotrem => "rodotrem",
        }
    }

    /// Look up a vehicle type by its catalog code.
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.code() == code)
    }
}

// ---------------------------------------------------------------------------
// History
// ---------------------------------------------------------------------------

/// Category of an immutable action history entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export, export_to = "bindings/")]
pub enum HistoryAction {
    /// Player account created.
    Registration,
    /// Gold or iron mined.
    Mining,
    /// Private company founded.
    CompanyPurchase,
    /// Company profit rate changed.
    CompanyRateChanged,
    /// Skill training started.
    Training,
    /// Skill or warehouse training finished.
    TrainingCompleted,
    /// Journey started.
    Travel,
    /// Journey finished.
    TravelCompleted,
    /// Residency change requested.
    ResidencyRequest,
    /// Residency request withdrawn.
    ResidencyCancel,
    /// Residency change approved.
    ResidencyApproved,
    /// Freight charged for a transport dispatch.
    FreightCharged,
    /// Transport delivered goods to a warehouse.
    TransportCompleted,
    /// Vehicle bought.
    VehiclePurchase,
    /// Vehicle removed after its validity period.
    VehicleExpired,
    /// Warehouse upgrade started.
    WarehouseUpgrade,
    /// Market order created.
    MarketOrderCreated,
    /// Goods sold through the market.
    MarketSale,
    /// Goods bought through the market.
    MarketPurchase,
    /// Market order cancelled by its creator.
    MarketOrderCancelled,
    /// Market order expired.
    MarketOrderExpired,
    /// Farm field opened.
    FieldCreated,
    /// Crop planted.
    Planting,
    /// Crop harvested by the planter.
    Harvest,
    /// Field owner's cut of a harvest.
    HarvestFee,
}

// ---------------------------------------------------------------------------
// Journal
// ---------------------------------------------------------------------------

/// What is being moved by a journal entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(tag = "kind", content = "resource", rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum Asset {
    /// Money balance.
    Money,
    /// Gold balance held in a player's wallet.
    Gold,
    /// Bulk goods held in a warehouse stock or pickup record.
    Goods(Resource),
}

/// Category of a journal entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export, export_to = "bindings/")]
pub enum EntryKind {
    /// Value created from the world (mining output, harvest).
    Yield,
    /// Regional tax withheld.
    Tax,
    /// Company profit share.
    Profit,
    /// Price paid for a purchase (company, vehicle, training, upgrade, seed).
    Purchase,
    /// Travel fare.
    Fare,
    /// Freight fare.
    Freight,
    /// Money or goods moved into escrow.
    EscrowLock,
    /// Money or goods released from escrow back to the owner.
    EscrowRelease,
    /// Settlement of a market fill.
    Settlement,
    /// Goods delivered into a warehouse.
    Delivery,
    /// Goods or value destroyed (expired pickups, expired vehicles).
    Decay,
}

/// A balance-holding account in the journal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum Account {
    /// External source and sink of value.
    World,
    /// A player's spendable wallet.
    Player(crate::ids::PlayerId),
    /// Money or goods a player has locked in open orders.
    Escrow(crate::ids::PlayerId),
    /// A company's cash.
    Company(crate::ids::CompanyId),
    /// A warehouse's goods.
    Warehouse(crate::ids::WarehouseId),
    /// Goods waiting for pickup, owned by a player.
    Pickup(crate::ids::PlayerId),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_statuses() {
        assert!(!OrderStatus::Active.is_terminal());
        assert!(OrderStatus::Completed.is_terminal());
        assert!(OrderStatus::Cancelled.is_terminal());
        assert!(OrderStatus::Expired.is_terminal());
    }

    #[test]
    fn vehicle_codes_round_trip() {
        for vehicle in VehicleType::ALL {
            assert_eq!(VehicleType::from_code(vehicle.code()), Some(vehicle));
        }
        assert_eq!(VehicleType::from_code("hovercraft"), None);
    }

    #[test]
    fn vehicle_type_serializes_as_catalog_code() {
        let json = serde_json::to_string(&VehicleType::LightTruck).unwrap_or_default();
        assert_eq!(json, "\"caminhao_3_4\"");
    }

    #[test]
    fn order_side_uses_uppercase_tags() {
        let json = serde_json::to_string(&OrderSide::Sell).unwrap_or_default();
        assert_eq!(json, "\"SELL\"");
    }

    #[test]
    fn ownership_owner() {
        let owner = crate::ids::PlayerId::new();
        assert_eq!(Ownership::Private(owner).owner(), Some(owner));
        assert!(Ownership::StateOwned.is_state_owned());
        assert_eq!(Ownership::StateOwned.owner(), None);
    }
}
