//! Shared type definitions for the Tycoon economic simulation.
//!
//! This crate is the single source of truth for entity, timer and journal
//! types used across the workspace. Types flow to `TypeScript` via `ts-rs`
//! for the browser client.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers for all entity identifiers
//! - [`enums`] -- Closed enumerations (resources, ownership, order side and status, skills)
//! - [`structs`] -- Entity structs (players, regions, companies, warehouses, orders, history)
//! - [`timers`] -- Time-bounded task records and the [`Scheduled`] trait

pub mod enums;
pub mod ids;
pub mod structs;
pub mod timers;

// Re-export all public types at crate root for convenience.
pub use enums::{
    Account, Asset, EntryKind, HistoryAction, OrderSide, OrderStatus, Ownership, Resource, Skill,
    TrainingTarget, VehicleType, WarehouseTrack,
};
pub use ids::{
    CompanyId, FieldId, HistoryEntryId, LedgerEntryId, OrderId, PlantingId, PlayerId, RegionId,
    TransportId, VehicleId, WarehouseId,
};
pub use structs::{
    Company, Field, HistoryEntry, LedgerEntry, MarketOrder, Player, Region, StockEntry, Vehicle,
    Warehouse,
};
pub use timers::{
    ActiveJourney, ActivePlanting, ActiveTraining, ActiveTransport, Pickup, PickupKey,
    ResidencyRequest, Scheduled,
};

#[cfg(test)]
mod tests {
    #[test]
    fn export_bindings() {
        // Calling export_all writes the TypeScript files to `bindings/`
        // relative to the crate root.
        use ts_rs::TS;

        let _ = crate::ids::PlayerId::export_all();
        let _ = crate::ids::RegionId::export_all();
        let _ = crate::ids::OrderId::export_all();

        let _ = crate::enums::Resource::export_all();
        let _ = crate::enums::OrderSide::export_all();
        let _ = crate::enums::OrderStatus::export_all();
        let _ = crate::enums::HistoryAction::export_all();

        let _ = crate::structs::Player::export_all();
        let _ = crate::structs::Region::export_all();
        let _ = crate::structs::Company::export_all();
        let _ = crate::structs::Warehouse::export_all();
        let _ = crate::structs::MarketOrder::export_all();
        let _ = crate::structs::HistoryEntry::export_all();

        let _ = crate::timers::ActiveJourney::export_all();
        let _ = crate::timers::ActiveTraining::export_all();
        let _ = crate::timers::Pickup::export_all();
    }
}
