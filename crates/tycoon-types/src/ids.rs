//! Type-safe identifier wrappers around [`Uuid`].
//!
//! Every entity in the game has a strongly-typed ID so a player id can
//! never be passed where a region id is expected. All IDs use UUID v7
//! (time-ordered) so database indexes stay append-friendly.

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

/// Generates a newtype wrapper around [`Uuid`] with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
        #[ts(export, export_to = "bindings/")]
        pub struct $name(pub Uuid);

        impl $name {
            /// Create a new identifier using UUID v7 (time-ordered).
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Return the inner [`Uuid`] value.
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id! {
    /// Unique identifier for a registered player.
    PlayerId
}

define_id! {
    /// Unique identifier for a map region.
    RegionId
}

define_id! {
    /// Unique identifier for a company (state-owned or private).
    CompanyId
}

define_id! {
    /// Unique identifier for a player's warehouse.
    WarehouseId
}

define_id! {
    /// Unique identifier for a vehicle in a warehouse fleet.
    VehicleId
}

define_id! {
    /// Unique identifier for a farm field.
    FieldId
}

define_id! {
    /// Unique identifier for a market order.
    OrderId
}

define_id! {
    /// Unique identifier for a crop planting in progress.
    PlantingId
}

define_id! {
    /// Unique identifier for a single transport trip.
    TransportId
}

define_id! {
    /// Unique identifier for an action history entry.
    HistoryEntryId
}

define_id! {
    /// Unique identifier for a journal entry (balance movement record).
    LedgerEntryId
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_distinct_types() {
        let player = PlayerId::new();
        let region = RegionId::new();
        assert_ne!(player.into_inner(), Uuid::nil());
        assert_ne!(region.into_inner(), Uuid::nil());
    }

    #[test]
    fn ids_are_time_ordered() {
        let first = OrderId::new();
        let second = OrderId::new();
        assert!(first <= second);
    }

    #[test]
    fn id_display_matches_uuid() {
        let uuid = Uuid::now_v7();
        let id = PlayerId::from(uuid);
        assert_eq!(id.to_string(), uuid.to_string());
        assert_eq!(Uuid::from(id), uuid);
    }

    #[test]
    fn id_serializes_as_bare_uuid() {
        let id = CompanyId::new();
        let json = serde_json::to_string(&id).unwrap_or_default();
        assert_eq!(json, format!("\"{}\"", id.into_inner()));
    }
}
