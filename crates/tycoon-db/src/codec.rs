//! Column encodings.
//!
//! Flat enums are stored as `TEXT` using their serde names, so the
//! database and the JSON API spell them the same way. Tagged enums
//! (accounts, assets, training targets) go into `JSONB`. Counters that
//! are `u32` in the domain are `INTEGER` columns.

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::DbError;

/// The serde name of a unit-variant enum.
pub fn to_text<T: Serialize>(value: &T) -> Result<String, DbError> {
    match serde_json::to_value(value)? {
        serde_json::Value::String(s) => Ok(s),
        other => Err(DbError::Config(format!(
            "expected a string encoding, got {other}"
        ))),
    }
}

/// Parse a unit-variant enum from its serde name.
pub fn from_text<T: DeserializeOwned>(table: &'static str, text: &str) -> Result<T, DbError> {
    serde_json::from_value(serde_json::Value::String(text.to_owned()))
        .map_err(|e| DbError::corrupt(table, format!("unknown value {text:?}: {e}")))
}

/// Encode any serde value as `JSONB`.
pub fn to_json<T: Serialize>(value: &T) -> Result<serde_json::Value, DbError> {
    Ok(serde_json::to_value(value)?)
}

/// Decode a `JSONB` column.
pub fn from_json<T: DeserializeOwned>(
    table: &'static str,
    value: serde_json::Value,
) -> Result<T, DbError> {
    serde_json::from_value(value).map_err(|e| DbError::corrupt(table, e.to_string()))
}

/// A domain counter as an `INTEGER` column.
pub fn to_int(table: &'static str, value: u32) -> Result<i32, DbError> {
    i32::try_from(value).map_err(|e| DbError::corrupt(table, format!("{value}: {e}")))
}

/// An `INTEGER` column as a domain counter.
pub fn from_int(table: &'static str, value: i32) -> Result<u32, DbError> {
    u32::try_from(value).map_err(|e| DbError::corrupt(table, format!("{value}: {e}")))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use tycoon_types::{
        Account, HistoryAction, OrderSide, OrderStatus, PlayerId, Resource, TrainingTarget,
        VehicleType, WarehouseTrack,
    };

    use super::*;

    #[test]
    fn flat_enums_use_serde_names() {
        assert_eq!(to_text(&Resource::Iron).unwrap(), "iron");
        assert_eq!(to_text(&OrderSide::Buy).unwrap(), "BUY");
        assert_eq!(to_text(&OrderStatus::Active).unwrap(), "ACTIVE");
        assert_eq!(to_text(&VehicleType::LightTruck).unwrap(), "caminhao_3_4");
        assert_eq!(
            to_text(&HistoryAction::MarketSale).unwrap(),
            "MARKET_SALE"
        );
        let parsed: VehicleType = from_text("vehicles", "rodotrem").unwrap();
        assert_eq!(parsed, VehicleType::Rodotrem);
    }

    #[test]
    fn unknown_text_is_corrupt() {
        let parsed: Result<Resource, _> = from_text("pickups", "diamond");
        assert!(matches!(parsed, Err(DbError::Corrupt { table: "pickups", .. })));
    }

    #[test]
    fn tagged_enums_are_not_text() {
        assert!(to_text(&Account::Player(PlayerId::new())).is_err());
        let target = TrainingTarget::Warehouse(WarehouseTrack::Fleet);
        let json = to_json(&target).unwrap();
        let back: TrainingTarget = from_json("active_trainings", json).unwrap();
        assert_eq!(back, target);
    }

    #[test]
    fn negative_counters_are_corrupt() {
        assert_eq!(from_int("players", 7).unwrap(), 7);
        assert!(from_int("players", -1).is_err());
        assert!(to_int("players", u32::MAX).is_err());
    }
}
