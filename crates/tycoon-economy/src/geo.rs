//! Great-circle distance between regions.

use rust_decimal::Decimal;
use tycoon_types::Region;

use crate::arith::{from_f64, round2, to_f64};
use crate::error::ActionError;

/// Mean Earth radius in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine distance in kilometres between two coordinates in degrees,
/// rounded to two decimal places.
pub fn haversine_km(
    lat1: Decimal,
    lon1: Decimal,
    lat2: Decimal,
    lon2: Decimal,
) -> Result<Decimal, ActionError> {
    let (lat1, lon1) = (to_f64(lat1)?.to_radians(), to_f64(lon1)?.to_radians());
    let (lat2, lon2) = (to_f64(lat2)?.to_radians(), to_f64(lon2)?.to_radians());
    let half_dlat = (lat2 - lat1) / 2.0;
    let half_dlon = (lon2 - lon1) / 2.0;
    let a = half_dlat.sin().powi(2) + lat1.cos() * lat2.cos() * half_dlon.sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    Ok(round2(from_f64(EARTH_RADIUS_KM * c)?))
}

/// Distance between two regions.
pub fn region_distance_km(from: &Region, to: &Region) -> Result<Decimal, ActionError> {
    haversine_km(from.latitude, from.longitude, to.latitude, to.longitude)
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn same_point_is_zero() {
        let d = haversine_km(dec!(-19.92), dec!(-43.94), dec!(-19.92), dec!(-43.94));
        assert_eq!(d.ok(), Some(Decimal::ZERO));
    }

    #[test]
    fn belo_horizonte_to_uberlandia() {
        let d = haversine_km(dec!(-19.92), dec!(-43.94), dec!(-18.91), dec!(-48.27));
        let d = d.unwrap_or_default();
        assert!(d > dec!(460) && d < dec!(475), "got {d}");
    }

    #[test]
    fn distance_is_symmetric() {
        let a = haversine_km(dec!(-19.92), dec!(-43.94), dec!(-18.85), dec!(-41.95));
        let b = haversine_km(dec!(-18.85), dec!(-41.95), dec!(-19.92), dec!(-43.94));
        assert_eq!(a.ok(), b.ok());
    }
}
