//! Geographic coordinate in decimal degrees.

use crate::PresenceError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A (latitude, longitude) pair in decimal degrees.
///
/// Construction does not validate: coordinates arrive from untrusted clients and the
/// scorers decide how to report a malformed pair. Call [`Coordinate::validate`] before
/// relying on the range.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub const LATITUDE_RANGE: (f64, f64) = (-90.0, 90.0);
    pub const LONGITUDE_RANGE: (f64, f64) = (-180.0, 180.0);

    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Whether both components are finite and inside their ranges.
    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// Check that both components are finite and inside their ranges.
    pub fn validate(&self) -> Result<(), PresenceError> {
        let (lat_min, lat_max) = Self::LATITUDE_RANGE;
        let (lon_min, lon_max) = Self::LONGITUDE_RANGE;

        if !self.latitude.is_finite() || !(lat_min..=lat_max).contains(&self.latitude) {
            return Err(PresenceError::InvalidCoordinate(format!(
                "latitude {} outside [{lat_min}, {lat_max}]",
                self.latitude
            )));
        }
        if !self.longitude.is_finite() || !(lon_min..=lon_max).contains(&self.longitude) {
            return Err(PresenceError::InvalidCoordinate(format!(
                "longitude {} outside [{lon_min}, {lon_max}]",
                self.longitude
            )));
        }
        Ok(())
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.latitude, self.longitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_range_boundaries() {
        assert!(Coordinate::new(90.0, 180.0).is_valid());
        assert!(Coordinate::new(-90.0, -180.0).is_valid());
        assert!(Coordinate::new(19.0760, 72.8777).is_valid());
    }

    #[test]
    fn rejects_out_of_range_latitude() {
        let err = Coordinate::new(90.5, 0.0).validate().unwrap_err();
        assert!(matches!(err, PresenceError::InvalidCoordinate(_)));
        assert!(err.to_string().contains("latitude"));
    }

    #[test]
    fn rejects_out_of_range_longitude() {
        let err = Coordinate::new(0.0, -180.01).validate().unwrap_err();
        assert!(err.to_string().contains("longitude"));
    }

    #[test]
    fn rejects_non_finite_components() {
        assert!(!Coordinate::new(f64::NAN, 0.0).is_valid());
        assert!(!Coordinate::new(0.0, f64::INFINITY).is_valid());
    }

    #[test]
    fn deserializes_from_named_fields() {
        let c: Coordinate =
            serde_json::from_str(r#"{"latitude": 41.26194, "longitude": -95.86083}"#).unwrap();
        assert_eq!(c, Coordinate::new(41.26194, -95.86083));
    }
}
