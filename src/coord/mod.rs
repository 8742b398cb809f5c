//! Coordinates and grid projections
//!
//! This module handles:
//! - Validated geographic coordinates (WGS84 latitude/longitude)
//! - The KMA forecast grid (Lambert conformal conic)
//! - The Korean central-belt transverse Mercator plane used for air quality stations
//!
//! The two projected systems have separate types so a forecast cell can never be
//! passed where a station coordinate is expected.

pub mod kma_grid;
pub mod tm;

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

pub use kma_grid::{to_weather_grid, WeatherGrid};
pub use tm::{to_tm, TmCoordinate};

/// A geographic coordinate (latitude, longitude)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoCoordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoCoordinate {
    /// Create new coordinates
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Create coordinates, rejecting values outside the valid ranges
    pub fn checked(latitude: f64, longitude: f64) -> Result<Self> {
        let coord = Self::new(latitude, longitude);
        coord.validate()?;
        Ok(coord)
    }

    /// Validate that coordinates are within valid ranges
    ///
    /// Latitude: -90 to 90
    /// Longitude: -180 to 180
    pub fn validate(&self) -> Result<()> {
        if !(-90.0..=90.0).contains(&self.latitude) {
            return Err(Error::InvalidCoordinates(format!(
                "Latitude {} is out of range [-90, 90]",
                self.latitude
            )));
        }
        if !(-180.0..=180.0).contains(&self.longitude) {
            return Err(Error::InvalidCoordinates(format!(
                "Longitude {} is out of range [-180, 180]",
                self.longitude
            )));
        }
        Ok(())
    }

    /// Forecast grid cell containing this coordinate
    pub fn weather_grid(&self) -> WeatherGrid {
        to_weather_grid(self.latitude, self.longitude)
    }

    /// Transverse Mercator position of this coordinate
    pub fn tm(&self) -> Result<TmCoordinate> {
        to_tm(self.latitude, self.longitude)
    }
}

impl std::fmt::Display for GeoCoordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.6}, {:.6}", self.latitude, self.longitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_ok() {
        assert!(GeoCoordinate::new(37.5665, 126.9780).validate().is_ok());
        assert!(GeoCoordinate::new(-90.0, 180.0).validate().is_ok());
    }

    #[test]
    fn test_validate_out_of_range() {
        assert!(GeoCoordinate::new(91.0, 0.0).validate().is_err());
        assert!(GeoCoordinate::new(0.0, -180.5).validate().is_err());
        assert!(GeoCoordinate::new(f64::NAN, 0.0).validate().is_err());
    }

    #[test]
    fn test_checked() {
        assert!(GeoCoordinate::checked(37.0, 127.0).is_ok());
        assert!(matches!(
            GeoCoordinate::checked(100.0, 127.0),
            Err(Error::InvalidCoordinates(_))
        ));
    }

    #[test]
    fn test_serialization() {
        let coord = GeoCoordinate::new(37.5665, 126.978);
        let json = serde_json::to_string(&coord).unwrap();
        assert!(json.contains("\"latitude\":37.5665"));
        let parsed: GeoCoordinate = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, coord);
    }
}
