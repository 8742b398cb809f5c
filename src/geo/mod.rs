//! Geocoding module
//!
//! Reverse geocoding for the session address, plus forward geocoding and IP
//! geolocation used by the CLI to obtain a starting coordinate.

pub mod ip_location;
pub mod nominatim;
pub mod proxy;

use crate::coord::GeoCoordinate;
use crate::error::Result;
use serde::{Deserialize, Serialize};

/// A geocoded location result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeoLocation {
    /// Latitude
    pub lat: f64,
    /// Longitude
    pub lng: f64,
    /// Display name (address or description)
    pub display_name: String,
}

impl GeoLocation {
    pub fn coordinate(&self) -> GeoCoordinate {
        GeoCoordinate::new(self.lat, self.lng)
    }
}

/// Trait for reverse geocoding backends
pub trait ReverseGeocoder: Send + Sync {
    /// Resolve coordinates to a human-readable address
    ///
    /// `Ok(None)` means the service answered but knows no address there.
    fn reverse_geocode(
        &self,
        coord: GeoCoordinate,
    ) -> impl std::future::Future<Output = Result<Option<String>>> + Send;
}

/// Reverse geocoder selected by the gateway mode
#[derive(Debug, Clone)]
pub enum Geocoder {
    /// Call Nominatim directly
    Direct(nominatim::NominatimBackend),
    /// Go through the development backend
    Proxy(proxy::ProxyGeocoder),
}

impl ReverseGeocoder for Geocoder {
    async fn reverse_geocode(&self, coord: GeoCoordinate) -> Result<Option<String>> {
        match self {
            Self::Direct(backend) => backend.reverse_geocode(coord).await,
            Self::Proxy(backend) => backend.reverse_geocode(coord).await,
        }
    }
}

/// Get the IP location service
pub fn get_ip_locator() -> ip_location::IpLocator {
    ip_location::IpLocator::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geo_location_serialization() {
        let loc = GeoLocation {
            lat: 37.5665,
            lng: 126.978,
            display_name: "Seoul".to_string(),
        };

        let json = serde_json::to_string(&loc).unwrap();
        let parsed: GeoLocation = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.lat, 37.5665);
        assert_eq!(parsed.display_name, "Seoul");
        assert_eq!(parsed.coordinate(), GeoCoordinate::new(37.5665, 126.978));
    }
}
