//! Nominatim geocoding backend (OpenStreetMap)
//!
//! Used directly in "direct" gateway mode and by the development backend's
//! reverse geocoding proxy. Nominatim requires an identifying User-Agent.

use crate::constants::USER_AGENT;
use crate::coord::GeoCoordinate;
use crate::error::{Error, Result};
use crate::geo::{GeoLocation, ReverseGeocoder};
use serde::Deserialize;

/// Nominatim geocoding backend
#[derive(Debug, Clone)]
pub struct NominatimBackend {
    client: reqwest::Client,
    base_url: String,
}

/// Nominatim search response item
#[derive(Debug, Deserialize)]
struct NominatimResult {
    lat: String,
    lon: String,
    display_name: String,
}

/// Nominatim reverse response; `error` is set when nothing is found
#[derive(Debug, Deserialize)]
struct NominatimReverse {
    display_name: Option<String>,
    error: Option<String>,
}

impl NominatimBackend {
    /// Create a backend against `base_url` sharing `client`
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Parse lat/lng strings to f64
    fn parse_coords(lat: &str, lng: &str) -> Result<(f64, f64)> {
        let lat: f64 = lat
            .parse()
            .map_err(|_| Error::UpstreamDataMissing(format!("Invalid latitude: {}", lat)))?;
        let lng: f64 = lng
            .parse()
            .map_err(|_| Error::UpstreamDataMissing(format!("Invalid longitude: {}", lng)))?;
        Ok((lat, lng))
    }

    /// Geocode a place name to its best match
    pub async fn search(&self, query: &str) -> Result<Option<GeoLocation>> {
        let url = format!(
            "{}/search?q={}&format=json&limit=1",
            self.base_url,
            urlencoding::encode(query)
        );

        let response = self
            .client
            .get(&url)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .send()
            .await
            .map_err(|e| Error::Transport(format!("Nominatim request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::Transport(format!(
                "Nominatim returned status: {}",
                response.status()
            )));
        }

        let results: Vec<NominatimResult> = response.json().await.map_err(|e| {
            Error::UpstreamDataMissing(format!("Failed to parse Nominatim response: {}", e))
        })?;

        match results.into_iter().next() {
            Some(result) => {
                let (lat, lng) = Self::parse_coords(&result.lat, &result.lon)?;
                Ok(Some(GeoLocation {
                    lat,
                    lng,
                    display_name: result.display_name,
                }))
            }
            None => Ok(None),
        }
    }
}

impl ReverseGeocoder for NominatimBackend {
    async fn reverse_geocode(&self, coord: GeoCoordinate) -> Result<Option<String>> {
        let url = format!(
            "{}/reverse?lat={}&lon={}&format=json",
            self.base_url, coord.latitude, coord.longitude
        );

        let response = self
            .client
            .get(&url)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .send()
            .await
            .map_err(|e| Error::Transport(format!("Nominatim request failed: {}", e)))?;

        if !response.status().is_success() {
            if response.status() == reqwest::StatusCode::NOT_FOUND {
                return Ok(None);
            }
            return Err(Error::Transport(format!(
                "Nominatim returned status: {}",
                response.status()
            )));
        }

        let result: NominatimReverse = response.json().await.map_err(|e| {
            Error::UpstreamDataMissing(format!("Failed to parse Nominatim response: {}", e))
        })?;

        Ok(address_from(result))
    }
}

fn address_from(result: NominatimReverse) -> Option<String> {
    if result.error.is_some() {
        return None;
    }
    result.display_name.filter(|name| !name.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_coords() {
        let (lat, lng) = NominatimBackend::parse_coords("37.5665", "126.9780").unwrap();
        assert!((lat - 37.5665).abs() < 0.0001);
        assert!((lng - 126.978).abs() < 0.0001);
    }

    #[test]
    fn test_parse_coords_invalid() {
        assert!(NominatimBackend::parse_coords("invalid", "0").is_err());
        assert!(NominatimBackend::parse_coords("0", "invalid").is_err());
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let backend = NominatimBackend::new(reqwest::Client::new(), "https://example.test/");
        assert_eq!(backend.base_url, "https://example.test");
    }

    #[test]
    fn test_reverse_response() {
        let body = r#"{"place_id": 1, "display_name": "Sejong-daero, Jung-gu, Seoul"}"#;
        let found: NominatimReverse = serde_json::from_str(body).unwrap();
        assert_eq!(
            address_from(found).as_deref(),
            Some("Sejong-daero, Jung-gu, Seoul")
        );

        let missing: NominatimReverse =
            serde_json::from_str(r#"{"error": "Unable to geocode"}"#).unwrap();
        assert_eq!(address_from(missing), None);
    }

    #[tokio::test]
    #[ignore = "Requires network access to Nominatim"]
    async fn test_reverse_geocode_live() {
        let backend = NominatimBackend::new(
            reqwest::Client::new(),
            crate::constants::api::NOMINATIM_URL,
        );
        let address = backend
            .reverse_geocode(GeoCoordinate::new(37.5665, 126.978))
            .await
            .unwrap();
        assert!(address.is_some());
    }
}
