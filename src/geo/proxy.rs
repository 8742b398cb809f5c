//! Reverse geocoding through the development backend
//!
//! The backend answers `GET /api/reverse-geocode?lat=..&lon=..` with either
//! `{"address": "..."}` or `{"error": "..."}`.

use crate::coord::GeoCoordinate;
use crate::error::{Error, Result};
use crate::geo::ReverseGeocoder;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Reverse geocoding proxy response
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProxyAddressResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Reverse geocoder backed by the development backend
#[derive(Debug, Clone)]
pub struct ProxyGeocoder {
    client: reqwest::Client,
    url: String,
}

impl ProxyGeocoder {
    /// `url` is the full reverse geocoding endpoint
    pub fn new(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

impl ReverseGeocoder for ProxyGeocoder {
    async fn reverse_geocode(&self, coord: GeoCoordinate) -> Result<Option<String>> {
        let url = format!("{}?lat={}&lon={}", self.url, coord.latitude, coord.longitude);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::Transport(format!("Reverse geocode proxy request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::Transport(format!(
                "Reverse geocode proxy returned status: {}",
                response.status()
            )));
        }

        let body: ProxyAddressResponse = response.json().await.map_err(|e| {
            Error::UpstreamDataMissing(format!("Failed to parse reverse geocode response: {}", e))
        })?;

        if let Some(error) = &body.error {
            debug!(%error, "reverse geocode proxy reported an error");
        }
        Ok(body.address.filter(|a| !a.trim().is_empty()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_shapes() {
        let ok: ProxyAddressResponse =
            serde_json::from_str(r#"{"address": "Seoul Jung-gu"}"#).unwrap();
        assert_eq!(ok.address.as_deref(), Some("Seoul Jung-gu"));
        assert!(ok.error.is_none());

        let err: ProxyAddressResponse =
            serde_json::from_str(r#"{"error": "not found"}"#).unwrap();
        assert!(err.address.is_none());
        assert_eq!(err.error.as_deref(), Some("not found"));
    }

    #[test]
    fn test_serialization_skips_empty() {
        let body = ProxyAddressResponse {
            address: Some("Busan".to_string()),
            error: None,
        };
        assert_eq!(serde_json::to_string(&body).unwrap(), r#"{"address":"Busan"}"#);
    }
}
