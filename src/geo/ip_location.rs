//! IP-based geolocation
//!
//! Stands in for a browser location permission on the command line: the
//! approximate position of the caller's public IP, cached on disk for an hour.

use crate::config::defaults::APP_DIR_NAME;
use crate::constants::api::IP_API_URL;
use crate::constants::cache::{IP_LOCATION_CACHE_FILE, IP_LOCATION_TTL_SECS};
use crate::constants::placeholder::UNKNOWN_LOCATION;
use crate::error::{Error, Result};
use crate::geo::GeoLocation;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::debug;

/// IP location service with an optional on-disk cache
#[derive(Debug)]
pub struct IpLocator {
    client: reqwest::Client,
    cache_path: Option<PathBuf>,
}

/// ip-api.com response
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IpApiResponse {
    status: String,
    message: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
    city: Option<String>,
    region_name: Option<String>,
    country_code: Option<String>,
}

impl IpApiResponse {
    fn into_location(self) -> Result<GeoLocation> {
        if self.status != "success" {
            return Err(Error::Upstream(format!(
                "IP location lookup failed: {}",
                self.message.unwrap_or(self.status)
            )));
        }

        let (Some(lat), Some(lng)) = (self.lat, self.lon) else {
            return Err(Error::UpstreamDataMissing(
                "IP location response has no coordinates".to_string(),
            ));
        };

        let display_name = [self.city, self.region_name, self.country_code]
            .into_iter()
            .flatten()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(", ");

        Ok(GeoLocation {
            lat,
            lng,
            display_name: if display_name.is_empty() {
                UNKNOWN_LOCATION.to_string()
            } else {
                display_name
            },
        })
    }
}

/// Cached location data
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CachedLocation {
    location: GeoLocation,
    fetched_at: u64,
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

impl IpLocator {
    /// Create a locator caching under the user cache directory
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            cache_path: dirs::cache_dir()
                .map(|p| p.join(APP_DIR_NAME).join(IP_LOCATION_CACHE_FILE)),
        }
    }

    /// Create a locator with a specific cache file
    pub fn with_cache_path(cache_path: PathBuf) -> Self {
        Self {
            client: reqwest::Client::new(),
            cache_path: Some(cache_path),
        }
    }

    /// Create a locator that always asks the service
    pub fn without_cache() -> Self {
        Self {
            client: reqwest::Client::new(),
            cache_path: None,
        }
    }

    /// Approximate location of this machine
    pub async fn locate(&self) -> Result<GeoLocation> {
        if let Some(cached) = self.load_cache(unix_now()) {
            debug!(display_name = %cached.display_name, "using cached IP location");
            return Ok(cached);
        }

        let location = self.fetch_location().await?;
        self.save_cache(&location, unix_now());
        Ok(location)
    }

    async fn fetch_location(&self) -> Result<GeoLocation> {
        let response = self
            .client
            .get(IP_API_URL)
            .send()
            .await
            .map_err(|e| Error::Transport(format!("IP location request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::Transport(format!(
                "IP location API returned status: {}",
                response.status()
            )));
        }

        let data: IpApiResponse = response.json().await.map_err(|e| {
            Error::UpstreamDataMissing(format!("Failed to parse IP location response: {}", e))
        })?;

        data.into_location()
    }

    /// Cached location if it is younger than the TTL at `now`
    fn load_cache(&self, now: u64) -> Option<GeoLocation> {
        let content = fs::read_to_string(self.cache_path.as_ref()?).ok()?;
        let cached: CachedLocation = serde_json::from_str(&content).ok()?;

        (now.saturating_sub(cached.fetched_at) < IP_LOCATION_TTL_SECS).then_some(cached.location)
    }

    /// Best effort; a failed write only costs a lookup next time
    fn save_cache(&self, location: &GeoLocation, now: u64) {
        let Some(cache_path) = &self.cache_path else {
            return;
        };

        if let Some(parent) = cache_path.parent() {
            let _ = fs::create_dir_all(parent);
        }

        let cached = CachedLocation {
            location: location.clone(),
            fetched_at: now,
        };
        if let Ok(content) = serde_json::to_string_pretty(&cached) {
            let _ = fs::write(cache_path, content);
        }
    }

    /// Forget the cached location
    pub fn clear_cache(&self) {
        if let Some(cache_path) = &self.cache_path {
            let _ = fs::remove_file(cache_path);
        }
    }
}

impl Default for IpLocator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn seoul() -> GeoLocation {
        GeoLocation {
            lat: 37.5665,
            lng: 126.978,
            display_name: "Seoul, KR".to_string(),
        }
    }

    #[test]
    fn test_without_cache() {
        let locator = IpLocator::without_cache();
        assert!(locator.cache_path.is_none());
        assert!(locator.load_cache(unix_now()).is_none());
    }

    #[test]
    fn test_cache_roundtrip_and_expiry() {
        let temp_dir = TempDir::new().unwrap();
        let locator = IpLocator::with_cache_path(temp_dir.path().join("nested").join("ip.json"));

        assert!(locator.load_cache(1_000).is_none());

        locator.save_cache(&seoul(), 1_000);
        let loaded = locator.load_cache(1_000 + IP_LOCATION_TTL_SECS - 1).unwrap();
        assert_eq!(loaded.display_name, "Seoul, KR");

        assert!(locator.load_cache(1_000 + IP_LOCATION_TTL_SECS).is_none());

        locator.clear_cache();
        assert!(locator.load_cache(1_000).is_none());
    }

    #[test]
    fn test_response_to_location() {
        let json = r#"{"status": "success", "lat": 37.5, "lon": 127.0,
            "city": "Seoul", "regionName": "Seoul", "countryCode": "KR"}"#;
        let response: IpApiResponse = serde_json::from_str(json).unwrap();
        let location = response.into_location().unwrap();
        assert_eq!(location.display_name, "Seoul, Seoul, KR");
        assert_eq!(location.lng, 127.0);
    }

    #[test]
    fn test_response_failure() {
        let json = r#"{"status": "fail", "message": "private range"}"#;
        let response: IpApiResponse = serde_json::from_str(json).unwrap();
        assert!(matches!(response.into_location(), Err(Error::Upstream(_))));
    }

    #[test]
    fn test_response_without_name() {
        let json = r#"{"status": "success", "lat": 1.0, "lon": 2.0}"#;
        let response: IpApiResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.into_location().unwrap().display_name, UNKNOWN_LOCATION);
    }
}
