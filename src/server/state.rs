//! Server shared state
//!
//! Holds configuration and the upstream clients the handlers share.

use crate::config::Config;
use crate::error::Result;
use crate::gateway::HttpGateway;
use crate::geo::nominatim::NominatimBackend;

/// Shared state for the HTTP server
pub struct AppState {
    /// Configuration
    pub config: Config,

    /// HTTP client for upstream calls
    pub client: reqwest::Client,

    /// Reverse geocoder behind `/api/reverse-geocode`
    pub geocoder: NominatimBackend,
}

impl AppState {
    /// Create new application state
    pub fn new(config: Config) -> Result<Self> {
        let client = HttpGateway::http_client(&config)?;
        let geocoder = NominatimBackend::new(client.clone(), &config.endpoints.nominatim);
        Ok(Self {
            config,
            client,
            geocoder,
        })
    }

    /// KMA key held by the server, if any
    pub fn kma_key(&self) -> Option<&str> {
        Some(self.config.api_keys.kma.as_str()).filter(|k| !k.is_empty())
    }
}
