//! Gateway backed by the real upstream services

use crate::air::airkorea::AirKoreaSource;
use crate::air::AirQualitySample;
use crate::config::Config;
use crate::constants::{api, placeholder::UNKNOWN_LOCATION, USER_AGENT};
use crate::coord::GeoCoordinate;
use crate::error::{Error, Result};
use crate::gateway::{Gateway, GatewayMode};
use crate::geo::nominatim::NominatimBackend;
use crate::geo::proxy::ProxyGeocoder;
use crate::geo::{Geocoder, ReverseGeocoder};
use crate::recommend::client::RecommendationClient;
use crate::recommend::Recommendation;
use crate::weather::kma::{kst_now, KmaForecastSource};
use crate::weather::WeatherSnapshot;
use std::time::Duration;
use tracing::{debug, warn};

/// Talks to KMA, AirKorea, a reverse geocoder and the recommendation backend
#[derive(Debug, Clone)]
pub struct HttpGateway {
    weather: KmaForecastSource,
    air: AirKoreaSource,
    geocoder: Geocoder,
    recommender: RecommendationClient,
}

impl HttpGateway {
    pub fn new(
        weather: KmaForecastSource,
        air: AirKoreaSource,
        geocoder: Geocoder,
        recommender: RecommendationClient,
    ) -> Self {
        Self {
            weather,
            air,
            geocoder,
            recommender,
        }
    }

    /// Build the shared HTTP client used by every source
    pub fn http_client(config: &Config) -> Result<reqwest::Client> {
        reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.gateway.timeout_secs.max(1)))
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {}", e)))
    }

    /// Wire up the sources for the configured gateway mode
    ///
    /// In proxy mode weather and address lookups go to the backend, which holds
    /// the KMA key, so no key is sent from here.
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = Self::http_client(config)?;
        let mode = config.gateway_mode()?;

        let (weather, geocoder) = match mode {
            GatewayMode::Direct => (
                KmaForecastSource::new(
                    client.clone(),
                    &config.endpoints.weather,
                    Some(config.api_keys.kma.clone()),
                ),
                Geocoder::Direct(NominatimBackend::new(
                    client.clone(),
                    &config.endpoints.nominatim,
                )),
            ),
            GatewayMode::Proxy => (
                KmaForecastSource::new(
                    client.clone(),
                    config.proxy_endpoint(api::WEATHER_PROXY_PATH),
                    None,
                ),
                Geocoder::Proxy(ProxyGeocoder::new(
                    client.clone(),
                    config.proxy_endpoint(api::REVERSE_GEOCODE_PATH),
                )),
            ),
        };

        if mode == GatewayMode::Direct && config.api_keys.kma.is_empty() {
            warn!("no KMA key configured; weather lookups will likely fail");
        }
        if config.api_keys.airkorea.is_empty() {
            warn!("no AirKorea key configured; air quality lookups will likely fail");
        }

        let air = AirKoreaSource::new(
            client.clone(),
            &config.endpoints.station,
            &config.endpoints.air_quality,
            config.api_keys.airkorea.clone(),
        );
        let recommender = RecommendationClient::new(client, &config.endpoints.recommend);

        debug!(%mode, "gateway configured");
        Ok(Self::new(weather, air, geocoder, recommender))
    }
}

impl Gateway for HttpGateway {
    async fn fetch_weather(&self, at: GeoCoordinate) -> Option<WeatherSnapshot> {
        match self.weather.fetch(at, kst_now()).await {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                warn!(error = %e, coord = %at, "weather unavailable");
                None
            }
        }
    }

    async fn fetch_air_quality(&self, at: GeoCoordinate) -> Option<AirQualitySample> {
        match self.air.fetch(at).await {
            Ok(sample) => Some(sample),
            Err(e) => {
                warn!(error = %e, coord = %at, "air quality unavailable");
                None
            }
        }
    }

    async fn fetch_address(&self, at: GeoCoordinate) -> String {
        match self.geocoder.reverse_geocode(at).await {
            Ok(Some(address)) => address,
            Ok(None) => {
                debug!(coord = %at, "no address for coordinate");
                UNKNOWN_LOCATION.to_string()
            }
            Err(e) => {
                warn!(error = %e, coord = %at, "reverse geocoding failed");
                UNKNOWN_LOCATION.to_string()
            }
        }
    }

    async fn request_recommendation(&self, prompt: &str) -> Result<Recommendation> {
        self.recommender.recommend(prompt).await
    }
}
