//! External data gateway
//!
//! The four upstream calls a session depends on. Context fetches never fail:
//! each one swallows its own errors and hands back `None` or a placeholder, so
//! one broken service cannot take the others down with it. Only the
//! recommendation call reports errors, because the caller has to tell the user.

pub mod http;

use crate::air::AirQualitySample;
use crate::coord::GeoCoordinate;
use crate::error::{Error, Result};
use crate::recommend::Recommendation;
use crate::weather::WeatherSnapshot;
use serde::{Deserialize, Serialize};
use std::future::Future;

pub use http::HttpGateway;

/// Upstream services used by a session
pub trait Gateway: Send + Sync {
    /// Weather at `at`, or `None` when unavailable
    fn fetch_weather(
        &self,
        at: GeoCoordinate,
    ) -> impl Future<Output = Option<WeatherSnapshot>> + Send;

    /// Air quality near `at`, or `None` when unavailable
    fn fetch_air_quality(
        &self,
        at: GeoCoordinate,
    ) -> impl Future<Output = Option<AirQualitySample>> + Send;

    /// Address of `at`, or the unknown-location placeholder
    fn fetch_address(&self, at: GeoCoordinate) -> impl Future<Output = String> + Send;

    /// Ask the backend for a recommendation
    fn request_recommendation(
        &self,
        prompt: &str,
    ) -> impl Future<Output = Result<Recommendation>> + Send;
}

/// Where weather and address lookups go
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GatewayMode {
    /// Call KMA and Nominatim directly with local keys
    #[default]
    Direct,
    /// Go through the development backend, which holds the keys
    Proxy,
}

impl std::fmt::Display for GatewayMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Direct => write!(f, "direct"),
            Self::Proxy => write!(f, "proxy"),
        }
    }
}

impl std::str::FromStr for GatewayMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "direct" => Ok(Self::Direct),
            "proxy" | "proxied" => Ok(Self::Proxy),
            _ => Err(Error::Config(format!("Unknown gateway mode: {}", s))),
        }
    }
}
