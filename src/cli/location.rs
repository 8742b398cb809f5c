//! Shared location arguments
//!
//! A location is given as `--lat/--lon`, a place name to geocode, or `--here`
//! for IP geolocation.

use crate::config::Config;
use crate::coord::GeoCoordinate;
use crate::error::{Error, Result};
use crate::gateway::HttpGateway;
use crate::geo::get_ip_locator;
use crate::geo::nominatim::NominatimBackend;
use clap::Args;

#[derive(Args, Debug, Clone)]
pub struct LocationArgs {
    /// Latitude
    #[arg(long, requires = "lon", allow_negative_numbers = true)]
    pub lat: Option<f64>,

    /// Longitude
    #[arg(long, requires = "lat", allow_negative_numbers = true)]
    pub lon: Option<f64>,

    /// Named location (geocoded)
    #[arg(long, conflicts_with_all = ["lat", "lon", "here"])]
    pub location: Option<String>,

    /// Use current location (IP geolocation)
    #[arg(long, conflicts_with_all = ["lat", "lon", "location"])]
    pub here: bool,
}

impl LocationArgs {
    /// Resolve the arguments to a validated coordinate
    pub async fn resolve(&self, config: &Config) -> Result<GeoCoordinate> {
        if self.here {
            let location = get_ip_locator().locate().await?;
            eprintln!("Using IP location: {}", location.display_name);
            return GeoCoordinate::checked(location.lat, location.lng);
        }

        if let Some(query) = &self.location {
            let geocoder = NominatimBackend::new(
                HttpGateway::http_client(config)?,
                &config.endpoints.nominatim,
            );
            let location = geocoder.search(query).await?.ok_or_else(|| {
                Error::InvalidInput(format!("Could not geocode '{}'", query))
            })?;
            eprintln!("Geocoded to: {}", location.display_name);
            return GeoCoordinate::checked(location.lat, location.lng);
        }

        match (self.lat, self.lon) {
            (Some(lat), Some(lon)) => GeoCoordinate::checked(lat, lon),
            _ => Err(Error::InvalidInput(
                "No location given; use --lat/--lon, --location or --here".to_string(),
            )),
        }
    }
}
