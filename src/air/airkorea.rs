//! AirKorea air quality source
//!
//! Two calls: find the monitoring station nearest to a TM coordinate, then read
//! that station's latest measurement. A failed station lookup stops the chain.

use crate::air::{parse_leading_int, AirQualitySample};
use crate::coord::{GeoCoordinate, TmCoordinate};
use crate::error::{Error, Result};
use serde::Deserialize;
use tracing::debug;

#[derive(Debug, Deserialize)]
struct AirKoreaEnvelope<T> {
    response: Option<AirKoreaResponse<T>>,
}

#[derive(Debug, Deserialize)]
struct AirKoreaResponse<T> {
    header: Option<AirKoreaHeader>,
    body: Option<AirKoreaBody<T>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AirKoreaHeader {
    result_msg: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AirKoreaBody<T> {
    #[serde(default = "Vec::new")]
    items: Vec<T>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StationItem {
    station_name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReadingItem {
    pm10_value: Option<String>,
    pm25_value: Option<String>,
}

impl<T> AirKoreaEnvelope<T> {
    /// First item of the body, or a message explaining why there is none
    fn first_item(self) -> std::result::Result<T, String> {
        let response = self.response.ok_or_else(|| "empty response".to_string())?;
        let message = response
            .header
            .and_then(|h| h.result_msg)
            .unwrap_or_else(|| "no items".to_string());

        response
            .body
            .and_then(|b| b.items.into_iter().next())
            .ok_or(message)
    }
}

fn parse_reading(raw: Option<&str>) -> Option<f64> {
    let raw = raw?.trim();
    raw.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .or_else(|| parse_leading_int(raw).map(|v| v as f64))
}

/// Client for the AirKorea station and measurement services
#[derive(Debug, Clone)]
pub struct AirKoreaSource {
    client: reqwest::Client,
    station_url: String,
    reading_url: String,
    service_key: String,
}

impl AirKoreaSource {
    pub fn new(
        client: reqwest::Client,
        station_url: impl Into<String>,
        reading_url: impl Into<String>,
        service_key: impl Into<String>,
    ) -> Self {
        Self {
            client,
            station_url: station_url.into(),
            reading_url: reading_url.into(),
            service_key: service_key.into(),
        }
    }

    fn station_query_url(&self, tm: TmCoordinate) -> String {
        format!(
            "{}?serviceKey={}&returnType=json&tmX={}&tmY={}",
            self.station_url,
            urlencoding::encode(&self.service_key),
            tm.x,
            tm.y
        )
    }

    fn reading_query_url(&self, station: &str) -> String {
        format!(
            "{}?serviceKey={}&returnType=json&numOfRows=1&pageNo=1&stationName={}&dataTerm=DAILY&ver=1.0",
            self.reading_url,
            urlencoding::encode(&self.service_key),
            urlencoding::encode(station)
        )
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str, what: &str) -> Result<T> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::Transport(format!("AirKorea {} request failed: {}", what, e)))?;

        if !response.status().is_success() {
            return Err(Error::Transport(format!(
                "AirKorea {} returned status: {}",
                what,
                response.status()
            )));
        }

        response.json().await.map_err(|e| {
            Error::UpstreamDataMissing(format!("Failed to parse AirKorea {} response: {}", what, e))
        })
    }

    /// Name of the station nearest to `tm`
    pub async fn nearest_station(&self, tm: TmCoordinate) -> Result<String> {
        let envelope: AirKoreaEnvelope<StationItem> =
            self.get_json(&self.station_query_url(tm), "station").await?;

        envelope
            .first_item()
            .map_err(|msg| Error::UpstreamDataMissing(format!("No nearby station: {}", msg)))?
            .station_name
            .filter(|name| !name.trim().is_empty())
            .ok_or_else(|| Error::UpstreamDataMissing("Station has no name".to_string()))
    }

    /// Latest reading for `station`
    pub async fn latest_reading(&self, station: &str) -> Result<AirQualitySample> {
        let envelope: AirKoreaEnvelope<ReadingItem> =
            self.get_json(&self.reading_query_url(station), "reading").await?;

        let item = envelope.first_item().map_err(|msg| {
            Error::UpstreamDataMissing(format!("No reading for {}: {}", station, msg))
        })?;

        Ok(AirQualitySample {
            station: station.to_string(),
            pm10: parse_reading(item.pm10_value.as_deref()),
            pm25: parse_reading(item.pm25_value.as_deref()),
        })
    }

    /// Resolve the nearest station to `coord` and read its latest measurement
    pub async fn fetch(&self, coord: GeoCoordinate) -> Result<AirQualitySample> {
        let tm = coord.tm()?;
        let station = self.nearest_station(tm).await?;
        debug!(%tm, %station, "resolved nearest air quality station");
        self.latest_reading(&station).await
    }
}
