//! KMA short-range forecast source
//!
//! Queries the village forecast service for the grid cell around a coordinate and
//! folds the category rows of one forecast slot into a [`WeatherSnapshot`].
//!
//! Forecasts are issued eight times a day (02, 05, ... 23 KST). We always ask for
//! the latest issue at or before the current hour, then pick the row matching the
//! current hour. If that exact row is missing we take the nearest slot instead.

use crate::coord::{GeoCoordinate, WeatherGrid};
use crate::error::{Error, Result};
use crate::weather::{ForecastSlot, PrecipitationCode, SkyCode, WeatherSnapshot};
use chrono::{Duration, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Utc};
use serde::Deserialize;
use tracing::debug;

/// Hours at which forecasts are issued (KST)
const ISSUE_HOURS: [u32; 8] = [2, 5, 8, 11, 14, 17, 20, 23];

/// Rows requested per query; one issue covers well over a day of slots
const ROWS_PER_PAGE: u32 = 200;

/// Korea Standard Time offset
const KST_OFFSET_SECS: i32 = 9 * 3600;

/// Response envelope shared by data.go.kr services
#[derive(Debug, Deserialize)]
struct KmaEnvelope {
    response: Option<KmaResponse>,
}

#[derive(Debug, Deserialize)]
struct KmaResponse {
    header: KmaHeader,
    body: Option<KmaBody>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct KmaHeader {
    result_code: String,
    result_msg: Option<String>,
}

#[derive(Debug, Deserialize)]
struct KmaBody {
    items: Option<KmaItems>,
}

#[derive(Debug, Deserialize)]
struct KmaItems {
    #[serde(default)]
    item: Vec<KmaItem>,
}

/// One category value for one forecast slot
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KmaItem {
    pub category: String,
    pub fcst_date: String,
    pub fcst_time: String,
    pub fcst_value: String,
}

impl KmaItem {
    fn slot(&self) -> Option<ForecastSlot> {
        Some(ForecastSlot {
            date: self.fcst_date.trim().parse().ok()?,
            time: self.fcst_time.trim().parse().ok()?,
        })
    }
}

/// Current wall clock time in KST
pub fn kst_now() -> NaiveDateTime {
    let now = Utc::now();
    FixedOffset::east_opt(KST_OFFSET_SECS)
        .map_or_else(|| now.naive_utc(), |kst| now.with_timezone(&kst).naive_local())
}

/// Latest forecast issue (date, hour) at or before `now`
///
/// Before 02:00 the previous day's 23:00 issue is used.
pub fn issue_time(now: NaiveDateTime) -> (NaiveDate, u32) {
    let hour = now.hour();
    match ISSUE_HOURS.iter().rev().find(|&&h| h <= hour) {
        Some(&h) => (now.date(), h),
        None => ((now - Duration::days(1)).date(), 23),
    }
}

/// The forecast slot covering `now` (its date and top of the hour)
pub fn target_slot(now: NaiveDateTime) -> ForecastSlot {
    ForecastSlot {
        date: date_key(now.date()),
        time: now.hour() * 100,
    }
}

fn date_key(date: NaiveDate) -> u32 {
    // YYYYMMDD always fits
    date.format("%Y%m%d").to_string().parse().unwrap_or(0)
}

fn slot_datetime(slot: ForecastSlot) -> Option<NaiveDateTime> {
    let date = NaiveDate::from_ymd_opt(
        (slot.date / 10_000) as i32,
        (slot.date / 100) % 100,
        slot.date % 100,
    )?;
    let time = NaiveTime::from_hms_opt(slot.time / 100, slot.time % 100, 0)?;
    Some(date.and_time(time))
}

/// Pick the slot to report: the exact target if present, otherwise the nearest
pub fn select_slot(items: &[KmaItem], target: ForecastSlot) -> Option<ForecastSlot> {
    let slots: Vec<ForecastSlot> = items.iter().filter_map(KmaItem::slot).collect();

    if slots.contains(&target) {
        return Some(target);
    }

    let target_at = slot_datetime(target)?;
    slots
        .into_iter()
        .filter_map(|s| slot_datetime(s).map(|at| (s, (at - target_at).num_minutes().abs())))
        .min_by_key(|&(s, distance)| (distance, s.date, s.time))
        .map(|(s, _)| s)
}

fn parse_number(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

fn parse_code(value: &str) -> Option<i64> {
    parse_number(value).map(|v| v as i64)
}

/// Fold the rows of one slot into a snapshot
///
/// Fails with [`Error::UpstreamDataMissing`] when the slot has no rows or no
/// temperature.
pub fn aggregate(items: &[KmaItem], slot: ForecastSlot) -> Result<WeatherSnapshot> {
    let mut temperature = None;
    let mut sky = None;
    let mut precipitation = None;
    let mut wind_speed = None;
    let mut humidity = None;
    let mut matched = 0usize;

    for item in items.iter().filter(|i| i.slot() == Some(slot)) {
        matched += 1;
        match item.category.as_str() {
            "TMP" => temperature = parse_number(&item.fcst_value),
            "SKY" => sky = parse_code(&item.fcst_value).map(SkyCode::from_code),
            "PTY" => precipitation = parse_code(&item.fcst_value).map(PrecipitationCode::from_code),
            "WSD" => wind_speed = parse_number(&item.fcst_value),
            "REH" => humidity = parse_number(&item.fcst_value),
            _ => {}
        }
    }

    if matched == 0 {
        return Err(Error::UpstreamDataMissing(format!(
            "No forecast rows for {} {:04}",
            slot.date, slot.time
        )));
    }

    let temperature = temperature.ok_or_else(|| {
        Error::UpstreamDataMissing("Forecast slot has no temperature".to_string())
    })?;

    Ok(WeatherSnapshot::new(
        temperature,
        sky,
        precipitation,
        wind_speed,
        humidity,
        slot,
    ))
}

/// Client for the KMA forecast service (or a proxy speaking the same format)
#[derive(Debug, Clone)]
pub struct KmaForecastSource {
    client: reqwest::Client,
    url: String,
    service_key: Option<String>,
}

impl KmaForecastSource {
    /// Create a source hitting `url`
    ///
    /// When `service_key` is `None` the key is left off the query, which is what a
    /// backend proxy holding its own key expects.
    pub fn new(
        client: reqwest::Client,
        url: impl Into<String>,
        service_key: Option<String>,
    ) -> Self {
        Self {
            client,
            url: url.into(),
            service_key: service_key.filter(|k| !k.is_empty()),
        }
    }

    fn request_url(&self, grid: WeatherGrid, issue: (NaiveDate, u32)) -> String {
        let mut url = format!(
            "{}?pageNo=1&numOfRows={}&dataType=JSON&base_date={}&base_time={:02}00&nx={}&ny={}",
            self.url,
            ROWS_PER_PAGE,
            issue.0.format("%Y%m%d"),
            issue.1,
            grid.nx,
            grid.ny
        );
        if let Some(key) = &self.service_key {
            url.push_str(&format!("&serviceKey={}", urlencoding::encode(key)));
        }
        url
    }

    /// Fetch the weather snapshot for `coord` as of `now` (KST)
    pub async fn fetch(&self, coord: GeoCoordinate, now: NaiveDateTime) -> Result<WeatherSnapshot> {
        let grid = coord.weather_grid();
        let issue = issue_time(now);
        debug!(%grid, base_date = %issue.0, base_hour = issue.1, "requesting KMA forecast");

        let response = self
            .client
            .get(self.request_url(grid, issue))
            .send()
            .await
            .map_err(|e| Error::Transport(format!("KMA request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::Transport(format!(
                "KMA returned status: {}",
                response.status()
            )));
        }

        let envelope: KmaEnvelope = response.json().await.map_err(|e| {
            Error::UpstreamDataMissing(format!("Failed to parse KMA response: {}", e))
        })?;

        let items = parse_items(envelope)?;
        let slot = select_slot(&items, target_slot(now)).ok_or_else(|| {
            Error::UpstreamDataMissing("KMA returned no forecast slots".to_string())
        })?;

        aggregate(&items, slot)
    }
}

fn parse_items(envelope: KmaEnvelope) -> Result<Vec<KmaItem>> {
    let response = envelope
        .response
        .ok_or_else(|| Error::UpstreamDataMissing("KMA response has no body".to_string()))?;

    if response.header.result_code != "00" {
        return Err(Error::Upstream(format!(
            "KMA result {}: {}",
            response.header.result_code,
            response.header.result_msg.unwrap_or_default()
        )));
    }

    Ok(response
        .body
        .and_then(|b| b.items)
        .map(|i| i.item)
        .unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn at(date: &str, hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    fn item(category: &str, date: &str, time: &str, value: &str) -> KmaItem {
        KmaItem {
            category: category.to_string(),
            fcst_date: date.to_string(),
            fcst_time: time.to_string(),
            fcst_value: value.to_string(),
        }
    }

    #[test]
    fn test_issue_time_same_day() {
        let (date, hour) = issue_time(at("2024-01-15", 14, 30));
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
        assert_eq!(hour, 14);

        let (_, hour) = issue_time(at("2024-01-15", 16, 59));
        assert_eq!(hour, 14);

        let (_, hour) = issue_time(at("2024-01-15", 23, 5));
        assert_eq!(hour, 23);
    }

    #[test]
    fn test_issue_time_after_midnight() {
        let (date, hour) = issue_time(at("2024-03-01", 1, 10));
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
        assert_eq!(hour, 23);
    }

    #[test]
    fn test_target_slot() {
        let slot = target_slot(at("2024-01-15", 9, 45));
        assert_eq!(
            slot,
            ForecastSlot {
                date: 20240115,
                time: 900
            }
        );
    }

    #[test]
    fn test_select_exact_slot() {
        let items = vec![
            item("TMP", "20240115", "0800", "1"),
            item("TMP", "20240115", "0900", "2"),
            item("TMP", "20240115", "1000", "3"),
        ];
        let target = ForecastSlot {
            date: 20240115,
            time: 900,
        };
        assert_eq!(select_slot(&items, target), Some(target));
    }

    #[test]
    fn test_select_nearest_slot() {
        // Issue at 23:00 starts at midnight; at 00:40 the 00:00 slot exists,
        // but at 23:30 the previous day only later slots are available.
        let items = vec![
            item("TMP", "20240116", "0000", "1"),
            item("TMP", "20240116", "0100", "2"),
            item("TMP", "20240116", "0300", "3"),
        ];
        let target = ForecastSlot {
            date: 20240116,
            time: 200,
        };
        // 01:00 and 03:00 are equally far; the earlier one wins
        assert_eq!(
            select_slot(&items, target),
            Some(ForecastSlot {
                date: 20240116,
                time: 100
            })
        );

        let target = ForecastSlot {
            date: 20240115,
            time: 2300,
        };
        assert_eq!(
            select_slot(&items, target),
            Some(ForecastSlot {
                date: 20240116,
                time: 0
            })
        );
    }

    #[test]
    fn test_select_slot_empty() {
        let target = ForecastSlot {
            date: 20240115,
            time: 900,
        };
        assert_eq!(select_slot(&[], target), None);
    }

    #[test]
    fn test_aggregate() {
        let items = vec![
            item("TMP", "20240115", "0900", "0"),
            item("SKY", "20240115", "0900", "4"),
            item("PTY", "20240115", "0900", "0"),
            item("WSD", "20240115", "0900", "10"),
            item("REH", "20240115", "0900", "55"),
            item("POP", "20240115", "0900", "20"),
            item("TMP", "20240115", "1000", "5"),
        ];
        let slot = ForecastSlot {
            date: 20240115,
            time: 900,
        };

        let snapshot = aggregate(&items, slot).unwrap();
        assert_eq!(snapshot.temperature_c, 0.0);
        assert_eq!(snapshot.sky, Some(SkyCode::Overcast));
        assert_eq!(snapshot.precipitation, Some(PrecipitationCode::None));
        assert_eq!(snapshot.wind_speed_ms, Some(10.0));
        assert_eq!(snapshot.humidity_pct, Some(55.0));
        assert_abs_diff_eq!(snapshot.feels_like_c, -7.1, epsilon = 1e-9);
        assert_eq!(snapshot.condition(), "overcast");
    }

    #[test]
    fn test_aggregate_missing_temperature() {
        let items = vec![item("SKY", "20240115", "0900", "1")];
        let slot = ForecastSlot {
            date: 20240115,
            time: 900,
        };
        assert!(matches!(
            aggregate(&items, slot),
            Err(Error::UpstreamDataMissing(_))
        ));
    }

    #[test]
    fn test_aggregate_no_rows() {
        let slot = ForecastSlot {
            date: 20240115,
            time: 900,
        };
        assert!(aggregate(&[], slot).is_err());
    }

    #[test]
    fn test_parse_envelope() {
        let json = r#"{
            "response": {
                "header": {"resultCode": "00", "resultMsg": "NORMAL_SERVICE"},
                "body": {
                    "dataType": "JSON",
                    "items": {"item": [
                        {"baseDate": "20240115", "baseTime": "0800", "category": "TMP",
                         "fcstDate": "20240115", "fcstTime": "0900", "fcstValue": "-2",
                         "nx": 60, "ny": 127}
                    ]},
                    "pageNo": 1, "numOfRows": 200, "totalCount": 1
                }
            }
        }"#;
        let envelope: KmaEnvelope = serde_json::from_str(json).unwrap();
        let items = parse_items(envelope).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].fcst_value, "-2");
    }

    #[test]
    fn test_parse_envelope_error_code() {
        let json = r#"{"response": {"header": {"resultCode": "03", "resultMsg": "NO_DATA"}}}"#;
        let envelope: KmaEnvelope = serde_json::from_str(json).unwrap();
        assert!(matches!(parse_items(envelope), Err(Error::Upstream(_))));
    }

    #[test]
    fn test_request_url() {
        let source = KmaForecastSource::new(
            reqwest::Client::new(),
            "http://example.test/fcst",
            Some("a+b/c".to_string()),
        );
        let url = source.request_url(
            WeatherGrid { nx: 60, ny: 127 },
            (NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(), 5),
        );
        assert!(url.starts_with("http://example.test/fcst?pageNo=1&numOfRows=200"));
        assert!(url.contains("base_date=20240115&base_time=0500&nx=60&ny=127"));
        assert!(url.ends_with("serviceKey=a%2Bb%2Fc"));
    }

    #[test]
    fn test_request_url_without_key() {
        let source = KmaForecastSource::new(
            reqwest::Client::new(),
            "http://localhost:8000/api/weather",
            Some(String::new()),
        );
        let url = source.request_url(
            WeatherGrid { nx: 1, ny: 2 },
            (NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(), 23),
        );
        assert!(!url.contains("serviceKey"));
        assert!(url.contains("base_time=2300"));
    }
}
