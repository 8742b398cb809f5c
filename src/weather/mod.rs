//! Weather snapshot model and condition decoding
//!
//! Forecast categories arrive as numeric codes. This module turns them into
//! human-readable conditions and computes the wind-chill "feels like" temperature.

pub mod kma;

use serde::{Deserialize, Serialize};

/// Sky state (KMA `SKY` category)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkyCode {
    Clear,
    PartlyCloudy,
    Overcast,
    Other(i64),
}

impl SkyCode {
    pub fn from_code(code: i64) -> Self {
        match code {
            1 => Self::Clear,
            3 => Self::PartlyCloudy,
            4 => Self::Overcast,
            n => Self::Other(n),
        }
    }

    pub fn code(&self) -> i64 {
        match self {
            Self::Clear => 1,
            Self::PartlyCloudy => 3,
            Self::Overcast => 4,
            Self::Other(n) => *n,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Clear => "clear",
            Self::PartlyCloudy => "partly cloudy",
            Self::Overcast => "overcast",
            Self::Other(_) => "unknown",
        }
    }
}

/// Precipitation type (KMA `PTY` category)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrecipitationCode {
    None,
    Rain,
    RainSnow,
    Snow,
    Drizzle,
    DrizzleSnow,
    SnowFlurry,
    Other(i64),
}

impl PrecipitationCode {
    pub fn from_code(code: i64) -> Self {
        match code {
            0 => Self::None,
            1 => Self::Rain,
            2 => Self::RainSnow,
            3 => Self::Snow,
            5 => Self::Drizzle,
            6 => Self::DrizzleSnow,
            7 => Self::SnowFlurry,
            n => Self::Other(n),
        }
    }

    pub fn code(&self) -> i64 {
        match self {
            Self::None => 0,
            Self::Rain => 1,
            Self::RainSnow => 2,
            Self::Snow => 3,
            Self::Drizzle => 5,
            Self::DrizzleSnow => 6,
            Self::SnowFlurry => 7,
            Self::Other(n) => *n,
        }
    }

    /// Whether anything is falling
    pub fn is_falling(&self) -> bool {
        self.code() > 0
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Rain => "rain",
            Self::RainSnow => "rain/snow",
            Self::Snow => "snow",
            Self::Drizzle => "drizzle",
            Self::DrizzleSnow => "drizzle/snow-flurry",
            Self::SnowFlurry => "snow-flurry",
            Self::None | Self::Other(_) => "unknown",
        }
    }
}

/// Decode precipitation and sky codes into a condition
///
/// Falling precipitation always wins over the sky state. A missing code is
/// treated like "nothing falling" / unknown sky.
pub fn decode_condition(
    precipitation: Option<PrecipitationCode>,
    sky: Option<SkyCode>,
) -> &'static str {
    match precipitation {
        Some(pty) if pty.is_falling() => pty.description(),
        _ => sky.map_or("unknown", |s| s.description()),
    }
}

/// Wind speed (km/h) at or below which wind chill is ignored
const WIND_CHILL_MIN_KMH: f64 = 4.8;

/// Wind-chill adjusted temperature, rounded to one decimal
///
/// Uses the KMA winter formula. It is applied regardless of the ambient
/// temperature.
pub fn feels_like(temp_c: f64, wind_speed_ms: Option<f64>) -> f64 {
    let Some(wind_ms) = wind_speed_ms else {
        return round1(temp_c);
    };

    let v = wind_ms * 3.6;
    if v <= WIND_CHILL_MIN_KMH {
        return round1(temp_c);
    }

    let v016 = v.powf(0.16);
    round1(13.12 + 0.6215 * temp_c - 11.37 * v016 + 0.3965 * temp_c * v016)
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Identifies one row of forecast predictions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForecastSlot {
    /// YYYYMMDD
    pub date: u32,
    /// HHMM
    pub time: u32,
}

/// Weather at the session location for one forecast slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub temperature_c: f64,
    pub sky: Option<SkyCode>,
    pub precipitation: Option<PrecipitationCode>,
    pub wind_speed_ms: Option<f64>,
    pub humidity_pct: Option<f64>,
    pub feels_like_c: f64,
    pub slot: ForecastSlot,
}

impl WeatherSnapshot {
    /// Build a snapshot, deriving the feels-like temperature
    pub fn new(
        temperature_c: f64,
        sky: Option<SkyCode>,
        precipitation: Option<PrecipitationCode>,
        wind_speed_ms: Option<f64>,
        humidity_pct: Option<f64>,
        slot: ForecastSlot,
    ) -> Self {
        Self {
            temperature_c,
            sky,
            precipitation,
            wind_speed_ms,
            humidity_pct,
            feels_like_c: feels_like(temperature_c, wind_speed_ms),
            slot,
        }
    }

    /// Human-readable condition for this snapshot
    pub fn condition(&self) -> &'static str {
        decode_condition(self.precipitation, self.sky)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_precipitation_takes_precedence() {
        for sky in [SkyCode::Clear, SkyCode::PartlyCloudy, SkyCode::Overcast] {
            assert_eq!(
                decode_condition(Some(PrecipitationCode::Rain), Some(sky)),
                "rain"
            );
        }
        assert_eq!(
            decode_condition(Some(PrecipitationCode::SnowFlurry), None),
            "snow-flurry"
        );
    }

    #[test]
    fn test_sky_when_dry() {
        assert_eq!(
            decode_condition(Some(PrecipitationCode::None), Some(SkyCode::Clear)),
            "clear"
        );
        assert_eq!(
            decode_condition(Some(PrecipitationCode::None), Some(SkyCode::Overcast)),
            "overcast"
        );
        assert_eq!(decode_condition(None, Some(SkyCode::PartlyCloudy)), "partly cloudy");
    }

    #[test]
    fn test_unknown_codes() {
        // Shower (4) is not in the table but is still precipitation
        assert_eq!(
            decode_condition(Some(PrecipitationCode::from_code(4)), Some(SkyCode::Clear)),
            "unknown"
        );
        assert_eq!(
            decode_condition(Some(PrecipitationCode::None), Some(SkyCode::from_code(2))),
            "unknown"
        );
        assert_eq!(decode_condition(None, None), "unknown");
    }

    #[test]
    fn test_code_roundtrip() {
        for code in [0, 1, 2, 3, 5, 6, 7, 9] {
            assert_eq!(PrecipitationCode::from_code(code).code(), code);
        }
        for code in [1, 3, 4, 2] {
            assert_eq!(SkyCode::from_code(code).code(), code);
        }
    }

    #[test]
    fn test_feels_like_without_wind() {
        assert_eq!(feels_like(10.0, None), 10.0);
        assert_eq!(format!("{:.1}", feels_like(10.0, None)), "10.0");
        assert_eq!(feels_like(12.34, None), 12.3);
    }

    #[test]
    fn test_feels_like_light_wind() {
        // 1 m/s = 3.6 km/h, below the threshold
        assert_eq!(feels_like(10.0, Some(1.0)), 10.0);
        // 1.3 m/s = 4.68 km/h, still ignored
        assert_eq!(feels_like(-3.0, Some(1.3)), -3.0);
    }

    #[test]
    fn test_feels_like_wind_chill() {
        let v: f64 = 36.0;
        let expected = 13.12 - 11.37 * v.powf(0.16);
        let expected = (expected * 10.0).round() / 10.0;

        let actual = feels_like(0.0, Some(10.0));
        assert_abs_diff_eq!(actual, expected, epsilon = 1e-9);
        assert_abs_diff_eq!(actual, -7.1, epsilon = 1e-9);
    }

    #[test]
    fn test_snapshot_derives_feels_like() {
        let snapshot = WeatherSnapshot::new(
            0.0,
            Some(SkyCode::Clear),
            Some(PrecipitationCode::None),
            Some(10.0),
            Some(40.0),
            ForecastSlot {
                date: 20240115,
                time: 900,
            },
        );
        assert_abs_diff_eq!(snapshot.feels_like_c, -7.1, epsilon = 1e-9);
        assert_eq!(snapshot.condition(), "clear");
    }
}
