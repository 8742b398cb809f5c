//! Air quality model and PM10 grading

pub mod airkorea;

use serde::{Deserialize, Serialize};

/// Coarse PM10 severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pm10Grade {
    Good,
    Normal,
    Bad,
    VeryBad,
    Unknown,
}

impl Pm10Grade {
    /// Grade an integer concentration (µg/m³)
    ///
    /// Upper bounds are inclusive and checked in ascending order.
    pub fn from_value(value: i64) -> Self {
        match value {
            v if v <= 30 => Self::Good,
            v if v <= 80 => Self::Normal,
            v if v <= 150 => Self::Bad,
            _ => Self::VeryBad,
        }
    }

    /// Grade a concentration, truncating any fractional part
    pub fn from_concentration(value: f64) -> Self {
        if value.is_finite() {
            Self::from_value(value.trunc() as i64)
        } else {
            Self::Unknown
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Good => "good",
            Self::Normal => "normal",
            Self::Bad => "bad",
            Self::VeryBad => "very bad",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for Pm10Grade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Parse the leading integer of a reading
///
/// Accepts leading whitespace and an optional sign, then reads digits until the
/// first non-digit ("42.7" -> 42, "17 µg" -> 17). Returns `None` if no digit
/// is found, which covers AirKorea's "-" for a missing measurement.
pub fn parse_leading_int(raw: &str) -> Option<i64> {
    let s = raw.trim_start();
    let (negative, rest) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let digits: &str = &rest[..rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len())];
    if digits.is_empty() {
        return None;
    }

    let value: i64 = digits.parse().ok()?;
    Some(if negative { -value } else { value })
}

/// Grade a raw PM10 reading
pub fn pm10_grade(raw: &str) -> Pm10Grade {
    parse_leading_int(raw).map_or(Pm10Grade::Unknown, Pm10Grade::from_value)
}

/// Latest particulate reading from the nearest monitoring station
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AirQualitySample {
    /// Monitoring station the reading came from
    pub station: String,
    /// PM10 in µg/m³, if the station reported one
    pub pm10: Option<f64>,
    /// PM2.5 in µg/m³, if the station reported one
    pub pm25: Option<f64>,
}

impl AirQualitySample {
    pub fn pm10_grade(&self) -> Pm10Grade {
        self.pm10
            .map_or(Pm10Grade::Unknown, Pm10Grade::from_concentration)
    }
}
