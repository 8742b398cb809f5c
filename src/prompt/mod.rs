//! Prompt construction
//!
//! Fuses address, weather, air quality, mood and time of day into the text sent
//! to the recommendation backend. Missing context never fails the build; each
//! missing field is rendered as "unknown".

use crate::air::AirQualitySample;
use crate::constants::placeholder::UNKNOWN;
use crate::session::MoodSelection;
use crate::weather::WeatherSnapshot;
use chrono::{NaiveDateTime, Timelike};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Appended when the user asks for another suggestion
pub const RETRY_INSTRUCTION: &str =
    "Please recommend a different food from the one you suggested before.";

/// Marker in front of the nonce
pub const CACHE_BUSTER_PREFIX: &str = "<!-- cache_buster: ";

static NONCE_SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// A token no other prompt from this process carries
///
/// Epoch milliseconds keep it readable; the sequence keeps two prompts built in
/// the same millisecond apart.
pub fn next_nonce() -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);
    let seq = NONCE_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    format!("{}.{}", millis, seq)
}

/// Everything the prompt is built from
#[derive(Debug, Clone)]
pub struct PromptInput<'a> {
    pub address: &'a str,
    pub weather: Option<&'a WeatherSnapshot>,
    pub air_quality: Option<&'a AirQualitySample>,
    pub moods: &'a MoodSelection,
    pub is_retry: bool,
    /// Local wall clock time used for the time-of-day phrase
    pub now: NaiveDateTime,
}

/// "AM 9:05" / "PM 12:30"; hour 0 reads as 12
pub fn time_of_day(now: NaiveDateTime) -> String {
    let hour = now.hour();
    let meridiem = if hour < 12 { "AM" } else { "PM" };
    let hour12 = match hour % 12 {
        0 => 12,
        h => h,
    };
    format!("{} {}:{:02}", meridiem, hour12, now.minute())
}

/// Build the recommendation prompt
pub fn build_prompt(input: &PromptInput<'_>) -> String {
    let condition = input.weather.map_or(UNKNOWN, |w| w.condition());
    let temperature = input
        .weather
        .map_or_else(|| UNKNOWN.to_string(), |w| w.temperature_c.to_string());
    let feels_like = input
        .weather
        .map_or_else(|| UNKNOWN.to_string(), |w| format!("{:.1}", w.feels_like_c));
    let pm10 = input
        .air_quality
        .map_or(UNKNOWN, |a| a.pm10_grade().label());
    let moods = input.moods.join(", ");

    let mut prompt = format!(
        "My current location is near '{address}'.\n\
         The current time is {time}, and\n\
         today's weather is {condition}, the temperature is {temperature}°C but it feels like {feels_like}°C.\n\
         The fine dust level is '{pm10}' and my mood is '{moods}'.\n\
         Recommend a food that suits this weather and mood, and tell me 3 good restaurants near my current location.",
        address = input.address,
        time = time_of_day(input.now),
    );

    if input.is_retry {
        prompt.push_str("\n\n");
        prompt.push_str(RETRY_INSTRUCTION);
    }

    prompt.push('\n');
    prompt.push_str(CACHE_BUSTER_PREFIX);
    prompt.push_str(&next_nonce());
    prompt.push_str(" -->");
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weather::{ForecastSlot, PrecipitationCode, SkyCode};
    use chrono::NaiveDate;

    fn at(hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    fn moods(tags: &[&str]) -> MoodSelection {
        let mut selection = MoodSelection::new();
        for tag in tags {
            selection.toggle(tag);
        }
        selection
    }

    fn nonce_of(prompt: &str) -> &str {
        let start = prompt.find(CACHE_BUSTER_PREFIX).unwrap() + CACHE_BUSTER_PREFIX.len();
        let end = prompt[start..].find(" -->").unwrap() + start;
        &prompt[start..end]
    }

    #[test]
    fn test_time_of_day() {
        assert_eq!(time_of_day(at(0, 5)), "AM 12:05");
        assert_eq!(time_of_day(at(9, 30)), "AM 9:30");
        assert_eq!(time_of_day(at(12, 0)), "PM 12:00");
        assert_eq!(time_of_day(at(23, 59)), "PM 11:59");
    }

    #[test]
    fn test_unknown_placeholders() {
        let selection = moods(&["tired"]);
        let prompt = build_prompt(&PromptInput {
            address: "Jung-gu, Seoul",
            weather: None,
            air_quality: None,
            moods: &selection,
            is_retry: false,
            now: at(13, 7),
        });

        assert!(prompt.contains("today's weather is unknown"));
        assert!(prompt.contains("the temperature is unknown°C"));
        assert!(prompt.contains("feels like unknown°C"));
        assert!(prompt.contains("fine dust level is 'unknown'"));
        assert!(prompt.contains("PM 1:07"));
        assert!(prompt.contains("my mood is 'tired'"));
    }

    #[test]
    fn test_full_context() {
        let weather = WeatherSnapshot::new(
            0.0,
            Some(SkyCode::Clear),
            Some(PrecipitationCode::Snow),
            Some(10.0),
            None,
            ForecastSlot {
                date: 20240115,
                time: 900,
            },
        );
        let air = AirQualitySample {
            station: "Jung-gu".to_string(),
            pm10: Some(31.0),
            pm25: None,
        };
        let selection = moods(&["happy", "hungry"]);

        let prompt = build_prompt(&PromptInput {
            address: "Myeongdong",
            weather: Some(&weather),
            air_quality: Some(&air),
            moods: &selection,
            is_retry: false,
            now: at(9, 0),
        });

        assert!(prompt.contains("near 'Myeongdong'"));
        assert!(prompt.contains("today's weather is snow"));
        assert!(prompt.contains("the temperature is 0°C but it feels like -7.1°C"));
        assert!(prompt.contains("fine dust level is 'normal'"));
        assert!(prompt.contains("my mood is 'happy, hungry'"));
    }

    #[test]
    fn test_retry_instruction() {
        let selection = moods(&["sad"]);
        let mut input = PromptInput {
            address: "Busan",
            weather: None,
            air_quality: None,
            moods: &selection,
            is_retry: false,
            now: at(18, 0),
        };

        assert!(!build_prompt(&input).contains(RETRY_INSTRUCTION));

        input.is_retry = true;
        let prompt = build_prompt(&input);
        assert!(prompt.contains(RETRY_INSTRUCTION));
        // The nonce stays last so caches see the whole body change
        assert!(prompt.trim_end().ends_with("-->"));
    }

    #[test]
    fn test_nonce_differs_between_calls() {
        let selection = moods(&["calm"]);
        let input = PromptInput {
            address: "Incheon",
            weather: None,
            air_quality: None,
            moods: &selection,
            is_retry: false,
            now: at(12, 0),
        };

        let first = build_prompt(&input);
        let second = build_prompt(&input);
        assert_ne!(nonce_of(&first), nonce_of(&second));
        assert_ne!(first, second);
    }
}
