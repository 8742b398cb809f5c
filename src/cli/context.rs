//! Context command handler
//!
//! Shows what a session would know about a location before any mood is picked.

use crate::cli::init_logging;
use crate::cli::location::LocationArgs;
use crate::config::Config;
use crate::constants::placeholder::UNKNOWN;
use crate::error::Result;
use crate::gateway::HttpGateway;
use crate::session::{AmbientContext, Session};
use clap::Args;

/// Context command arguments
#[derive(Args)]
pub struct ContextArgs {
    #[command(flatten)]
    pub location: LocationArgs,

    /// Print JSON instead of text
    #[arg(long)]
    pub json: bool,
}

/// Run the context command
pub async fn run(args: ContextArgs) -> Result<()> {
    init_logging("warn");

    let config = Config::load_with_env()?;
    let coord = args.location.resolve(&config).await?;
    let session = Session::new(HttpGateway::from_config(&config)?);
    let context = session.load_context(coord.latitude, coord.longitude).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&context)?);
    } else {
        println!("Location: {} ({})", context.address, coord);
        print!("{}", describe(&context));
    }
    Ok(())
}

/// Human-readable weather and air quality lines
fn describe(context: &AmbientContext) -> String {
    let mut out = String::new();

    match &context.weather {
        Some(w) => {
            out.push_str(&format!(
                "Weather:  {}, {}°C (feels like {:.1}°C)\n",
                w.condition(),
                w.temperature_c,
                w.feels_like_c
            ));
            if let Some(humidity) = w.humidity_pct {
                out.push_str(&format!("Humidity: {}%\n", humidity));
            }
            if let Some(wind) = w.wind_speed_ms {
                out.push_str(&format!("Wind:     {} m/s\n", wind));
            }
        }
        None => out.push_str(&format!("Weather:  {}\n", UNKNOWN)),
    }

    match &context.air_quality {
        Some(air) => {
            let pm10 = air.pm10.map_or_else(|| UNKNOWN.to_string(), |v| v.to_string());
            out.push_str(&format!(
                "PM10:     {} µg/m³ ({}) at {}\n",
                pm10,
                air.pm10_grade(),
                air.station
            ));
        }
        None => out.push_str(&format!("PM10:     {}\n", UNKNOWN)),
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::air::AirQualitySample;
    use crate::weather::{ForecastSlot, PrecipitationCode, SkyCode, WeatherSnapshot};

    #[test]
    fn test_describe_full() {
        let context = AmbientContext {
            address: "Haeundae".to_string(),
            weather: Some(WeatherSnapshot::new(
                28.0,
                Some(SkyCode::Overcast),
                Some(PrecipitationCode::None),
                Some(3.0),
                Some(70.0),
                ForecastSlot {
                    date: 20240801,
                    time: 1500,
                },
            )),
            air_quality: Some(AirQualitySample {
                station: "Jwa-dong".to_string(),
                pm10: Some(160.0),
                pm25: None,
            }),
        };

        let text = describe(&context);
        assert!(text.contains("Weather:  overcast, 28°C"));
        assert!(text.contains("Humidity: 70%"));
        assert!(text.contains("(very bad) at Jwa-dong"));
    }

    #[test]
    fn test_describe_missing() {
        let context = AmbientContext {
            address: "somewhere".to_string(),
            weather: None,
            air_quality: None,
        };
        let text = describe(&context);
        assert_eq!(text, "Weather:  unknown\nPM10:     unknown\n");
    }
}
