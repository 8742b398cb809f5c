//! Config command handler
//!
//! View and modify configuration settings.

use crate::config::Config;
use crate::error::{Error, Result};
use clap::Args;

/// Config command arguments
#[derive(Args)]
pub struct ConfigArgs {
    /// Configuration key (e.g., "gateway.mode")
    pub key: Option<String>,

    /// Value to set (if not provided, shows current value)
    pub value: Option<String>,

    /// Show config file path
    #[arg(long)]
    pub path: bool,

    /// Reset config to defaults
    #[arg(long)]
    pub reset: bool,
}

/// Run the config command
pub fn run(args: ConfigArgs) -> Result<()> {
    if args.path {
        let path = Config::config_path()?;
        println!("{}", path.display());
        return Ok(());
    }

    if args.reset {
        Config::default().save()?;
        println!("Configuration reset to defaults");
        return Ok(());
    }

    // File values only; env overrides must not be written back
    let mut config = Config::load()?;

    match (&args.key, &args.value) {
        (None, None) => print!("{}", render(&config)),

        (Some(key), None) => match config.get(key) {
            Some(value) => println!("{}", value),
            None => {
                eprintln!("Available keys:");
                for k in Config::available_keys() {
                    eprintln!("  {}", k);
                }
                return Err(Error::Config(format!("Unknown config key: {}", key)));
            }
        },

        (Some(key), Some(value)) => {
            config.set(key, value)?;
            config.save()?;
            println!("{} = {}", key, value);
        }

        (None, Some(_)) => {
            return Err(Error::Config(
                "Must specify a key to set a value".to_string(),
            ));
        }
    }

    Ok(())
}

fn masked(key: &str) -> &'static str {
    if key.is_empty() {
        "\"\" # not configured"
    } else {
        "\"***\" # configured"
    }
}

/// All configuration values, with API keys masked
fn render(config: &Config) -> String {
    let mut out = String::new();
    let mut section = |name: &str, entries: Vec<(&str, String)>| {
        out.push_str(&format!("[{}]\n", name));
        for (key, value) in entries {
            out.push_str(&format!("{} = {}\n", key, value));
        }
        out.push('\n');
    };

    section(
        "gateway",
        vec![
            ("mode", format!("{:?}", config.gateway.mode)),
            ("proxy_url", format!("{:?}", config.gateway.proxy_url)),
            ("timeout_secs", config.gateway.timeout_secs.to_string()),
        ],
    );
    section(
        "endpoints",
        vec![
            ("weather", format!("{:?}", config.endpoints.weather)),
            ("station", format!("{:?}", config.endpoints.station)),
            ("air_quality", format!("{:?}", config.endpoints.air_quality)),
            ("nominatim", format!("{:?}", config.endpoints.nominatim)),
            ("recommend", format!("{:?}", config.endpoints.recommend)),
        ],
    );
    section(
        "api_keys",
        vec![
            ("kma", masked(&config.api_keys.kma).to_string()),
            ("airkorea", masked(&config.api_keys.airkorea).to_string()),
        ],
    );
    section(
        "server",
        vec![
            ("host", format!("{:?}", config.server.host)),
            ("port", config.server.port.to_string()),
            ("allowed_origins", format!("{:?}", config.server.allowed_origins)),
        ],
    );

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_masks_keys() {
        let mut config = Config::default();
        config.api_keys.kma = "super-secret".to_string();

        let text = render(&config);
        assert!(!text.contains("super-secret"));
        assert!(text.contains("kma = \"***\" # configured"));
        assert!(text.contains("airkorea = \"\" # not configured"));
        assert!(text.contains("[gateway]\nmode = \"direct\""));
        assert!(text.contains("port = 8000"));
    }
}
