//! Configuration management
//!
//! Loads and saves configuration from XDG-compliant paths.
//! Config location: ~/.config/mood-menu/config.toml
//!
//! API keys may also come from the environment (`MOOD_MENU_KMA_KEY`,
//! `MOOD_MENU_AIRKOREA_KEY`); those win over the file but are never written back.

pub mod defaults;

use crate::constants::api;
use crate::error::{Error, Result};
use crate::gateway::GatewayMode;
use defaults::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// How upstream calls are routed
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Upstream endpoint URLs
    #[serde(default)]
    pub endpoints: EndpointsConfig,

    /// API keys for the public data services
    #[serde(default)]
    pub api_keys: ApiKeysConfig,

    /// Development backend settings
    #[serde(default)]
    pub server: ServerConfig,
}

/// Gateway routing settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// "direct" or "proxy"
    #[serde(default = "default_gateway_mode")]
    pub mode: String,

    /// Base URL of the backend used in proxy mode
    #[serde(default = "default_proxy_url")]
    pub proxy_url: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

/// Upstream endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointsConfig {
    #[serde(default = "default_weather_url")]
    pub weather: String,

    #[serde(default = "default_station_url")]
    pub station: String,

    #[serde(default = "default_air_quality_url")]
    pub air_quality: String,

    #[serde(default = "default_nominatim_url")]
    pub nominatim: String,

    /// Full recommendation endpoint
    #[serde(default = "default_recommend_url")]
    pub recommend: String,
}

/// API keys for external services
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ApiKeysConfig {
    /// KMA forecast service key
    #[serde(default)]
    pub kma: String,

    /// AirKorea service key
    #[serde(default)]
    pub airkorea: String,
}

/// Development backend settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Origins allowed by CORS
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,
}

// Default value functions for serde
fn default_gateway_mode() -> String {
    DEFAULT_GATEWAY_MODE.to_string()
}
fn default_proxy_url() -> String {
    api::BACKEND_URL.to_string()
}
fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}
fn default_weather_url() -> String {
    api::KMA_FORECAST_URL.to_string()
}
fn default_station_url() -> String {
    api::AIRKOREA_STATION_URL.to_string()
}
fn default_air_quality_url() -> String {
    api::AIRKOREA_READING_URL.to_string()
}
fn default_nominatim_url() -> String {
    api::NOMINATIM_URL.to_string()
}
fn default_recommend_url() -> String {
    format!("{}{}", api::BACKEND_URL, api::RECOMMEND_FOOD_PATH)
}
fn default_host() -> String {
    DEFAULT_HOST.to_string()
}
fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_allowed_origins() -> Vec<String> {
    DEFAULT_ALLOWED_ORIGINS.iter().map(|o| o.to_string()).collect()
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            mode: default_gateway_mode(),
            proxy_url: default_proxy_url(),
            timeout_secs: default_timeout(),
        }
    }
}

impl Default for EndpointsConfig {
    fn default() -> Self {
        Self {
            weather: default_weather_url(),
            station: default_station_url(),
            air_quality: default_air_quality_url(),
            nominatim: default_nominatim_url(),
            recommend: default_recommend_url(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            allowed_origins: default_allowed_origins(),
        }
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|p| p.join(APP_DIR_NAME))
            .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))
    }

    /// Get the config file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join(CONFIG_FILE_NAME))
    }

    /// Load configuration from the default path
    ///
    /// Creates default config if file doesn't exist
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from `path`, writing defaults there if it is missing
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = fs::read_to_string(path)?;

            toml::from_str(&content)
                .map_err(|e| Error::Config(format!("Failed to parse config file: {}", e)))
        } else {
            let config = Config::default();
            config.save_to(path)?;
            Ok(config)
        }
    }

    /// Load configuration and apply environment overrides
    pub fn load_with_env() -> Result<Self> {
        let mut config = Self::load()?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Replace API keys with non-empty environment values
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let value = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(key) = value(KMA_KEY_ENV) {
            self.api_keys.kma = key;
        }
        if let Some(key) = value(AIRKOREA_KEY_ENV) {
            self.api_keys.airkorea = key;
        }
    }

    /// Save configuration to the default path
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    /// Save configuration to `path`, creating parent directories
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;

        fs::write(path, content)?;

        Ok(())
    }

    /// Get a configuration value by key path
    ///
    /// Key format: "section.key"
    /// Returns the value as a string, or None if not found
    pub fn get(&self, key: &str) -> Option<String> {
        let parts: Vec<&str> = key.split('.').collect();

        match parts.as_slice() {
            ["gateway", "mode"] => Some(self.gateway.mode.clone()),
            ["gateway", "proxy_url"] => Some(self.gateway.proxy_url.clone()),
            ["gateway", "timeout_secs"] => Some(self.gateway.timeout_secs.to_string()),

            ["endpoints", "weather"] => Some(self.endpoints.weather.clone()),
            ["endpoints", "station"] => Some(self.endpoints.station.clone()),
            ["endpoints", "air_quality"] => Some(self.endpoints.air_quality.clone()),
            ["endpoints", "nominatim"] => Some(self.endpoints.nominatim.clone()),
            ["endpoints", "recommend"] => Some(self.endpoints.recommend.clone()),

            ["api_keys", "kma"] => Some(self.api_keys.kma.clone()),
            ["api_keys", "airkorea"] => Some(self.api_keys.airkorea.clone()),

            ["server", "host"] => Some(self.server.host.clone()),
            ["server", "port"] => Some(self.server.port.to_string()),
            ["server", "allowed_origins"] => Some(self.server.allowed_origins.join(",")),

            _ => None,
        }
    }

    /// Set a configuration value by key path
    ///
    /// Key format: "section.key"
    /// Returns error if key is invalid or value type is wrong
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let parts: Vec<&str> = key.split('.').collect();

        match parts.as_slice() {
            ["gateway", "mode"] => {
                let mode: GatewayMode = value.parse()?;
                self.gateway.mode = mode.to_string();
            }
            ["gateway", "proxy_url"] => {
                self.gateway.proxy_url = value.trim_end_matches('/').to_string();
            }
            ["gateway", "timeout_secs"] => {
                self.gateway.timeout_secs = value
                    .parse()
                    .map_err(|_| Error::Config(format!("Invalid timeout value: {}", value)))?;
            }

            ["endpoints", "weather"] => {
                self.endpoints.weather = value.to_string();
            }
            ["endpoints", "station"] => {
                self.endpoints.station = value.to_string();
            }
            ["endpoints", "air_quality"] => {
                self.endpoints.air_quality = value.to_string();
            }
            ["endpoints", "nominatim"] => {
                self.endpoints.nominatim = value.to_string();
            }
            ["endpoints", "recommend"] => {
                self.endpoints.recommend = value.to_string();
            }

            ["api_keys", "kma"] => {
                self.api_keys.kma = value.to_string();
            }
            ["api_keys", "airkorea"] => {
                self.api_keys.airkorea = value.to_string();
            }

            ["server", "host"] => {
                self.server.host = value.to_string();
            }
            ["server", "port"] => {
                self.server.port = value
                    .parse()
                    .map_err(|_| Error::Config(format!("Invalid port value: {}", value)))?;
            }
            ["server", "allowed_origins"] => {
                self.server.allowed_origins = value
                    .split(',')
                    .map(str::trim)
                    .filter(|o| !o.is_empty())
                    .map(str::to_string)
                    .collect();
            }

            _ => {
                return Err(Error::Config(format!("Unknown config key: {}", key)));
            }
        }

        Ok(())
    }

    /// List all available config keys
    pub fn available_keys() -> Vec<&'static str> {
        vec![
            "gateway.mode",
            "gateway.proxy_url",
            "gateway.timeout_secs",
            "endpoints.weather",
            "endpoints.station",
            "endpoints.air_quality",
            "endpoints.nominatim",
            "endpoints.recommend",
            "api_keys.kma",
            "api_keys.airkorea",
            "server.host",
            "server.port",
            "server.allowed_origins",
        ]
    }

    /// Parsed gateway mode
    pub fn gateway_mode(&self) -> Result<GatewayMode> {
        self.gateway.mode.parse()
    }

    /// Full URL of a path on the proxy backend
    pub fn proxy_endpoint(&self, path: &str) -> String {
        format!("{}{}", self.gateway.proxy_url.trim_end_matches('/'), path)
    }

    /// Get server address as "host:port"
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
