//! Default configuration values
//!
//! Named constants for all tunable parameters

/// Default gateway mode ("direct" or "proxy")
pub const DEFAULT_GATEWAY_MODE: &str = "direct";

/// Default upstream request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Default server host
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default server port
pub const DEFAULT_PORT: u16 = 8000;

/// Origins the development backend accepts cross-origin requests from
pub const DEFAULT_ALLOWED_ORIGINS: [&str; 2] = ["http://localhost:5173", "http://127.0.0.1:5173"];

/// Environment variable overriding `api_keys.kma`
pub const KMA_KEY_ENV: &str = "MOOD_MENU_KMA_KEY";

/// Environment variable overriding `api_keys.airkorea`
pub const AIRKOREA_KEY_ENV: &str = "MOOD_MENU_AIRKOREA_KEY";

/// Config file name
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Application directory name (for XDG paths)
pub const APP_DIR_NAME: &str = "mood-menu";
