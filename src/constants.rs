//! Centralized constants for the mood-menu crate
//!
//! Endpoints, fixed placeholders and cache settings shared across modules.

/// External API endpoints
pub mod api {
    /// KMA short-range (village) forecast
    pub const KMA_FORECAST_URL: &str =
        "https://apis.data.go.kr/1360000/VilageFcstInfoService_2.0/getVilageFcst";

    /// AirKorea nearby monitoring station lookup
    pub const AIRKOREA_STATION_URL: &str =
        "https://apis.data.go.kr/B552584/MsrstnInfoInqireSvc/getNearbyMsrstnList";

    /// AirKorea real-time measurement per station
    pub const AIRKOREA_READING_URL: &str =
        "https://apis.data.go.kr/B552584/ArpltnInforInqireSvc/getMsrstnAcctoRltmMesureDnsty";

    /// OpenStreetMap Nominatim geocoding API
    pub const NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org";

    /// IP geolocation API (free, no key required)
    pub const IP_API_URL: &str = "http://ip-api.com/json";

    /// Development backend base URL
    pub const BACKEND_URL: &str = "http://localhost:8000";

    /// Recommendation endpoint path on the backend
    pub const RECOMMEND_FOOD_PATH: &str = "/api/recommend-food";

    /// Reverse geocoding proxy path on the backend
    pub const REVERSE_GEOCODE_PATH: &str = "/api/reverse-geocode";

    /// Weather forecast proxy path on the backend
    pub const WEATHER_PROXY_PATH: &str = "/api/weather";
}

/// Placeholders used when ambient data is missing
pub mod placeholder {
    /// Any missing prompt field
    pub const UNKNOWN: &str = "unknown";

    /// Address that could not be resolved
    pub const UNKNOWN_LOCATION: &str = "unknown location";
}

/// Cache settings
pub mod cache {
    /// IP location cache duration in seconds (1 hour)
    pub const IP_LOCATION_TTL_SECS: u64 = 3600;

    /// IP location cache file name
    pub const IP_LOCATION_CACHE_FILE: &str = "ip_location_cache.json";
}

/// HTTP user agent for all outgoing requests
pub const USER_AGENT: &str = concat!("mood-menu/", env!("CARGO_PKG_VERSION"));
