//! mood-menu: weather, air quality and mood aware food recommendations
//!
//! Gathers the ambient context around a location (address, KMA forecast,
//! AirKorea particulate reading), fuses it with the user's mood into a prompt,
//! and asks a recommendation backend what to eat.
//!
//! ## Features
//!
//! - KMA forecast grid and Korean TM coordinate transforms
//! - Weather condition decoding with wind-chill feels-like temperature
//! - PM10 grading
//! - Prompt building with a per-request nonce and re-roll support
//! - A session coordinator with single-flight submission
//! - A development backend (recommendation stub, geocoding and weather proxies)
//!
//! ## Quick Start
//!
//! ```rust
//! use mood_menu::coord::GeoCoordinate;
//! use mood_menu::weather::feels_like;
//!
//! let seoul = GeoCoordinate::new(37.5665, 126.978);
//! let grid = seoul.weather_grid();
//! assert_eq!((grid.nx, grid.ny), (60, 127));
//!
//! assert_eq!(feels_like(0.0, Some(10.0)), -7.1);
//! ```

pub mod air;
pub mod cli;
pub mod config;
pub mod constants;
pub mod coord;
pub mod error;
pub mod gateway;
pub mod geo;
pub mod prompt;
pub mod recommend;
pub mod server;
pub mod session;
pub mod weather;

// Re-export commonly used types
pub use config::Config;
pub use coord::{GeoCoordinate, TmCoordinate, WeatherGrid};
pub use error::{Error, Result};
pub use gateway::{Gateway, HttpGateway};
pub use recommend::Recommendation;
pub use session::{Notice, Phase, Session};
