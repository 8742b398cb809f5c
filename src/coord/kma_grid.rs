//! KMA forecast grid conversion
//!
//! The Korea Meteorological Administration publishes short-range forecasts on a
//! 5 km Lambert conformal conic grid. Cells are addressed by integer (nx, ny).

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Earth radius in km
const RE: f64 = 6371.00877;
/// Grid spacing in km
const GRID: f64 = 5.0;
/// Standard parallel 1 (degrees)
const SLAT1: f64 = 30.0;
/// Standard parallel 2 (degrees)
const SLAT2: f64 = 60.0;
/// Origin longitude (degrees)
const OLON: f64 = 126.0;
/// Origin latitude (degrees)
const OLAT: f64 = 38.0;
/// Origin X offset in grid units
const XO: f64 = 43.0;
/// Origin Y offset in grid units
const YO: f64 = 136.0;

const DEGRAD: f64 = PI / 180.0;

/// A cell on the KMA forecast grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WeatherGrid {
    pub nx: i32,
    pub ny: i32,
}

impl std::fmt::Display for WeatherGrid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "nx={} ny={}", self.nx, self.ny)
    }
}

/// Projection constants derived once from the fixed grid parameters
struct Lcc {
    re: f64,
    sn: f64,
    sf: f64,
    ro: f64,
    olon: f64,
}

impl Lcc {
    fn new() -> Self {
        let re = RE / GRID;
        let slat1 = SLAT1 * DEGRAD;
        let slat2 = SLAT2 * DEGRAD;
        let olon = OLON * DEGRAD;
        let olat = OLAT * DEGRAD;

        let sn = (slat1.cos() / slat2.cos()).ln()
            / ((PI * 0.25 + slat2 * 0.5).tan() / (PI * 0.25 + slat1 * 0.5).tan()).ln();
        let sf = (PI * 0.25 + slat1 * 0.5).tan().powf(sn) * slat1.cos() / sn;
        let ro = re * sf / (PI * 0.25 + olat * 0.5).tan().powf(sn);

        Self {
            re,
            sn,
            sf,
            ro,
            olon,
        }
    }

    fn project(&self, lat: f64, lon: f64) -> (f64, f64) {
        let ra = self.re * self.sf / (PI * 0.25 + lat * DEGRAD * 0.5).tan().powf(self.sn);

        let mut theta = lon * DEGRAD - self.olon;
        if theta > PI {
            theta -= 2.0 * PI;
        }
        if theta < -PI {
            theta += 2.0 * PI;
        }
        theta *= self.sn;

        (ra * theta.sin(), self.ro - ra * theta.cos())
    }
}

/// Convert latitude/longitude (degrees) to a KMA forecast grid cell
///
/// Cell indices are rounded to nearest by adding 0.5 and flooring, which is how
/// the forecast service addresses its cells.
pub fn to_weather_grid(lat: f64, lon: f64) -> WeatherGrid {
    let (x, y) = Lcc::new().project(lat, lon);
    WeatherGrid {
        nx: (x + XO + 0.5).floor() as i32,
        ny: (y + YO + 0.5).floor() as i32,
    }
}
