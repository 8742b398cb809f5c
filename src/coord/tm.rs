//! Transverse Mercator projection for air quality station lookup
//!
//! AirKorea expects station queries in the central-belt TM plane
//! (GRS80, central meridian 127E, origin 38N, false easting/northing 200 km / 500 km).
//! The math is delegated to proj4rs so results agree with proj4.

use crate::error::{Error, Result};
use proj4rs::Proj;
use serde::{Deserialize, Serialize};

/// Geographic WGS84 source definition
const WGS84_DEF: &str = "+proj=longlat +ellps=WGS84 +datum=WGS84 +no_defs";

/// Central-belt TM definition used by AirKorea
const TM_CENTRAL_DEF: &str =
    "+proj=tmerc +lat_0=38 +lon_0=127 +k=1 +x_0=200000 +y_0=500000 +ellps=GRS80 +units=m +no_defs";

/// A position on the central-belt TM plane, in metres
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TmCoordinate {
    pub x: f64,
    pub y: f64,
}

impl std::fmt::Display for TmCoordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "tmX={} tmY={}", self.x, self.y)
    }
}

fn parse_proj(def: &str) -> Result<Proj> {
    Proj::from_proj_string(def)
        .map_err(|e| Error::Projection(format!("Invalid projection '{}': {}", def, e)))
}

/// Convert latitude/longitude (degrees) to central-belt TM metres
pub fn to_tm(lat: f64, lon: f64) -> Result<TmCoordinate> {
    let src = parse_proj(WGS84_DEF)?;
    let dst = parse_proj(TM_CENTRAL_DEF)?;

    // proj4rs works in radians for geographic systems
    let mut point = (lon.to_radians(), lat.to_radians(), 0.0);
    proj4rs::transform::transform(&src, &dst, &mut point)
        .map_err(|e| Error::Projection(format!("TM transform failed: {}", e)))?;

    Ok(TmCoordinate {
        x: point.0,
        y: point.1,
    })
}
