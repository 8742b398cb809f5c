//! Grid command handler
//!
//! Prints the forecast grid cell and TM coordinate for a latitude/longitude.

use crate::coord::GeoCoordinate;
use crate::error::Result;
use clap::Args;
use serde_json::json;

/// Grid command arguments
#[derive(Args)]
pub struct GridArgs {
    /// Latitude
    #[arg(long, allow_negative_numbers = true)]
    pub lat: f64,

    /// Longitude
    #[arg(long, allow_negative_numbers = true)]
    pub lon: f64,

    /// Print JSON instead of text
    #[arg(long)]
    pub json: bool,
}

/// Run the grid command
pub fn run(args: GridArgs) -> Result<()> {
    let coord = GeoCoordinate::checked(args.lat, args.lon)?;
    let grid = coord.weather_grid();
    let tm = coord.tm()?;

    if args.json {
        let output = json!({
            "coordinate": coord,
            "grid": {"nx": grid.nx, "ny": grid.ny},
            "tm": {"x": tm.x, "y": tm.y},
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("Coordinate: {}", coord);
        println!("Grid:       {}", grid);
        println!("TM:         {}", tm);
    }
    Ok(())
}
