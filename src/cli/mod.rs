//! CLI command handlers
//!
//! Each subcommand has its own module with handler functions.

pub mod config;
pub mod context;
pub mod grid;
pub mod location;
pub mod recommend;
pub mod serve;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// Weather, air quality and mood aware food recommendations
#[derive(Parser)]
#[command(name = "mood-menu")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Recommend a food for a location and mood
    Recommend(recommend::RecommendArgs),

    /// Show the ambient context (address, weather, air quality) for a location
    Context(context::ContextArgs),

    /// Convert a coordinate to the forecast grid and TM plane
    Grid(grid::GridArgs),

    /// Start the development backend (foreground)
    Serve(serve::ServeArgs),

    /// Manage configuration
    Config(config::ConfigArgs),
}

/// Install the global tracing subscriber
///
/// `RUST_LOG` wins over `default_filter`. Logs go to stderr so stdout stays
/// clean for command output.
pub fn init_logging(default_filter: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Run the CLI
pub async fn run() -> crate::error::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Recommend(args) => recommend::run(args).await,
        Commands::Context(args) => context::run(args).await,
        Commands::Grid(args) => grid::run(args),
        Commands::Serve(args) => serve::run(args).await,
        Commands::Config(args) => config::run(args),
    }
}
