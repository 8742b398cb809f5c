//! Serve command handler
//!
//! Starts the development backend in foreground mode.

use crate::cli::init_logging;
use crate::config::Config;
use crate::error::Result;
use crate::server;
use clap::Args;
use tracing::{info, warn};

/// Serve command arguments
#[derive(Args)]
pub struct ServeArgs {
    /// Host address to bind to
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(long, short = 'p')]
    pub port: Option<u16>,
}

/// Run the serve command
pub async fn run(args: ServeArgs) -> Result<()> {
    init_logging("info");

    let mut config = Config::load_with_env()?;

    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    if config.api_keys.kma.is_empty() {
        warn!("no KMA key configured; /api/weather will answer 503");
    }

    info!(
        "Starting mood-menu backend v{} on {}",
        env!("CARGO_PKG_VERSION"),
        config.server_addr()
    );

    server::run(config).await
}
