//! Recommend command handler
//!
//! Loads the ambient context for a location, selects the given moods and asks
//! for a recommendation, optionally re-rolling for alternatives.

use crate::cli::init_logging;
use crate::cli::location::LocationArgs;
use crate::config::Config;
use crate::error::Result;
use crate::gateway::HttpGateway;
use crate::recommend::Recommendation;
use crate::session::{AmbientContext, Notice, Session};
use clap::Args;
use serde::Serialize;
use tokio::sync::broadcast;

/// Recommend command arguments
#[derive(Args)]
pub struct RecommendArgs {
    #[command(flatten)]
    pub location: LocationArgs,

    /// Mood tag (repeat for several)
    #[arg(long = "mood", short = 'm', required = true)]
    pub moods: Vec<String>,

    /// Ask for this many alternative recommendations after the first
    #[arg(long, default_value_t = 0)]
    pub rerolls: u32,

    /// Print JSON instead of text
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct RecommendOutput<'a> {
    context: &'a AmbientContext,
    moods: Vec<&'a str>,
    recommendations: &'a [Recommendation],
}

/// Run the recommend command
pub async fn run(args: RecommendArgs) -> Result<()> {
    init_logging("warn");

    let config = Config::load_with_env()?;
    let coord = args.location.resolve(&config).await?;
    let session = Session::new(HttpGateway::from_config(&config)?);
    let mut notices = session.notices();

    let context = session.load_context(coord.latitude, coord.longitude).await?;
    print_notices(&mut notices);

    for mood in distinct_moods(&args.moods) {
        session.toggle_mood(mood);
    }

    let mut recommendations = Vec::new();
    for attempt in 0..=args.rerolls {
        let outcome = session.submit(attempt > 0).await;
        print_notices(&mut notices);
        if let Some(rec) = outcome? {
            recommendations.push(rec);
        }
    }

    if args.json {
        let moods = session.moods();
        let output = RecommendOutput {
            context: &context,
            moods: moods.iter().collect(),
            recommendations: &recommendations,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("Near {}", context.address);
    for (i, rec) in recommendations.iter().enumerate() {
        if i > 0 {
            println!("Alternative #{}:", i);
        }
        print!("{}", rec);
    }
    if recommendations.is_empty() {
        println!("No recommendation available.");
    }
    Ok(())
}

/// Mood flags in first-seen order with repeats removed
///
/// Selection toggles, so a repeated `--mood` would otherwise deselect itself.
fn distinct_moods(moods: &[String]) -> Vec<&str> {
    let mut seen = Vec::new();
    for mood in moods.iter().map(|m| m.trim()) {
        if !mood.is_empty() && !seen.contains(&mood) {
            seen.push(mood);
        }
    }
    seen
}

fn print_notices(notices: &mut broadcast::Receiver<Notice>) {
    while let Ok(notice) = notices.try_recv() {
        eprintln!("{}", notice);
    }
}
