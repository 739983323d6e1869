//! Goose Pilot - Main Entry Point

use anyhow::Context;
use pilot::{init_logging, parse_replay, run_replay, JsonLinesSink, PilotSettings};
use tracing::info;

/// Config file used when GOOSE_PILOT_CONFIG is not set
const DEFAULT_CONFIG: &str = "goose-pilot.toml";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path =
        std::env::var("GOOSE_PILOT_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG.to_string());
    let settings = PilotSettings::load(&config_path)
        .with_context(|| format!("failed to load settings from {}", config_path))?;
    init_logging(&settings.log_level);

    info!("=== Goose Pilot v{} ===", env!("CARGO_PKG_VERSION"));

    let replay_path = std::env::args()
        .nth(1)
        .context("usage: goose-pilot <replay.jsonl>")?;
    let text = tokio::fs::read_to_string(&replay_path)
        .await
        .with_context(|| format!("failed to read replay file {}", replay_path))?;
    let events = parse_replay(&text)?;
    info!("Loaded {} replay events from {}", events.len(), replay_path);

    let mut sink = JsonLinesSink::new(std::io::stdout());
    let summary = run_replay(&settings, events, &mut sink).await?;
    info!("Replay finished: {:?}", summary);

    Ok(())
}
