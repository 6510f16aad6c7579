mod bot;
mod card;
mod config;
mod inline;
mod limiter;
mod platform;
mod reply;
mod resolver;
mod scryfall;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::bot::AppState;
use crate::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,scrybot=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("config.toml"));

    info!("Loading configuration from: {}", config_path.display());
    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;

    info!("Configuration loaded successfully");
    info!("  Scryfall: {}", config.scryfall.base_url);
    info!(
        "  Rate limit: {} requests per {} ms",
        config.rate_limit.max_requests, config.rate_limit.period_ms
    );
    if config.auth.api_id.is_some() || config.auth.api_hash.is_some() {
        info!("  api_id/api_hash present; the Bot API transport only uses bot_token");
    }

    let state = Arc::new(AppState::new(config));

    info!("Bot is starting...");
    platform::telegram::run(state).await?;

    Ok(())
}
