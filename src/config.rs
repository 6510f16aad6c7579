use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub auth: AuthConfig,
    #[serde(default)]
    pub scryfall: ScryfallConfig,
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub bot_token: String,
    /// MTProto application id. The Bot API transport only needs `bot_token`.
    #[serde(default)]
    pub api_id: Option<i64>,
    #[serde(default)]
    pub api_hash: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ScryfallConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for ScryfallConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            user_agent: default_user_agent(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct RateLimitConfig {
    #[serde(default = "default_max_requests")]
    pub max_requests: usize,
    #[serde(default = "default_period_ms")]
    pub period_ms: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: default_max_requests(),
            period_ms: default_period_ms(),
        }
    }
}

impl RateLimitConfig {
    pub fn period(&self) -> Duration {
        Duration::from_millis(self.period_ms)
    }
}

fn default_base_url() -> String {
    "https://api.scryfall.com".to_string()
}

fn default_user_agent() -> String {
    format!("scrybot/{}", env!("CARGO_PKG_VERSION"))
}

fn default_max_requests() -> usize {
    10
}

fn default_period_ms() -> u64 {
    1000
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        let mut config: Config = toml::from_str(content)?;

        if config.auth.bot_token.trim().is_empty() {
            anyhow::bail!("auth.bot_token must not be empty");
        }
        if config.rate_limit.max_requests == 0 || config.rate_limit.period_ms == 0 {
            anyhow::bail!(
                "rate_limit values must be positive (max_requests = {}, period_ms = {})",
                config.rate_limit.max_requests,
                config.rate_limit.period_ms
            );
        }

        // Endpoints are joined as "{base_url}/cards/..."
        while config.scryfall.base_url.ends_with('/') {
            config.scryfall.base_url.pop();
        }

        Ok(config)
    }
}
