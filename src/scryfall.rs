use std::future::Future;
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::Url;
use serde_json::Value;
use tracing::debug;

use crate::card::{NamedLookup, SearchResponse};
use crate::config::ScryfallConfig;
use crate::limiter::RateLimiter;
use crate::resolver::CardQuery;

/// Read-only card database used by the handlers.
#[async_trait]
pub trait CardSource: Send + Sync {
    /// `GET /cards/named?fuzzy=<name>&set=<edition>`
    async fn named(&self, query: &CardQuery) -> Result<NamedLookup>;

    /// `GET /cards/search?q=<query>`
    async fn search(&self, query: &str) -> Result<SearchResponse>;
}

pub struct ScryfallClient {
    config: ScryfallConfig,
    limiter: Arc<RateLimiter>,
}

impl ScryfallClient {
    pub fn new(config: ScryfallConfig, limiter: Arc<RateLimiter>) -> Self {
        Self { config, limiter }
    }

    fn named_url(&self, query: &CardQuery) -> Result<Url> {
        Url::parse_with_params(
            &format!("{}/cards/named", self.config.base_url),
            &[
                ("fuzzy", query.name.as_str()),
                ("set", query.edition.as_str()),
            ],
        )
        .context("Failed to build named-card URL")
    }

    /// The query text is appended as typed; Scryfall parses its own search syntax.
    fn search_url(&self, query: &str) -> Result<Url> {
        Url::parse(&format!("{}/cards/search?q={}", self.config.base_url, query))
            .with_context(|| format!("Failed to build search URL for query: {}", query))
    }

    /// Acquire a limiter slot, open a fresh HTTP client, issue the GET and hand the
    /// response to `read`. The response is owned by `read` and dropped on every path.
    ///
    /// Error statuses are not treated as failures: Scryfall reports them as JSON
    /// bodies that the caller interprets.
    async fn limited_fetch<T, F, Fut>(&self, url: Url, read: F) -> Result<T>
    where
        F: FnOnce(reqwest::Response) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        self.limiter.acquire().await;

        let client = reqwest::Client::builder()
            .user_agent(self.config.user_agent.as_str())
            .build()
            .context("Failed to build HTTP client")?;

        debug!("GET {}", url);
        let response = client
            .get(url.clone())
            .header(ACCEPT, "application/json")
            .send()
            .await
            .with_context(|| format!("Failed to send request to Scryfall: {}", url))?;
        debug!("Scryfall responded {} for {}", response.status(), url);

        read(response).await
    }

    async fn fetch_json(&self, url: Url) -> Result<Value> {
        self.limited_fetch(url, |response| async move {
            response
                .json::<Value>()
                .await
                .context("Failed to parse Scryfall response")
        })
        .await
    }
}

#[async_trait]
impl CardSource for ScryfallClient {
    async fn named(&self, query: &CardQuery) -> Result<NamedLookup> {
        let url = self.named_url(query)?;
        let body = self.fetch_json(url).await?;
        NamedLookup::from_value(body)
    }

    async fn search(&self, query: &str) -> Result<SearchResponse> {
        let url = self.search_url(query)?;
        let body = self.fetch_json(url).await?;
        serde_json::from_value(body).context("Malformed search response from Scryfall")
    }
}
