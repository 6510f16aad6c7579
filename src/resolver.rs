use std::sync::LazyLock;

use anyhow::Result;
use regex::Regex;
use tracing::info;

use crate::card::NamedLookup;
use crate::scryfall::CardSource;

/// Matches a message that contains at least one bracketed token.
pub static MENTION_FILTER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[.+\]").expect("valid mention filter regex"));

static TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[(.+?)\]").expect("valid token regex"));

/// Fuzzy name plus optional set code, parsed from `Name|SET`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardQuery {
    pub name: String,
    /// Empty means any edition.
    pub edition: String,
}

impl CardQuery {
    /// Split on `|`: the first segment is the name, the second the edition.
    /// Anything after a second `|` is ignored. No trimming or validation.
    pub fn parse(token: &str) -> Self {
        let mut parts = token.split('|');
        let name = parts.next().unwrap_or_default().to_string();
        let edition = parts.next().unwrap_or_default().to_string();
        Self { name, edition }
    }
}

/// Bracketed tokens in left-to-right order.
pub fn extract_tokens(text: &str) -> Vec<&str> {
    TOKEN
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str())
        .collect()
}

pub async fn resolve(source: &dyn CardSource, token: &str) -> Result<NamedLookup> {
    let query = CardQuery::parse(token);
    info!(
        "Looking up card: name={:?} edition={:?}",
        query.name, query.edition
    );
    source.named(&query).await
}
