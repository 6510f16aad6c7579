use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value;

/// Image resolution picked from a card's `image_uris`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageVariant {
    /// Full-size PNG, used for direct replies.
    Png,
    /// Medium JPEG, used for inline thumbnails.
    Normal,
}

impl ImageVariant {
    pub fn as_str(self) -> &'static str {
        match self {
            ImageVariant::Png => "png",
            ImageVariant::Normal => "normal",
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct ImageUris {
    #[serde(default)]
    pub normal: Option<String>,
    #[serde(default)]
    pub png: Option<String>,
}

impl ImageUris {
    pub fn get(&self, variant: ImageVariant) -> Option<&str> {
        match variant {
            ImageVariant::Png => self.png.as_deref(),
            ImageVariant::Normal => self.normal.as_deref(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct RelatedUris {
    #[serde(default)]
    pub gatherer: Option<String>,
    #[serde(default)]
    pub edhrec: Option<String>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct CardFace {
    #[serde(default)]
    pub image_uris: Option<ImageUris>,
}

/// A card record as returned by Scryfall. Only the fields the bot reads are modeled.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Card {
    pub name: String,
    #[serde(default)]
    pub scryfall_uri: Option<String>,
    #[serde(default)]
    pub related_uris: RelatedUris,
    #[serde(default)]
    pub image_uris: Option<ImageUris>,
    #[serde(default)]
    pub card_faces: Option<Vec<CardFace>>,
}

/// Scryfall's `{"object": "error"}` payload.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct ApiError {
    #[serde(default)]
    pub details: String,
    #[serde(default)]
    pub status: Option<u16>,
    #[serde(default)]
    pub code: Option<String>,
}

/// Outcome of a named lookup: either a card or the API's own error record.
#[derive(Debug, Clone, PartialEq)]
pub enum NamedLookup {
    Card(Box<Card>),
    Error(ApiError),
}

impl NamedLookup {
    pub fn from_value(value: Value) -> Result<Self> {
        if value.get("object").and_then(Value::as_str) == Some("error") {
            let error: ApiError =
                serde_json::from_value(value).context("Malformed error object from Scryfall")?;
            return Ok(NamedLookup::Error(error));
        }

        let card: Card =
            serde_json::from_value(value).context("Malformed card object from Scryfall")?;
        Ok(NamedLookup::Card(Box::new(card)))
    }
}

/// Response of `/cards/search`. A missing `data` field means no matches.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct SearchResponse {
    #[serde(default)]
    pub data: Option<Vec<Card>>,
    #[serde(default)]
    pub total_cards: Option<u64>,
    #[serde(default)]
    pub has_more: bool,
}
