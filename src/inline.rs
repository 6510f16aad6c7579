use anyhow::Result;
use tracing::{debug, info};
use uuid::Uuid;

use crate::card::{Card, ImageVariant};
use crate::reply::{build_caption, primary_image};
use crate::scryfall::CardSource;

/// Telegram accepts at most 50 results per inline answer.
pub const MAX_INLINE_RESULTS: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InlineItem {
    Photo {
        id: String,
        title: String,
        photo_url: String,
        thumbnail_url: String,
        caption: String,
    },
    Article {
        id: String,
        title: String,
        message_text: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineAnswer {
    pub items: Vec<InlineItem>,
    pub is_gallery: bool,
}

impl InlineAnswer {
    fn no_results(query: &str) -> Self {
        Self {
            items: vec![InlineItem::Article {
                id: Uuid::new_v4().to_string(),
                title: format!("No results found for query {}", query),
                message_text: format!("query {} returned no results", query),
            }],
            is_gallery: false,
        }
    }
}

fn photo_item(card: &Card) -> Result<InlineItem> {
    let image = primary_image(card, ImageVariant::Normal)?;
    let caption = build_caption(card)?;
    debug!("name={}, imgurl={}", card.name, image);

    Ok(InlineItem::Photo {
        id: Uuid::new_v4().to_string(),
        title: card.name.clone(),
        photo_url: image.clone(),
        thumbnail_url: image,
        caption,
    })
}

/// Run a Scryfall search for an inline query.
///
/// Returns `None` for an empty query, in which case nothing is answered.
pub async fn search_answer(source: &dyn CardSource, query: &str) -> Result<Option<InlineAnswer>> {
    info!("Received inline query: {:?}", query);
    if query.is_empty() {
        return Ok(None);
    }

    let response = source.search(query).await?;
    let Some(cards) = response.data else {
        return Ok(Some(InlineAnswer::no_results(query)));
    };
    debug!(
        "Search {:?} matched {:?} card(s), has_more={}",
        query, response.total_cards, response.has_more
    );

    // Every entry is mapped before truncating, so a malformed entry anywhere fails
    let mut items = cards.iter().map(photo_item).collect::<Result<Vec<_>>>()?;
    items.truncate(MAX_INLINE_RESULTS);

    Ok(Some(InlineAnswer {
        items,
        is_gallery: true,
    }))
}
