use anyhow::{Context, Result};

use crate::card::{Card, CardFace, ImageUris, ImageVariant};

/// One image in an outgoing reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Photo {
    pub url: String,
    pub caption: Option<String>,
}

/// Shape of the reply for a resolved card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CardReply {
    /// Single-faced card: one captioned photo.
    Photo(Photo),
    /// Multi-faced card: one photo per face, caption on the first only.
    MediaGroup(Vec<Photo>),
}

impl CardReply {
    pub fn photos(&self) -> &[Photo] {
        match self {
            CardReply::Photo(photo) => std::slice::from_ref(photo),
            CardReply::MediaGroup(photos) => photos,
        }
    }
}

/// Card name on the first line, then `(G)`, `(SF)` and `(EDHREC)` links, each
/// followed by a space. Gatherer is optional; the other two must be present.
pub fn build_caption(card: &Card) -> Result<String> {
    let scryfall = card
        .scryfall_uri
        .as_deref()
        .with_context(|| format!("Card '{}' has no scryfall_uri", card.name))?;
    let edhrec = card
        .related_uris
        .edhrec
        .as_deref()
        .with_context(|| format!("Card '{}' has no related_uris.edhrec", card.name))?;

    let mut links: Vec<(&str, &str)> = Vec::with_capacity(3);
    if let Some(gatherer) = card.related_uris.gatherer.as_deref() {
        links.push(("(G)", gatherer));
    }
    links.push(("(SF)", scryfall));
    links.push(("(EDHREC)", edhrec));

    let mut caption = format!("{}\n", html_escape::encode_text(&card.name));
    for (label, url) in links {
        caption.push_str(&format!("<a href=\"{}\">{}</a> ", url, label));
    }
    Ok(caption)
}

fn image_url(uris: Option<&ImageUris>, variant: ImageVariant, card: &Card) -> Result<String> {
    uris.and_then(|uris| uris.get(variant))
        .map(str::to_string)
        .with_context(|| {
            format!(
                "Card '{}' has no '{}' image",
                card.name,
                variant.as_str()
            )
        })
}

fn faces(card: &Card) -> Option<&[CardFace]> {
    card.card_faces
        .as_deref()
        .filter(|faces| !faces.is_empty())
}

/// Top-level image, falling back to the first face's image.
pub fn primary_image(card: &Card, variant: ImageVariant) -> Result<String> {
    match (&card.image_uris, faces(card)) {
        (Some(uris), _) => image_url(Some(uris), variant, card),
        (None, Some(faces)) => image_url(faces[0].image_uris.as_ref(), variant, card),
        (None, None) => image_url(None, variant, card),
    }
}

/// Build the reply for a card. A card with `card_faces` gets one image per face.
pub fn format_card(card: &Card, variant: ImageVariant) -> Result<CardReply> {
    let caption = build_caption(card)?;

    let Some(faces) = faces(card) else {
        let url = image_url(card.image_uris.as_ref(), variant, card)?;
        return Ok(CardReply::Photo(Photo {
            url,
            caption: Some(caption),
        }));
    };

    let mut photos = Vec::with_capacity(faces.len());
    for face in faces {
        photos.push(Photo {
            url: image_url(face.image_uris.as_ref(), variant, card)?,
            caption: None,
        });
    }
    photos[0].caption = Some(caption);

    // Telegram media groups need at least two items
    if photos.len() == 1 {
        return Ok(CardReply::Photo(photos.remove(0)));
    }
    Ok(CardReply::MediaGroup(photos))
}
