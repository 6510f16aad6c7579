use std::sync::Arc;

use anyhow::Result;
use tracing::debug;

use crate::card::{ImageVariant, NamedLookup};
use crate::config::Config;
use crate::inline::search_answer;
use crate::limiter::RateLimiter;
use crate::platform::{InlineResponder, ReplySink};
use crate::reply::format_card;
use crate::resolver::{extract_tokens, resolve, MENTION_FILTER};
use crate::scryfall::{CardSource, ScryfallClient};

pub const HELP_TEXT: &str = "Mention a card in square brackets and I'll post it:\n\n\
     [Black Lotus] - fuzzy name lookup\n\
     [Lightning Bolt|m10] - restrict to a set code\n\n\
     Inline mode: type @<bot> followed by a Scryfall search query.";

/// Shared application state
pub struct AppState {
    pub config: Config,
    pub cards: Arc<dyn CardSource>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let limiter = Arc::new(RateLimiter::new(
            config.rate_limit.max_requests,
            config.rate_limit.period(),
        ));
        let cards = Arc::new(ScryfallClient::new(config.scryfall.clone(), limiter));
        Self { config, cards }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
}

/// Recognise `/start` and `/help`, with or without a `@botname` suffix.
pub fn parse_command(text: &str) -> Option<Command> {
    let word = text.split_whitespace().next()?;
    let name = word.split('@').next().unwrap_or(word);
    match name {
        "/start" => Some(Command::Start),
        "/help" => Some(Command::Help),
        _ => None,
    }
}

/// What an incoming text message should trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Cards,
    Command(Command),
}

/// Bracketed card mentions win over commands, so `/help [Opt]` posts the card.
pub fn route(text: &str) -> Option<Route> {
    if MENTION_FILTER.is_match(text) {
        return Some(Route::Cards);
    }
    parse_command(text).map(Route::Command)
}

/// Look up every bracketed token in `text` and reply to each in turn.
///
/// Tokens are handled one after another: each lookup and its reply finish before
/// the next lookup starts.
pub async fn process_message(
    cards: &dyn CardSource,
    sink: &dyn ReplySink,
    text: &str,
) -> Result<()> {
    for token in extract_tokens(text) {
        match resolve(cards, token).await? {
            NamedLookup::Error(err) => {
                debug!(
                    "Lookup for {:?} failed ({:?} {:?}): {}",
                    token, err.status, err.code, err.details
                );
                sink.send_text(&err.details).await?;
            }
            NamedLookup::Card(card) => {
                let reply = format_card(&card, ImageVariant::Png)?;
                for photo in reply.photos() {
                    debug!("name={}, imgurl={}", card.name, photo.url);
                }
                sink.send_card(&reply).await?;
            }
        }
    }
    Ok(())
}

pub async fn process_inline_query(
    cards: &dyn CardSource,
    responder: &dyn InlineResponder,
    query: &str,
) -> Result<()> {
    if let Some(answer) = search_answer(cards, query).await? {
        responder.answer(answer).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::{ApiError, Card, CardFace, ImageUris, RelatedUris, SearchResponse};
    use crate::inline::InlineAnswer;
    use crate::reply::CardReply;
    use crate::resolver::CardQuery;
    use async_trait::async_trait;
    use std::sync::Mutex;

    type Events = Arc<Mutex<Vec<String>>>;

    fn card(name: &str, faces: usize) -> Card {
        let uris = |tag: &str| ImageUris {
            normal: Some(format!("https://img/{}.jpg", tag)),
            png: Some(format!("https://img/{}.png", tag)),
        };
        Card {
            name: name.to_string(),
            scryfall_uri: Some("https://scryfall.com/c".to_string()),
            related_uris: RelatedUris {
                gatherer: None,
                edhrec: Some("https://edhrec.com/c".to_string()),
            },
            image_uris: if faces == 0 { Some(uris(name)) } else { None },
            card_faces: if faces == 0 {
                None
            } else {
                Some(
                    (0..faces)
                        .map(|i| CardFace {
                            image_uris: Some(uris(&format!("{}-{}", name, i))),
                        })
                        .collect(),
                )
            },
        }
    }

    /// Knows "Black Lotus", "Opt" and the double-faced "Delver".
    struct FakeCards {
        events: Events,
    }

    #[async_trait]
    impl CardSource for FakeCards {
        async fn named(&self, query: &CardQuery) -> Result<NamedLookup> {
            self.events
                .lock()
                .unwrap()
                .push(format!("lookup {}|{}", query.name, query.edition));
            tokio::task::yield_now().await;
            Ok(match query.name.as_str() {
                "Black Lotus" | "Opt" => NamedLookup::Card(Box::new(card(&query.name, 0))),
                "Delver" => NamedLookup::Card(Box::new(card(&query.name, 2))),
                "Broken" => {
                    let mut c = card("Broken", 0);
                    c.related_uris.edhrec = None;
                    NamedLookup::Card(Box::new(c))
                }
                other => NamedLookup::Error(ApiError {
                    details: format!("No cards found matching “{}”", other),
                    ..Default::default()
                }),
            })
        }

        async fn search(&self, query: &str) -> Result<SearchResponse> {
            self.events.lock().unwrap().push(format!("search {}", query));
            Ok(SearchResponse {
                data: Some(vec![card("Lightning Bolt", 0), card("Opt", 0), card("Delver", 2)]),
                ..Default::default()
            })
        }
    }

    struct FakeChat {
        events: Events,
    }

    #[async_trait]
    impl ReplySink for FakeChat {
        async fn send_card(&self, reply: &CardReply) -> Result<()> {
            let kind = match reply {
                CardReply::Photo(_) => "photo",
                CardReply::MediaGroup(_) => "group",
            };
            self.events
                .lock()
                .unwrap()
                .push(format!("{} {}", kind, reply.photos().len()));
            Ok(())
        }

        async fn send_text(&self, text: &str) -> Result<()> {
            self.events.lock().unwrap().push(format!("text {}", text));
            Ok(())
        }
    }

    #[async_trait]
    impl InlineResponder for FakeChat {
        async fn answer(&self, answer: InlineAnswer) -> Result<()> {
            self.events.lock().unwrap().push(format!(
                "answer {} gallery={}",
                answer.items.len(),
                answer.is_gallery
            ));
            Ok(())
        }
    }

    fn fakes() -> (FakeCards, FakeChat, Events) {
        let events: Events = Arc::new(Mutex::new(Vec::new()));
        (
            FakeCards {
                events: events.clone(),
            },
            FakeChat {
                events: events.clone(),
            },
            events,
        )
    }

    fn take(events: &Events) -> Vec<String> {
        events.lock().unwrap().clone()
    }

    #[tokio::test]
    async fn test_single_card_single_reply() {
        let (cards, chat, events) = fakes();
        process_message(&cards, &chat, "check out [Black Lotus]")
            .await
            .unwrap();
        assert_eq!(take(&events), vec!["lookup Black Lotus|", "photo 1"]);
    }

    #[tokio::test]
    async fn test_tokens_are_handled_sequentially_in_order() {
        let (cards, chat, events) = fakes();
        process_message(&cards, &chat, "[Opt|m10] beats [Nope] and [Delver]")
            .await
            .unwrap();
        assert_eq!(
            take(&events),
            vec![
                "lookup Opt|m10",
                "photo 1",
                "lookup Nope|",
                "text No cards found matching “Nope”",
                "lookup Delver|",
                "group 2",
            ]
        );
    }

    #[tokio::test]
    async fn test_malformed_card_stops_processing() {
        let (cards, chat, events) = fakes();
        let result = process_message(&cards, &chat, "[Broken] [Opt]").await;
        assert!(result.is_err());
        assert_eq!(take(&events), vec!["lookup Broken|"]);
    }

    #[tokio::test]
    async fn test_message_without_tokens_is_ignored() {
        let (cards, chat, events) = fakes();
        process_message(&cards, &chat, "no cards here []").await.unwrap();
        assert!(take(&events).is_empty());
    }

    #[tokio::test]
    async fn test_inline_query_answers_gallery() {
        let (cards, chat, events) = fakes();
        process_inline_query(&cards, &chat, "lightning bolt")
            .await
            .unwrap();
        assert_eq!(
            take(&events),
            vec!["search lightning bolt", "answer 3 gallery=true"]
        );
    }

    #[tokio::test]
    async fn test_empty_inline_query_is_silent() {
        let (cards, chat, events) = fakes();
        process_inline_query(&cards, &chat, "").await.unwrap();
        assert!(take(&events).is_empty());
    }

    #[test]
    fn test_parse_command() {
        assert_eq!(parse_command("/start"), Some(Command::Start));
        assert_eq!(parse_command("/help@scrybot"), Some(Command::Help));
        assert_eq!(parse_command("/help me"), Some(Command::Help));
        assert_eq!(parse_command("/clear"), None);
        assert_eq!(parse_command("[Opt] /help"), None);
        assert_eq!(parse_command(""), None);
    }

    #[test]
    fn test_route_prefers_card_mentions() {
        assert_eq!(route("/help [Opt]"), Some(Route::Cards));
        assert_eq!(route("/start [Black Lotus|lea]"), Some(Route::Cards));
        assert_eq!(route("check out [Opt]"), Some(Route::Cards));
        assert_eq!(route("/help"), Some(Route::Command(Command::Help)));
        assert_eq!(route("/start@scrybot"), Some(Route::Command(Command::Start)));
        assert_eq!(route("/help []"), Some(Route::Command(Command::Help)));
        assert_eq!(route("just chatting"), None);
    }

    #[test]
    fn test_app_state_builds_from_config() {
        let config = Config::parse("[auth]\nbot_token = \"t\"\n").unwrap();
        let state = AppState::new(config);
        assert_eq!(state.config.rate_limit.max_requests, 10);
    }
}
