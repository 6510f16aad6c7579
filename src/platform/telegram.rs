use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Url;
use teloxide::prelude::*;
use teloxide::types::{
    InlineQueryResult, InlineQueryResultArticle, InlineQueryResultPhoto, InputFile, InputMedia,
    InputMediaPhoto, InputMessageContent, InputMessageContentText, MessageId, ParseMode,
    ReplyParameters,
};
use tracing::{debug, info};

use crate::bot::{process_inline_query, process_message, route, AppState, Route, HELP_TEXT};
use crate::inline::{InlineAnswer, InlineItem};
use crate::platform::{InlineResponder, ReplySink};
use crate::reply::{CardReply, Photo};

fn parse_url(url: &str) -> Result<Url> {
    Url::parse(url).with_context(|| format!("Invalid image URL: {}", url))
}

/// Quote-replies into the chat a message came from.
pub struct ChatReplier {
    bot: Bot,
    chat_id: ChatId,
    reply_to: MessageId,
}

impl ChatReplier {
    pub fn new(bot: Bot, chat_id: ChatId, reply_to: MessageId) -> Self {
        Self {
            bot,
            chat_id,
            reply_to,
        }
    }
}

fn input_media(photo: &Photo) -> Result<InputMedia> {
    let mut media = InputMediaPhoto::new(InputFile::url(parse_url(&photo.url)?));
    if let Some(caption) = &photo.caption {
        media = media.caption(caption.as_str()).parse_mode(ParseMode::Html);
    }
    Ok(InputMedia::Photo(media))
}

#[async_trait]
impl ReplySink for ChatReplier {
    async fn send_card(&self, reply: &CardReply) -> Result<()> {
        match reply {
            CardReply::Photo(photo) => {
                let mut request = self
                    .bot
                    .send_photo(self.chat_id, InputFile::url(parse_url(&photo.url)?))
                    .reply_parameters(ReplyParameters::new(self.reply_to));
                if let Some(caption) = &photo.caption {
                    request = request.caption(caption.as_str()).parse_mode(ParseMode::Html);
                }
                request.await?;
            }
            CardReply::MediaGroup(photos) => {
                let media = photos.iter().map(input_media).collect::<Result<Vec<_>>>()?;
                self.bot
                    .send_media_group(self.chat_id, media)
                    .reply_parameters(ReplyParameters::new(self.reply_to))
                    .await?;
            }
        }
        Ok(())
    }

    async fn send_text(&self, text: &str) -> Result<()> {
        self.bot
            .send_message(self.chat_id, text)
            .reply_parameters(ReplyParameters::new(self.reply_to))
            .await?;
        Ok(())
    }
}

/// Answers a single inline query.
pub struct InlineAnswerer {
    bot: Bot,
    query: InlineQuery,
}

impl InlineAnswerer {
    pub fn new(bot: Bot, query: InlineQuery) -> Self {
        Self { bot, query }
    }
}

fn inline_result(item: InlineItem) -> Result<InlineQueryResult> {
    Ok(match item {
        InlineItem::Photo {
            id,
            title,
            photo_url,
            thumbnail_url,
            caption,
        } => InlineQueryResult::Photo(
            InlineQueryResultPhoto::new(id, parse_url(&photo_url)?, parse_url(&thumbnail_url)?)
                .title(title)
                .caption(caption)
                .parse_mode(ParseMode::Html),
        ),
        InlineItem::Article {
            id,
            title,
            message_text,
        } => InlineQueryResult::Article(InlineQueryResultArticle::new(
            id,
            title,
            InputMessageContent::Text(InputMessageContentText::new(message_text)),
        )),
    })
}

#[async_trait]
impl InlineResponder for InlineAnswerer {
    async fn answer(&self, answer: InlineAnswer) -> Result<()> {
        // Bot API clients lay photo results out as a grid on their own,
        // so the gallery flag has no request parameter to map to.
        debug!(
            "Answering inline query {:?} with {} result(s), gallery={}",
            self.query.id,
            answer.items.len(),
            answer.is_gallery
        );
        let results = answer
            .items
            .into_iter()
            .map(inline_result)
            .collect::<Result<Vec<_>>>()?;
        self.bot
            .answer_inline_query(self.query.id.clone(), results)
            .await?;
        Ok(())
    }
}

/// Run the Telegram bot
pub async fn run(state: Arc<AppState>) -> Result<()> {
    let bot = Bot::new(&state.config.auth.bot_token);

    info!("Starting Telegram platform...");

    let handler = dptree::entry()
        .branch(
            Update::filter_message()
                .branch(
                    dptree::filter(|msg: Message| {
                        msg.text().and_then(route) == Some(Route::Cards)
                    })
                    .endpoint(handle_card_message),
                )
                .branch(
                    dptree::filter(|msg: Message| {
                        matches!(msg.text().and_then(route), Some(Route::Command(_)))
                    })
                    .endpoint(handle_command),
                ),
        )
        .branch(Update::filter_inline_query().endpoint(handle_inline_query));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state])
        .default_handler(|upd| async move {
            debug!("Unhandled update: {:?}", upd.id);
        })
        .error_handler(LoggingErrorHandler::with_custom_text("scrybot"))
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}

async fn handle_command(bot: Bot, msg: Message) -> Result<()> {
    bot.send_message(msg.chat.id, HELP_TEXT).await?;
    Ok(())
}

async fn handle_card_message(bot: Bot, msg: Message, state: Arc<AppState>) -> Result<()> {
    let Some(text) = msg.text() else {
        return Ok(());
    };

    info!("Card mention in chat {}: {}", msg.chat.id.0, text);

    let replier = ChatReplier::new(bot, msg.chat.id, msg.id);
    process_message(state.cards.as_ref(), &replier, text).await
}

async fn handle_inline_query(bot: Bot, query: InlineQuery, state: Arc<AppState>) -> Result<()> {
    let text = query.query.clone();
    let answerer = InlineAnswerer::new(bot, query);
    process_inline_query(state.cards.as_ref(), &answerer, &text).await
}
