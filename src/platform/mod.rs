pub mod telegram;

use anyhow::Result;
use async_trait::async_trait;

use crate::inline::InlineAnswer;
use crate::reply::CardReply;

/// Replies to one incoming chat message. Every send quotes that message.
#[async_trait]
pub trait ReplySink: Send + Sync {
    /// Send a resolved card as a single photo or a media group.
    async fn send_card(&self, reply: &CardReply) -> Result<()>;

    /// Send a plain text reply.
    async fn send_text(&self, text: &str) -> Result<()>;
}

/// Answers one incoming inline query.
#[async_trait]
pub trait InlineResponder: Send + Sync {
    async fn answer(&self, answer: InlineAnswer) -> Result<()>;
}
