//! Server-side relay that delivers chat messages through the Telegram Bot API.

use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::Recipient;

use crate::error::{Error, Result};

/// Something that can deliver a text message to a chat.
#[async_trait]
pub trait ChatSender: Send + Sync {
    /// Deliver `text` and return the provider's message id.
    async fn send(&self, chat_id: &str, text: &str) -> Result<i64>;
}

/// Resolve a chat id string: numeric ids or `@channel` usernames.
pub fn parse_recipient(chat_id: &str) -> Result<Recipient> {
    let chat_id = chat_id.trim();
    if let Ok(id) = chat_id.parse::<i64>() {
        return Ok(Recipient::Id(ChatId(id)));
    }
    if chat_id.len() > 1 && chat_id.starts_with('@') {
        return Ok(Recipient::ChannelUsername(chat_id.to_string()));
    }
    Err(Error::Validation(format!("invalid chat id '{}'", chat_id)))
}

/// Telegram bot relay.
pub struct TelegramRelay {
    bot: Bot,
}

impl TelegramRelay {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            bot: Bot::new(token),
        }
    }
}

#[async_trait]
impl ChatSender for TelegramRelay {
    async fn send(&self, chat_id: &str, text: &str) -> Result<i64> {
        let recipient = parse_recipient(chat_id)?;
        let sent = self
            .bot
            .send_message(recipient, text)
            .await
            .map_err(|e| Error::Messaging(format!("telegram: {}", e)))?;
        tracing::info!(chat_id = %chat_id, message_id = sent.id.0, "Relayed message to Telegram");
        Ok(i64::from(sent.id.0))
    }
}
