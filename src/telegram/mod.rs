//! Messaging integration: endpoint client, deep links, and Telegram relay.

pub mod client;
pub mod relay;

pub use client::{chat_link, ChatClient, ChatRequest};
pub use relay::{ChatSender, TelegramRelay};
