//! Client for the messaging endpoint and Telegram deep links.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

use crate::error::{Error, Result};

const SEND_TIMEOUT: Duration = Duration::from_secs(15);

/// Payload accepted by the messaging endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub chat_id: String,
    pub message: String,
}

/// Thin wrapper around the messaging endpoint.
#[derive(Debug, Clone)]
pub struct ChatClient {
    client: Client,
    endpoint_url: String,
}

impl ChatClient {
    pub fn new(endpoint_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint_url: endpoint_url.into(),
        }
    }

    /// Send `message` to `chat_id`, returning the provider's JSON response.
    pub async fn send_message(&self, chat_id: &str, message: &str) -> Result<serde_json::Value> {
        let request = ChatRequest {
            chat_id: chat_id.trim().to_string(),
            message: message.to_string(),
        };
        if request.chat_id.is_empty() {
            return Err(Error::Validation("chat id is required".to_string()));
        }
        if request.message.trim().is_empty() {
            return Err(Error::Validation("message is required".to_string()));
        }

        let response = self
            .client
            .post(&self.endpoint_url)
            .timeout(SEND_TIMEOUT)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(chat_id = %request.chat_id, %status, "Messaging endpoint rejected message");
            return Err(Error::Messaging(format!("endpoint returned {}: {}", status, body)));
        }

        let value = response.json::<serde_json::Value>().await?;
        tracing::info!(chat_id = %request.chat_id, "Message sent via messaging endpoint");
        Ok(value)
    }
}

/// Build a `https://t.me/<username>` link, optionally with a start payload.
pub fn chat_link(username: &str, start: Option<&str>) -> Result<String> {
    let username = username.trim().trim_start_matches('@');
    if username.is_empty() || !username.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(Error::Validation(format!(
            "invalid Telegram username '{}'",
            username
        )));
    }

    let mut url = Url::parse("https://t.me/")
        .and_then(|base| base.join(username))
        .map_err(|e| Error::Other(format!("chat link: {}", e)))?;
    if let Some(payload) = start.filter(|p| !p.is_empty()) {
        url.query_pairs_mut().append_pair("start", payload);
    }
    Ok(url.to_string())
}
