//! Messaging endpoint: relays `{chatId, message}` to the chat provider.

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use crate::error::Error;
use crate::telegram::ChatRequest;
use crate::web::state::AppState;

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ChatResponse {
    fn failed(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            message_id: None,
            error: Some(error.into()),
        }
    }
}

/// Relay a chat message.
pub async fn send_chat(
    State(state): State<AppState>,
    Json(payload): Json<ChatRequest>,
) -> (StatusCode, Json<ChatResponse>) {
    let Some(sender) = state.chat.clone() else {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ChatResponse::failed("messaging is not configured")),
        );
    };

    if payload.message.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ChatResponse::failed("message is required")),
        );
    }

    match sender.send(&payload.chat_id, &payload.message).await {
        Ok(message_id) => (
            StatusCode::OK,
            Json(ChatResponse {
                ok: true,
                message_id: Some(message_id),
                error: None,
            }),
        ),
        Err(Error::Validation(msg)) => (StatusCode::BAD_REQUEST, Json(ChatResponse::failed(msg))),
        Err(e) => {
            tracing::error!("Chat relay failed: {}", e);
            state.monitor.capture_exception(&e).await;
            (StatusCode::BAD_GATEWAY, Json(ChatResponse::failed(e.to_string())))
        }
    }
}
