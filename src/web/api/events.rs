//! API endpoints for relay events, routing, status, and inboxes.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::agent::{AgentId, StatusValue};
use crate::core::RouteOutcome;
use crate::protocol::{ReceivedMessage, RelayEvent};
use crate::web::state::AppState;

/// Route request.
#[derive(Deserialize)]
pub struct RouteRequest {
    pub from: AgentId,
    pub to: String,
    pub message: String,
}

/// Status update request.
#[derive(Deserialize)]
pub struct StatusRequest {
    pub agent: AgentId,
    pub status: StatusValue,
}

#[derive(Serialize)]
pub struct QueuedResponse {
    pub queued: bool,
}

#[derive(Serialize)]
pub struct StatusUpdateResponse {
    pub updated: bool,
}

/// Indicator state for one agent.
#[derive(Serialize)]
pub struct StatusResponse {
    pub agent: AgentId,
    pub status: Option<StatusValue>,
    pub title: String,
}

/// Queue an event for the dispatcher.
pub async fn post_event(
    State(state): State<AppState>,
    Json(event): Json<RelayEvent>,
) -> (StatusCode, Json<QueuedResponse>) {
    tracing::debug!(kind = event.kind(), "Event received over HTTP");
    if state.bus.publish(event) {
        (StatusCode::ACCEPTED, Json(QueuedResponse { queued: true }))
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(QueuedResponse { queued: false }),
        )
    }
}

/// Route a message synchronously and report what happened.
pub async fn post_route(
    State(state): State<AppState>,
    Json(payload): Json<RouteRequest>,
) -> Json<RouteOutcome> {
    Json(
        state
            .dispatcher
            .route(payload.from, &payload.to, &payload.message),
    )
}

/// Apply a status update immediately.
pub async fn post_status(
    State(state): State<AppState>,
    Json(payload): Json<StatusRequest>,
) -> Json<StatusUpdateResponse> {
    let updated = state.dispatcher.update_status(payload.agent, payload.status);
    Json(StatusUpdateResponse { updated })
}

/// Current indicator states.
pub async fn list_status(State(state): State<AppState>) -> Json<Vec<StatusResponse>> {
    let statuses = state
        .dispatcher
        .board()
        .snapshot()
        .into_iter()
        .map(|(agent, status, title)| StatusResponse {
            agent,
            status,
            title,
        })
        .collect();
    Json(statuses)
}

/// Messages received by an agent.
pub async fn get_inbox(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<ReceivedMessage>>, StatusCode> {
    let agent = AgentId::parse(&id).ok_or(StatusCode::NOT_FOUND)?;
    let inbox = state.inboxes.get(&agent).ok_or(StatusCode::NOT_FOUND)?;
    Ok(Json(inbox.messages()))
}
