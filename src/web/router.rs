//! Route definitions for web server.

use axum::{
    routing::{get, post},
    Router,
};

use super::api;
use super::state::AppState;

/// Create the API router.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        // Agents
        .route("/events", post(api::post_event))
        .route("/route", post(api::post_route))
        .route("/status", get(api::list_status).post(api::post_status))
        .route("/agents/:id/inbox", get(api::get_inbox))

        // Peripheral endpoints
        .route("/contact", post(api::submit_contact))
        .route("/chat", post(api::send_chat))
}

/// Create the full app router.
pub fn create_app_router(state: AppState) -> Router {
    Router::new()
        .nest("/api", create_api_router())
        .route("/health", get(health_check))
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}
