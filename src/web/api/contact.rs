//! Contact form submission endpoint.

use axum::{extract::State, http::StatusCode, Json};

use crate::contact::{client::SENT_MESSAGE, ContactForm, SubmissionResponse};
use crate::web::state::AppState;

const STORE_FAILED_MESSAGE: &str = "Could not save your message. Please try again later.";

/// Validate and store a contact form.
pub async fn submit_contact(
    State(state): State<AppState>,
    Json(form): Json<ContactForm>,
) -> (StatusCode, Json<SubmissionResponse>) {
    if let Err(errors) = form.validate() {
        let message = errors.first().map(|e| e.message.clone());
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(SubmissionResponse {
                success: false,
                message,
            }),
        );
    }

    let form = form.normalized();
    let store = state.store.clone();
    let result = tokio::task::spawn_blocking(move || store.insert(&form)).await;

    match result {
        Ok(Ok(id)) => {
            tracing::info!(submission_id = %id, "Contact submission stored");
            (
                StatusCode::OK,
                Json(SubmissionResponse {
                    success: true,
                    message: Some(SENT_MESSAGE.to_string()),
                }),
            )
        }
        Ok(Err(e)) => {
            tracing::error!("Failed to store contact submission: {}", e);
            state.monitor.capture_exception(&e).await;
            store_failed()
        }
        Err(e) => {
            tracing::error!("Contact store task failed: {}", e);
            state.monitor.capture_exception(&e).await;
            store_failed()
        }
    }
}

fn store_failed() -> (StatusCode, Json<SubmissionResponse>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(SubmissionResponse {
            success: false,
            message: Some(STORE_FAILED_MESSAGE.to_string()),
        }),
    )
}
