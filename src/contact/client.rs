//! Client for the contact submission endpoint.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use super::form::{ContactForm, FieldError};
use crate::error::Error;
use crate::monitoring::Monitor;

pub const SENT_MESSAGE: &str = "Thank you! Your message has been sent.";
pub const REJECTED_MESSAGE: &str = "Something went wrong. Please try again.";
pub const NETWORK_MESSAGE: &str = "Network error. Please check your connection and try again.";

const SUBMIT_TIMEOUT: Duration = Duration::from_secs(15);

/// Body returned by the submission endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Result of a submission attempt, always reportable to the visitor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Validation failed; nothing was sent.
    Invalid(Vec<FieldError>),
    /// Endpoint accepted the form.
    Sent(String),
    /// Endpoint answered with `success: false`.
    Rejected(String),
    /// The request did not complete.
    Failed(String),
}

impl SubmitOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, SubmitOutcome::Sent(_))
    }

    /// Text to show the visitor.
    pub fn user_message(&self) -> String {
        match self {
            SubmitOutcome::Invalid(errors) => errors
                .iter()
                .map(|e| e.message.as_str())
                .collect::<Vec<_>>()
                .join(" "),
            SubmitOutcome::Sent(m) | SubmitOutcome::Rejected(m) | SubmitOutcome::Failed(m) => {
                m.clone()
            }
        }
    }
}

/// Validates and submits contact forms.
pub struct ContactClient {
    client: Client,
    submit_url: String,
    monitor: Arc<Monitor>,
}

impl ContactClient {
    pub fn new(submit_url: impl Into<String>, monitor: Arc<Monitor>) -> Self {
        Self {
            client: Client::new(),
            submit_url: submit_url.into(),
            monitor,
        }
    }

    /// Validate and submit. Never returns an error; failures become outcomes.
    pub async fn submit(&self, form: &ContactForm) -> SubmitOutcome {
        if let Err(errors) = form.validate() {
            tracing::debug!(count = errors.len(), "Contact form failed validation");
            return SubmitOutcome::Invalid(errors);
        }

        match self.post(&form.normalized()).await {
            Ok(SubmissionResponse { success: true, message }) => {
                tracing::info!("Contact form submitted");
                SubmitOutcome::Sent(message.unwrap_or_else(|| SENT_MESSAGE.to_string()))
            }
            Ok(SubmissionResponse { success: false, message }) => {
                tracing::warn!(?message, "Contact form rejected by endpoint");
                SubmitOutcome::Rejected(message.unwrap_or_else(|| REJECTED_MESSAGE.to_string()))
            }
            Err(e) => {
                tracing::error!("Contact form submission failed: {}", e);
                self.monitor.capture_exception(&e).await;
                SubmitOutcome::Failed(NETWORK_MESSAGE.to_string())
            }
        }
    }

    async fn post(&self, form: &ContactForm) -> Result<SubmissionResponse, Error> {
        let response = self
            .client
            .post(&self.submit_url)
            .timeout(SUBMIT_TIMEOUT)
            .json(form)
            .send()
            .await?;
        // The endpoint reports rejections in the body even on 4xx.
        let body = response.json::<SubmissionResponse>().await?;
        Ok(body)
    }
}
