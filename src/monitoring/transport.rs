//! HTTP transport for monitoring events.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use super::{MonitorEvent, Transport};
use crate::error::{Error, Result};

const SEND_TIMEOUT: Duration = Duration::from_secs(5);

/// Posts each event as JSON to the configured DSN.
pub struct HttpTransport {
    client: Client,
    endpoint: String,
}

impl HttpTransport {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, event: &MonitorEvent) -> Result<()> {
        let response = self
            .client
            .post(&self.endpoint)
            .timeout(SEND_TIMEOUT)
            .json(event)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Monitor(format!("ingest returned {}: {}", status, body)));
        }
        tracing::trace!(event_id = %event.event_id, "Monitoring event delivered");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitoring::{Level, Monitor, MonitorConfig};
    use axum::{http::StatusCode, routing::post, Json, Router};
    use std::sync::{Arc, Mutex};

    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_events_are_posted_as_json() {
        let seen: Arc<Mutex<Vec<serde_json::Value>>> = Arc::default();
        let sink = Arc::clone(&seen);
        let app = Router::new().route(
            "/ingest",
            post(move |Json(body): Json<serde_json::Value>| {
                let sink = Arc::clone(&sink);
                async move {
                    sink.lock().unwrap().push(body);
                    StatusCode::OK
                }
            }),
        );
        let base = serve(app).await;

        let config = MonitorConfig {
            dsn: Some(format!("{}/ingest", base)),
            environment: "test".to_string(),
            ..MonitorConfig::default()
        };
        let monitor = Monitor::init(&config);
        assert!(monitor.is_enabled());

        let id = monitor.capture_message("disk almost full", Level::Error).await;
        assert!(id.is_some());

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0]["message"], "disk almost full");
        assert_eq!(seen[0]["level"], "error");
        assert_eq!(seen[0]["environment"], "test");
    }

    #[tokio::test]
    async fn test_non_success_status_is_error() {
        let app = Router::new().route("/ingest", post(|| async { StatusCode::TOO_MANY_REQUESTS }));
        let base = serve(app).await;

        let transport = HttpTransport::new(format!("{}/ingest", base));
        let monitor = Monitor::with_transport(&MonitorConfig::default(), Arc::new(transport));
        assert!(monitor.capture_message("rate limited", Level::Fatal).await.is_none());
    }
}
