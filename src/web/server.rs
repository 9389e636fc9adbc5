//! Web server using Axum.

use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::router::create_app_router;
use super::state::AppState;
use crate::config::Settings;
use crate::core::run_dispatcher;
use crate::error::{Error, Result};

/// Web server configuration.
pub struct WebServerConfig {
    pub port: u16,
    pub host: String,
}

impl Default for WebServerConfig {
    fn default() -> Self {
        Self {
            port: 3333,
            host: "0.0.0.0".to_string(),
        }
    }
}

/// Run the web server and the event dispatcher until the server stops.
pub async fn run_server(config: WebServerConfig, settings: &Settings) -> Result<()> {
    let (state, rx) = AppState::from_settings(settings)?;
    let dispatcher = tokio::spawn(run_dispatcher(Arc::clone(&state.dispatcher), rx));

    let app = create_app_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );

    let listener = bind(&config.host, config.port).await?;
    if let Ok(addr) = listener.local_addr() {
        tracing::info!("Starting web server on {}", addr);
    }

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    // Dropping the router dropped every bus sender; let the dispatcher drain.
    match dispatcher.await {
        Ok(handled) => tracing::info!(handled, "Dispatcher drained"),
        Err(e) => tracing::warn!("Dispatcher task failed: {}", e),
    }

    served.map_err(|e| Error::Web(format!("server: {}", e)))
}

/// Bind a listener. Accepts host names, IPv4 and bare IPv6 literals.
async fn bind(host: &str, port: u16) -> Result<TcpListener> {
    let host = host.trim_start_matches('[').trim_end_matches(']');
    TcpListener::bind((host, port))
        .await
        .map_err(|e| Error::Web(format!("Failed to bind {}:{}: {}", host, port, e)))
}

/// Run the web server using settings for host and port.
pub async fn run_web_server(settings: &Settings) -> Result<()> {
    let config = WebServerConfig {
        port: settings.web.port,
        host: settings.web.host.clone(),
    };

    run_server(config, settings).await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_bind_accepts_host_names() {
        let listener = bind("localhost", 0).await.unwrap();
        assert!(listener.local_addr().unwrap().ip().is_loopback());

        let listener = bind("127.0.0.1", 0).await.unwrap();
        assert_ne!(listener.local_addr().unwrap().port(), 0);
    }

    #[tokio::test]
    async fn test_bind_reports_unresolvable_host() {
        let err = bind("no such host", 0).await.unwrap_err();
        assert!(matches!(err, Error::Web(_)));
    }
}
