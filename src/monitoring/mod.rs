//! Error monitoring facade.
//!
//! Configured once at startup. When no DSN is configured there is no SDK and
//! every capture call degrades to a log line.

pub mod transport;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use crate::error::Result;

pub use transport::HttpTransport;

/// Monitoring configuration.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct MonitorConfig {
    /// Ingest endpoint. `None` disables the SDK.
    pub dsn: Option<String>,
    #[serde(default = "default_environment")]
    pub environment: String,
    pub release: Option<String>,
    #[serde(default = "default_traces_sample_rate")]
    pub traces_sample_rate: f64,
    #[serde(default = "default_replays_session_sample_rate")]
    pub replays_session_sample_rate: f64,
    #[serde(default = "default_replays_on_error_sample_rate")]
    pub replays_on_error_sample_rate: f64,
}

fn default_environment() -> String {
    "production".to_string()
}

fn default_traces_sample_rate() -> f64 {
    0.1
}

fn default_replays_session_sample_rate() -> f64 {
    0.1
}

fn default_replays_on_error_sample_rate() -> f64 {
    1.0
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            dsn: None,
            environment: default_environment(),
            release: None,
            traces_sample_rate: default_traces_sample_rate(),
            replays_session_sample_rate: default_replays_session_sample_rate(),
            replays_on_error_sample_rate: default_replays_on_error_sample_rate(),
        }
    }
}

impl MonitorConfig {
    /// Copy with every rate forced into `0.0..=1.0` (NaN becomes 0.0).
    pub fn clamped(&self) -> Self {
        let mut config = self.clone();
        config.traces_sample_rate = clamp_rate(config.traces_sample_rate);
        config.replays_session_sample_rate = clamp_rate(config.replays_session_sample_rate);
        config.replays_on_error_sample_rate = clamp_rate(config.replays_on_error_sample_rate);
        config
    }
}

fn clamp_rate(rate: f64) -> f64 {
    if rate.is_nan() {
        0.0
    } else {
        rate.clamp(0.0, 1.0)
    }
}

/// Severity of a captured event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Debug,
    Info,
    Warning,
    Error,
    Fatal,
}

/// User attached to subsequent events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitorUser {
    pub id: Option<String>,
    pub email: Option<String>,
    pub username: Option<String>,
}

/// Captured error details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExceptionInfo {
    pub value: String,
    /// `source()` chain, outermost first, excluding `value`.
    pub causes: Vec<String>,
}

impl ExceptionInfo {
    pub fn from_error(error: &(dyn std::error::Error + 'static)) -> Self {
        let mut causes = Vec::new();
        let mut source = error.source();
        while let Some(cause) = source {
            causes.push(cause.to_string());
            source = cause.source();
        }
        Self {
            value: error.to_string(),
            causes,
        }
    }
}

/// Event payload delivered to the transport.
#[derive(Debug, Clone, Serialize)]
pub struct MonitorEvent {
    pub event_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub level: Level,
    pub message: Option<String>,
    pub exception: Option<ExceptionInfo>,
    pub environment: String,
    pub release: Option<String>,
    pub user: Option<MonitorUser>,
}

/// Delivery of events to a monitoring backend.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, event: &MonitorEvent) -> Result<()>;
}

struct Sdk {
    config: MonitorConfig,
    transport: Arc<dyn Transport>,
    user: Mutex<Option<MonitorUser>>,
}

/// Error monitor. Cheap to share behind an `Arc`.
pub struct Monitor {
    sdk: Option<Sdk>,
}

impl std::fmt::Debug for Monitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Monitor")
            .field("enabled", &self.is_enabled())
            .finish()
    }
}

impl Monitor {
    /// Build a monitor from configuration. Without a DSN the SDK is absent.
    pub fn init(config: &MonitorConfig) -> Self {
        match config.dsn.as_deref().filter(|d| !d.trim().is_empty()) {
            Some(dsn) => {
                let transport = Arc::new(HttpTransport::new(dsn));
                Self::with_transport(config, transport)
            }
            None => {
                tracing::info!("Error monitoring disabled (no DSN configured)");
                Self::disabled()
            }
        }
    }

    /// Monitor with no SDK; every call only logs.
    pub fn disabled() -> Self {
        Self { sdk: None }
    }

    pub fn with_transport(config: &MonitorConfig, transport: Arc<dyn Transport>) -> Self {
        let config = config.clamped();
        tracing::info!(
            environment = %config.environment,
            traces_sample_rate = config.traces_sample_rate,
            replays_session_sample_rate = config.replays_session_sample_rate,
            replays_on_error_sample_rate = config.replays_on_error_sample_rate,
            "Error monitoring initialized"
        );
        Self {
            sdk: Some(Sdk {
                config,
                transport,
                user: Mutex::new(None),
            }),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.sdk.is_some()
    }

    /// Effective (clamped) configuration, when the SDK is present.
    pub fn config(&self) -> Option<&MonitorConfig> {
        self.sdk.as_ref().map(|s| &s.config)
    }

    /// Report an error. Always sent when the SDK is present.
    pub async fn capture_exception(
        &self,
        error: &(dyn std::error::Error + Send + Sync + 'static),
    ) -> Option<Uuid> {
        let Some(sdk) = &self.sdk else {
            tracing::error!("Captured exception (monitoring disabled): {}", error);
            return None;
        };
        let mut event = sdk.event(Level::Error);
        event.exception = Some(ExceptionInfo::from_error(error));
        sdk.deliver(event).await
    }

    /// Report a message. Sampled with `traces_sample_rate` below error level.
    pub async fn capture_message(&self, message: &str, level: Level) -> Option<Uuid> {
        let Some(sdk) = &self.sdk else {
            tracing::info!(?level, "Captured message (monitoring disabled): {}", message);
            return None;
        };
        let rate = match level {
            Level::Error | Level::Fatal => 1.0,
            _ => sdk.config.traces_sample_rate,
        };
        if !sample(rate) {
            tracing::trace!("Message dropped by sampling");
            return None;
        }
        let mut event = sdk.event(level);
        event.message = Some(message.to_string());
        sdk.deliver(event).await
    }

    /// Attach a user to subsequent events; `None` clears it.
    pub fn set_user(&self, user: Option<MonitorUser>) {
        match &self.sdk {
            Some(sdk) => {
                *sdk.user.lock().unwrap_or_else(|e| e.into_inner()) = user;
            }
            None => tracing::debug!(?user, "set_user ignored (monitoring disabled)"),
        }
    }
}

impl Sdk {
    fn event(&self, level: Level) -> MonitorEvent {
        MonitorEvent {
            event_id: Uuid::new_v4(),
            timestamp: Utc::now(),
            level,
            message: None,
            exception: None,
            environment: self.config.environment.clone(),
            release: self.config.release.clone(),
            user: self.user.lock().unwrap_or_else(|e| e.into_inner()).clone(),
        }
    }

    async fn deliver(&self, event: MonitorEvent) -> Option<Uuid> {
        let id = event.event_id;
        match self.transport.send(&event).await {
            Ok(()) => Some(id),
            Err(e) => {
                tracing::warn!("Failed to deliver monitoring event {}: {}", id, e);
                None
            }
        }
    }
}

/// Bernoulli draw with probability `rate`.
fn sample(rate: f64) -> bool {
    if rate >= 1.0 {
        return true;
    }
    if rate <= 0.0 || rate.is_nan() {
        return false;
    }
    fastrand::f64() < rate
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[derive(Default)]
    struct Recording {
        events: Mutex<Vec<MonitorEvent>>,
        fail: bool,
    }

    #[async_trait]
    impl Transport for Recording {
        async fn send(&self, event: &MonitorEvent) -> Result<()> {
            if self.fail {
                return Err(Error::Monitor("ingest unavailable".to_string()));
            }
            self.events.lock().unwrap().push(event.clone());
            Ok(())
        }
    }

    #[derive(Debug)]
    struct Outer(std::io::Error);

    impl std::fmt::Display for Outer {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "submit failed")
        }
    }

    impl std::error::Error for Outer {
        fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
            Some(&self.0)
        }
    }

    #[tokio::test]
    async fn test_disabled_monitor_degrades() {
        let monitor = Monitor::init(&MonitorConfig::default());
        assert!(!monitor.is_enabled());
        let err = std::io::Error::new(std::io::ErrorKind::Other, "boom");
        assert!(monitor.capture_exception(&err).await.is_none());
        assert!(monitor.capture_message("hello", Level::Error).await.is_none());
        monitor.set_user(None);
    }

    #[tokio::test]
    async fn test_exception_carries_cause_chain_and_user() {
        let transport = Arc::new(Recording::default());
        let monitor = Monitor::with_transport(&MonitorConfig::default(), transport.clone());
        monitor.set_user(Some(MonitorUser {
            id: Some("42".to_string()),
            email: None,
            username: Some("lee".to_string()),
        }));

        let err = Outer(std::io::Error::new(std::io::ErrorKind::Other, "connection reset"));
        let id = monitor.capture_exception(&err).await;
        assert!(id.is_some());

        let events = transport.events.lock().unwrap();
        assert_eq!(events.len(), 1);
        let exception = events[0].exception.as_ref().unwrap();
        assert_eq!(exception.value, "submit failed");
        assert_eq!(exception.causes, vec!["connection reset".to_string()]);
        assert_eq!(events[0].user.as_ref().unwrap().id.as_deref(), Some("42"));
        assert_eq!(events[0].level, Level::Error);
    }

    #[tokio::test]
    async fn test_message_sampling_bounds() {
        let transport = Arc::new(Recording::default());
        let config = MonitorConfig {
            traces_sample_rate: 0.0,
            ..MonitorConfig::default()
        };
        let monitor = Monitor::with_transport(&config, transport.clone());

        assert!(monitor.capture_message("dropped", Level::Info).await.is_none());
        assert!(monitor.capture_message("kept", Level::Fatal).await.is_some());

        let events = transport.events.lock().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].message.as_deref(), Some("kept"));
    }

    #[tokio::test]
    async fn test_transport_failure_is_swallowed() {
        let transport = Arc::new(Recording {
            fail: true,
            ..Recording::default()
        });
        let monitor = Monitor::with_transport(&MonitorConfig::default(), transport);
        let err = std::io::Error::new(std::io::ErrorKind::Other, "boom");
        assert!(monitor.capture_exception(&err).await.is_none());
    }

    #[test]
    fn test_rates_are_clamped() {
        let config = MonitorConfig {
            traces_sample_rate: 3.0,
            replays_session_sample_rate: -1.0,
            replays_on_error_sample_rate: f64::NAN,
            ..MonitorConfig::default()
        }
        .clamped();
        assert_eq!(config.traces_sample_rate, 1.0);
        assert_eq!(config.replays_session_sample_rate, 0.0);
        assert_eq!(config.replays_on_error_sample_rate, 0.0);
    }

    #[test]
    fn test_sample_extremes() {
        assert!((0..100).all(|_| sample(1.0)));
        assert!((0..100).all(|_| !sample(0.0)));
        assert!((0..100).all(|_| !sample(f64::NAN)));
    }

    #[test]
    fn test_sample_fractional_rate() {
        let hits = (0..4000).filter(|_| sample(0.5)).count();
        assert!((1500..2500).contains(&hits), "hits = {}", hits);
    }
}
