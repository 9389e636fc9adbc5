//! agentrelay library root.

pub mod agent;
pub mod cli;
pub mod config;
pub mod contact;
pub mod core;
pub mod error;
pub mod logging;
pub mod monitoring;
pub mod protocol;
pub mod telegram;
pub mod web;

pub use agent::{AgentId, Recipient, StatusValue};
pub use cli::Commands;
pub use config::{load_settings, Settings};
pub use crate::core::{AgentRegistry, Dispatcher, EventBus, IndicatorBoard, RouteOutcome, Router};
pub use error::{Error, Result};
pub use monitoring::Monitor;
pub use protocol::{AgentHandler, InboxHandler, RelayEvent};
pub use web::run_web_server;
