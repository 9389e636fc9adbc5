//! Inter-agent protocol for agentrelay.
//!
//! This module defines what travels between the environment and the agents:
//! - Typed relay events (message sent, status changed)
//! - The handler capability recipients expose
//! - In-memory agent inboxes

pub mod mailbox;
pub mod types;

pub use mailbox::{AgentHandler, InboxHandler};
pub use types::{ReceivedMessage, RelayEvent};
