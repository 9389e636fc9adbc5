//! Event and message types carried between the environment and the router.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::agent::{AgentId, StatusValue};

/// A notification arriving from the hosting environment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RelayEvent {
    /// An agent sent a message to another agent or to `"all"`.
    MessageSent {
        from: AgentId,
        /// Raw recipient; resolved at dispatch time so unknown values can be reported.
        to: String,
        message: String,
    },
    /// An agent changed its presence.
    StatusChanged { agent: AgentId, status: StatusValue },
}

impl RelayEvent {
    pub fn message(from: AgentId, to: impl Into<String>, message: impl Into<String>) -> Self {
        Self::MessageSent {
            from,
            to: to.into(),
            message: message.into(),
        }
    }

    pub fn status(agent: AgentId, status: StatusValue) -> Self {
        Self::StatusChanged { agent, status }
    }

    /// Short label used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            RelayEvent::MessageSent { .. } => "message_sent",
            RelayEvent::StatusChanged { .. } => "status_changed",
        }
    }
}

/// A message as recorded in a recipient's inbox.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceivedMessage {
    pub from: AgentId,
    pub body: String,
    pub received_at: DateTime<Utc>,
}

impl ReceivedMessage {
    pub fn new(from: AgentId, body: impl Into<String>) -> Self {
        Self {
            from,
            body: body.into(),
            received_at: Utc::now(),
        }
    }
}
