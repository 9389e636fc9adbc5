//! Agent identities, recipients, and status values.

use serde::{de, Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Reserved recipient value that addresses every registered agent.
pub const BROADCAST: &str = "all";

/// A named participant that can receive routed messages and report a status.
///
/// Serializes lowercase; deserializes with the same leniency as [`AgentId::parse`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentId {
    Lee,
    Tim,
    Leonard,
    Nicole,
}

impl AgentId {
    /// Every agent, in broadcast order.
    pub const ALL: [AgentId; 4] = [AgentId::Lee, AgentId::Tim, AgentId::Leonard, AgentId::Nicole];

    pub fn as_str(&self) -> &'static str {
        match self {
            AgentId::Lee => "lee",
            AgentId::Tim => "tim",
            AgentId::Leonard => "leonard",
            AgentId::Nicole => "nicole",
        }
    }

    /// Human-readable name (the identifier, capitalized).
    pub fn display_name(&self) -> &'static str {
        match self {
            AgentId::Lee => "Lee",
            AgentId::Tim => "Tim",
            AgentId::Leonard => "Leonard",
            AgentId::Nicole => "Nicole",
        }
    }

    /// Parse an agent identifier, ignoring case and surrounding whitespace.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "lee" => Some(AgentId::Lee),
            "tim" => Some(AgentId::Tim),
            "leonard" => Some(AgentId::Leonard),
            "nicole" => Some(AgentId::Nicole),
            _ => None,
        }
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AgentId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AgentId::parse(s).ok_or_else(|| Error::NotFound(format!("unknown agent '{}'", s)))
    }
}

impl<'de> Deserialize<'de> for AgentId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        AgentId::parse(&raw).ok_or_else(|| de::Error::unknown_variant(&raw, AGENT_NAMES))
    }
}

const AGENT_NAMES: &[&str] = &["lee", "tim", "leonard", "nicole"];

/// Target of a routed message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recipient {
    Agent(AgentId),
    All,
}

impl Recipient {
    /// Resolve a raw `to` value. `None` means the value names nobody.
    pub fn parse(s: &str) -> Option<Self> {
        if s.trim().eq_ignore_ascii_case(BROADCAST) {
            return Some(Recipient::All);
        }
        AgentId::parse(s).map(Recipient::Agent)
    }
}

impl fmt::Display for Recipient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Recipient::Agent(id) => f.write_str(id.as_str()),
            Recipient::All => f.write_str(BROADCAST),
        }
    }
}

/// Presence reported by an agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusValue {
    Online,
    Busy,
    Away,
    Offline,
}

impl StatusValue {
    pub const ALL: [StatusValue; 4] = [
        StatusValue::Online,
        StatusValue::Busy,
        StatusValue::Away,
        StatusValue::Offline,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StatusValue::Online => "online",
            StatusValue::Busy => "busy",
            StatusValue::Away => "away",
            StatusValue::Offline => "offline",
        }
    }

    /// Visual class applied to a status indicator.
    pub fn css_class(&self) -> &'static str {
        match self {
            StatusValue::Online => "status-online",
            StatusValue::Busy => "status-busy",
            StatusValue::Away => "status-away",
            StatusValue::Offline => "status-offline",
        }
    }
}

impl fmt::Display for StatusValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StatusValue {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "online" => Ok(StatusValue::Online),
            "busy" => Ok(StatusValue::Busy),
            "away" => Ok(StatusValue::Away),
            "offline" => Ok(StatusValue::Offline),
            other => Err(Error::Validation(format!("unknown status '{}'", other))),
        }
    }
}

impl<'de> Deserialize<'de> for StatusValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse::<StatusValue>()
            .map_err(|_| de::Error::unknown_variant(&raw, &["online", "busy", "away", "offline"]))
    }
}
