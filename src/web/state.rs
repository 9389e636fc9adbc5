//! Shared state for web handlers.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::mpsc;

use crate::agent::AgentId;
use crate::config::Settings;
use crate::contact::SubmissionStore;
use crate::core::{AgentRegistry, Dispatcher, EventBus, IndicatorBoard, Router};
use crate::error::Result;
use crate::monitoring::Monitor;
use crate::protocol::{InboxHandler, RelayEvent};
use crate::telegram::{ChatSender, TelegramRelay};

/// Everything a handler can reach. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
    pub bus: EventBus,
    pub inboxes: Arc<HashMap<AgentId, Arc<InboxHandler>>>,
    pub store: SubmissionStore,
    pub chat: Option<Arc<dyn ChatSender>>,
    pub monitor: Arc<Monitor>,
}

/// Pieces needed to assemble an [`AppState`].
pub struct StateParts {
    pub enabled_agents: Vec<AgentId>,
    pub store: SubmissionStore,
    pub chat: Option<Arc<dyn ChatSender>>,
    pub monitor: Arc<Monitor>,
}

impl AppState {
    /// Build state plus the receiver the dispatcher task must drain.
    pub fn build(parts: StateParts) -> (Self, mpsc::UnboundedReceiver<RelayEvent>) {
        let mut registry = AgentRegistry::new();
        let mut inboxes = HashMap::new();
        for agent in parts.enabled_agents {
            let inbox = Arc::new(InboxHandler::new(agent));
            registry.register(agent, inbox.clone());
            inboxes.insert(agent, inbox);
        }
        tracing::info!(agents = ?registry.registered(), "Agent registry built");

        // Every agent gets an indicator, registered or not.
        let board = IndicatorBoard::with_agents(AgentId::ALL);
        let dispatcher = Arc::new(Dispatcher::new(Router::new(registry), board));
        let (bus, rx) = EventBus::new();

        let state = Self {
            dispatcher,
            bus,
            inboxes: Arc::new(inboxes),
            store: parts.store,
            chat: parts.chat,
            monitor: parts.monitor,
        };
        (state, rx)
    }

    /// Build state from loaded settings.
    pub fn from_settings(
        settings: &Settings,
    ) -> Result<(Self, mpsc::UnboundedReceiver<RelayEvent>)> {
        let chat = settings
            .messaging
            .bot_token
            .as_deref()
            .filter(|t| !t.is_empty())
            .map(|token| Arc::new(TelegramRelay::new(token)) as Arc<dyn ChatSender>);
        if chat.is_none() {
            tracing::warn!("No bot token configured; /api/chat will answer 503");
        }

        Ok(Self::build(StateParts {
            enabled_agents: settings.agents.enabled.clone(),
            store: SubmissionStore::new(settings.contact.resolved_database_path()?),
            chat,
            monitor: Arc::new(Monitor::init(&settings.monitoring)),
        }))
    }
}
