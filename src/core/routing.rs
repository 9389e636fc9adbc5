//! Message routing for agentrelay.
//!
//! Handles:
//! - Direct routing to a single agent
//! - Broadcast routing (`"all"`) in fixed agent order
//! - Reporting of unregistered and unknown recipients

use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

use crate::agent::{AgentId, Recipient};
use crate::protocol::AgentHandler;

/// Handlers available to the router, keyed by agent.
///
/// Built once and handed to [`Router::new`]; an agent without an entry is
/// treated as absent at dispatch time.
#[derive(Clone, Default)]
pub struct AgentRegistry {
    handlers: HashMap<AgentId, Arc<dyn AgentHandler>>,
}

impl AgentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler, replacing any previous one for the same agent.
    pub fn register(&mut self, agent: AgentId, handler: Arc<dyn AgentHandler>) {
        self.handlers.insert(agent, handler);
    }

    pub fn get(&self, agent: AgentId) -> Option<&Arc<dyn AgentHandler>> {
        self.handlers.get(&agent)
    }

    pub fn contains(&self, agent: AgentId) -> bool {
        self.handlers.contains_key(&agent)
    }

    /// Registered agents in broadcast order.
    pub fn registered(&self) -> Vec<AgentId> {
        AgentId::ALL
            .into_iter()
            .filter(|id| self.handlers.contains_key(id))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl std::fmt::Debug for AgentRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentRegistry")
            .field("registered", &self.registered())
            .finish()
    }
}

/// What happened to a routed message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RouteOutcome {
    /// Handed to these agents, in invocation order. Empty for a broadcast
    /// with nobody registered.
    Delivered { recipients: Vec<AgentId> },
    /// Addressed to a known agent with no handler; dropped.
    Unregistered { agent: AgentId },
    /// `to` named nobody; dropped.
    UnknownRecipient { to: String },
}

impl RouteOutcome {
    pub fn delivered_count(&self) -> usize {
        match self {
            RouteOutcome::Delivered { recipients } => recipients.len(),
            _ => 0,
        }
    }
}

/// Routes messages to registered agent handlers.
#[derive(Debug, Clone)]
pub struct Router {
    registry: AgentRegistry,
}

impl Router {
    pub fn new(registry: AgentRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &AgentRegistry {
        &self.registry
    }

    /// Route `message` from `from` to the raw recipient `to`.
    ///
    /// Never fails: absent or unknown recipients are logged and dropped.
    pub fn route(&self, from: AgentId, to: &str, message: &str) -> RouteOutcome {
        match Recipient::parse(to) {
            Some(recipient) => self.route_to(from, recipient, message),
            None => {
                tracing::warn!(from = %from, to = %to, "Unknown agent, message dropped");
                RouteOutcome::UnknownRecipient { to: to.to_string() }
            }
        }
    }

    /// Route to an already-resolved recipient.
    pub fn route_to(&self, from: AgentId, to: Recipient, message: &str) -> RouteOutcome {
        match to {
            Recipient::Agent(agent) => match self.registry.get(agent) {
                Some(handler) => {
                    handler.receive_message(from, message);
                    tracing::debug!(from = %from, to = %agent, "Message routed");
                    RouteOutcome::Delivered {
                        recipients: vec![agent],
                    }
                }
                None => {
                    tracing::warn!(from = %from, to = %agent, "Agent not registered, message dropped");
                    RouteOutcome::Unregistered { agent }
                }
            },
            Recipient::All => {
                let mut recipients = Vec::new();
                for agent in AgentId::ALL {
                    if let Some(handler) = self.registry.get(agent) {
                        handler.receive_message(from, message);
                        recipients.push(agent);
                    }
                }
                tracing::debug!(from = %from, delivered = recipients.len(), "Message broadcast");
                RouteOutcome::Delivered { recipients }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::count_events;
    use std::sync::Mutex;
    use tracing::Level;

    /// Handler that records every invocation with the receiving agent.
    #[derive(Default)]
    struct Recorder {
        calls: Mutex<Vec<(AgentId, AgentId, String)>>,
    }

    struct Tap {
        agent: AgentId,
        recorder: Arc<Recorder>,
    }

    impl AgentHandler for Tap {
        fn receive_message(&self, from: AgentId, message: &str) {
            self.recorder
                .calls
                .lock()
                .unwrap()
                .push((self.agent, from, message.to_string()));
        }
    }

    fn registry_with(agents: &[AgentId], recorder: &Arc<Recorder>) -> AgentRegistry {
        let mut registry = AgentRegistry::new();
        for &agent in agents {
            registry.register(
                agent,
                Arc::new(Tap {
                    agent,
                    recorder: Arc::clone(recorder),
                }),
            );
        }
        registry
    }

    #[test]
    fn test_direct_route_invokes_only_target() {
        let recorder = Arc::new(Recorder::default());
        let router = Router::new(registry_with(&AgentId::ALL, &recorder));

        let outcome = router.route(AgentId::Lee, "tim", "  exact text, kept verbatim ");
        assert_eq!(
            outcome,
            RouteOutcome::Delivered {
                recipients: vec![AgentId::Tim]
            }
        );

        let calls = recorder.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(
            calls[0],
            (
                AgentId::Tim,
                AgentId::Lee,
                "  exact text, kept verbatim ".to_string()
            )
        );
    }

    #[test]
    fn test_broadcast_skips_unregistered_in_fixed_order() {
        let recorder = Arc::new(Recorder::default());
        // Registration order deliberately differs from broadcast order.
        let router = Router::new(registry_with(
            &[AgentId::Nicole, AgentId::Lee, AgentId::Leonard],
            &recorder,
        ));

        let (outcome, warnings) = count_events(Level::WARN, || router.route(AgentId::Tim, "all", "hello"));
        assert_eq!(outcome.delivered_count(), 3);
        assert_eq!(warnings, 0);

        let calls = recorder.calls.lock().unwrap();
        let order: Vec<AgentId> = calls.iter().map(|c| c.0).collect();
        assert_eq!(order, vec![AgentId::Lee, AgentId::Leonard, AgentId::Nicole]);
        assert!(calls.iter().all(|c| c.1 == AgentId::Tim && c.2 == "hello"));
    }

    #[test]
    fn test_broadcast_includes_sender_once() {
        let recorder = Arc::new(Recorder::default());
        let router = Router::new(registry_with(&AgentId::ALL, &recorder));

        router.route(AgentId::Lee, "all", "hi");

        let calls = recorder.calls.lock().unwrap();
        assert_eq!(calls.len(), 4);
        let lee_calls = calls.iter().filter(|c| c.0 == AgentId::Lee).count();
        assert_eq!(lee_calls, 1);
    }

    #[test]
    fn test_broadcast_with_empty_registry() {
        let router = Router::new(AgentRegistry::new());
        let outcome = router.route(AgentId::Lee, "all", "anyone?");
        assert_eq!(outcome, RouteOutcome::Delivered { recipients: vec![] });
    }

    #[test]
    fn test_unregistered_agent_is_dropped() {
        let recorder = Arc::new(Recorder::default());
        let router = Router::new(registry_with(&[AgentId::Lee], &recorder));

        let (outcome, warnings) =
            count_events(Level::WARN, || router.route(AgentId::Lee, "leonard", "you there?"));
        assert_eq!(warnings, 1);
        assert_eq!(
            outcome,
            RouteOutcome::Unregistered {
                agent: AgentId::Leonard
            }
        );
        assert!(recorder.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_unknown_recipient_is_reported() {
        let recorder = Arc::new(Recorder::default());
        let router = Router::new(registry_with(&AgentId::ALL, &recorder));

        let (outcome, warnings) = count_events(Level::WARN, || router.route(AgentId::Nicole, "bob", "hi"));
        assert_eq!(warnings, 1);
        assert_eq!(
            outcome,
            RouteOutcome::UnknownRecipient {
                to: "bob".to_string()
            }
        );
        assert_eq!(outcome.delivered_count(), 0);
        assert!(recorder.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_registry_registered_order() {
        let recorder = Arc::new(Recorder::default());
        let registry = registry_with(&[AgentId::Nicole, AgentId::Tim], &recorder);
        assert_eq!(registry.registered(), vec![AgentId::Tim, AgentId::Nicole]);
        assert!(registry.contains(AgentId::Tim));
        assert!(!registry.contains(AgentId::Lee));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_outcome_serializes_with_tag() {
        let json = serde_json::to_value(RouteOutcome::UnknownRecipient {
            to: "bob".to_string(),
        })
        .unwrap();
        assert_eq!(json["outcome"], "unknown_recipient");
        assert_eq!(json["to"], "bob");
    }
}
