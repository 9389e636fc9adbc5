//! Agent handlers and in-memory inboxes.

use std::sync::{Mutex, MutexGuard};

use super::types::ReceivedMessage;
use crate::agent::AgentId;

/// Maximum messages kept per inbox before the oldest are dropped.
const MAX_INBOX_SIZE: usize = 1000;

/// Capability exposed by a recipient of routed messages.
pub trait AgentHandler: Send + Sync {
    fn receive_message(&self, from: AgentId, message: &str);
}

/// An agent handler that records every message it receives.
#[derive(Debug)]
pub struct InboxHandler {
    agent_id: AgentId,
    inbox: Mutex<Vec<ReceivedMessage>>,
}

impl InboxHandler {
    pub fn new(agent_id: AgentId) -> Self {
        Self {
            agent_id,
            inbox: Mutex::new(Vec::new()),
        }
    }

    pub fn agent_id(&self) -> AgentId {
        self.agent_id
    }

    /// Snapshot of received messages, oldest first.
    pub fn messages(&self) -> Vec<ReceivedMessage> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Take every message out of the inbox.
    pub fn drain(&self) -> Vec<ReceivedMessage> {
        std::mem::take(&mut *self.lock())
    }

    fn lock(&self) -> MutexGuard<'_, Vec<ReceivedMessage>> {
        // A panicking reader cannot leave the Vec half-written.
        self.inbox.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl AgentHandler for InboxHandler {
    fn receive_message(&self, from: AgentId, message: &str) {
        let mut inbox = self.lock();
        inbox.push(ReceivedMessage::new(from, message));
        if inbox.len() > MAX_INBOX_SIZE {
            let excess = inbox.len() - MAX_INBOX_SIZE;
            inbox.drain(..excess);
        }
        tracing::debug!(
            agent = %self.agent_id,
            from = %from,
            inbox_len = inbox.len(),
            "Message delivered to inbox"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inbox_records_messages_in_order() {
        let inbox = InboxHandler::new(AgentId::Tim);
        inbox.receive_message(AgentId::Lee, "first");
        inbox.receive_message(AgentId::Nicole, "second");

        let messages = inbox.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].from, AgentId::Lee);
        assert_eq!(messages[0].body, "first");
        assert_eq!(messages[1].from, AgentId::Nicole);
    }

    #[test]
    fn test_drain_empties_inbox() {
        let inbox = InboxHandler::new(AgentId::Lee);
        inbox.receive_message(AgentId::Tim, "ping");
        assert_eq!(inbox.drain().len(), 1);
        assert!(inbox.is_empty());
    }

    #[test]
    fn test_inbox_is_bounded() {
        let inbox = InboxHandler::new(AgentId::Leonard);
        for i in 0..(MAX_INBOX_SIZE + 5) {
            inbox.receive_message(AgentId::Lee, &format!("msg {}", i));
        }
        let messages = inbox.messages();
        assert_eq!(messages.len(), MAX_INBOX_SIZE);
        assert_eq!(messages[0].body, "msg 5");
    }
}
