//! Event dispatch: feeds relay events into the router and the indicator board.

use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::mpsc;
use tokio_stream::{wrappers::UnboundedReceiverStream, StreamExt};

use super::routing::{RouteOutcome, Router};
use super::status::IndicatorBoard;
use crate::agent::{AgentId, StatusValue};
use crate::protocol::RelayEvent;

/// Result of handling one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatched {
    Routed(RouteOutcome),
    StatusApplied(bool),
}

/// Owns the router and indicator board and handles events to completion.
#[derive(Debug)]
pub struct Dispatcher {
    router: Router,
    board: Mutex<IndicatorBoard>,
}

impl Dispatcher {
    pub fn new(router: Router, board: IndicatorBoard) -> Self {
        Self {
            router,
            board: Mutex::new(board),
        }
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    /// Lock the indicator board for reading or direct updates.
    pub fn board(&self) -> MutexGuard<'_, IndicatorBoard> {
        self.board.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn route(&self, from: AgentId, to: &str, message: &str) -> RouteOutcome {
        self.router.route(from, to, message)
    }

    pub fn update_status(&self, agent: AgentId, status: StatusValue) -> bool {
        self.board().update_status(agent, status)
    }

    /// Handle a single event synchronously.
    pub fn handle(&self, event: RelayEvent) -> Dispatched {
        tracing::trace!(kind = event.kind(), "Dispatching event");
        match event {
            RelayEvent::MessageSent { from, to, message } => {
                Dispatched::Routed(self.route(from, &to, &message))
            }
            RelayEvent::StatusChanged { agent, status } => {
                Dispatched::StatusApplied(self.update_status(agent, status))
            }
        }
    }
}

/// Producer side of the event channel. Cheap to clone.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: mpsc::UnboundedSender<RelayEvent>,
}

impl EventBus {
    /// Create a bus and the receiver to hand to [`run_dispatcher`].
    pub fn new() -> (Self, mpsc::UnboundedReceiver<RelayEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Queue an event. Returns `false` if the dispatcher has stopped.
    pub fn publish(&self, event: RelayEvent) -> bool {
        match self.tx.send(event) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(kind = e.0.kind(), "Dispatcher stopped, event dropped");
                false
            }
        }
    }
}

/// Drain the channel, handling events one at a time in arrival order.
///
/// Returns the number of events handled once every [`EventBus`] is dropped.
pub async fn run_dispatcher(
    dispatcher: Arc<Dispatcher>,
    rx: mpsc::UnboundedReceiver<RelayEvent>,
) -> usize {
    tracing::info!("Event dispatcher started");
    let mut events = UnboundedReceiverStream::new(rx);
    let mut handled = 0;
    while let Some(event) = events.next().await {
        dispatcher.handle(event);
        handled += 1;
    }
    tracing::info!(handled, "Event dispatcher stopped");
    handled
}
