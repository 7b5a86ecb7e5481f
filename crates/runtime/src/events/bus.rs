//! Topic-based event bus implementation.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use super::BattleEvent;

/// Topics for event routing
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum Topic {
    /// Round and turn boundaries
    Turn,
    /// Resolved, rejected and relayed actions
    Action,
    /// Battle log lines
    Log,
    /// State sync and battle end
    Session,
}

/// Topic-based event bus
///
/// Cloning the bus shares the underlying channels.
#[derive(Clone)]
pub struct EventBus {
    turn: broadcast::Sender<BattleEvent>,
    action: broadcast::Sender<BattleEvent>,
    log: broadcast::Sender<BattleEvent>,
    session: broadcast::Sender<BattleEvent>,
    all: broadcast::Sender<BattleEvent>,
}

impl EventBus {
    /// Creates a new event bus with default capacity for each topic
    pub fn new() -> Self {
        Self::with_capacity(256)
    }

    /// Creates a new event bus with specified capacity per topic
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            turn: broadcast::channel(capacity).0,
            action: broadcast::channel(capacity).0,
            log: broadcast::channel(capacity).0,
            session: broadcast::channel(capacity).0,
            all: broadcast::channel(capacity).0,
        }
    }

    fn sender(&self, topic: Topic) -> &broadcast::Sender<BattleEvent> {
        match topic {
            Topic::Turn => &self.turn,
            Topic::Action => &self.action,
            Topic::Log => &self.log,
            Topic::Session => &self.session,
        }
    }

    /// Publish an event to its topic and to the combined stream
    pub fn publish(&self, event: BattleEvent) {
        let topic = event.topic();
        if self.sender(topic).send(event.clone()).is_err() {
            // No subscribers for this topic - this is normal, not an error
            tracing::trace!(target: "battle::scheduler", "No subscribers for topic {:?}", topic);
        }
        let _ = self.all.send(event);
    }

    /// Subscribe to a specific topic
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<BattleEvent> {
        self.sender(topic).subscribe()
    }

    /// Subscribe to every event, in publication order
    pub fn subscribe_all(&self) -> broadcast::Receiver<BattleEvent> {
        self.all.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
