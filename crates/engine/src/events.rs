//! Entity-change events.
//!
//! Writes that matter to the balance consolidator publish an [`EntityEvent`]
//! on the [`EventBus`]. The consolidation loop subscribes and dispatches each
//! event to a handler. Delivery is at-least-once: the broadcast channel can
//! re-deliver work after a lagged receiver catches up, and the periodic sweep
//! re-derives the same work anyway, so every handler re-reads state from the
//! database instead of trusting the event payload.

use tokio::sync::broadcast;

/// A change to an entity the consolidator reacts to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EntityEvent {
    /// An account mirror was written.
    AccountChanged { account_id: String },
    /// A linked-account edge was created or its mirrored balance changed.
    LinkedAccountChanged {
        user_id: String,
        account_id: String,
    },
}

/// Broadcast channel for [`EntityEvent`]s.
#[derive(Clone, Debug)]
pub struct EventBus {
    tx: broadcast::Sender<EntityEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Publishes an event. Publishing with no subscribers is a no-op: the
    /// sweep acts as the fallback consumer.
    pub fn publish(&self, event: EntityEvent) {
        if self.tx.send(event).is_err() {
            tracing::debug!("no event subscribers; sweep will pick up the change");
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<EntityEvent> {
        self.tx.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}
