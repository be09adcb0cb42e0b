//! Broadcast channel for session events.
//!
//! [`EventBus`] wraps a [`tokio::sync::broadcast`] channel. Every
//! coordinator mutation publishes a [`SessionEvent`] through the bus, and
//! every relay subscribes to receive them in publish order.

use tokio::sync::broadcast;

use super::SessionEvent;

/// Broadcast bus for [`SessionEvent`]s.
///
/// Publishing is fire-and-forget: there is no acknowledgement and no
/// backlog for listeners that subscribe later. When a receiver falls more
/// than `capacity` events behind, it observes `RecvError::Lagged` and the
/// oldest events are dropped for it only.
///
/// The channel lives in this process. With several instances sharing one
/// Postgres store, relays only see mutations made through their own
/// instance, so a deployment serving live clients runs a single instance.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<SessionEvent>,
}

impl EventBus {
    /// Builds a bus whose channel buffers up to `capacity` events per relay.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publishes an event to all current subscribers.
    ///
    /// Returns how many subscriptions the event was queued for.
    /// With no relay connected the event is discarded.
    pub fn publish(&self, event: SessionEvent) -> usize {
        let kind = event.event_type_str();
        let delivered = self.sender.send(event).unwrap_or(0);
        tracing::trace!(kind, delivered, "session event published");
        delivered
    }

    /// Opens a subscription that sees every event published from now on.
    ///
    /// Each relay calls this once when it starts streaming.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.sender.subscribe()
    }

    /// Number of open subscriptions.
    #[must_use]
    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}
