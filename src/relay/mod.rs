//! Relay layer: per-connection forwarding from the event bus to a client.
//!
//! A [`Relay`] subscribes to the [`crate::domain::EventBus`], seeds its
//! client with an `INITIAL_DATA` snapshot, then yields every bus event in
//! publish order. Two transports drive it: a WebSocket at `/ws` and a
//! Server-Sent Events stream at `/api/v1/game/events`.

pub mod sse;
pub mod websocket;

use std::sync::Arc;

use futures_util::Stream;
use futures_util::stream;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;

use crate::domain::SessionEvent;
use crate::service::SessionService;

/// Lifecycle of a relay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayState {
    /// Created, not yet subscribed.
    Connecting,
    /// Subscribed to the bus and forwarding events.
    Streaming,
    /// Subscription released; yields nothing more.
    Closed,
}

/// Per-connection forwarder from the event bus to one client.
///
/// The subscription is taken before the roster snapshot is read, so a join
/// racing the snapshot may reach the client twice (once inside
/// `INITIAL_DATA`, once as `PLAYER_JOIN`); client reducers are idempotent
/// to that. The subscription is released on [`Relay::close`] or when the
/// relay is dropped, whichever comes first.
#[derive(Debug)]
pub struct Relay {
    service: Arc<SessionService>,
    state: RelayState,
    events: Option<broadcast::Receiver<SessionEvent>>,
    snapshot_pending: bool,
}

impl Relay {
    /// Creates a relay in the [`RelayState::Connecting`] state.
    #[must_use]
    pub fn new(service: Arc<SessionService>) -> Self {
        Self {
            service,
            state: RelayState::Connecting,
            events: None,
            snapshot_pending: false,
        }
    }

    /// Creates a relay and starts streaming immediately.
    #[must_use]
    pub fn connect(service: Arc<SessionService>) -> Self {
        let mut relay = Self::new(service);
        relay.start();
        relay
    }

    /// Returns the current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> RelayState {
        self.state
    }

    /// Subscribes to the bus and schedules the initial snapshot.
    ///
    /// Has no effect unless the relay is still connecting.
    pub fn start(&mut self) {
        if self.state != RelayState::Connecting {
            return;
        }
        self.events = Some(self.service.event_bus().subscribe());
        self.snapshot_pending = true;
        self.state = RelayState::Streaming;
        tracing::debug!(
            relays = self.service.event_bus().receiver_count(),
            "relay streaming"
        );
    }

    /// Waits for the next event to forward.
    ///
    /// The first call after [`Relay::start`] yields the `INITIAL_DATA`
    /// snapshot. Returns `None` once the relay is closed or the bus is gone.
    /// Cancelling the returned future loses no event.
    pub async fn next_event(&mut self) -> Option<SessionEvent> {
        loop {
            if self.state != RelayState::Streaming {
                return None;
            }

            if self.snapshot_pending {
                let players = self.service.list_active().await;
                self.snapshot_pending = false;
                return Some(SessionEvent::initial_data(players));
            }

            let rx = self.events.as_mut()?;
            match rx.recv().await {
                Ok(event) => return Some(event),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "relay lagged behind event bus; resending snapshot");
                    // Drop the stale backlog so nothing older than the
                    // snapshot is replayed on top of it.
                    *rx = rx.resubscribe();
                    self.snapshot_pending = true;
                }
                Err(RecvError::Closed) => {
                    self.close();
                    return None;
                }
            }
        }
    }

    /// Releases the subscription. Idempotent.
    pub fn close(&mut self) {
        if self.state == RelayState::Closed {
            return;
        }
        self.events = None;
        self.snapshot_pending = false;
        self.state = RelayState::Closed;
        tracing::debug!("relay closed");
    }

    /// Turns the relay into a stream of events; dropping the stream closes it.
    pub fn into_stream(self) -> impl Stream<Item = SessionEvent> + Send + 'static {
        stream::unfold(self, |mut relay| async move {
            let event = relay.next_event().await?;
            Some((event, relay))
        })
    }
}

impl Drop for Relay {
    fn drop(&mut self) {
        self.close();
    }
}
