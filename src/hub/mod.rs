//! Live traffic broadcaster.
//!
//! # Responsibilities
//! - Own the set of connected observers
//! - Fan out every accepted request to them
//! - Drop observers that stop draining their buffer
//!
//! # Data Flow
//! ```text
//! register / unregister / publish
//!     → HubHandle (unbounded event queue, never blocks the caller)
//!     → Hub::run (single loop, sole owner of the subscriber map)
//!     → per-subscriber bounded mpsc → WebSocket writer
//! ```
//!
//! # Design Decisions
//! - No lock around the subscriber set; the loop owns it
//! - Events are applied in submission order, so a subscriber registered
//!   before a publish receives it and one registered after does not
//! - Removing a subscriber drops its sender, which closes its channel

pub mod message;

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::{broadcast, mpsc, oneshot};

pub use message::{BroadcastMessage, MessageData};

use crate::observability::metrics;

static SUBSCRIBER_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for a subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(u64);

impl SubscriberId {
    pub fn new() -> Self {
        Self(SUBSCRIBER_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for SubscriberId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

/// The hub's side of a subscriber: where to push serialized messages.
#[derive(Debug)]
pub struct Subscriber {
    pub id: SubscriberId,
    outbound: mpsc::Sender<Arc<str>>,
}

/// The observer's side of a subscriber.
#[derive(Debug)]
pub struct Subscription {
    pub id: SubscriberId,
    pub receiver: mpsc::Receiver<Arc<str>>,
}

impl Subscriber {
    /// Create a subscriber with an outbound buffer of `capacity` messages.
    pub fn channel(capacity: usize) -> (Subscriber, Subscription) {
        let id = SubscriberId::new();
        let (outbound, receiver) = mpsc::channel(capacity.max(1));
        (Subscriber { id, outbound }, Subscription { id, receiver })
    }
}

enum HubEvent {
    Register(Subscriber),
    Unregister(SubscriberId),
    Publish(Arc<str>),
    Count(oneshot::Sender<usize>),
}

/// Cloneable handle used by request handlers and WebSocket connections.
#[derive(Clone)]
pub struct HubHandle {
    events: mpsc::UnboundedSender<HubEvent>,
    subscriber_buffer: usize,
}

impl HubHandle {
    pub fn register(&self, subscriber: Subscriber) {
        self.submit(HubEvent::Register(subscriber));
    }

    /// Register a fresh subscriber using the configured buffer size.
    pub fn subscribe(&self) -> Subscription {
        let (subscriber, subscription) = Subscriber::channel(self.subscriber_buffer);
        self.register(subscriber);
        subscription
    }

    /// Remove a subscriber. Unknown ids are ignored.
    pub fn unregister(&self, id: SubscriberId) {
        self.submit(HubEvent::Unregister(id));
    }

    /// Queue a message for every current subscriber. Never waits.
    pub fn publish(&self, message: &BroadcastMessage) {
        match serde_json::to_string(message) {
            Ok(payload) => self.submit(HubEvent::Publish(payload.into())),
            Err(e) => tracing::error!(error = %e, "Failed to serialize broadcast message"),
        }
    }

    /// Number of subscribers after every previously submitted event was applied.
    pub async fn subscriber_count(&self) -> usize {
        let (tx, rx) = oneshot::channel();
        self.submit(HubEvent::Count(tx));
        rx.await.unwrap_or(0)
    }

    fn submit(&self, event: HubEvent) {
        if self.events.send(event).is_err() {
            tracing::debug!("Hub loop has stopped, event discarded");
        }
    }
}

/// Event loop owning the subscriber set.
pub struct Hub {
    events: mpsc::UnboundedReceiver<HubEvent>,
    subscribers: HashMap<SubscriberId, mpsc::Sender<Arc<str>>>,
}

impl Hub {
    /// Create the hub and a handle to it. Nothing happens until `run`.
    pub fn new(subscriber_buffer: usize) -> (Self, HubHandle) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                events: rx,
                subscribers: HashMap::new(),
            },
            HubHandle {
                events: tx,
                subscriber_buffer,
            },
        )
    }

    /// Create the hub and run it on a background task.
    pub fn spawn(subscriber_buffer: usize, shutdown: broadcast::Receiver<()>) -> HubHandle {
        let (hub, handle) = Self::new(subscriber_buffer);
        tokio::spawn(hub.run(shutdown));
        handle
    }

    pub async fn run(mut self, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!("Hub starting");

        loop {
            tokio::select! {
                event = self.events.recv() => match event {
                    Some(event) => self.apply(event),
                    None => break,
                },
                _ = shutdown.recv() => {
                    tracing::info!("Hub received shutdown signal, exiting loop");
                    break;
                }
            }
        }

        // Dropping the senders closes every subscriber channel
        self.subscribers.clear();
        metrics::record_hub_subscribers(0);
    }

    fn apply(&mut self, event: HubEvent) {
        match event {
            HubEvent::Register(subscriber) => {
                tracing::debug!(subscriber = %subscriber.id, "Subscriber registered");
                self.subscribers.insert(subscriber.id, subscriber.outbound);
            }
            HubEvent::Unregister(id) => {
                if self.subscribers.remove(&id).is_some() {
                    tracing::debug!(subscriber = %id, "Subscriber unregistered");
                }
            }
            HubEvent::Publish(payload) => self.broadcast(payload),
            HubEvent::Count(reply) => {
                let _ = reply.send(self.subscribers.len());
            }
        }
        metrics::record_hub_subscribers(self.subscribers.len());
    }

    fn broadcast(&mut self, payload: Arc<str>) {
        self.subscribers.retain(|id, outbound| match outbound.try_send(payload.clone()) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::warn!(subscriber = %id, "Subscriber buffer full, dropping subscriber");
                metrics::record_hub_dropped();
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => false,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::Shutdown;

    fn message(text: &str) -> BroadcastMessage {
        BroadcastMessage::bulk("ACME", "4179", text)
    }

    #[tokio::test]
    async fn test_registered_subscriber_receives_publish() {
        let shutdown = Shutdown::new();
        let hub = Hub::spawn(8, shutdown.subscribe());

        let mut sub = hub.subscribe();
        hub.publish(&message("hello"));

        let payload = sub.receiver.recv().await.unwrap();
        let received: BroadcastMessage = serde_json::from_str(&payload).unwrap();
        assert_eq!(received, message("hello"));
    }

    #[tokio::test]
    async fn test_unregistered_subscriber_receives_nothing() {
        let shutdown = Shutdown::new();
        let hub = Hub::spawn(8, shutdown.subscribe());

        let mut sub = hub.subscribe();
        hub.unregister(sub.id);
        hub.publish(&message("hello"));

        assert_eq!(hub.subscriber_count().await, 0);
        // Channel was closed on unregister, and the publish never reached it
        assert!(sub.receiver.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_subscriber_registered_after_publish_misses_it() {
        let shutdown = Shutdown::new();
        let hub = Hub::spawn(8, shutdown.subscribe());

        hub.publish(&message("early"));
        let mut sub = hub.subscribe();
        hub.publish(&message("late"));

        let payload = sub.receiver.recv().await.unwrap();
        assert!(payload.contains("late"));
        assert!(sub.receiver.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_unregister_unknown_is_noop() {
        let shutdown = Shutdown::new();
        let hub = Hub::spawn(8, shutdown.subscribe());

        let _sub = hub.subscribe();
        hub.unregister(SubscriberId::new());
        assert_eq!(hub.subscriber_count().await, 1);
    }

    #[tokio::test]
    async fn test_saturated_subscriber_is_dropped() {
        let shutdown = Shutdown::new();
        let hub = Hub::spawn(1, shutdown.subscribe());

        let mut slow = hub.subscribe();
        let mut fast = hub.subscribe();

        hub.publish(&message("one"));
        // Drain the fast subscriber so only the slow one is saturated
        assert!(fast.receiver.recv().await.unwrap().contains("one"));
        hub.publish(&message("two"));

        assert_eq!(hub.subscriber_count().await, 1);
        assert!(fast.receiver.recv().await.unwrap().contains("two"));

        // Slow subscriber keeps what it had buffered, then sees the close
        assert!(slow.receiver.recv().await.unwrap().contains("one"));
        assert!(slow.receiver.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_shutdown_closes_subscribers() {
        let shutdown = Shutdown::new();
        let hub = Hub::spawn(8, shutdown.subscribe());

        let mut sub = hub.subscribe();
        assert_eq!(hub.subscriber_count().await, 1);

        shutdown.trigger();
        assert!(sub.receiver.recv().await.is_none());
    }
}
