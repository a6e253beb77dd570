//! Per-execution publish/subscribe fan-out.

use dashmap::DashMap;
use flowscript_core::ExecutionId;
use tokio::sync::mpsc;
use tracing::warn;

use crate::event::Event;

/// Default channel capacity for each subscriber, used by [`EventBus::new`].
/// Chosen generously: a subscriber that is this far behind the publisher is
/// assumed to be gone or stuck, not merely slow.
pub const DEFAULT_SUBSCRIBER_BUFFER: usize = 256;

/// A live subscription to an execution's events.
///
/// Holds the strong [`mpsc::Sender`] half alongside the receiver purely to
/// keep the channel open for as long as the subscription is alive; nothing
/// ever sends on it. The bus only ever holds a [`mpsc::WeakSender`], so
/// dropping a `Subscription` is enough to unsubscribe: the next publish
/// finds the weak sender can no longer upgrade and prunes it.
pub struct Subscription {
    receiver: mpsc::Receiver<Event>,
    _keep_alive: mpsc::Sender<Event>,
}

impl Subscription {
    /// Wait for the next event. Returns `None` once the execution's entry
    /// is torn down and no further events will arrive.
    pub async fn recv(&mut self) -> Option<Event> {
        self.receiver.recv().await
    }
}

/// Fans events for a given execution out to every subscriber still
/// listening for them.
///
/// Subscribers are held weakly: there is no explicit unsubscribe call,
/// dropping the [`Subscription`] is sufficient. A subscriber whose buffer
/// fills up (it isn't draining fast enough) is treated the same as a
/// dropped one and pruned, rather than blocking the publisher or the rest
/// of the subscriber list.
pub struct EventBus {
    subscribers: DashMap<ExecutionId, Vec<mpsc::WeakSender<Event>>>,
    buffer_size: usize,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    /// Create an empty bus with the default per-subscriber buffer size.
    #[must_use]
    pub fn new() -> Self {
        Self::with_buffer_size(DEFAULT_SUBSCRIBER_BUFFER)
    }

    /// Create an empty bus with a caller-chosen per-subscriber buffer size.
    #[must_use]
    pub fn with_buffer_size(buffer_size: usize) -> Self {
        Self { subscribers: DashMap::new(), buffer_size }
    }

    /// Subscribe to events for a single execution.
    pub fn subscribe(&self, execution_id: ExecutionId) -> Subscription {
        let (tx, rx) = mpsc::channel(self.buffer_size);
        let weak = tx.downgrade();
        self.subscribers.entry(execution_id).or_default().push(weak);
        Subscription { receiver: rx, _keep_alive: tx }
    }

    /// Publish an event to every live subscriber of `execution_id`.
    ///
    /// A no-op if nobody has ever subscribed to this execution. Never
    /// blocks: a full or closed subscriber channel is dropped from the
    /// list instead of stalling delivery to everyone else.
    pub fn publish(&self, execution_id: ExecutionId, event: Event) {
        let dropped = self.deliver(execution_id, event);
        if dropped {
            warn!(%execution_id, "subscriber dropped for lagging or closing");
            self.deliver(execution_id, Event::SubscriberDropped);
        }
    }

    /// Sends `event` to every currently-live subscriber, pruning any that
    /// can no longer receive it. Returns `true` if at least one subscriber
    /// was pruned during this pass.
    fn deliver(&self, execution_id: ExecutionId, event: Event) -> bool {
        let Some(mut subscribers) = self.subscribers.get_mut(&execution_id) else {
            return false;
        };
        let before = subscribers.len();
        subscribers.retain(|weak| match weak.upgrade() {
            Some(sender) => sender.try_send(event.clone()).is_ok(),
            None => false,
        });
        subscribers.len() < before
    }

    /// Drop all subscriber bookkeeping for an execution. Call once an
    /// execution reaches a terminal state and no further events will be
    /// published for it.
    pub fn retire(&self, execution_id: ExecutionId) {
        self.subscribers.remove(&execution_id);
    }
}
