//! Per-table change notifications.
//!
//! Handlers publish once a write has committed; the admin dashboard holds a
//! [`Subscription`] for as long as it wants updates. Dropping the
//! subscription is the unsubscribe.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use quickcart_core::{OrderId, OrderStatus};

/// Table a change happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeTable {
    Orders,
}

/// What happened to the row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Insert,
    Update,
}

/// One committed change to a row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeEvent {
    pub table: ChangeTable,
    pub kind: ChangeKind,
    pub order_id: OrderId,
    /// Status after the change.
    pub status: OrderStatus,
}

impl ChangeEvent {
    #[must_use]
    pub const fn order_inserted(order_id: OrderId, status: OrderStatus) -> Self {
        Self {
            table: ChangeTable::Orders,
            kind: ChangeKind::Insert,
            order_id,
            status,
        }
    }

    #[must_use]
    pub const fn order_updated(order_id: OrderId, status: OrderStatus) -> Self {
        Self {
            table: ChangeTable::Orders,
            kind: ChangeKind::Update,
            order_id,
            status,
        }
    }
}

/// Fan-out of [`ChangeEvent`]s to any number of subscribers.
///
/// Cheap to clone; clones publish into the same feed.
#[derive(Debug, Clone)]
pub struct ChangeFeed {
    sender: broadcast::Sender<ChangeEvent>,
}

impl ChangeFeed {
    /// Create a feed buffering up to `capacity` events per subscriber.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish a change. Having no subscribers is not an error.
    pub fn publish(&self, event: ChangeEvent) {
        let delivered = self.sender.send(event).unwrap_or(0);
        tracing::debug!(subscribers = delivered, "Published change event");
    }

    /// Start receiving every change published from now on.
    #[must_use]
    pub fn subscribe(&self) -> Subscription {
        Subscription {
            receiver: self.sender.subscribe(),
        }
    }

    /// Number of live subscriptions.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

/// A live subscription to a [`ChangeFeed`]. Dropping it unsubscribes.
#[derive(Debug)]
pub struct Subscription {
    receiver: broadcast::Receiver<ChangeEvent>,
}

impl Subscription {
    /// Wait for the next change.
    ///
    /// Returns `None` once the feed is gone. A subscriber that falls behind
    /// skips the events it missed and keeps going.
    pub async fn recv(&mut self) -> Option<ChangeEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Change subscriber lagged, events dropped");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}
