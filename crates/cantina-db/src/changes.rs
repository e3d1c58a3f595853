//! # Change Notifications
//!
//! The live read side. Every repository publishes a [`ChangeEvent`] after a
//! successful commit; subscribers (view code) re-query the collections they
//! care about through the repositories.
//!
//! ## Why Notify-Then-Requery
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  mutation commits ──► ChangeEvent { collection }                │
//! │                              │                                  │
//! │        ┌─────────────────────┴─────────────────────┐            │
//! │        ▼                                           ▼            │
//! │  dashboard view                              inventory view     │
//! │  re-reads balance, debt                      re-reads levels    │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Events carry no payload. A subscriber that lags and misses events
//! (`RecvError::Lagged`) simply re-queries everything; the database is the
//! single source of truth, so a dropped notification can never corrupt a
//! consumer - it can only delay a repaint.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Collections a subscriber can observe changing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    Products,
    StockLevels,
    Providers,
    Workers,
    Purchases,
    Shifts,
    ShiftSales,
    ShiftLoans,
    Cashflow,
    ProviderSettlements,
    WorkerSettlements,
}

/// A committed change to one collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeEvent {
    pub collection: Collection,
}

/// Fan-out sender for change events.
///
/// Cheap to clone; every repository holds one. Publishing with no live
/// subscribers is a no-op.
#[derive(Debug, Clone)]
pub struct ChangeNotifier {
    sender: broadcast::Sender<ChangeEvent>,
}

impl ChangeNotifier {
    /// Creates a notifier with the given event buffer capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        ChangeNotifier { sender }
    }

    /// Subscribes to change events.
    ///
    /// The receiver sees every event published after this call; on lag it
    /// should re-query rather than trying to recover the missed events.
    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.sender.subscribe()
    }

    /// Publishes a change to one collection.
    pub fn publish(&self, collection: Collection) {
        // Send fails only when there are no subscribers; nothing to do then.
        let _ = self.sender.send(ChangeEvent { collection });
    }

    /// Publishes changes to several collections, in order.
    pub fn publish_all(&self, collections: &[Collection]) {
        for collection in collections {
            self.publish(*collection);
        }
    }
}

impl Default for ChangeNotifier {
    fn default() -> Self {
        // Large enough that a repainting UI never lags in practice.
        ChangeNotifier::new(256)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_subscriber_receives_published_events() {
        let notifier = ChangeNotifier::default();
        let mut rx = notifier.subscribe();

        notifier.publish(Collection::StockLevels);
        notifier.publish_all(&[Collection::Shifts, Collection::Cashflow]);

        assert_eq!(rx.recv().await.unwrap().collection, Collection::StockLevels);
        assert_eq!(rx.recv().await.unwrap().collection, Collection::Shifts);
        assert_eq!(rx.recv().await.unwrap().collection, Collection::Cashflow);
    }

    #[tokio::test]
    async fn test_publish_without_subscribers_is_noop() {
        let notifier = ChangeNotifier::default();
        notifier.publish(Collection::Products);
    }
}
