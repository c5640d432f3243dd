//! Table change notifications.
//!
//! A [`ChangeFeed`] hands out [`Subscription`]s to a single table. Events
//! carry no row data; subscribers react by re-reading. Dropping a
//! subscription unsubscribes it.

use std::fmt;

use tokio::sync::broadcast;
use tracing::debug;

/// Kind of row change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Insert => "INSERT",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
        })
    }
}

/// A change to some row of `table`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub table: String,
    pub kind: ChangeKind,
}

impl ChangeEvent {
    #[must_use]
    pub fn new(table: impl Into<String>, kind: ChangeKind) -> Self {
        Self {
            table: table.into(),
            kind,
        }
    }
}

/// Source of table change events.
pub trait ChangeFeed: Send + Sync {
    /// Subscribe to changes on `table`.
    fn subscribe(&self, table: &str) -> Subscription;
}

/// A live subscription to one table's changes.
#[derive(Debug)]
pub struct Subscription {
    table: String,
    rx: broadcast::Receiver<ChangeEvent>,
}

impl Subscription {
    /// Wait for the next change on this table.
    ///
    /// Returns `None` once the feed is closed. If the subscriber fell behind,
    /// the missed events are reported as a single update.
    pub async fn next(&mut self) -> Option<ChangeEvent> {
        loop {
            match self.rx.recv().await {
                Ok(event) if event.table == self.table => return Some(event),
                Ok(_) => {}
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    debug!(table = %self.table, skipped, "Change subscriber lagged");
                    return Some(ChangeEvent::new(self.table.clone(), ChangeKind::Update));
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

/// In-process change feed.
#[derive(Debug, Clone)]
pub struct ChangeHub {
    tx: broadcast::Sender<ChangeEvent>,
}

impl ChangeHub {
    /// Create a hub buffering up to `capacity` events per subscriber.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Notify subscribers of `table`. A no-op when nobody listens.
    pub fn publish(&self, table: &str, kind: ChangeKind) {
        let _ = self.tx.send(ChangeEvent::new(table, kind));
    }

    /// Number of live subscriptions across all tables.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for ChangeHub {
    fn default() -> Self {
        Self::new(64)
    }
}

impl ChangeFeed for ChangeHub {
    fn subscribe(&self, table: &str) -> Subscription {
        Subscription {
            table: table.to_string(),
            rx: self.tx.subscribe(),
        }
    }
}
