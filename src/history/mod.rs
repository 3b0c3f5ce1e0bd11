//! Search-history persistence.
//!
//! The store is a plain document interface: append, list, clear-all. Entries
//! are never updated. Live updates are a separate concern: the [`HistoryFeed`]
//! broadcasts each recorded entry to subscribers, and dropping a receiver is
//! the unsubscribe.

use tokio::sync::broadcast;

use crate::error::AppResult;
use crate::models::{SearchHistoryEntry, SearchKind};

pub mod memory;
pub mod postgres;

pub use memory::MemoryHistoryStore;
pub use postgres::PostgresHistoryStore;

#[async_trait::async_trait]
pub trait HistoryStore: Send + Sync {
    /// Appends one entry
    async fn record(&self, entry: SearchHistoryEntry) -> AppResult<()>;

    /// Lists entries newest-first, optionally filtered by kind and by a
    /// case-insensitive substring of the query summary
    async fn list(
        &self,
        kind: Option<SearchKind>,
        text: Option<&str>,
    ) -> AppResult<Vec<SearchHistoryEntry>>;

    /// Deletes every entry, returning how many were removed
    async fn clear_all(&self) -> AppResult<u64>;
}

/// Broadcast channel of newly recorded entries
#[derive(Clone)]
pub struct HistoryFeed {
    tx: broadcast::Sender<SearchHistoryEntry>,
}

impl HistoryFeed {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Publishes a recorded entry; a feed with no subscribers drops it
    pub fn publish(&self, entry: SearchHistoryEntry) {
        let _ = self.tx.send(entry);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SearchHistoryEntry> {
        self.tx.subscribe()
    }
}

impl Default for HistoryFeed {
    fn default() -> Self {
        Self::new(64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[tokio::test]
    async fn feed_delivers_to_subscribers() {
        let feed = HistoryFeed::default();
        let mut rx = feed.subscribe();

        let entry = SearchHistoryEntry::new(
            SearchKind::Movie,
            "Título: It".to_string(),
            BTreeMap::new(),
        );
        feed.publish(entry.clone());

        let received = rx.recv().await.unwrap();
        assert_eq!(received, entry);
    }

    #[tokio::test]
    async fn publish_without_subscribers_is_a_noop() {
        let feed = HistoryFeed::default();
        feed.publish(SearchHistoryEntry::new(
            SearchKind::Book,
            "Autores: King".to_string(),
            BTreeMap::new(),
        ));
    }
}
