use tokio::sync::RwLock;

use crate::error::AppResult;
use crate::history::HistoryStore;
use crate::models::{SearchHistoryEntry, SearchKind};

/// In-memory history store for tests and storage-less deployments
#[derive(Default)]
pub struct MemoryHistoryStore {
    entries: RwLock<Vec<SearchHistoryEntry>>,
}

impl MemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl HistoryStore for MemoryHistoryStore {
    async fn record(&self, entry: SearchHistoryEntry) -> AppResult<()> {
        self.entries.write().await.push(entry);
        Ok(())
    }

    async fn list(
        &self,
        kind: Option<SearchKind>,
        text: Option<&str>,
    ) -> AppResult<Vec<SearchHistoryEntry>> {
        let entries = self.entries.read().await;
        let needle = text.map(str::to_lowercase);

        let mut matching: Vec<SearchHistoryEntry> = entries
            .iter()
            .filter(|entry| kind.is_none_or(|kind| entry.kind == kind))
            .filter(|entry| {
                needle
                    .as_deref()
                    .is_none_or(|needle| entry.query.to_lowercase().contains(needle))
            })
            .cloned()
            .collect();

        matching.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(matching)
    }

    async fn clear_all(&self) -> AppResult<u64> {
        let mut entries = self.entries.write().await;
        let removed = entries.len() as u64;
        entries.clear();
        Ok(removed)
    }
}
