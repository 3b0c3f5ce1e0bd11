use std::collections::BTreeMap;
use std::fmt::Display;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Which catalog a recorded search targeted
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SearchKind {
    Movie,
    Book,
}

impl SearchKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchKind::Movie => "movie",
            SearchKind::Book => "book",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "movie" => Some(SearchKind::Movie),
            "book" => Some(SearchKind::Book),
            _ => None,
        }
    }
}

impl Display for SearchKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One recorded search
///
/// Created once per executed search with at least one non-empty criterion,
/// never mutated, removed only by an explicit clear-all. The `filters` map
/// holds only the criteria that were actually used; empty values are stripped
/// before the entry is stored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchHistoryEntry {
    pub id: Uuid,
    pub kind: SearchKind,
    pub query: String,
    pub filters: BTreeMap<String, Value>,
    pub timestamp: DateTime<Utc>,
}

impl SearchHistoryEntry {
    pub fn new(kind: SearchKind, query: String, filters: BTreeMap<String, Value>) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            query,
            filters: clean_filters(filters),
            timestamp: Utc::now(),
        }
    }
}

/// Strips null, empty-string and empty-array filter values.
///
/// The document store rejects null/undefined fields, so the entry only keeps
/// criteria that carried a value.
pub fn clean_filters(filters: BTreeMap<String, Value>) -> BTreeMap<String, Value> {
    filters
        .into_iter()
        .filter(|(_, value)| match value {
            Value::Null => false,
            Value::String(s) => !s.trim().is_empty(),
            Value::Array(items) => !items.is_empty(),
            _ => true,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn clean_filters_drops_empty_values() {
        let mut filters = BTreeMap::new();
        filters.insert("authors".to_string(), json!(["Stephen King"]));
        filters.insert("title".to_string(), json!(""));
        filters.insert("genre".to_string(), Value::Null);
        filters.insert("tags".to_string(), json!([]));

        let cleaned = clean_filters(filters);
        assert_eq!(cleaned.len(), 1);
        assert_eq!(cleaned["authors"], json!(["Stephen King"]));
    }

    #[test]
    fn entry_constructor_cleans_filters() {
        let mut filters = BTreeMap::new();
        filters.insert("title".to_string(), json!("It"));
        filters.insert("actor".to_string(), json!("   "));

        let entry = SearchHistoryEntry::new(SearchKind::Movie, "Título: It".to_string(), filters);
        assert_eq!(entry.kind, SearchKind::Movie);
        assert_eq!(entry.filters.len(), 1);
        assert!(entry.filters.contains_key("title"));
    }

    #[test]
    fn kind_round_trips_as_str() {
        assert_eq!(SearchKind::parse("movie"), Some(SearchKind::Movie));
        assert_eq!(SearchKind::parse("book"), Some(SearchKind::Book));
        assert_eq!(SearchKind::parse("song"), None);
        assert_eq!(SearchKind::Book.as_str(), "book");
    }
}
