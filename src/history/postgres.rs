use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::history::HistoryStore;
use crate::models::{SearchHistoryEntry, SearchKind};

/// PostgreSQL-backed history store
pub struct PostgresHistoryStore {
    pool: PgPool,
}

impl PostgresHistoryStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates the history table if this is a fresh database
    pub async fn init(&self) -> AppResult<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS search_history (
                id UUID PRIMARY KEY,
                kind TEXT NOT NULL,
                query TEXT NOT NULL,
                filters JSONB NOT NULL,
                recorded_at TIMESTAMPTZ NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    fn entry_from_row(row: &sqlx::postgres::PgRow) -> AppResult<SearchHistoryEntry> {
        let id: Uuid = row.try_get("id")?;
        let kind: String = row.try_get("kind")?;
        let query: String = row.try_get("query")?;
        let filters: serde_json::Value = row.try_get("filters")?;
        let timestamp: DateTime<Utc> = row.try_get("recorded_at")?;

        let kind = SearchKind::parse(&kind)
            .ok_or_else(|| AppError::Internal(format!("Unknown history kind: {}", kind)))?;
        let filters: BTreeMap<String, serde_json::Value> = match filters {
            serde_json::Value::Object(map) => map.into_iter().collect(),
            _ => BTreeMap::new(),
        };

        Ok(SearchHistoryEntry {
            id,
            kind,
            query,
            filters,
            timestamp,
        })
    }
}

#[async_trait::async_trait]
impl HistoryStore for PostgresHistoryStore {
    async fn record(&self, entry: SearchHistoryEntry) -> AppResult<()> {
        let filters = serde_json::Value::Object(entry.filters.into_iter().collect());

        sqlx::query(
            r#"
            INSERT INTO search_history (id, kind, query, filters, recorded_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(entry.id)
        .bind(entry.kind.as_str())
        .bind(&entry.query)
        .bind(filters)
        .bind(entry.timestamp)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn list(
        &self,
        kind: Option<SearchKind>,
        text: Option<&str>,
    ) -> AppResult<Vec<SearchHistoryEntry>> {
        let rows = sqlx::query(
            r#"
            SELECT id, kind, query, filters, recorded_at
            FROM search_history
            WHERE ($1::TEXT IS NULL OR kind = $1)
              AND ($2::TEXT IS NULL OR query ILIKE '%' || $2 || '%')
            ORDER BY recorded_at DESC
            "#,
        )
        .bind(kind.map(|kind| kind.as_str()))
        .bind(text)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::entry_from_row).collect()
    }

    async fn clear_all(&self) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM search_history")
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
