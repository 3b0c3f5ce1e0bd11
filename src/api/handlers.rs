use std::collections::BTreeMap;
use std::convert::Infallible;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use serde::Deserialize;
use serde_json::json;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::{Stream, StreamExt};

use crate::error::AppResult;
use crate::models::{
    Book, BookCriteria, Movie, MovieCriteria, SearchHistoryEntry, SearchKind,
};
use crate::search::PaginatedResults;

use super::AppState;

// Request/Response types

fn default_page() -> u32 {
    1
}

#[derive(Debug, Deserialize)]
pub struct PaginatedMovieRequest {
    #[serde(flatten)]
    pub criteria: MovieCriteria,
    #[serde(default = "default_page")]
    pub page: u32,
}

#[derive(Debug, Deserialize)]
pub struct PaginatedBookRequest {
    #[serde(flatten)]
    pub criteria: BookCriteria,
    #[serde(default = "default_page")]
    pub page: u32,
}

#[derive(Debug, Deserialize)]
pub struct RecordHistoryRequest {
    pub kind: SearchKind,
    pub query: String,
    #[serde(default)]
    pub filters: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub kind: Option<SearchKind>,
    pub query: Option<String>,
}

// Handlers

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(json!({"status": "ok"}))
}

/// Combined movie search; fail-soft, so this always returns 200 with a
/// (possibly empty) list
pub async fn search_movies(
    State(state): State<AppState>,
    Json(criteria): Json<MovieCriteria>,
) -> Json<Vec<Movie>> {
    Json(state.movies.search(&criteria).await)
}

/// Paginated movie search
pub async fn search_movies_paginated(
    State(state): State<AppState>,
    Json(request): Json<PaginatedMovieRequest>,
) -> Json<PaginatedResults<Movie>> {
    Json(
        state
            .movies
            .search_paginated(&request.criteria, request.page)
            .await,
    )
}

/// Combined book search
pub async fn search_books(
    State(state): State<AppState>,
    Json(criteria): Json<BookCriteria>,
) -> Json<Vec<Book>> {
    Json(state.books.search(&criteria).await)
}

/// Paginated book search
pub async fn search_books_paginated(
    State(state): State<AppState>,
    Json(request): Json<PaginatedBookRequest>,
) -> Json<PaginatedResults<Book>> {
    Json(
        state
            .books
            .search_paginated(&request.criteria, request.page)
            .await,
    )
}

/// Records one search in the history store and publishes it to the live feed.
///
/// Unlike search, a store failure here is a real error: the caller decides
/// whether to surface it, and the already-displayed results are unaffected.
pub async fn record_history(
    State(state): State<AppState>,
    Json(request): Json<RecordHistoryRequest>,
) -> AppResult<(StatusCode, Json<SearchHistoryEntry>)> {
    let entry = SearchHistoryEntry::new(request.kind, request.query, request.filters);
    state.history.record(entry.clone()).await?;
    state.feed.publish(entry.clone());

    tracing::info!(kind = %entry.kind, query = %entry.query, "Search recorded");

    Ok((StatusCode::CREATED, Json(entry)))
}

/// Lists recorded searches, newest first
pub async fn list_history(
    State(state): State<AppState>,
    Query(params): Query<HistoryQuery>,
) -> AppResult<Json<Vec<SearchHistoryEntry>>> {
    let entries = state
        .history
        .list(params.kind, params.query.as_deref())
        .await?;
    Ok(Json(entries))
}

/// Deletes all recorded searches
pub async fn clear_history(State(state): State<AppState>) -> AppResult<Json<serde_json::Value>> {
    let deleted = state.history.clear_all().await?;
    tracing::info!(deleted = deleted, "Search history cleared");
    Ok(Json(json!({"deleted": deleted})))
}

/// Live feed of newly recorded searches as server-sent events.
///
/// Closing the connection drops the broadcast receiver, which is the
/// unsubscribe; lagged receivers skip missed entries rather than erroring.
pub async fn watch_history(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let stream = BroadcastStream::new(state.feed.subscribe()).filter_map(|entry| match entry {
        Ok(entry) => Event::default()
            .event("search")
            .json_data(&entry)
            .ok()
            .map(Ok),
        Err(_) => None,
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}
