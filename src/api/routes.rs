use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::request_id::{make_span_with_request_id, request_id_middleware};

use super::handlers;
use super::AppState;

/// Creates the main API router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        // Movie search
        .route("/search/movies", post(handlers::search_movies))
        .route(
            "/search/movies/paginated",
            post(handlers::search_movies_paginated),
        )
        // Book search
        .route("/search/books", post(handlers::search_books))
        .route(
            "/search/books/paginated",
            post(handlers::search_books_paginated),
        )
        // Search history
        .route("/history", post(handlers::record_history))
        .route("/history", get(handlers::list_history))
        .route("/history", delete(handlers::clear_history))
        .route("/history/watch", get(handlers::watch_history))
        .layer(
            TraceLayer::new_for_http().make_span_with(make_span_with_request_id),
        )
        .layer(middleware::from_fn(request_id_middleware))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
