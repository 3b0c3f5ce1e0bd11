use std::sync::Arc;

use crate::history::{HistoryFeed, HistoryStore};
use crate::providers::{BookCatalog, MovieCatalog};
use crate::search::{BookSearch, MovieSearch};

/// Shared application state
///
/// Catalog clients and the history store are constructed once at startup and
/// handed to the composers explicitly; nothing in the core reads process-wide
/// globals.
#[derive(Clone)]
pub struct AppState {
    pub movies: Arc<MovieSearch>,
    pub books: Arc<BookSearch>,
    pub history: Arc<dyn HistoryStore>,
    pub feed: HistoryFeed,
}

impl AppState {
    pub fn new(
        movie_catalog: Arc<dyn MovieCatalog>,
        book_catalog: Arc<dyn BookCatalog>,
        history: Arc<dyn HistoryStore>,
    ) -> Self {
        Self {
            movies: Arc::new(MovieSearch::new(movie_catalog)),
            books: Arc::new(BookSearch::new(book_catalog)),
            history,
            feed: HistoryFeed::default(),
        }
    }
}
