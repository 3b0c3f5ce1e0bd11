/// Upstream catalog abstraction
///
/// The composers in `crate::search` only ever talk to these traits, so the
/// combination logic is testable against fake catalogs and the concrete
/// clients stay thin request builders.
use crate::{
    error::AppResult,
    models::{MoviePage, VolumesPage},
};

pub mod fake;
pub mod google_books;
pub mod tmdb;

pub use google_books::GoogleBooksCatalog;
pub use tmdb::TmdbCatalog;

/// Movie metadata catalog (TMDB-shaped)
#[async_trait::async_trait]
pub trait MovieCatalog: Send + Sync {
    /// Discover movies carrying every given genre id, popularity-sorted
    async fn discover_by_genres(&self, genre_ids: &[u64], page: u32) -> AppResult<MoviePage>;

    /// Free-text title search
    async fn search_by_title(&self, title: &str, page: u32) -> AppResult<MoviePage>;

    /// Resolves a person name to an upstream id; first match only, no
    /// disambiguation. `None` when nothing matches.
    async fn find_person(&self, name: &str) -> AppResult<Option<u64>>;

    /// Discover movies by cast member, optionally narrowed by genre ids
    /// (native AND semantics)
    async fn discover_by_cast(
        &self,
        person_id: u64,
        genre_ids: &[u64],
        page: u32,
    ) -> AppResult<MoviePage>;

    /// Cast membership test via the credits endpoint
    async fn movie_has_cast(&self, movie_id: u64, person_id: u64) -> AppResult<bool>;
}

/// Book metadata catalog (Google Books-shaped)
///
/// The Boolean query string (`inauthor:`/`intitle:`/`subject:` clauses) is
/// built by the book composer; the catalog only executes it.
#[async_trait::async_trait]
pub trait BookCatalog: Send + Sync {
    async fn search_volumes(
        &self,
        query: &str,
        start_index: u32,
        max_results: u32,
    ) -> AppResult<VolumesPage>;
}
