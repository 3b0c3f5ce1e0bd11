//! In-memory catalogs with canned results and a call log.
//!
//! Used by the composer unit tests and the API integration tests to verify
//! which upstream requests a criteria combination produces without any
//! network traffic.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use crate::error::{AppError, AppResult};
use crate::models::{Book, Movie, MoviePage, Volume, VolumeInfo, VolumesPage};
use crate::providers::{BookCatalog, MovieCatalog};

pub fn movie(id: u64, title: &str, genre_ids: &[u64]) -> Movie {
    Movie {
        id,
        title: title.to_string(),
        overview: None,
        poster_path: None,
        genre_ids: genre_ids.to_vec(),
        release_date: None,
        vote_average: None,
        popularity: None,
    }
}

pub fn book(id: &str, title: &str, authors: &[&str]) -> Book {
    Book {
        id: id.to_string(),
        title: title.to_string(),
        authors: authors.iter().map(|a| a.to_string()).collect(),
        description: None,
        thumbnail: None,
        categories: Vec::new(),
        preview_link: None,
    }
}

fn volume_of(book: &Book) -> Volume {
    Volume {
        id: book.id.clone(),
        volume_info: VolumeInfo {
            title: book.title.clone(),
            authors: book.authors.clone(),
            description: book.description.clone(),
            image_links: None,
            categories: book.categories.clone(),
            preview_link: book.preview_link.clone(),
        },
    }
}

/// Fake movie catalog: fixed result sets per operation plus a call log
#[derive(Default)]
pub struct FakeMovieCatalog {
    pub genre_results: Vec<Movie>,
    pub title_results: Vec<Movie>,
    pub cast_results: Vec<Movie>,
    pub person: Option<u64>,
    /// (movie_id, person_id) pairs for which the credits check succeeds
    pub cast_memberships: HashSet<(u64, u64)>,
    /// Reported upstream page count, for exercising the native page cap
    pub total_pages_override: Option<u32>,
    /// When set, every operation fails with an upstream error
    pub failing: bool,
    pub calls: Mutex<Vec<String>>,
}

impl FakeMovieCatalog {
    fn page_of(&self, results: Vec<Movie>, page: u32) -> MoviePage {
        let total_results = results.len() as u64;
        let natural_pages = if results.is_empty() { 0 } else { 1 };
        MoviePage {
            page,
            total_pages: self.total_pages_override.unwrap_or(natural_pages),
            total_results,
            results,
        }
    }

    pub fn call_log(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn log(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn check_failing(&self) -> AppResult<()> {
        if self.failing {
            Err(AppError::ExternalApi("upstream down".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait::async_trait]
impl MovieCatalog for FakeMovieCatalog {
    async fn discover_by_genres(&self, genre_ids: &[u64], page: u32) -> AppResult<MoviePage> {
        self.log(format!(
            "discover_by_genres:{}:p{}",
            genre_ids
                .iter()
                .map(u64::to_string)
                .collect::<Vec<_>>()
                .join(","),
            page
        ));
        self.check_failing()?;
        Ok(self.page_of(self.genre_results.clone(), page))
    }

    async fn search_by_title(&self, title: &str, page: u32) -> AppResult<MoviePage> {
        self.log(format!("search_by_title:{}:p{}", title.trim(), page));
        self.check_failing()?;
        Ok(self.page_of(self.title_results.clone(), page))
    }

    async fn find_person(&self, name: &str) -> AppResult<Option<u64>> {
        self.log(format!("find_person:{}", name.trim()));
        self.check_failing()?;
        Ok(self.person)
    }

    async fn discover_by_cast(
        &self,
        person_id: u64,
        genre_ids: &[u64],
        page: u32,
    ) -> AppResult<MoviePage> {
        self.log(format!(
            "discover_by_cast:{}:g{}:p{}",
            person_id,
            genre_ids
                .iter()
                .map(u64::to_string)
                .collect::<Vec<_>>()
                .join(","),
            page
        ));
        self.check_failing()?;
        Ok(self.page_of(self.cast_results.clone(), page))
    }

    async fn movie_has_cast(&self, movie_id: u64, person_id: u64) -> AppResult<bool> {
        self.log(format!("movie_has_cast:{}:{}", movie_id, person_id));
        self.check_failing()?;
        Ok(self.cast_memberships.contains(&(movie_id, person_id)))
    }
}

/// One canned volumes response for a fake book catalog query
pub struct CannedVolumes {
    pub total_items: u64,
    pub books: Vec<Book>,
}

/// Fake book catalog: canned pages keyed by exact query string plus a call log
#[derive(Default)]
pub struct FakeBookCatalog {
    pub by_query: HashMap<String, CannedVolumes>,
    /// Queries that fail with an upstream error
    pub failing_queries: HashSet<String>,
    pub failing: bool,
    pub calls: Mutex<Vec<(String, u32, u32)>>,
}

impl FakeBookCatalog {
    pub fn with_query(mut self, query: &str, total_items: u64, books: Vec<Book>) -> Self {
        self.by_query
            .insert(query.to_string(), CannedVolumes { total_items, books });
        self
    }

    pub fn with_failing_query(mut self, query: &str) -> Self {
        self.failing_queries.insert(query.to_string());
        self
    }

    pub fn call_log(&self) -> Vec<(String, u32, u32)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl BookCatalog for FakeBookCatalog {
    async fn search_volumes(
        &self,
        query: &str,
        start_index: u32,
        max_results: u32,
    ) -> AppResult<VolumesPage> {
        self.calls
            .lock()
            .unwrap()
            .push((query.to_string(), start_index, max_results));

        if self.failing || self.failing_queries.contains(query) {
            return Err(AppError::ExternalApi("upstream down".to_string()));
        }

        let Some(canned) = self.by_query.get(query) else {
            return Ok(VolumesPage::default());
        };

        // Slice the canned set the way the upstream pages it
        let items = canned
            .books
            .iter()
            .skip(start_index as usize)
            .take(max_results as usize)
            .map(volume_of)
            .collect();

        Ok(VolumesPage {
            total_items: canned.total_items,
            items,
        })
    }
}
