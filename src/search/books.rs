//! Book criteria-combination composer.
//!
//! The volumes API combines criteria natively through one Boolean query
//! string, so most combinations map to a single request. The exception is
//! multiple authors with no other criteria: an OR-author query only returns
//! works co-authored by every listed author, so the paginated composer fans
//! out one exact-phrase request per author and merges client-side.

use std::sync::Arc;

use crate::error::AppResult;
use crate::models::{Book, BookCriteria, VolumesPage};
use crate::providers::BookCatalog;
use crate::search::{genres, merge_dedupe, shuffle, PaginatedResults, PAGE_SIZE};

/// Practical upstream `startIndex` ceiling; requests beyond it come back empty
const MAX_START_INDEX: u32 = 800;

pub struct BookSearch {
    catalog: Arc<dyn BookCatalog>,
}

impl BookSearch {
    pub fn new(catalog: Arc<dyn BookCatalog>) -> Self {
        Self { catalog }
    }

    /// Combined multi-criteria search, first page of the composed ordering.
    ///
    /// Fail-soft: upstream failures degrade to an empty result.
    pub async fn search(&self, criteria: &BookCriteria) -> Vec<Book> {
        match self.compose(criteria).await {
            Ok(books) => books,
            Err(e) => {
                tracing::warn!(error = %e, "Book search failed, returning empty result");
                Vec::new()
            }
        }
    }

    /// Page-by-page variant of [`search`](Self::search).
    pub async fn search_paginated(
        &self,
        criteria: &BookCriteria,
        page: u32,
    ) -> PaginatedResults<Book> {
        match self.compose_page(criteria, page.max(1)).await {
            Ok(results) => results,
            Err(e) => {
                tracing::warn!(error = %e, "Paginated book search failed, returning empty page");
                PaginatedResults::empty()
            }
        }
    }

    async fn compose(&self, criteria: &BookCriteria) -> AppResult<Vec<Book>> {
        let Some(query) = build_query(criteria) else {
            return Ok(Vec::new());
        };
        let page = self
            .catalog
            .search_volumes(&query, 0, PAGE_SIZE as u32)
            .await?;
        Ok(page.items.into_iter().map(Book::from).collect())
    }

    async fn compose_page(
        &self,
        criteria: &BookCriteria,
        page: u32,
    ) -> AppResult<PaginatedResults<Book>> {
        if criteria.is_empty() {
            return Ok(PaginatedResults::empty());
        }

        let authors = criteria.author_names();
        if authors.len() > 1 && !criteria.has_title() && !criteria.has_genre() {
            return self.fan_out(&authors, page).await;
        }

        let Some(query) = build_query(criteria) else {
            return Ok(PaginatedResults::empty());
        };

        let start_index = (page - 1).saturating_mul(PAGE_SIZE as u32);
        if start_index >= MAX_START_INDEX {
            // Known upstream depth limit: explicit empty page, no request
            return Ok(capped_page(page));
        }

        let volumes = self
            .catalog
            .search_volumes(&query, start_index, PAGE_SIZE as u32)
            .await?;
        Ok(native_page(volumes, page))
    }

    /// Multi-author fan-out: one exact-phrase request per author, merged
    /// client-side.
    ///
    /// The page quota is split across authors and each author paginates
    /// independently, so `total_results` (the sum of per-author totals) and
    /// the derived page count are approximations, not exact combined counts.
    async fn fan_out(&self, authors: &[&str], page: u32) -> AppResult<PaginatedResults<Book>> {
        let quota = PAGE_SIZE.div_ceil(authors.len()) as u32;
        let start_index = (page - 1).saturating_mul(quota);

        if start_index >= MAX_START_INDEX {
            return Ok(capped_page(page));
        }

        let mut tasks = Vec::new();
        for &author in authors {
            let catalog = Arc::clone(&self.catalog);
            let query = exact_author_clause(author);
            tasks.push(tokio::spawn(async move {
                catalog.search_volumes(&query, start_index, quota).await
            }));
        }

        let mut batches = Vec::new();
        let mut total_results: u64 = 0;
        for task in tasks {
            match task.await {
                Ok(Ok(volumes)) => {
                    total_results += volumes.total_items;
                    batches.push(volumes.items.into_iter().map(Book::from).collect());
                }
                Ok(Err(e)) => {
                    // A failed leg contributes nothing; the page still renders
                    tracing::warn!(error = %e, "Author fan-out request failed");
                    batches.push(Vec::new());
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Author fan-out task join error");
                    batches.push(Vec::new());
                }
            }
        }

        let mut items = merge_dedupe(batches);
        shuffle(&mut items);
        items.truncate(PAGE_SIZE);

        Ok(PaginatedResults {
            items,
            current_page: page,
            total_pages: page_count(total_results),
            total_results,
        })
    }
}

/// Builds the Boolean volumes query for a criteria combination.
///
/// A single author is an exact-phrase clause; several authors form an OR
/// sub-expression; clause groups join with AND. Returns `None` when no
/// criterion survives trimming.
fn build_query(criteria: &BookCriteria) -> Option<String> {
    let mut clauses = Vec::new();

    if let Some(authors) = author_clause(&criteria.author_names()) {
        clauses.push(authors);
    }

    let title = criteria.title.trim();
    if !title.is_empty() {
        clauses.push(format!("intitle:\"{}\"", title));
    }

    let genre = criteria.genre.trim();
    if !genre.is_empty() {
        clauses.push(format!("subject:\"{}\"", genres::canonical_subject(genre)));
    }

    if clauses.is_empty() {
        None
    } else {
        Some(clauses.join(" AND "))
    }
}

fn exact_author_clause(author: &str) -> String {
    format!("inauthor:\"{}\"", author)
}

fn author_clause(authors: &[&str]) -> Option<String> {
    match authors {
        [] => None,
        [author] => Some(exact_author_clause(author)),
        many => {
            let joined = many
                .iter()
                .map(|author| exact_author_clause(author))
                .collect::<Vec<_>>()
                .join(" OR ");
            Some(format!("({})", joined))
        }
    }
}

fn page_count(total_results: u64) -> u32 {
    let reachable = total_results.min(MAX_START_INDEX as u64);
    reachable.div_ceil(PAGE_SIZE as u64) as u32
}

fn native_page(volumes: VolumesPage, page: u32) -> PaginatedResults<Book> {
    PaginatedResults {
        items: volumes.items.into_iter().map(Book::from).collect(),
        current_page: page,
        total_pages: page_count(volumes.total_items),
        total_results: volumes.total_items,
    }
}

/// Page past the upstream depth cap: empty, with the page count the cap allows
fn capped_page(page: u32) -> PaginatedResults<Book> {
    PaginatedResults {
        items: Vec::new(),
        current_page: page,
        total_pages: MAX_START_INDEX / PAGE_SIZE as u32,
        total_results: 0,
    }
}
