//! Multi-criteria search composition.
//!
//! The movie and book composers share the same shape: dispatch on which
//! criteria slots are filled, pick a combination strategy (single-criterion
//! passthrough, native compound query, client-side intersection/filtering, or
//! per-entity fan-out) and paginate either natively or by slicing a single
//! combined fetch. This module holds the domain-independent strategy pieces;
//! `movies` and `books` supply the per-catalog dispatch.

use std::collections::HashSet;
use std::hash::Hash;

use rand::seq::SliceRandom;
use serde::Serialize;

pub mod books;
pub mod genres;
pub mod movies;

pub use books::BookSearch;
pub use movies::MovieSearch;

/// Fixed page size for every composed result page
pub const PAGE_SIZE: usize = 20;

/// An item with a catalog identity, used for dedup and intersection
pub trait CatalogItem {
    type Id: Eq + Hash + Clone;

    fn item_id(&self) -> Self::Id;
}

impl CatalogItem for crate::models::Movie {
    type Id = u64;

    fn item_id(&self) -> u64 {
        self.id
    }
}

impl CatalogItem for crate::models::Book {
    type Id = String;

    fn item_id(&self) -> String {
        self.id.clone()
    }
}

/// One page of composed search results.
///
/// For fan-out and client-side-sliced strategies, `total_results` and
/// `total_pages` are approximations of what a single combined fetch saw, not
/// exact upstream counts.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PaginatedResults<T> {
    pub items: Vec<T>,
    pub current_page: u32,
    pub total_pages: u32,
    pub total_results: u64,
}

impl<T> PaginatedResults<T> {
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            current_page: 1,
            total_pages: 0,
            total_results: 0,
        }
    }

    /// Simulates pagination over an already-fetched result list.
    ///
    /// Used for criteria combinations the upstream cannot paginate natively;
    /// totals reflect only what that single fetch returned.
    pub fn slice_of(all: Vec<T>, page: u32) -> Self {
        let page = page.max(1);
        let total_results = all.len() as u64;
        let total_pages = all.len().div_ceil(PAGE_SIZE) as u32;
        let start = (page as usize - 1).saturating_mul(PAGE_SIZE);
        let items = all.into_iter().skip(start).take(PAGE_SIZE).collect();
        Self {
            items,
            current_page: page,
            total_pages,
            total_results,
        }
    }
}

/// Intersection by identifier, preserving the order of `left`
pub fn intersect_by_id<T: CatalogItem>(left: Vec<T>, right: &[T]) -> Vec<T> {
    let right_ids: HashSet<T::Id> = right.iter().map(CatalogItem::item_id).collect();
    left.into_iter()
        .filter(|item| right_ids.contains(&item.item_id()))
        .collect()
}

/// Merges fan-out batches in order, dropping duplicate identifiers
pub fn merge_dedupe<T: CatalogItem>(batches: Vec<Vec<T>>) -> Vec<T> {
    let mut seen = HashSet::new();
    let mut merged = Vec::new();
    for batch in batches {
        for item in batch {
            if seen.insert(item.item_id()) {
                merged.push(item);
            }
        }
    }
    merged
}

/// Shuffles a merged fan-out page so no single entity dominates the visible
/// slice. Deliberately re-randomized on every call.
pub fn shuffle<T>(items: &mut [T]) {
    items.shuffle(&mut rand::thread_rng());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Movie;

    fn movie(id: u64) -> Movie {
        Movie {
            id,
            title: format!("movie-{id}"),
            overview: None,
            poster_path: None,
            genre_ids: Vec::new(),
            release_date: None,
            vote_average: None,
            popularity: None,
        }
    }

    #[test]
    fn slice_of_pages_a_long_list() {
        let all: Vec<Movie> = (1..=45).map(movie).collect();
        let page1 = PaginatedResults::slice_of(all.clone(), 1);
        assert_eq!(page1.items.len(), PAGE_SIZE);
        assert_eq!(page1.items[0].id, 1);
        assert_eq!(page1.total_pages, 3);
        assert_eq!(page1.total_results, 45);

        let page3 = PaginatedResults::slice_of(all.clone(), 3);
        assert_eq!(page3.items.len(), 5);
        assert_eq!(page3.items[0].id, 41);

        let page4 = PaginatedResults::slice_of(all, 4);
        assert!(page4.items.is_empty());
        assert_eq!(page4.current_page, 4);
    }

    #[test]
    fn slice_of_clamps_page_zero() {
        let page = PaginatedResults::slice_of(vec![movie(1)], 0);
        assert_eq!(page.current_page, 1);
        assert_eq!(page.items.len(), 1);
    }

    #[test]
    fn intersect_preserves_left_order() {
        let left = vec![movie(1), movie(2), movie(3)];
        let right = vec![movie(3), movie(1)];
        let both = intersect_by_id(left, &right);
        assert_eq!(both.iter().map(|m| m.id).collect::<Vec<_>>(), vec![1, 3]);
    }

    #[test]
    fn merge_dedupe_keeps_first_occurrence() {
        let merged = merge_dedupe(vec![
            vec![movie(1), movie(2)],
            vec![movie(2), movie(3)],
            vec![movie(1)],
        ]);
        assert_eq!(merged.iter().map(|m| m.id).collect::<Vec<_>>(), vec![1, 2, 3]);
    }
}
