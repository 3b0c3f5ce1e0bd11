//! Movie criteria-combination composer.
//!
//! Dispatches on which of the three criteria slots (genres, title, actor)
//! are filled. Each of the seven non-empty combinations has its own strategy
//! because the upstream supports them unevenly: discover combines genres and
//! cast natively, but title+genre and title+actor only combine client-side.

use std::sync::Arc;

use crate::error::AppResult;
use crate::models::{Movie, MovieCriteria, MoviePage};
use crate::providers::MovieCatalog;
use crate::search::{genres, intersect_by_id, PaginatedResults};

/// Upstream discover/search endpoints stop serving pages past this index
const MAX_NATIVE_PAGES: u32 = 500;

pub struct MovieSearch {
    catalog: Arc<dyn MovieCatalog>,
}

impl MovieSearch {
    pub fn new(catalog: Arc<dyn MovieCatalog>) -> Self {
        Self { catalog }
    }

    /// Combined multi-criteria search, first page of the composed ordering.
    ///
    /// Fail-soft: upstream failures degrade to an empty result, never an
    /// error to the caller.
    pub async fn search(&self, criteria: &MovieCriteria) -> Vec<Movie> {
        match self.compose(criteria).await {
            Ok(movies) => movies,
            Err(e) => {
                tracing::warn!(error = %e, "Movie search failed, returning empty result");
                Vec::new()
            }
        }
    }

    /// Page-by-page variant of [`search`](Self::search).
    ///
    /// Single-criterion combinations and genres+actor forward the page to the
    /// upstream; the rest fetch the combined list once and slice client-side,
    /// so their totals only reflect that single fetch.
    pub async fn search_paginated(
        &self,
        criteria: &MovieCriteria,
        page: u32,
    ) -> PaginatedResults<Movie> {
        match self.compose_page(criteria, page.max(1)).await {
            Ok(results) => results,
            Err(e) => {
                tracing::warn!(error = %e, "Paginated movie search failed, returning empty page");
                PaginatedResults::empty()
            }
        }
    }

    async fn compose(&self, criteria: &MovieCriteria) -> AppResult<Vec<Movie>> {
        let slots = (
            criteria.has_genres(),
            criteria.has_title(),
            criteria.has_actor(),
        );

        match slots {
            // No criteria: nothing to ask upstream
            (false, false, false) => Ok(Vec::new()),

            // Single criterion: direct passthrough
            (false, true, false) => Ok(self
                .catalog
                .search_by_title(&criteria.title, 1)
                .await?
                .results),
            (false, false, true) => Ok(self.by_actor(&criteria.actor, 1).await?.results),
            (true, false, false) => Ok(self.by_genres(&criteria.genres, 1).await?.results),

            // Title + actor: no upstream endpoint combines these, so run both
            // and intersect by id
            (false, true, true) => {
                let (title_page, actor_page) = tokio::join!(
                    self.catalog.search_by_title(&criteria.title, 1),
                    self.by_actor(&criteria.actor, 1),
                );
                Ok(intersect_by_id(title_page?.results, &actor_page?.results))
            }

            // Genres + actor: native compound discover
            (true, false, true) => {
                let Some(person_id) = self.catalog.find_person(&criteria.actor).await? else {
                    return Ok(Vec::new());
                };
                let genre_ids = genres::movie_genre_ids(&criteria.genres);
                if genre_ids.is_empty() {
                    return Ok(Vec::new());
                }
                Ok(self
                    .catalog
                    .discover_by_cast(person_id, &genre_ids, 1)
                    .await?
                    .results)
            }

            // Genres + title: title search, then filter on genre tags
            (true, true, false) => {
                let title_results = self
                    .catalog
                    .search_by_title(&criteria.title, 1)
                    .await?
                    .results;
                let genre_ids = genres::movie_genre_ids(&criteria.genres);
                Ok(filter_by_genres(title_results, &genre_ids))
            }

            // All three: title search, per-movie cast membership check, then
            // genre filter. The credits lookups are the expensive path.
            (true, true, true) => {
                let title_results = self
                    .catalog
                    .search_by_title(&criteria.title, 1)
                    .await?
                    .results;
                let Some(person_id) = self.catalog.find_person(&criteria.actor).await? else {
                    return Ok(Vec::new());
                };

                let mut with_actor = Vec::new();
                for movie in title_results {
                    // A failed credits lookup only drops that movie
                    let has_actor = self
                        .catalog
                        .movie_has_cast(movie.id, person_id)
                        .await
                        .unwrap_or(false);
                    if has_actor {
                        with_actor.push(movie);
                    }
                }

                let genre_ids = genres::movie_genre_ids(&criteria.genres);
                Ok(filter_by_genres(with_actor, &genre_ids))
            }
        }
    }

    async fn compose_page(
        &self,
        criteria: &MovieCriteria,
        page: u32,
    ) -> AppResult<PaginatedResults<Movie>> {
        let slots = (
            criteria.has_genres(),
            criteria.has_title(),
            criteria.has_actor(),
        );

        match slots {
            (false, false, false) => Ok(PaginatedResults::empty()),

            // Natively paginated combinations
            (true, false, false) => Ok(native_page(self.by_genres(&criteria.genres, page).await?)),
            (false, true, false) => Ok(native_page(
                self.catalog.search_by_title(&criteria.title, page).await?,
            )),
            (false, false, true) => Ok(native_page(self.by_actor(&criteria.actor, page).await?)),
            (true, false, true) => {
                let Some(person_id) = self.catalog.find_person(&criteria.actor).await? else {
                    return Ok(PaginatedResults::empty());
                };
                let genre_ids = genres::movie_genre_ids(&criteria.genres);
                if genre_ids.is_empty() {
                    return Ok(PaginatedResults::empty());
                }
                Ok(native_page(
                    self.catalog
                        .discover_by_cast(person_id, &genre_ids, page)
                        .await?,
                ))
            }

            // Remaining combinations cannot paginate upstream: fetch the
            // combined list once and slice it
            _ => Ok(PaginatedResults::slice_of(
                self.compose(criteria).await?,
                page,
            )),
        }
    }

    /// Genre search; unresolvable token sets return empty without a call
    async fn by_genres(&self, tokens: &[String], page: u32) -> AppResult<MoviePage> {
        let genre_ids = genres::movie_genre_ids(tokens);
        if genre_ids.is_empty() {
            return Ok(empty_movie_page());
        }
        self.catalog.discover_by_genres(&genre_ids, page).await
    }

    /// Two-step actor search: resolve the name, then discover by cast id
    async fn by_actor(&self, name: &str, page: u32) -> AppResult<MoviePage> {
        let Some(person_id) = self.catalog.find_person(name).await? else {
            return Ok(empty_movie_page());
        };
        self.catalog.discover_by_cast(person_id, &[], page).await
    }
}

fn empty_movie_page() -> MoviePage {
    MoviePage {
        page: 1,
        results: Vec::new(),
        total_pages: 0,
        total_results: 0,
    }
}

/// Keeps movies whose genre-tag set intersects the requested ids.
///
/// An empty id set (every requested name unmapped) applies no filter.
fn filter_by_genres(movies: Vec<Movie>, genre_ids: &[u64]) -> Vec<Movie> {
    if genre_ids.is_empty() {
        return movies;
    }
    movies
        .into_iter()
        .filter(|movie| movie.genre_ids.iter().any(|id| genre_ids.contains(id)))
        .collect()
}

fn native_page(page: MoviePage) -> PaginatedResults<Movie> {
    PaginatedResults {
        items: page.results,
        current_page: page.page,
        total_pages: page.total_pages.min(MAX_NATIVE_PAGES),
        total_results: page.total_results,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::fake::{movie, FakeMovieCatalog};
    use std::collections::HashSet;

    fn service(catalog: Arc<FakeMovieCatalog>) -> MovieSearch {
        MovieSearch::new(catalog)
    }

    fn criteria(genres: &[&str], title: &str, actor: &str) -> MovieCriteria {
        MovieCriteria {
            genres: genres.iter().map(|g| g.to_string()).collect(),
            title: title.to_string(),
            actor: actor.to_string(),
        }
    }

    #[tokio::test]
    async fn all_empty_criteria_issue_no_calls() {
        let catalog = Arc::new(FakeMovieCatalog::default());
        let search = service(catalog.clone());

        let results = search.search(&criteria(&[], "", "")).await;
        assert!(results.is_empty());

        let page = search.search_paginated(&criteria(&[], "  ", ""), 1).await;
        assert!(page.items.is_empty());
        assert_eq!(page.total_pages, 0);

        assert_eq!(catalog.call_count(), 0);
    }

    #[tokio::test]
    async fn genre_search_builds_discover_query_for_accion() {
        let catalog = Arc::new(FakeMovieCatalog {
            genre_results: vec![movie(1, "Mad Max", &[28]), movie(2, "John Wick", &[28, 53])],
            ..Default::default()
        });
        let search = service(catalog.clone());

        let results = search.search(&criteria(&["accion"], "", "")).await;
        assert_eq!(results.len(), 2);
        assert_eq!(catalog.call_log(), vec!["discover_by_genres:28:p1"]);
    }

    #[tokio::test]
    async fn numeric_genre_tokens_are_used_directly() {
        let catalog = Arc::new(FakeMovieCatalog {
            genre_results: vec![movie(1, "Mad Max", &[28])],
            ..Default::default()
        });
        let search = service(catalog.clone());

        search.search(&criteria(&["28", "12"], "", "")).await;
        assert_eq!(catalog.call_log(), vec!["discover_by_genres:28,12:p1"]);
    }

    #[tokio::test]
    async fn unknown_genre_alone_returns_empty_without_a_call() {
        let catalog = Arc::new(FakeMovieCatalog {
            genre_results: vec![movie(1, "ignored", &[28])],
            ..Default::default()
        });
        let search = service(catalog.clone());

        let results = search.search(&criteria(&["xyzzy"], "", "")).await;
        assert!(results.is_empty());
        assert_eq!(catalog.call_count(), 0);
    }

    #[tokio::test]
    async fn actor_search_resolves_person_then_discovers() {
        let catalog = Arc::new(FakeMovieCatalog {
            person: Some(6384),
            cast_results: vec![movie(603, "Matrix", &[28, 878])],
            ..Default::default()
        });
        let search = service(catalog.clone());

        let results = search.search(&criteria(&[], "", "Keanu Reeves")).await;
        assert_eq!(results.len(), 1);
        assert_eq!(
            catalog.call_log(),
            vec!["find_person:Keanu Reeves", "discover_by_cast:6384:g:p1"]
        );
    }

    #[tokio::test]
    async fn unmatched_actor_returns_empty() {
        let catalog = Arc::new(FakeMovieCatalog::default());
        let search = service(catalog.clone());

        let results = search.search(&criteria(&[], "", "Nobody Famous")).await;
        assert!(results.is_empty());
        assert_eq!(catalog.call_log(), vec!["find_person:Nobody Famous"]);
    }

    #[tokio::test]
    async fn title_plus_actor_returns_the_intersection() {
        let catalog = Arc::new(FakeMovieCatalog {
            title_results: vec![
                movie(1, "Speed", &[28]),
                movie(2, "Speed 2", &[28]),
                movie(3, "Speed Racer", &[12]),
            ],
            person: Some(6384),
            cast_results: vec![movie(2, "Speed 2", &[28]), movie(1, "Speed", &[28])],
            ..Default::default()
        });
        let search = service(catalog.clone());

        let results = search.search(&criteria(&[], "Speed", "Keanu Reeves")).await;
        let ids: Vec<u64> = results.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![1, 2]);

        // Intersection is a subset of both single-criterion result sets
        let title_ids: HashSet<u64> = catalog.title_results.iter().map(|m| m.id).collect();
        let actor_ids: HashSet<u64> = catalog.cast_results.iter().map(|m| m.id).collect();
        for id in ids {
            assert!(title_ids.contains(&id));
            assert!(actor_ids.contains(&id));
        }
    }

    #[tokio::test]
    async fn genres_plus_actor_issues_one_compound_discover() {
        let catalog = Arc::new(FakeMovieCatalog {
            person: Some(6384),
            cast_results: vec![movie(603, "Matrix", &[28, 878])],
            ..Default::default()
        });
        let search = service(catalog.clone());

        let results = search
            .search(&criteria(&["accion", "878"], "", "Keanu Reeves"))
            .await;
        assert_eq!(results.len(), 1);
        assert_eq!(
            catalog.call_log(),
            vec!["find_person:Keanu Reeves", "discover_by_cast:6384:g28,878:p1"]
        );
    }

    #[tokio::test]
    async fn genres_plus_title_filters_on_genre_tags() {
        let catalog = Arc::new(FakeMovieCatalog {
            title_results: vec![
                movie(1, "Alien", &[27, 878]),
                movie(2, "Alien Autopsy", &[35]),
                movie(3, "Aliens", &[878, 28]),
            ],
            ..Default::default()
        });
        let search = service(catalog.clone());

        let results = search.search(&criteria(&["scifi"], "Alien", "")).await;
        let ids: Vec<u64> = results.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![1, 3]);

        // Every survivor carries at least one requested genre tag
        for movie in &results {
            assert!(movie.genre_ids.contains(&878));
        }
    }

    #[tokio::test]
    async fn genres_plus_title_with_unmapped_genres_keeps_title_results() {
        let catalog = Arc::new(FakeMovieCatalog {
            title_results: vec![movie(1, "Alien", &[27]), movie(2, "Aliens", &[878])],
            ..Default::default()
        });
        let search = service(catalog.clone());

        let results = search.search(&criteria(&["xyzzy"], "Alien", "")).await;
        assert_eq!(results.len(), 2);
    }

    #[tokio::test]
    async fn all_three_criteria_chain_cast_checks_then_genre_filter() {
        let catalog = Arc::new(FakeMovieCatalog {
            title_results: vec![
                movie(1, "Speed", &[28, 53]),
                movie(2, "Speed 2", &[53]),
                movie(3, "Speed Racer", &[28]),
            ],
            person: Some(6384),
            cast_memberships: [(1, 6384), (2, 6384)].into_iter().collect(),
            ..Default::default()
        });
        let search = service(catalog.clone());

        let results = search
            .search(&criteria(&["accion"], "Speed", "Keanu Reeves"))
            .await;
        // Movie 3 fails the cast check, movie 2 fails the genre filter
        assert_eq!(results.iter().map(|m| m.id).collect::<Vec<_>>(), vec![1]);

        // Credits looked up once per title result, sequentially
        let log = catalog.call_log();
        assert_eq!(
            log,
            vec![
                "search_by_title:Speed:p1",
                "find_person:Keanu Reeves",
                "movie_has_cast:1:6384",
                "movie_has_cast:2:6384",
                "movie_has_cast:3:6384",
            ]
        );
    }

    #[tokio::test]
    async fn upstream_failure_degrades_to_empty() {
        let catalog = Arc::new(FakeMovieCatalog {
            failing: true,
            ..Default::default()
        });
        let search = service(catalog.clone());

        let results = search.search(&criteria(&["drama"], "", "")).await;
        assert!(results.is_empty());

        let page = search.search_paginated(&criteria(&[], "Alien", ""), 1).await;
        assert!(page.items.is_empty());
        assert_eq!(page.total_results, 0);
    }

    #[tokio::test]
    async fn single_criterion_pagination_is_native() {
        let catalog = Arc::new(FakeMovieCatalog {
            genre_results: vec![movie(1, "Mad Max", &[28])],
            total_pages_override: Some(33),
            ..Default::default()
        });
        let search = service(catalog.clone());

        let page = search.search_paginated(&criteria(&["accion"], "", ""), 4).await;
        assert_eq!(page.current_page, 4);
        assert_eq!(page.total_pages, 33);
        assert_eq!(catalog.call_log(), vec!["discover_by_genres:28:p4"]);
    }

    #[tokio::test]
    async fn native_pagination_caps_total_pages_at_api_limit() {
        let catalog = Arc::new(FakeMovieCatalog {
            title_results: vec![movie(1, "Alien", &[878])],
            total_pages_override: Some(1200),
            ..Default::default()
        });
        let search = service(catalog.clone());

        let page = search.search_paginated(&criteria(&[], "Alien", ""), 1).await;
        assert_eq!(page.total_pages, 500);
    }

    #[tokio::test]
    async fn genres_plus_actor_pagination_forwards_the_page() {
        let catalog = Arc::new(FakeMovieCatalog {
            person: Some(6384),
            cast_results: vec![movie(603, "Matrix", &[28])],
            ..Default::default()
        });
        let search = service(catalog.clone());

        let page = search
            .search_paginated(&criteria(&["28"], "", "Keanu Reeves"), 2)
            .await;
        assert_eq!(page.current_page, 2);
        assert_eq!(
            catalog.call_log(),
            vec!["find_person:Keanu Reeves", "discover_by_cast:6384:g28:p2"]
        );
    }

    #[tokio::test]
    async fn multi_criterion_pagination_slices_client_side() {
        let all: Vec<Movie> = (1..=30).map(|id| movie(id, "Speed", &[28])).collect();
        let catalog = Arc::new(FakeMovieCatalog {
            title_results: all.clone(),
            person: Some(6384),
            cast_results: all,
            ..Default::default()
        });
        let search = service(catalog.clone());

        let page2 = search
            .search_paginated(&criteria(&[], "Speed", "Keanu Reeves"), 2)
            .await;
        assert_eq!(page2.items.len(), 10);
        assert_eq!(page2.items[0].id, 21);
        assert_eq!(page2.total_results, 30);
        assert_eq!(page2.total_pages, 2);
    }
}
