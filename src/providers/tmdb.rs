/// TMDB API catalog client
///
/// Query shapes the composer relies on:
/// 1. Discover: `with_genres` (comma-joined ids) and/or `with_cast`,
///    `sort_by=popularity.desc`, numbered pages
/// 2. Title search: free-text `query`, numbered pages
/// 3. Person search: free-text `query`, first match used
/// 4. Credits by movie id: cast list, used for membership tests
///
/// Language is pinned to Spanish, matching the UI this API serves.
use crate::{
    cached,
    db::{Cache, CacheKey},
    error::{AppError, AppResult},
    models::{Credits, MoviePage, PersonPage},
    providers::MovieCatalog,
};
use reqwest::Client as HttpClient;

const LANGUAGE: &str = "es-ES";
const SORT_BY: &str = "popularity.desc";

const DISCOVER_CACHE_TTL: u64 = 3600; // 1 hour
const TITLE_CACHE_TTL: u64 = 3600; // 1 hour
const PERSON_CACHE_TTL: u64 = 86400; // 1 day
const CREDITS_CACHE_TTL: u64 = 604800; // 1 week

#[derive(Clone)]
pub struct TmdbCatalog {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    cache: Cache,
}

impl TmdbCatalog {
    pub fn new(cache: Cache, api_key: String, api_url: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_key,
            api_url,
            cache,
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> AppResult<T> {
        let url = format!("{}{}", self.api_url, path);

        let response = self
            .http_client
            .get(&url)
            .query(&[("api_key", self.api_key.as_str())])
            .query(query)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "TMDB API returned status {}: {}",
                status, body
            )));
        }

        Ok(response.json().await?)
    }

    fn join_ids(genre_ids: &[u64]) -> String {
        genre_ids
            .iter()
            .map(u64::to_string)
            .collect::<Vec<_>>()
            .join(",")
    }
}

#[async_trait::async_trait]
impl MovieCatalog for TmdbCatalog {
    async fn discover_by_genres(&self, genre_ids: &[u64], page: u32) -> AppResult<MoviePage> {
        let with_genres = Self::join_ids(genre_ids);
        let key = CacheKey::MovieDiscover(format!("g{}", with_genres), page);

        cached!(self.cache, key, DISCOVER_CACHE_TTL, async {
            let page: MoviePage = self
                .get_json(
                    "/discover/movie",
                    &[
                        ("with_genres", with_genres.clone()),
                        ("language", LANGUAGE.to_string()),
                        ("sort_by", SORT_BY.to_string()),
                        ("page", page.to_string()),
                    ],
                )
                .await?;

            tracing::debug!(
                genres = %with_genres,
                results = page.results.len(),
                "Genre discover completed"
            );

            Ok(page)
        })
    }

    async fn search_by_title(&self, title: &str, page: u32) -> AppResult<MoviePage> {
        let query = title.trim().to_string();
        let key = CacheKey::MovieTitleSearch(query.clone(), page);

        cached!(self.cache, key, TITLE_CACHE_TTL, async {
            let page: MoviePage = self
                .get_json(
                    "/search/movie",
                    &[
                        ("query", query.clone()),
                        ("language", LANGUAGE.to_string()),
                        ("page", page.to_string()),
                    ],
                )
                .await?;

            tracing::debug!(query = %query, results = page.results.len(), "Title search completed");

            Ok(page)
        })
    }

    async fn find_person(&self, name: &str) -> AppResult<Option<u64>> {
        let query = name.trim().to_string();
        let key = CacheKey::PersonSearch(query.clone());

        cached!(self.cache, key, PERSON_CACHE_TTL, async {
            let page: PersonPage = self
                .get_json(
                    "/search/person",
                    &[
                        ("query", query.clone()),
                        ("language", LANGUAGE.to_string()),
                    ],
                )
                .await?;

            // First match only; no disambiguation
            let person_id = page.results.first().map(|person| person.id);

            tracing::debug!(query = %query, person_id = ?person_id, "Person search completed");

            Ok(person_id)
        })
    }

    async fn discover_by_cast(
        &self,
        person_id: u64,
        genre_ids: &[u64],
        page: u32,
    ) -> AppResult<MoviePage> {
        let mut query = vec![
            ("with_cast", person_id.to_string()),
            ("language", LANGUAGE.to_string()),
            ("sort_by", SORT_BY.to_string()),
            ("page", page.to_string()),
        ];

        let signature = if genre_ids.is_empty() {
            format!("c{}", person_id)
        } else {
            let with_genres = Self::join_ids(genre_ids);
            query.push(("with_genres", with_genres.clone()));
            format!("c{}+g{}", person_id, with_genres)
        };

        let key = CacheKey::MovieDiscover(signature, page);

        cached!(self.cache, key, DISCOVER_CACHE_TTL, async {
            let page: MoviePage = self.get_json("/discover/movie", &query).await?;

            tracing::debug!(
                person_id = person_id,
                results = page.results.len(),
                "Cast discover completed"
            );

            Ok(page)
        })
    }

    async fn movie_has_cast(&self, movie_id: u64, person_id: u64) -> AppResult<bool> {
        let key = CacheKey::MovieCredits(movie_id);

        let credits: AppResult<Credits> = cached!(self.cache, key, CREDITS_CACHE_TTL, async {
            let credits: Credits = self
                .get_json(&format!("/movie/{}/credits", movie_id), &[])
                .await?;
            Ok(credits)
        });

        Ok(credits?.cast.iter().any(|member| member.id == person_id))
    }
}
