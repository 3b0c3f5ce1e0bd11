/// Google Books volumes catalog client
///
/// Executes Boolean volume queries (`inauthor:"X" AND intitle:"Y" AND
/// subject:"Z"`) built by the book composer. `maxResults` and `startIndex`
/// drive paging; the composer enforces the practical `startIndex` ceiling
/// before calling here.
use crate::{
    cached,
    db::{Cache, CacheKey},
    error::{AppError, AppResult},
    models::VolumesPage,
    providers::BookCatalog,
};
use reqwest::Client as HttpClient;

const VOLUMES_CACHE_TTL: u64 = 3600; // 1 hour

#[derive(Clone)]
pub struct GoogleBooksCatalog {
    http_client: HttpClient,
    api_url: String,
    cache: Cache,
}

impl GoogleBooksCatalog {
    pub fn new(cache: Cache, api_url: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_url,
            cache,
        }
    }
}

#[async_trait::async_trait]
impl BookCatalog for GoogleBooksCatalog {
    async fn search_volumes(
        &self,
        query: &str,
        start_index: u32,
        max_results: u32,
    ) -> AppResult<VolumesPage> {
        let key = CacheKey::BookVolumes(query.to_string(), start_index, max_results);

        cached!(self.cache, key, VOLUMES_CACHE_TTL, async {
            let url = format!("{}/volumes", self.api_url);

            let response = self
                .http_client
                .get(&url)
                .query(&[
                    ("q", query.to_string()),
                    ("maxResults", max_results.to_string()),
                    ("startIndex", start_index.to_string()),
                ])
                .send()
                .await?;

            if !response.status().is_success() {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                return Err(AppError::ExternalApi(format!(
                    "Google Books API returned status {}: {}",
                    status, body
                )));
            }

            let page: VolumesPage = response.json().await?;

            tracing::debug!(
                query = %query,
                start_index = start_index,
                results = page.items.len(),
                "Volume search completed"
            );

            Ok(page)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn catalog_for(server: &MockServer) -> GoogleBooksCatalog {
        GoogleBooksCatalog::new(Cache::disabled(), server.base_url())
    }

    #[tokio::test]
    async fn search_volumes_sends_query_and_paging_params() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/volumes")
                .query_param("q", "inauthor:\"Stephen King\"")
                .query_param("maxResults", "20")
                .query_param("startIndex", "40");
            then.status(200).json_body(json!({
                "totalItems": 312,
                "items": [
                    {"id": "it-1", "volumeInfo": {"title": "It", "authors": ["Stephen King"]}}
                ]
            }));
        });

        let page = catalog_for(&server)
            .search_volumes("inauthor:\"Stephen King\"", 40, 20)
            .await
            .unwrap();

        mock.assert();
        assert_eq!(page.total_items, 312);
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].id, "it-1");
    }

    #[tokio::test]
    async fn missing_items_field_deserializes_as_empty() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/volumes");
            then.status(200).json_body(json!({"totalItems": 0}));
        });

        let page = catalog_for(&server)
            .search_volumes("inauthor:\"Nobody\"", 0, 20)
            .await
            .unwrap();

        assert!(page.items.is_empty());
        assert_eq!(page.total_items, 0);
    }

    #[tokio::test]
    async fn non_success_status_is_an_external_api_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/volumes");
            then.status(503).body("backend unavailable");
        });

        let result = catalog_for(&server).search_volumes("intitle:\"It\"", 0, 20).await;
        assert!(matches!(result, Err(AppError::ExternalApi(_))));
    }
}
