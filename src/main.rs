use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use mediarec_api::api::{create_router, AppState};
use mediarec_api::config::Config;
use mediarec_api::db::{create_pool, create_redis_client, Cache};
use mediarec_api::history::PostgresHistoryStore;
use mediarec_api::providers::{GoogleBooksCatalog, TmdbCatalog};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("mediarec_api=info,tower_http=info")),
        )
        .init();

    // Upstream response cache; the client connects lazily
    let redis_client = create_redis_client(&config.redis_url)?;
    let (cache, _cache_writer) = Cache::new(redis_client);

    // Search history store
    let pool = create_pool(&config.database_url).await?;
    let history = PostgresHistoryStore::new(pool);
    history.init().await?;

    let movie_catalog = Arc::new(TmdbCatalog::new(
        cache.clone(),
        config.tmdb_api_key.clone(),
        config.tmdb_api_url.clone(),
    ));
    let book_catalog = Arc::new(GoogleBooksCatalog::new(
        cache,
        config.books_api_url.clone(),
    ));

    let state = AppState::new(movie_catalog, book_catalog, Arc::new(history));
    let app = create_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(addr = %addr, "Server listening");
    axum::serve(listener, app).await?;

    Ok(())
}
