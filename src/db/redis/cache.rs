use redis::AsyncCommands;
use redis::Client;
use std::fmt::Display;
use tokio::sync::mpsc;

use crate::error::AppResult;

/// Cache keys for upstream catalog responses.
///
/// Caching sits at the single-upstream-request level only, so composed
/// strategies (intersection, fan-out shuffling) stay per-call.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// Genre/cast discover page: filter signature + page number
    MovieDiscover(String, u32),
    /// Title search query + page number
    MovieTitleSearch(String, u32),
    /// Person search query
    PersonSearch(String),
    /// Credits lookup by movie id
    MovieCredits(u64),
    /// Book volumes query + start index + max results
    BookVolumes(String, u32, u32),
}

impl Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheKey::MovieDiscover(sig, page) => write!(f, "discover:{}:p{}", sig, page),
            CacheKey::MovieTitleSearch(query, page) => {
                write!(f, "title:{}:p{}", query.to_lowercase(), page)
            }
            CacheKey::PersonSearch(query) => write!(f, "person:{}", query.to_lowercase()),
            CacheKey::MovieCredits(movie_id) => write!(f, "credits:{}", movie_id),
            CacheKey::BookVolumes(query, start, max) => {
                write!(f, "volumes:{}:s{}:m{}", query.to_lowercase(), start, max)
            }
        }
    }
}

/// Creates a Redis client for caching
///
/// The client connects lazily; an unreachable Redis only surfaces as cache
/// misses at lookup time.
pub fn create_redis_client(redis_url: &str) -> anyhow::Result<Client> {
    let client = Client::open(redis_url)?;
    Ok(client)
}

/// Message for asynchronous cache writes
struct CacheWriteMessage {
    key: String,
    value: String,
    ttl: u64,
}

/// Cache handler for storing and retrieving upstream responses from Redis
///
/// A disabled cache (no Redis client) misses every read and drops every
/// write, so search code is identical with or without Redis available.
#[derive(Clone)]
pub struct Cache {
    redis_client: Option<Client>,
    write_tx: Option<mpsc::UnboundedSender<CacheWriteMessage>>,
}

/// Handle for gracefully shutting down the cache writer
pub struct CacheWriterHandle {
    shutdown_tx: mpsc::Sender<()>,
}

impl CacheWriterHandle {
    /// Initiates a graceful shutdown of the cache writer
    ///
    /// Sends a shutdown signal to the writer task and lets it flush pending
    /// writes to Redis before exiting.
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(()).await;
        tracing::info!("Cache writer shutdown signal sent");
    }
}

impl Cache {
    /// Creates a new Cache instance with an async write background task
    ///
    /// Writes go through a background task so cache population never blocks
    /// a search response.
    pub fn new(redis_client: Client) -> (Self, CacheWriterHandle) {
        let (write_tx, write_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);

        let client = redis_client.clone();
        tokio::spawn(async move {
            Self::cache_writer_task(client, write_rx, shutdown_rx).await;
        });

        let cache = Self {
            redis_client: Some(redis_client),
            write_tx: Some(write_tx),
        };

        let handle = CacheWriterHandle { shutdown_tx };

        (cache, handle)
    }

    /// Creates a no-op cache: every get misses, every set is dropped
    pub fn disabled() -> Self {
        Self {
            redis_client: None,
            write_tx: None,
        }
    }

    /// Background task that processes cache write messages
    async fn cache_writer_task(
        client: Client,
        mut write_rx: mpsc::UnboundedReceiver<CacheWriteMessage>,
        mut shutdown_rx: mpsc::Receiver<()>,
    ) {
        tracing::debug!("Cache writer task started");
        loop {
            tokio::select! {
                message = write_rx.recv() => {
                    match message {
                        Some(message) => Self::write_entry(&client, message).await,
                        None => break,
                    }
                }
                _ = shutdown_rx.recv() => {
                    // Flush whatever is still queued, then exit
                    write_rx.close();
                    while let Some(message) = write_rx.recv().await {
                        Self::write_entry(&client, message).await;
                    }
                    break;
                }
            }
        }
        tracing::debug!("Cache writer task stopped");
    }

    async fn write_entry(client: &Client, message: CacheWriteMessage) {
        let result: redis::RedisResult<()> = async {
            let mut conn = client.get_multiplexed_async_connection().await?;
            conn.set_ex(&message.key, &message.value, message.ttl).await
        }
        .await;

        if let Err(e) = result {
            tracing::warn!(error = %e, key = %message.key, "Cache write failed");
        }
    }

    /// Attempts to read a cached value.
    ///
    /// Redis or deserialization failures are logged and reported as a miss;
    /// the cache never fails a search.
    pub async fn get_from_cache<T: serde::de::DeserializeOwned>(
        &self,
        key: &CacheKey,
    ) -> AppResult<Option<T>> {
        let Some(client) = &self.redis_client else {
            return Ok(None);
        };

        let raw: Option<String> = match async {
            let mut conn = client.get_multiplexed_async_connection().await?;
            conn.get(key.to_string()).await
        }
        .await
        {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(error = %e, key = %key, "Cache read failed");
                return Ok(None);
            }
        };

        match raw {
            Some(raw) => match serde_json::from_str(&raw) {
                Ok(value) => Ok(Some(value)),
                Err(e) => {
                    tracing::warn!(error = %e, key = %key, "Discarding unparseable cache entry");
                    Ok(None)
                }
            },
            None => Ok(None),
        }
    }

    /// Queues a cache write without waiting for it to complete
    pub fn set_in_background<T: serde::Serialize>(&self, key: &CacheKey, value: &T, ttl: u64) {
        let Some(write_tx) = &self.write_tx else {
            return;
        };

        let value = match serde_json::to_string(value) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(error = %e, key = %key, "Failed to serialize cache value");
                return;
            }
        };

        let message = CacheWriteMessage {
            key: key.to_string(),
            value,
            ttl,
        };

        if write_tx.send(message).is_err() {
            tracing::warn!(key = %key, "Cache writer is gone, dropping write");
        }
    }
}
