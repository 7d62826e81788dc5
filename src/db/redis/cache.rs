use redis::AsyncCommands;
use redis::Client;
use std::fmt::Display;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::mpsc;

use crate::error::AppError;
use crate::error::AppResult;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// Distinct genre list of the whole catalog
    Genres,
}

impl Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheKey::Genres => write!(f, "catalog:genres"),
        }
    }
}

/// Creates a Redis client for caching
pub fn create_redis_client(redis_url: &str) -> anyhow::Result<Client> {
    let client = Client::open(redis_url)?;
    Ok(client)
}

/// Pending mutation for the background writer
enum CacheCommand {
    Set { key: String, value: String, ttl: u64 },
    Delete { key: String },
}

/// Redis-backed cache whose writes happen off the request path
///
/// Commands are applied in queue order by a single writer. Every
/// invalidation bumps a generation counter; a value computed under an older
/// generation is never queued, so a read that raced a catalog change cannot
/// restore the stale entry after its `Delete`.
#[derive(Clone)]
pub struct Cache {
    redis_client: Client,
    write_tx: mpsc::UnboundedSender<CacheCommand>,
    generation: Arc<Mutex<u64>>,
}

/// Handle for gracefully shutting down the cache writer
pub struct CacheWriterHandle {
    shutdown_tx: mpsc::Sender<()>,
}

impl CacheWriterHandle {
    /// Signals the writer task to flush pending commands and stop
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(()).await;
        tracing::info!("Cache writer shutdown signal sent");
    }
}

impl Cache {
    /// Creates a cache and spawns its background writer task
    pub async fn new(redis_client: Client) -> (Self, CacheWriterHandle) {
        let (write_tx, write_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);

        let client = redis_client.clone();
        tokio::spawn(async move {
            Self::cache_writer_task(client, write_rx, shutdown_rx).await;
        });

        (
            Self::with_writer(redis_client, write_tx),
            CacheWriterHandle { shutdown_tx },
        )
    }

    fn with_writer(redis_client: Client, write_tx: mpsc::UnboundedSender<CacheCommand>) -> Self {
        Self {
            redis_client,
            write_tx,
            generation: Arc::new(Mutex::new(0)),
        }
    }

    async fn cache_writer_task(
        client: Client,
        mut write_rx: mpsc::UnboundedReceiver<CacheCommand>,
        mut shutdown_rx: mpsc::Receiver<()>,
    ) {
        tracing::info!("Cache writer task started");

        loop {
            tokio::select! {
                Some(command) = write_rx.recv() => {
                    if let Err(e) = Self::apply(&client, command).await {
                        tracing::error!(error = %e, "Failed to write to Redis cache");
                    }
                }
                _ = shutdown_rx.recv() => {
                    tracing::info!("Cache writer shutting down, flushing remaining writes");

                    write_rx.close();
                    while let Some(command) = write_rx.recv().await {
                        if let Err(e) = Self::apply(&client, command).await {
                            tracing::error!(error = %e, "Failed to flush cache write during shutdown");
                        }
                    }

                    tracing::info!("Cache writer task stopped");
                    break;
                }
            }
        }
    }

    async fn apply(client: &Client, command: CacheCommand) -> AppResult<()> {
        let mut conn = client.get_multiplexed_async_connection().await?;
        match command {
            CacheCommand::Set { key, value, ttl } => {
                let _: () = conn.set_ex(key, value, ttl).await?;
            }
            CacheCommand::Delete { key } => {
                let _: () = conn.del(key).await?;
            }
        }
        Ok(())
    }

    /// Retrieves and deserializes a cached value, `None` on a miss
    pub async fn get_from_cache<T: serde::de::DeserializeOwned>(
        &self,
        key: &CacheKey,
    ) -> AppResult<Option<T>> {
        let mut conn = self.redis_client.get_multiplexed_async_connection().await?;
        let cached: Option<String> = conn.get(key.to_string()).await?;

        match cached {
            Some(json) => {
                let data = serde_json::from_str(&json).map_err(|e| {
                    AppError::Internal(format!("Cache deserialization error: {}", e))
                })?;
                Ok(Some(data))
            }
            None => Ok(None),
        }
    }

    /// Current invalidation generation, read before computing a value
    pub fn generation(&self) -> u64 {
        *self.generation.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Queues a write without waiting for Redis
    ///
    /// Dropped when an invalidation happened since `generation` was read.
    pub fn set_in_background<T: serde::Serialize>(
        &self,
        key: &CacheKey,
        value: &T,
        ttl: u64,
        generation: u64,
    ) {
        let json = match serde_json::to_string(value) {
            Ok(j) => j,
            Err(e) => {
                tracing::error!(error = %e, "Cache serialization error");
                return;
            }
        };

        let current = self.generation.lock().unwrap_or_else(PoisonError::into_inner);
        if *current != generation {
            tracing::debug!(key = %key, "Skipping cache write computed before an invalidation");
            return;
        }
        self.send(CacheCommand::Set {
            key: key.to_string(),
            value: json,
            ttl,
        });
    }

    /// Queues removal of a key, used after catalog mutations
    pub fn invalidate_in_background(&self, key: &CacheKey) {
        let mut current = self.generation.lock().unwrap_or_else(PoisonError::into_inner);
        *current += 1;
        self.send(CacheCommand::Delete {
            key: key.to_string(),
        });
    }

    fn send(&self, command: CacheCommand) {
        if self.write_tx.send(command).is_err() {
            tracing::error!("Cache writer is gone, dropping cache command");
        }
    }
}
