use std::sync::Arc;
use tokio::sync::mpsc;

use crate::error::AppResult;

use super::{CacheKey, KeyValueStore, StorageKey};

/// Message for asynchronous cache writes
struct CacheWriteMessage {
    key: String,
    value: String,
    ttl: u64,
}

/// Read-through cache for upstream API responses
///
/// Reads go straight to the store. Writes are queued to a background task so
/// a slow store never delays a response.
#[derive(Clone)]
pub struct ResponseCache {
    store: Arc<dyn KeyValueStore>,
    write_tx: mpsc::UnboundedSender<CacheWriteMessage>,
}

/// Handle for gracefully shutting down the cache writer
pub struct CacheWriterHandle {
    shutdown_tx: mpsc::Sender<()>,
    task: tokio::task::JoinHandle<()>,
}

impl CacheWriterHandle {
    /// Signals the writer task and waits until queued writes are flushed
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(()).await;
        tracing::info!("Cache writer shutdown signal sent");
        if let Err(e) = self.task.await {
            tracing::error!(error = %e, "Cache writer task panicked");
        }
    }
}

impl ResponseCache {
    /// Creates the cache and spawns its writer task
    pub fn new(store: Arc<dyn KeyValueStore>) -> (Self, CacheWriterHandle) {
        let (write_tx, write_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);

        // The writer gets its own handle so the cache stays cheap to clone
        let writer_store = store.clone();
        let task = tokio::spawn(async move {
            Self::cache_writer_task(writer_store, write_rx, shutdown_rx).await;
        });

        (Self { store, write_tx }, CacheWriterHandle { shutdown_tx, task })
    }

    /// Background task that applies queued writes until shutdown
    ///
    /// Write errors are logged and dropped; a missed cache write only costs a
    /// later upstream request.
    async fn cache_writer_task(
        store: Arc<dyn KeyValueStore>,
        mut write_rx: mpsc::UnboundedReceiver<CacheWriteMessage>,
        mut shutdown_rx: mpsc::Receiver<()>,
    ) {
        tracing::info!(backend = store.name(), "Cache writer task started");

        loop {
            tokio::select! {
                Some(msg) = write_rx.recv() => {
                    Self::write(store.as_ref(), msg).await;
                }
                Some(()) = shutdown_rx.recv() => {
                    // Senders live as long as the cache clones, so drain what is queued now
                    let mut flushed = 0usize;
                    while let Ok(msg) = write_rx.try_recv() {
                        Self::write(store.as_ref(), msg).await;
                        flushed += 1;
                    }
                    tracing::info!(flushed, "Cache writer task stopped");
                    break;
                }
                else => break,
            }
        }
    }

    /// Applies one queued write
    async fn write(store: &dyn KeyValueStore, msg: CacheWriteMessage) {
        if let Err(e) = store.set_with_ttl(&msg.key, &msg.value, msg.ttl).await {
            tracing::error!(error = %e, key = %msg.key, "Failed to write cache entry");
        }
    }

    /// Retrieves a cached value
    ///
    /// An entry that no longer deserializes (for instance after a model
    /// change) counts as a miss.
    pub async fn get_from_cache<T: serde::de::DeserializeOwned>(
        &self,
        key: &CacheKey,
    ) -> AppResult<Option<T>> {
        let storage_key = StorageKey::Cache(key.clone()).to_string();
        let Some(json) = self.store.get(&storage_key).await? else {
            tracing::debug!(key = %storage_key, "Cache miss");
            return Ok(None);
        };

        match serde_json::from_str(&json) {
            Ok(value) => {
                tracing::debug!(key = %storage_key, "Cache hit");
                Ok(Some(value))
            }
            Err(e) => {
                tracing::warn!(error = %e, key = %storage_key, "Discarding unreadable cache entry");
                Ok(None)
            }
        }
    }

    /// Queues a value for writing without waiting for the store
    pub fn set_in_background<T: serde::Serialize>(&self, key: &CacheKey, value: &T, ttl: u64) {
        let json = match serde_json::to_string(value) {
            Ok(j) => j,
            Err(e) => {
                tracing::error!(error = %e, "Cache serialization error");
                return;
            }
        };

        let msg = CacheWriteMessage {
            key: StorageKey::Cache(key.clone()).to_string(),
            value: json,
            ttl,
        };

        if let Err(e) = self.write_tx.send(msg) {
            tracing::error!(error = %e, "Failed to send cache write message");
        }
    }
}
