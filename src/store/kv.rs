use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use serde::{de::DeserializeOwned, Serialize};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

use crate::error::AppResult;

use super::StorageKey;

/// Opaque string key-value store holding sessions, lists and cached responses
///
/// Values are JSON blobs; the store never interprets them.
#[async_trait::async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> AppResult<Option<String>>;

    async fn set(&self, key: &str, value: &str) -> AppResult<()>;

    /// Stores a value that expires after `ttl_secs` seconds
    async fn set_with_ttl(&self, key: &str, value: &str, ttl_secs: u64) -> AppResult<()>;

    async fn remove(&self, key: &str) -> AppResult<()>;

    /// Backend name for logging
    fn name(&self) -> &'static str;
}

/// Reads and deserializes a JSON value
///
/// Returns `Ok(None)` when the key is absent. A blob that does not parse is
/// reported as a serialization error so callers can decide how to recover.
pub async fn get_json<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &StorageKey,
) -> AppResult<Option<T>> {
    match store.get(&key.to_string()).await? {
        Some(json) => Ok(Some(serde_json::from_str(&json)?)),
        None => Ok(None),
    }
}

/// Serializes a value to JSON and writes it under `key`
pub async fn set_json<T: Serialize + ?Sized>(
    store: &dyn KeyValueStore,
    key: &StorageKey,
    value: &T,
) -> AppResult<()> {
    let json = serde_json::to_string(value)?;
    store.set(&key.to_string(), &json).await
}

/// Redis-backed store
#[derive(Clone)]
pub struct RedisStore {
    connection: ConnectionManager,
}

impl RedisStore {
    /// Connects to Redis; the connection manager reconnects on failure
    pub async fn connect(redis_url: &str) -> AppResult<Self> {
        let client = redis::Client::open(redis_url)?;
        let connection = ConnectionManager::new(client).await?;
        tracing::info!(redis_url = %redis_url, "Connected to Redis");
        Ok(Self { connection })
    }
}

#[async_trait::async_trait]
impl KeyValueStore for RedisStore {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        let mut conn = self.connection.clone();
        let value: Option<String> = conn.get(key).await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str) -> AppResult<()> {
        let mut conn = self.connection.clone();
        let _: () = conn.set(key, value).await?;
        Ok(())
    }

    async fn set_with_ttl(&self, key: &str, value: &str, ttl_secs: u64) -> AppResult<()> {
        let mut conn = self.connection.clone();
        let _: () = conn.set_ex(key, value, ttl_secs).await?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> AppResult<()> {
        let mut conn = self.connection.clone();
        let _: () = conn.del(key).await?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "redis"
    }
}

struct MemoryEntry {
    value: String,
    expires_at: Option<Instant>,
}

impl MemoryEntry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.map_or(true, |at| at > now)
    }
}

/// In-process store for single-instance deployments and tests
#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, MemoryEntry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        let entries = self.entries.read().await;
        let now = Instant::now();
        Ok(entries
            .get(key)
            .filter(|entry| entry.is_live(now))
            .map(|entry| entry.value.clone()))
    }

    async fn set(&self, key: &str, value: &str) -> AppResult<()> {
        let mut entries = self.entries.write().await;
        entries.insert(
            key.to_string(),
            MemoryEntry {
                value: value.to_string(),
                expires_at: None,
            },
        );
        Ok(())
    }

    async fn set_with_ttl(&self, key: &str, value: &str, ttl_secs: u64) -> AppResult<()> {
        let mut entries = self.entries.write().await;
        let now = Instant::now();
        // Expired entries are dropped lazily on writes
        entries.retain(|_, entry| entry.is_live(now));
        entries.insert(
            key.to_string(),
            MemoryEntry {
                value: value.to_string(),
                expires_at: Some(now + Duration::from_secs(ttl_secs)),
            },
        );
        Ok(())
    }

    async fn remove(&self, key: &str) -> AppResult<()> {
        self.entries.write().await.remove(key);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::models::User;

    #[tokio::test]
    async fn test_memory_store_set_get_remove() {
        let store = MemoryStore::new();
        assert_eq!(store.get("k").await.unwrap(), None);

        store.set("k", "v").await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), Some("v".to_string()));

        store.remove("k").await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_memory_store_zero_ttl_expires_immediately() {
        let store = MemoryStore::new();
        store.set_with_ttl("k", "v", 0).await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_memory_store_ttl_keeps_fresh_values() {
        let store = MemoryStore::new();
        store.set_with_ttl("k", "v", 60).await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), Some("v".to_string()));
    }

    #[tokio::test]
    async fn test_json_helpers_round_trip_user() {
        let store = MemoryStore::new();
        let user = User::new("neo");
        set_json(&store, &StorageKey::User, &user).await.unwrap();

        let raw = store.get("cinesuggest_user").await.unwrap().unwrap();
        assert_eq!(raw, r#"{"username":"neo"}"#);

        let loaded: Option<User> = get_json(&store, &StorageKey::User).await.unwrap();
        assert_eq!(loaded, Some(user));
    }

    #[tokio::test]
    async fn test_get_json_reports_corrupt_blob() {
        let store = MemoryStore::new();
        store.set("cinesuggest_user", "{not json").await.unwrap();

        let result: AppResult<Option<User>> = get_json(&store, &StorageKey::User).await;
        assert!(matches!(result, Err(AppError::Serialization(_))));
    }
}
