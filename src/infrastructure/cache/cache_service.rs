//! Cache Service
//!
//! Generic cache trait and its Redis implementation.
//!
//! Values are stored as JSON strings so every backend shares one encoding.
//!
//! # Example
//!
//! ```rust,ignore
//! use studio_api::infrastructure::cache::{Cache, RedisCache};
//!
//! let cache = RedisCache::new(redis_connection);
//! cache.set_ex("health:cache:1", &"ok", 10).await?;
//! let value: Option<String> = cache.get("health:cache:1").await?;
//! ```

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

use crate::shared::error::AppError;

/// Generic cache trait for abstracting cache operations.
///
/// Implemented by [`RedisCache`], [`super::MemoryCache`] and the
/// [`super::CacheStore`] dispatcher.
#[async_trait]
pub trait Cache: Send + Sync {
    /// Retrieves a value by key; `Ok(None)` when the key is absent or expired.
    async fn get<T: DeserializeOwned + Send>(&self, key: &str) -> Result<Option<T>, AppError>;

    /// Stores a value that expires after `seconds`.
    async fn set_ex<T: Serialize + Sync + Send>(
        &self,
        key: &str,
        value: &T,
        seconds: u64,
    ) -> Result<(), AppError>;

    /// Deletes a key. Returns whether it existed.
    async fn delete(&self, key: &str) -> Result<bool, AppError>;

    async fn exists(&self, key: &str) -> Result<bool, AppError>;
}

/// Serializes a value to the JSON string stored in the cache.
pub(crate) fn serialize<T: Serialize>(value: &T) -> Result<String, AppError> {
    serde_json::to_string(value).map_err(|e| {
        warn!("Cache serialization error: {}", e);
        AppError::Internal(format!("Cache serialization failed: {}", e))
    })
}

/// Deserializes a cached JSON string to the target type.
pub(crate) fn deserialize<T: DeserializeOwned>(data: &str) -> Result<T, AppError> {
    serde_json::from_str(data).map_err(|e| {
        warn!("Cache deserialization error: {}", e);
        AppError::Internal(format!("Cache deserialization failed: {}", e))
    })
}

/// Redis-backed cache implementation.
///
/// Uses a Redis ConnectionManager for connection reuse and automatic
/// reconnection handling.
#[derive(Clone)]
pub struct RedisCache {
    conn: ConnectionManager,
    /// Optional key prefix for namespacing
    prefix: Option<Arc<str>>,
}

impl RedisCache {
    pub fn new(conn: ConnectionManager) -> Self {
        Self { conn, prefix: None }
    }

    /// All keys are prefixed, e.g. `studio:` turns `health:x` into `studio:health:x`.
    pub fn with_prefix(conn: ConnectionManager, prefix: impl Into<Arc<str>>) -> Self {
        Self {
            conn,
            prefix: Some(prefix.into()),
        }
    }

    fn format_key(&self, key: &str) -> String {
        prefixed(self.prefix.as_deref(), key)
    }
}

fn prefixed(prefix: Option<&str>, key: &str) -> String {
    match prefix {
        Some(prefix) => format!("{}{}", prefix, key),
        None => key.to_string(),
    }
}

#[async_trait]
impl Cache for RedisCache {
    #[instrument(skip(self), level = "debug")]
    async fn get<T: DeserializeOwned + Send>(&self, key: &str) -> Result<Option<T>, AppError> {
        let full_key = self.format_key(key);
        let mut conn = self.conn.clone();

        let result: Option<String> = conn.get(&full_key).await?;

        match result {
            Some(data) => {
                debug!(key = %full_key, "Cache hit");
                Ok(Some(deserialize(&data)?))
            }
            None => {
                debug!(key = %full_key, "Cache miss");
                Ok(None)
            }
        }
    }

    #[instrument(skip(self, value), level = "debug")]
    async fn set_ex<T: Serialize + Sync + Send>(
        &self,
        key: &str,
        value: &T,
        seconds: u64,
    ) -> Result<(), AppError> {
        let full_key = self.format_key(key);
        let data = serialize(value)?;
        let mut conn = self.conn.clone();

        let _: () = conn.set_ex(&full_key, data, seconds).await?;
        debug!(key = %full_key, ttl = seconds, "Cache set with expiry");

        Ok(())
    }

    #[instrument(skip(self), level = "debug")]
    async fn delete(&self, key: &str) -> Result<bool, AppError> {
        let full_key = self.format_key(key);
        let mut conn = self.conn.clone();

        let deleted: u64 = conn.del(&full_key).await?;
        debug!(key = %full_key, deleted = deleted > 0, "Cache delete");

        Ok(deleted > 0)
    }

    #[instrument(skip(self), level = "debug")]
    async fn exists(&self, key: &str) -> Result<bool, AppError> {
        let full_key = self.format_key(key);
        let mut conn = self.conn.clone();

        let exists: bool = conn.exists(&full_key).await?;
        Ok(exists)
    }
}

impl std::fmt::Debug for RedisCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisCache")
            .field("prefix", &self.prefix)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
    struct Sentinel {
        id: i32,
        token: String,
    }

    #[test]
    fn test_serialization() {
        let data = Sentinel {
            id: 1,
            token: "abc".to_string(),
        };

        let json = serialize(&data).unwrap();
        let parsed: Sentinel = deserialize(&json).unwrap();

        assert_eq!(data, parsed);
    }

    #[test]
    fn test_deserialize_garbage_is_internal_error() {
        let result: Result<Sentinel, _> = deserialize("not json");
        assert!(matches!(result, Err(AppError::Internal(_))));
    }

    #[test]
    fn test_prefixed_keys() {
        assert_eq!(prefixed(None, "health:cache:1"), "health:cache:1");
        assert_eq!(prefixed(Some("studio:"), "health:cache:1"), "studio:health:cache:1");
    }
}
