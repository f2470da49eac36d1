//! In-process cache backed by a concurrent map.
//!
//! Used in development and tests where no Redis server is available.
//! Expired entries are dropped lazily on access.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, instrument};

use super::cache_service::{deserialize, serialize, Cache};
use crate::shared::error::AppError;

#[derive(Debug, Clone)]
struct Entry {
    data: String,
    expires_at: Instant,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryCache {
    entries: Arc<DashMap<String, Entry>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries, expired ones included until touched.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn live_data(&self, key: &str) -> Option<String> {
        let now = Instant::now();
        let data = {
            let entry = self.entries.get(key)?;
            if entry.is_expired(now) {
                None
            } else {
                Some(entry.data.clone())
            }
        };
        if data.is_none() {
            self.entries.remove_if(key, |_, entry| entry.is_expired(now));
        }
        data
    }
}

#[async_trait]
impl Cache for MemoryCache {
    #[instrument(skip(self), level = "debug")]
    async fn get<T: DeserializeOwned + Send>(&self, key: &str) -> Result<Option<T>, AppError> {
        match self.live_data(key) {
            Some(data) => {
                debug!(key = %key, "Cache hit");
                Ok(Some(deserialize(&data)?))
            }
            None => {
                debug!(key = %key, "Cache miss");
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
        let entry = Entry {
            data: serialize(value)?,
            expires_at: Instant::now() + Duration::from_secs(seconds),
        };
        self.entries.insert(key.to_string(), entry);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool, AppError> {
        Ok(self.entries.remove(key).is_some())
    }

    async fn exists(&self, key: &str) -> Result<bool, AppError> {
        Ok(self.live_data(key).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_set_then_get() {
        let cache = MemoryCache::new();
        cache.set_ex("k", &"value", 60).await.unwrap();

        let value: Option<String> = cache.get("k").await.unwrap();
        assert_eq!(value.as_deref(), Some("value"));
        assert!(cache.exists("k").await.unwrap());
    }

    #[tokio::test]
    async fn test_zero_ttl_expires_immediately() {
        let cache = MemoryCache::new();
        cache.set_ex("k", &1_i32, 0).await.unwrap();

        let value: Option<i32> = cache.get("k").await.unwrap();
        assert_eq!(value, None);
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_delete_reports_presence() {
        let cache = MemoryCache::new();
        cache.set_ex("k", &1_i32, 60).await.unwrap();

        assert!(cache.delete("k").await.unwrap());
        assert!(!cache.delete("k").await.unwrap());
        assert!(!cache.exists("k").await.unwrap());
    }

    #[tokio::test]
    async fn test_clones_share_entries() {
        let cache = MemoryCache::new();
        let other = cache.clone();
        cache.set_ex("shared", &true, 60).await.unwrap();

        let value: Option<bool> = other.get("shared").await.unwrap();
        assert_eq!(value, Some(true));
    }
}
