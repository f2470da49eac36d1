//! Cache Module
//!
//! Cache abstraction with two backends:
//! - `MemoryCache`: in-process `DashMap`, the development and test default
//! - `RedisCache`: Redis through a reconnecting `ConnectionManager`
//!
//! `CacheStore` picks one at startup from [`CacheSettings`] and is what the
//! application state holds.
//!
//! ```text
//! +-------------------+
//! |   Health probe    |
//! +-------------------+
//!          |
//!          v
//! +-------------------+
//! |    CacheStore     |  <-- chosen by cache.backend
//! +-------------------+
//!      |         |
//!      v         v
//!  MemoryCache  RedisCache
//! ```

mod cache_service;
mod memory_cache;

pub use cache_service::{Cache, RedisCache};
pub use memory_cache::MemoryCache;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::Client;
use serde::{de::DeserializeOwned, Serialize};
use tracing::{info, instrument};

use crate::config::{CacheBackend, CacheSettings};
use crate::shared::error::AppError;

/// Cache backend selected from configuration.
#[derive(Debug, Clone)]
pub enum CacheStore {
    Memory(MemoryCache),
    Redis(RedisCache),
}

impl CacheStore {
    pub fn backend(&self) -> CacheBackend {
        match self {
            Self::Memory(_) => CacheBackend::Memory,
            Self::Redis(_) => CacheBackend::Redis,
        }
    }
}

#[async_trait]
impl Cache for CacheStore {
    async fn get<T: DeserializeOwned + Send>(&self, key: &str) -> Result<Option<T>, AppError> {
        match self {
            Self::Memory(cache) => cache.get(key).await,
            Self::Redis(cache) => cache.get(key).await,
        }
    }

    async fn set_ex<T: Serialize + Sync + Send>(
        &self,
        key: &str,
        value: &T,
        seconds: u64,
    ) -> Result<(), AppError> {
        match self {
            Self::Memory(cache) => cache.set_ex(key, value, seconds).await,
            Self::Redis(cache) => cache.set_ex(key, value, seconds).await,
        }
    }

    async fn delete(&self, key: &str) -> Result<bool, AppError> {
        match self {
            Self::Memory(cache) => cache.delete(key).await,
            Self::Redis(cache) => cache.delete(key).await,
        }
    }

    async fn exists(&self, key: &str) -> Result<bool, AppError> {
        match self {
            Self::Memory(cache) => cache.exists(key).await,
            Self::Redis(cache) => cache.exists(key).await,
        }
    }
}

/// Creates a Redis connection manager with automatic reconnection.
#[instrument(skip(url))]
pub async fn create_redis_client(url: &str) -> Result<ConnectionManager, redis::RedisError> {
    info!("Connecting to Redis...");
    let client = Client::open(url)?;
    let manager = ConnectionManager::new(client).await?;
    info!("Redis connection established");
    Ok(manager)
}

/// Builds the configured cache backend.
///
/// # Errors
/// Fails when the Redis backend is selected and the server is unreachable,
/// or when `cache.redis_url` is missing.
pub async fn create_cache(settings: &CacheSettings) -> Result<CacheStore, AppError> {
    match settings.backend {
        CacheBackend::Memory => {
            info!("Using in-memory cache");
            Ok(CacheStore::Memory(MemoryCache::new()))
        }
        CacheBackend::Redis => {
            let url = settings.redis_url.as_deref().ok_or_else(|| {
                AppError::Internal("cache.redis_url is required for the redis backend".into())
            })?;
            let conn = create_redis_client(url).await?;
            Ok(CacheStore::Redis(RedisCache::with_prefix(conn, keys::PREFIX)))
        }
    }
}

/// Cache key naming.
pub mod keys {
    /// Namespace applied to every Redis key
    pub const PREFIX: &str = "studio:";

    /// Prefix for health-check sentinels (e.g., "health:cache:<uuid>")
    pub const HEALTH_SENTINEL: &str = "health:cache:";

    #[inline]
    pub fn health_sentinel(token: impl std::fmt::Display) -> String {
        format!("{}{}", HEALTH_SENTINEL, token)
    }
}
