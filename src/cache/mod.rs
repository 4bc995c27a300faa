//! Read-through / write-invalidate cache in front of the [`Store`].
//!
//! Reads go through [`Cache::get_or_compute`]: a hit is returned without
//! touching the database, a miss runs the computation and stores its JSON
//! with a TTL. Writes call [`Cache::apply`] with the [`Mutation`] they
//! performed, which deletes every key that mutation can make stale.
//!
//! The cache is never authoritative and every backend call is fail-open: a
//! broken backend turns hits into misses and skipped deletes into entries
//! that age out by TTL. Concurrent misses on the same key may each compute.

mod invalidation;
mod keys;
pub mod memory;
pub mod redis_store;
pub mod sql;

pub use invalidation::{InvalidationPlan, Mutation};
pub use keys::CacheKey;

use crate::config::{CacheBackend, CacheConfig};
use crate::db::Store;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Minimal key/value contract every backend provides: `GET`, `SETEX`, `DEL`.
#[async_trait::async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &str) -> anyhow::Result<Option<String>>;

    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> anyhow::Result<()>;

    async fn del(&self, key: &str) -> anyhow::Result<()>;
}

#[derive(Clone)]
pub struct Cache {
    store: Option<Arc<dyn CacheStore>>,
    config: CacheConfig,
}

impl Cache {
    #[must_use]
    pub fn new(store: Arc<dyn CacheStore>, config: CacheConfig) -> Self {
        Self {
            store: Some(store),
            config,
        }
    }

    /// A cache that always misses.
    #[must_use]
    pub const fn disabled(config: CacheConfig) -> Self {
        Self {
            store: None,
            config,
        }
    }

    /// Builds the backend selected in `config`. A Redis backend that cannot
    /// be reached at startup degrades to a disabled cache.
    pub async fn from_config(config: &CacheConfig, db: &Store) -> Self {
        let store: Arc<dyn CacheStore> = match config.backend {
            CacheBackend::Disabled => {
                info!("Response cache disabled");
                return Self::disabled(config.clone());
            }
            CacheBackend::Memory => Arc::new(memory::MemoryCacheStore::new()),
            CacheBackend::Database => Arc::new(sql::DatabaseCacheStore::new(db.clone())),
            CacheBackend::Redis => match redis_store::RedisCacheStore::connect(&config.redis_url).await {
                Ok(store) => Arc::new(store),
                Err(e) => {
                    error!(
                        error = %e,
                        url = %config.redis_url,
                        "Redis unavailable, response cache disabled"
                    );
                    return Self::disabled(config.clone());
                }
            },
        };

        info!(backend = ?config.backend, "Response cache initialized");
        Self::new(store, config.clone())
    }

    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.store.is_some()
    }

    #[must_use]
    pub const fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Returns the cached value for `key`, or computes, stores and returns it.
    ///
    /// Errors from `compute` propagate and nothing is stored. Backend errors
    /// and undecodable entries are logged and treated as a miss.
    pub async fn get_or_compute<T, E, F, Fut>(
        &self,
        key: &str,
        ttl: Duration,
        compute: F,
    ) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let Some(store) = &self.store else {
            return compute().await;
        };

        match store.get(key).await {
            Ok(Some(raw)) => match serde_json::from_str::<T>(&raw) {
                Ok(value) => {
                    metrics::counter!("cache_hits_total").increment(1);
                    debug!(key, "Cache hit");
                    return Ok(value);
                }
                Err(e) => {
                    warn!(key, error = %e, "Discarding undecodable cache entry");
                }
            },
            Ok(None) => {}
            Err(e) => {
                metrics::counter!("cache_errors_total", "op" => "get").increment(1);
                warn!(key, error = %e, "Cache read failed, recomputing");
            }
        }

        metrics::counter!("cache_misses_total").increment(1);
        debug!(key, "Cache miss");

        let value = compute().await?;

        match serde_json::to_string(&value) {
            Ok(raw) => {
                if let Err(e) = store.set_ex(key, &raw, ttl).await {
                    metrics::counter!("cache_errors_total", "op" => "set").increment(1);
                    warn!(key, error = %e, "Cache write failed");
                }
            }
            Err(e) => warn!(key, error = %e, "Value not cacheable"),
        }

        Ok(value)
    }

    /// [`Self::get_or_compute`] with the key's own name and TTL.
    pub async fn cached<T, E, F, Fut>(&self, key: CacheKey, compute: F) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let ttl = key.ttl(&self.config);
        self.get_or_compute(&key.to_string(), ttl, compute).await
    }

    pub async fn invalidate(&self, key: CacheKey) {
        self.invalidate_raw(&key.to_string()).await;
    }

    pub async fn invalidate_raw(&self, key: &str) {
        let Some(store) = &self.store else {
            return;
        };

        if let Err(e) = store.del(key).await {
            metrics::counter!("cache_errors_total", "op" => "del").increment(1);
            warn!(key, error = %e, "Cache delete failed, entry will expire by TTL");
        } else {
            debug!(key, "Cache invalidated");
        }
    }

    /// Drops every key `mutation` can make stale.
    pub async fn apply(&self, mutation: &Mutation) {
        let keys = mutation.plan().into_keys();
        debug!(?mutation, keys = keys.len(), "Applying invalidation plan");
        for key in keys {
            self.invalidate(key).await;
        }
    }
}
