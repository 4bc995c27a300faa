use super::CacheStore;
use crate::db::Store;
use std::time::Duration;

/// Backend that keeps entries in the `cache_entries` table.
#[derive(Clone)]
pub struct DatabaseCacheStore {
    store: Store,
}

impl DatabaseCacheStore {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }
}

#[async_trait::async_trait]
impl CacheStore for DatabaseCacheStore {
    async fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        self.store.cache_get(key).await
    }

    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> anyhow::Result<()> {
        let ttl = chrono::Duration::from_std(ttl)?;
        self.store.cache_set(key, value, ttl).await
    }

    async fn del(&self, key: &str) -> anyhow::Result<()> {
        self.store.cache_delete(key).await
    }
}
