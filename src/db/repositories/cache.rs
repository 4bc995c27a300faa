use crate::entities::{cache_entries, prelude::*};
use anyhow::Result;
use sea_orm::sea_query::OnConflict;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};

/// Key/value rows with an expiry, backing the `database` cache backend.
pub struct CacheRepository {
    conn: DatabaseConnection,
}

impl CacheRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn get(&self, key: &str) -> Result<Option<String>> {
        let now = chrono::Utc::now().to_rfc3339();

        // Opportunistic cleanup of expired rows.
        let _ = CacheEntries::delete_many()
            .filter(cache_entries::Column::ExpiresAt.lt(&now))
            .exec(&self.conn)
            .await;

        let entry = CacheEntries::find_by_id(key.to_string())
            .filter(cache_entries::Column::ExpiresAt.gt(&now))
            .one(&self.conn)
            .await?;

        Ok(entry.map(|e| e.value))
    }

    pub async fn set(&self, key: &str, value: &str, ttl: chrono::Duration) -> Result<()> {
        let expires_at = (chrono::Utc::now() + ttl).to_rfc3339();

        let model = cache_entries::ActiveModel {
            key: Set(key.to_string()),
            value: Set(value.to_string()),
            expires_at: Set(expires_at),
        };

        CacheEntries::insert(model)
            .on_conflict(
                OnConflict::column(cache_entries::Column::Key)
                    .update_columns([
                        cache_entries::Column::Value,
                        cache_entries::Column::ExpiresAt,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(&self.conn)
            .await?;

        Ok(())
    }

    pub async fn delete(&self, key: &str) -> Result<()> {
        CacheEntries::delete_by_id(key.to_string())
            .exec(&self.conn)
            .await?;
        Ok(())
    }
}
