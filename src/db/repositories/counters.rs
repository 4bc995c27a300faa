use crate::entities::{item_searches, location_searches, prelude::*};
use crate::geo::LocationBucket;
use anyhow::Result;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    DatabaseConnection, EntityTrait, QueryOrder, QuerySelect, Set, TransactionTrait,
};

/// Search analytics: how often a text and a rounded location were searched.
pub struct SearchCounterRepository {
    conn: DatabaseConnection,
}

impl SearchCounterRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Increments both counters for one search in a single transaction.
    /// Each increment is an `INSERT .. ON CONFLICT DO UPDATE count + 1`, so
    /// concurrent searches never lose an update.
    pub async fn record(&self, item: &str, bucket: LocationBucket) -> Result<()> {
        let now = chrono::Utc::now().to_rfc3339();
        let txn = self.conn.begin().await?;

        let item_model = item_searches::ActiveModel {
            item: Set(item.to_string()),
            count: Set(1),
            updated_at: Set(now.clone()),
        };
        ItemSearches::insert(item_model)
            .on_conflict(
                OnConflict::column(item_searches::Column::Item)
                    .value(
                        item_searches::Column::Count,
                        Expr::col((ItemSearches, item_searches::Column::Count)).add(1),
                    )
                    .update_column(item_searches::Column::UpdatedAt)
                    .to_owned(),
            )
            .exec_without_returning(&txn)
            .await?;

        let location_model = location_searches::ActiveModel {
            lat_tenths: Set(bucket.lat_tenths),
            lng_tenths: Set(bucket.lng_tenths),
            count: Set(1),
            updated_at: Set(now),
        };
        LocationSearches::insert(location_model)
            .on_conflict(
                OnConflict::columns([
                    location_searches::Column::LatTenths,
                    location_searches::Column::LngTenths,
                ])
                .value(
                    location_searches::Column::Count,
                    Expr::col((LocationSearches, location_searches::Column::Count)).add(1),
                )
                .update_column(location_searches::Column::UpdatedAt)
                .to_owned(),
            )
            .exec_without_returning(&txn)
            .await?;

        txn.commit().await?;
        Ok(())
    }

    pub async fn item_count(&self, item: &str) -> Result<i64> {
        let row = ItemSearches::find_by_id(item.to_string())
            .one(&self.conn)
            .await?;
        Ok(row.map_or(0, |r| r.count))
    }

    pub async fn location_count(&self, bucket: LocationBucket) -> Result<i64> {
        let row = LocationSearches::find_by_id((bucket.lat_tenths, bucket.lng_tenths))
            .one(&self.conn)
            .await?;
        Ok(row.map_or(0, |r| r.count))
    }

    pub async fn top_items(&self, limit: u64) -> Result<Vec<item_searches::Model>> {
        let rows = ItemSearches::find()
            .order_by_desc(item_searches::Column::Count)
            .order_by_asc(item_searches::Column::Item)
            .limit(limit)
            .all(&self.conn)
            .await?;
        Ok(rows)
    }

    pub async fn top_locations(&self, limit: u64) -> Result<Vec<location_searches::Model>> {
        let rows = LocationSearches::find()
            .order_by_desc(location_searches::Column::Count)
            .limit(limit)
            .all(&self.conn)
            .await?;
        Ok(rows)
    }
}
