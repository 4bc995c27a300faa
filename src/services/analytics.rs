//! Admin dashboard aggregates.
//!
//! Everything except the activity feed and the daily notification counts
//! is served through the cache. Search and view counters invalidate their
//! aggregates like any other write.

use crate::cache::{Cache, CacheKey};
use crate::db::Store;
use crate::entities::activities;
use crate::geo::LocationBucket;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

pub const LEADERBOARD_SIZE: u64 = 10;
pub const ACTIVITY_FEED_SIZE: u64 = 10;

#[derive(Debug, Error)]
pub enum AnalyticsError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for AnalyticsError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for AnalyticsError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DailyCount {
    pub date: String,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ItemCount {
    pub item: String,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LocationCount {
    pub latitude: f64,
    pub longitude: f64,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BusinessViews {
    pub business_id: i32,
    pub name: Option<String>,
    pub total_views: i64,
}

/// What happened since midnight UTC.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Notifications {
    pub businesses_created: u64,
    pub users_registered: u64,
    pub reviews_received: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ActivityDto {
    pub id: i32,
    pub kind: String,
    pub message: String,
    pub created_at: String,
}

impl From<activities::Model> for ActivityDto {
    fn from(model: activities::Model) -> Self {
        Self {
            id: model.id,
            kind: model.kind,
            message: model.message,
            created_at: model.created_at,
        }
    }
}

fn daily(rows: Vec<(String, i64)>) -> Vec<DailyCount> {
    rows.into_iter()
        .map(|(date, count)| DailyCount { date, count })
        .collect()
}

pub struct AnalyticsService {
    store: Arc<Store>,
    cache: Cache,
}

impl AnalyticsService {
    #[must_use]
    pub const fn new(store: Arc<Store>, cache: Cache) -> Self {
        Self { store, cache }
    }

    pub async fn users_created_by_day(&self) -> Result<Vec<DailyCount>, AnalyticsError> {
        self.cache
            .cached(CacheKey::UserCreatedCountByDay, || async {
                Ok::<_, AnalyticsError>(daily(self.store.users_created_by_day().await?))
            })
            .await
    }

    pub async fn businesses_created_by_day(&self) -> Result<Vec<DailyCount>, AnalyticsError> {
        self.cache
            .cached(CacheKey::BusinessCreatedCountByDay, || async {
                Ok::<_, AnalyticsError>(daily(self.store.businesses_created_by_day().await?))
            })
            .await
    }

    pub async fn views_by_day(&self) -> Result<Vec<DailyCount>, AnalyticsError> {
        self.cache
            .cached(CacheKey::TotalViewsByDay, || async {
                Ok::<_, AnalyticsError>(daily(self.store.views_by_day().await?))
            })
            .await
    }

    pub async fn top_items(&self) -> Result<Vec<ItemCount>, AnalyticsError> {
        self.cache
            .cached(CacheKey::TopItems, || async {
                let rows = self.store.top_searched_items(LEADERBOARD_SIZE).await?;
                Ok::<_, AnalyticsError>(
                    rows.into_iter()
                        .map(|r| ItemCount {
                            item: r.item,
                            count: r.count,
                        })
                        .collect(),
                )
            })
            .await
    }

    pub async fn top_locations(&self) -> Result<Vec<LocationCount>, AnalyticsError> {
        self.cache
            .cached(CacheKey::TopLocations, || async {
                let rows = self.store.top_searched_locations(LEADERBOARD_SIZE).await?;
                Ok::<_, AnalyticsError>(
                    rows.into_iter()
                        .map(|r| {
                            let bucket = LocationBucket {
                                lat_tenths: r.lat_tenths,
                                lng_tenths: r.lng_tenths,
                            };
                            LocationCount {
                                latitude: bucket.latitude(),
                                longitude: bucket.longitude(),
                                count: r.count,
                            }
                        })
                        .collect(),
                )
            })
            .await
    }

    /// Cumulative views leaderboard; kept longer than other aggregates.
    pub async fn top_businesses_by_views(&self) -> Result<Vec<BusinessViews>, AnalyticsError> {
        self.cache
            .cached(CacheKey::TopBusinessesByViews, || async {
                let rows = self.store.top_viewed_businesses(LEADERBOARD_SIZE).await?;
                let ids: Vec<i32> = rows.iter().map(|(id, _)| *id).collect();
                let names = self.store.business_names(&ids).await?;
                Ok::<_, AnalyticsError>(
                    rows.into_iter()
                        .map(|(business_id, total_views)| BusinessViews {
                            business_id,
                            name: names.get(&business_id).cloned(),
                            total_views,
                        })
                        .collect(),
                )
            })
            .await
    }

    pub async fn notifications(&self) -> Result<Notifications, AnalyticsError> {
        let today = Utc::now().format("%Y-%m-%d").to_string();

        let (businesses, users, reviews) = tokio::join!(
            self.store.businesses_created_since(&today),
            self.store.users_created_since(&today),
            self.store.reviews_created_since(&today),
        );

        Ok(Notifications {
            businesses_created: businesses?,
            users_registered: users?,
            reviews_received: reviews?,
        })
    }

    pub async fn latest_activities(&self) -> Result<Vec<ActivityDto>, AnalyticsError> {
        let rows = self.store.latest_activities(ACTIVITY_FEED_SIZE).await?;
        Ok(rows.into_iter().map(ActivityDto::from).collect())
    }
}
