use crate::entities::{
    activities, businesses, item_searches, location_searches, page_contents, reviews, users,
};
use crate::geo::{BoundingBox, LocationBucket};
use anyhow::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;
use tracing::info;

pub mod migrator;
pub mod repositories;

pub use repositories::business::{BusinessChanges, NewBusiness};
pub use repositories::review::{NewReview, ReviewRow};
pub use repositories::user::{DeletedUser, UserChanges};

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        let in_memory = db_url.contains(":memory:");
        if !in_memory {
            let path_str = db_url.trim_start_matches("sqlite:").trim_start_matches("//");
            let path_str = path_str.split('?').next().unwrap_or(path_str);
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        // Every pooled connection to `:memory:` is its own database.
        let (max_connections, min_connections) = if in_memory {
            (1, 1)
        } else {
            (max_connections, min_connections)
        };

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .sqlx_logging(false);
        if !in_memory {
            opt.idle_timeout(Duration::from_secs(300))
                .max_lifetime(Duration::from_secs(600));
        }

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn business_repo(&self) -> repositories::business::BusinessRepository {
        repositories::business::BusinessRepository::new(self.conn.clone())
    }

    fn keyword_repo(&self) -> repositories::keyword::KeywordRepository {
        repositories::keyword::KeywordRepository::new(self.conn.clone())
    }

    fn review_repo(&self) -> repositories::review::ReviewRepository {
        repositories::review::ReviewRepository::new(self.conn.clone())
    }

    fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    fn favorite_repo(&self) -> repositories::favorite::FavoriteRepository {
        repositories::favorite::FavoriteRepository::new(self.conn.clone())
    }

    fn view_repo(&self) -> repositories::views::ViewRepository {
        repositories::views::ViewRepository::new(self.conn.clone())
    }

    fn counter_repo(&self) -> repositories::counters::SearchCounterRepository {
        repositories::counters::SearchCounterRepository::new(self.conn.clone())
    }

    fn activity_repo(&self) -> repositories::activity::ActivityRepository {
        repositories::activity::ActivityRepository::new(self.conn.clone())
    }

    fn content_repo(&self) -> repositories::content::PageContentRepository {
        repositories::content::PageContentRepository::new(self.conn.clone())
    }

    fn cache_repo(&self) -> repositories::cache::CacheRepository {
        repositories::cache::CacheRepository::new(self.conn.clone())
    }

    // Businesses

    pub async fn add_business(&self, business: NewBusiness) -> Result<i32> {
        self.business_repo().insert(business).await
    }

    pub async fn get_business(&self, id: i32) -> Result<Option<businesses::Model>> {
        self.business_repo().get(id).await
    }

    pub async fn update_business(&self, id: i32, changes: BusinessChanges) -> Result<bool> {
        self.business_repo().update(id, changes).await
    }

    pub async fn set_business_open(&self, id: i32, is_open: bool) -> Result<bool> {
        self.business_repo().set_open(id, is_open).await
    }

    pub async fn set_business_verified(&self, id: i32, is_verified: bool) -> Result<bool> {
        self.business_repo().set_verified(id, is_verified).await
    }

    pub async fn set_business_image_updated(&self, id: i32, is_image_updated: bool) -> Result<bool> {
        self.business_repo()
            .set_image_updated(id, is_image_updated)
            .await
    }

    pub async fn set_business_images(
        &self,
        id: i32,
        urls: &[String],
        is_image_updated: bool,
    ) -> Result<bool> {
        self.business_repo()
            .set_images(id, urls, is_image_updated)
            .await
    }

    pub async fn delete_business(&self, id: i32) -> Result<bool> {
        self.business_repo().delete(id).await
    }

    pub async fn find_businesses_in_box(
        &self,
        bbox: &BoundingBox,
        text: &str,
    ) -> Result<Vec<businesses::Model>> {
        self.business_repo().find_in_box(bbox, text).await
    }

    pub async fn find_businesses_by_category(
        &self,
        category: &str,
        bbox: Option<&BoundingBox>,
    ) -> Result<Vec<businesses::Model>> {
        self.business_repo().find_by_category(category, bbox).await
    }

    pub async fn suggest_businesses(&self, text: &str, limit: u64) -> Result<Vec<businesses::Model>> {
        self.business_repo().suggest_by_name(text, limit).await
    }

    pub async fn list_businesses(&self) -> Result<Vec<businesses::Model>> {
        self.business_repo().list().await
    }

    pub async fn list_image_updated_businesses(&self) -> Result<Vec<businesses::Model>> {
        self.business_repo().list_image_updated().await
    }

    pub async fn business_names(&self, ids: &[i32]) -> Result<HashMap<i32, String>> {
        Ok(self.business_repo().names_for(ids).await?.into_iter().collect())
    }

    pub async fn businesses_created_since(&self, since: &str) -> Result<u64> {
        self.business_repo().count_created_since(since).await
    }

    pub async fn businesses_created_by_day(&self) -> Result<Vec<(String, i64)>> {
        let timestamps = self.business_repo().created_timestamps().await?;
        Ok(repositories::count_by_day(timestamps))
    }

    // Keywords

    pub async fn suggest_keywords(&self, text: &str, limit: u64) -> Result<Vec<String>> {
        self.keyword_repo().suggest(text, limit).await
    }

    pub async fn keywords_matching_any(&self, tokens: &[&str], limit: u64) -> Result<Vec<String>> {
        self.keyword_repo().matching_any(tokens, limit).await
    }

    pub async fn keywords_for_business(&self, business_id: i32) -> Result<Vec<String>> {
        self.keyword_repo().names_for_business(business_id).await
    }

    // Reviews

    pub async fn add_review(&self, review: NewReview) -> Result<i32> {
        self.review_repo().insert(review).await
    }

    pub async fn get_review(&self, id: i32) -> Result<Option<reviews::Model>> {
        self.review_repo().get(id).await
    }

    pub async fn set_review_verified(&self, id: i32, is_verified: bool) -> Result<bool> {
        self.review_repo().set_verified(id, is_verified).await
    }

    pub async fn delete_review(&self, id: i32) -> Result<bool> {
        self.review_repo().delete(id).await
    }

    pub async fn list_reviews_by_verification(&self, is_verified: bool) -> Result<Vec<ReviewRow>> {
        self.review_repo().list_by_verification(is_verified).await
    }

    pub async fn list_business_reviews(
        &self,
        business_id: i32,
        verified_only: bool,
    ) -> Result<Vec<ReviewRow>> {
        self.review_repo()
            .list_for_business(business_id, verified_only)
            .await
    }

    pub async fn list_user_reviews(&self, user_id: i32) -> Result<Vec<ReviewRow>> {
        self.review_repo().list_by_user(user_id).await
    }

    pub async fn reviews_created_since(&self, since: &str) -> Result<u64> {
        self.review_repo().count_created_since(since).await
    }

    pub async fn reviewed_business_ids(&self, user_id: i32) -> Result<Vec<i32>> {
        self.review_repo().business_ids_for_user(user_id).await
    }

    pub async fn business_ratings(&self, business_id: i32) -> Result<Vec<(i32, String)>> {
        self.review_repo().ratings_for_business(business_id).await
    }

    pub async fn average_ratings(&self, business_ids: &[i32]) -> Result<HashMap<i32, f64>> {
        self.review_repo().average_ratings(business_ids).await
    }

    // Users and favorites

    pub async fn add_user(&self, name: &str, email: &str) -> Result<i32> {
        self.user_repo().insert(name, email).await
    }

    pub async fn get_user(&self, id: i32) -> Result<Option<users::Model>> {
        self.user_repo().get(id).await
    }

    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<users::Model>> {
        self.user_repo().find_by_email(email).await
    }

    pub async fn list_users(&self) -> Result<Vec<users::Model>> {
        self.user_repo().list().await
    }

    pub async fn update_user(&self, id: i32, changes: UserChanges) -> Result<bool> {
        self.user_repo().update(id, changes).await
    }

    pub async fn users_created_since(&self, since: &str) -> Result<u64> {
        self.user_repo().count_created_since(since).await
    }

    pub async fn delete_user(&self, id: i32) -> Result<Option<DeletedUser>> {
        self.user_repo().delete(id).await
    }

    pub async fn users_created_by_day(&self) -> Result<Vec<(String, i64)>> {
        let timestamps = self.user_repo().created_timestamps().await?;
        Ok(repositories::count_by_day(timestamps))
    }

    pub async fn add_favorite(&self, user_id: i32, business_id: i32) -> Result<bool> {
        self.favorite_repo().add(user_id, business_id).await
    }

    pub async fn remove_favorite(&self, user_id: i32, business_id: i32) -> Result<bool> {
        self.favorite_repo().remove(user_id, business_id).await
    }

    pub async fn list_favorites(&self, user_id: i32) -> Result<Vec<businesses::Model>> {
        self.favorite_repo().list_for_user(user_id).await
    }

    // Views

    pub async fn record_view(&self, business_id: i32, date: &str) -> Result<()> {
        self.view_repo().record(business_id, date).await
    }

    pub async fn total_views(&self, business_id: i32) -> Result<i64> {
        self.view_repo().total_for(business_id).await
    }

    pub async fn total_views_for(&self, business_ids: &[i32]) -> Result<HashMap<i32, i64>> {
        self.view_repo().totals_for(business_ids).await
    }

    pub async fn views_by_day(&self) -> Result<Vec<(String, i64)>> {
        self.view_repo().by_day().await
    }

    pub async fn business_views_since(
        &self,
        business_id: i32,
        since: &str,
    ) -> Result<Vec<(String, i64)>> {
        self.view_repo().for_business_since(business_id, since).await
    }

    pub async fn top_viewed_businesses(&self, limit: u64) -> Result<Vec<(i32, i64)>> {
        self.view_repo().top_businesses(limit).await
    }

    // Search counters

    pub async fn record_search(&self, item: &str, bucket: LocationBucket) -> Result<()> {
        self.counter_repo().record(item, bucket).await
    }

    pub async fn item_search_count(&self, item: &str) -> Result<i64> {
        self.counter_repo().item_count(item).await
    }

    pub async fn location_search_count(&self, bucket: LocationBucket) -> Result<i64> {
        self.counter_repo().location_count(bucket).await
    }

    pub async fn top_searched_items(&self, limit: u64) -> Result<Vec<item_searches::Model>> {
        self.counter_repo().top_items(limit).await
    }

    pub async fn top_searched_locations(
        &self,
        limit: u64,
    ) -> Result<Vec<location_searches::Model>> {
        self.counter_repo().top_locations(limit).await
    }

    // Activity feed

    pub async fn add_activity(&self, kind: &str, message: &str) -> Result<()> {
        self.activity_repo().insert(kind, message).await
    }

    pub async fn latest_activities(&self, limit: u64) -> Result<Vec<activities::Model>> {
        self.activity_repo().latest(limit).await
    }

    // Page content

    pub async fn get_page_content(&self, key: &str) -> Result<Option<page_contents::Model>> {
        self.content_repo().get(key).await
    }

    pub async fn save_page_content(&self, key: &str, text: &str) -> Result<page_contents::Model> {
        self.content_repo().upsert(key, text).await
    }

    // Cache rows

    pub async fn cache_get(&self, key: &str) -> Result<Option<String>> {
        self.cache_repo().get(key).await
    }

    pub async fn cache_set(&self, key: &str, value: &str, ttl: chrono::Duration) -> Result<()> {
        self.cache_repo().set(key, value, ttl).await
    }

    pub async fn cache_delete(&self, key: &str) -> Result<()> {
        self.cache_repo().delete(key).await
    }
}
