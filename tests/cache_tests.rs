use bizdir::cache::memory::MemoryCacheStore;
use bizdir::cache::{Cache, CacheKey, CacheStore, Mutation};
use bizdir::config::{CacheConfig, Config};
use bizdir::db::Store;
use bizdir::services::business_service::{
    BusinessRecord, ImageAction, ImageReview, OpenState, RegisterBusinessRequest,
    UpdateBusinessRequest,
};
use bizdir::services::review_service::{
    AspectRating, ModerationDecision, PostReviewRequest, ReviewDto,
};
use bizdir::services::search::SearchQuery;
use bizdir::services::user_service::{RegisterUserRequest, UpdateUserRequest, UserDto};
use bizdir::services::BusinessError;
use bizdir::state::SharedState;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

const TTL: Duration = Duration::from_secs(60);

fn memory_cache() -> (Arc<MemoryCacheStore>, Cache) {
    let store = Arc::new(MemoryCacheStore::new());
    let cache = Cache::new(store.clone(), CacheConfig::default());
    (store, cache)
}

struct FailingStore;

#[async_trait::async_trait]
impl CacheStore for FailingStore {
    async fn get(&self, _key: &str) -> anyhow::Result<Option<String>> {
        anyhow::bail!("connection refused")
    }

    async fn set_ex(&self, _key: &str, _value: &str, _ttl: Duration) -> anyhow::Result<()> {
        anyhow::bail!("connection refused")
    }

    async fn del(&self, _key: &str) -> anyhow::Result<()> {
        anyhow::bail!("connection refused")
    }
}

async fn counted(cache: &Cache, key: &str, calls: &AtomicUsize) -> Vec<i32> {
    cache
        .get_or_compute(key, TTL, || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok::<_, anyhow::Error>(vec![1, 2, 3])
        })
        .await
        .unwrap()
}

#[tokio::test]
async fn test_hit_skips_computation() {
    let (_, cache) = memory_cache();
    let calls = AtomicUsize::new(0);

    let first = counted(&cache, "users", &calls).await;
    let second = counted(&cache, "users", &calls).await;

    assert_eq!(first, second);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_invalidate_forces_recompute() {
    let (_, cache) = memory_cache();
    let calls = AtomicUsize::new(0);

    counted(&cache, "users", &calls).await;
    cache.invalidate(CacheKey::Users).await;
    counted(&cache, "users", &calls).await;

    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_compute_error_is_not_cached() {
    let (store, cache) = memory_cache();

    let result: Result<Vec<i32>, anyhow::Error> = cache
        .get_or_compute("topItems", TTL, || async { Err(anyhow::anyhow!("db down")) })
        .await;
    assert!(result.is_err());
    assert!(store.get("topItems").await.unwrap().is_none());

    let calls = AtomicUsize::new(0);
    counted(&cache, "topItems", &calls).await;
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_undecodable_entry_is_a_miss() {
    let (store, cache) = memory_cache();
    store.set_ex("users", "not json", TTL).await.unwrap();

    let calls = AtomicUsize::new(0);
    let value = counted(&cache, "users", &calls).await;

    assert_eq!(value, vec![1, 2, 3]);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_failing_backend_is_fail_open() {
    let cache = Cache::new(Arc::new(FailingStore), CacheConfig::default());
    let calls = AtomicUsize::new(0);

    assert_eq!(counted(&cache, "users", &calls).await, vec![1, 2, 3]);
    assert_eq!(counted(&cache, "users", &calls).await, vec![1, 2, 3]);
    assert_eq!(calls.load(Ordering::SeqCst), 2);

    cache
        .apply(&Mutation::PostReview { business_id: 1 })
        .await;
}

#[tokio::test]
async fn test_disabled_cache_always_computes() {
    let cache = Cache::disabled(CacheConfig::default());
    let calls = AtomicUsize::new(0);

    counted(&cache, "users", &calls).await;
    counted(&cache, "users", &calls).await;

    assert!(!cache.is_enabled());
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_posting_review_drops_affected_keys_only() {
    let (store, cache) = memory_cache();
    for key in ["business:7", "nonVerifiedReviews", "business:8", "users"] {
        store.set_ex(key, "[]", TTL).await.unwrap();
    }

    cache.apply(&Mutation::PostReview { business_id: 7 }).await;

    assert!(store.get("business:7").await.unwrap().is_none());
    assert!(store.get("nonVerifiedReviews").await.unwrap().is_none());
    assert!(store.get("business:8").await.unwrap().is_some());
    assert!(store.get("users").await.unwrap().is_some());
}

#[tokio::test]
async fn test_search_counters_drop_leaderboards() {
    let (store, cache) = memory_cache();
    for key in ["topItems", "topLocations", "users"] {
        store.set_ex(key, "[]", TTL).await.unwrap();
    }

    cache.apply(&Mutation::RecordSearch).await;

    assert!(store.get("topItems").await.unwrap().is_none());
    assert!(store.get("topLocations").await.unwrap().is_none());
    assert!(store.get("users").await.unwrap().is_some());
}

#[tokio::test]
async fn test_memory_entries_expire() {
    let store = MemoryCacheStore::new();
    store
        .set_ex("users", "[]", Duration::from_millis(20))
        .await
        .unwrap();

    tokio::time::sleep(Duration::from_millis(40)).await;

    assert!(store.get("users").await.unwrap().is_none());
}

#[tokio::test]
async fn test_database_backend_round_trip() {
    let db = Store::new("sqlite::memory:").await.unwrap();
    let backend = bizdir::cache::sql::DatabaseCacheStore::new(db);

    backend.set_ex("users", "[1]", TTL).await.unwrap();
    assert_eq!(backend.get("users").await.unwrap().as_deref(), Some("[1]"));

    backend.set_ex("users", "[2]", TTL).await.unwrap();
    assert_eq!(backend.get("users").await.unwrap().as_deref(), Some("[2]"));

    backend.del("users").await.unwrap();
    assert!(backend.get("users").await.unwrap().is_none());
}

fn bakery() -> RegisterBusinessRequest {
    RegisterBusinessRequest {
        name: "Corner Bakery".to_string(),
        category: "Bakery".to_string(),
        description: None,
        address: "12 Elm St".to_string(),
        city: "Springfield".to_string(),
        state: "IL".to_string(),
        zipcode: "62701".to_string(),
        phone: None,
        email: None,
        website: None,
        latitude: 39.7817,
        longitude: -89.6501,
        image_urls: Vec::new(),
        keywords: vec!["bread".to_string()],
    }
}

async fn cached_state() -> (SharedState, Arc<MemoryCacheStore>) {
    let db = Store::new("sqlite::memory:").await.unwrap();
    let (memory, cache) = memory_cache();
    (SharedState::with_parts(Config::default(), db, cache), memory)
}

async fn register_user(state: &SharedState, name: &str, email: &str) -> UserDto {
    state
        .user_service
        .register(RegisterUserRequest {
            name: name.to_string(),
            email: email.to_string(),
        })
        .await
        .unwrap()
}

async fn approved_review(state: &SharedState, business_id: i32, user_id: i32) -> ReviewDto {
    let review = state
        .review_service
        .post(PostReviewRequest {
            business_id,
            user_id,
            content: "Lovely rye".to_string(),
            aspects: vec![AspectRating {
                aspect: "taste".to_string(),
                rating: 4,
            }],
            image: None,
        })
        .await
        .unwrap();
    state
        .review_service
        .moderate(review.id, ModerationDecision::Approve)
        .await
        .unwrap();
    review
}

fn find(records: &[BusinessRecord], id: i32) -> &BusinessRecord {
    records.iter().find(|b| b.id == id).unwrap()
}

/// Every cached view that embeds the business record, as currently served.
struct RecordViews {
    detail: BusinessRecord,
    listed: BusinessRecord,
    exported: BusinessRecord,
    pending: Vec<BusinessRecord>,
}

impl RecordViews {
    async fn load(state: &SharedState, id: i32) -> Self {
        let detail = state.business_service.get(id).await.unwrap().business;
        let list = state.business_service.list().await.unwrap();
        let export = state.business_service.export().await.unwrap();
        let exported = export
            .into_iter()
            .find(|row| row.business.id == id)
            .unwrap()
            .business;
        let pending = state.business_service.list_pending_images().await.unwrap();
        Self {
            detail,
            listed: find(&list, id).clone(),
            exported,
            pending,
        }
    }

    fn all(&self) -> [&BusinessRecord; 3] {
        [&self.detail, &self.listed, &self.exported]
    }
}

#[tokio::test]
async fn test_detail_reflects_review_after_moderation() {
    let (state, memory) = cached_state().await;

    let business = state.business_service.register(bakery()).await.unwrap();
    let user = register_user(&state, "Ana", "ana@example.com").await;

    let detail = state.business_service.get(business.id).await.unwrap();
    assert!(detail.reviews.is_empty());
    let key = CacheKey::Business(business.id).to_string();
    assert!(memory.get(&key).await.unwrap().is_some());

    let review = state
        .review_service
        .post(PostReviewRequest {
            business_id: business.id,
            user_id: user.id,
            content: "Great sourdough".to_string(),
            aspects: vec![
                AspectRating {
                    aspect: "taste".to_string(),
                    rating: 5,
                },
                AspectRating {
                    aspect: "service".to_string(),
                    rating: 4,
                },
            ],
            image: None,
        })
        .await
        .unwrap();
    assert!(memory.get(&key).await.unwrap().is_none());

    // Unverified reviews stay off the public page.
    let detail = state.business_service.get(business.id).await.unwrap();
    assert!(detail.reviews.is_empty());

    state
        .review_service
        .moderate(review.id, ModerationDecision::Approve)
        .await
        .unwrap();

    let detail = state.business_service.get(business.id).await.unwrap();
    assert_eq!(detail.reviews.len(), 1);
    assert_eq!(detail.reviews[0].rating, 5);
    assert_eq!(detail.rating, Some(5.0));
}

#[tokio::test]
async fn test_favorites_refresh_cached_counts() {
    let (state, _) = cached_state().await;
    let business = state.business_service.register(bakery()).await.unwrap();
    let user = register_user(&state, "Bo", "bo@example.com").await;

    let views = RecordViews::load(&state, business.id).await;
    assert!(views.all().iter().all(|b| b.favorite_count == 0));

    state
        .user_service
        .add_favorite(user.id, business.id)
        .await
        .unwrap();
    let views = RecordViews::load(&state, business.id).await;
    assert!(views.all().iter().all(|b| b.favorite_count == 1));

    state
        .user_service
        .remove_favorite(user.id, business.id)
        .await
        .unwrap();
    let views = RecordViews::load(&state, business.id).await;
    assert!(views.all().iter().all(|b| b.favorite_count == 0));
}

#[tokio::test]
async fn test_image_changes_refresh_listings_and_queue() {
    let (state, _) = cached_state().await;
    let business = state.business_service.register(bakery()).await.unwrap();
    let url = "https://img.example/loaf.jpg";

    let views = RecordViews::load(&state, business.id).await;
    assert!(views.pending.is_empty());

    state
        .business_service
        .update_image(business.id, ImageAction::Add, url)
        .await
        .unwrap();
    let views = RecordViews::load(&state, business.id).await;
    assert!(views.all().iter().all(|b| b.image_urls == vec![url.to_string()]));
    assert!(views.all().iter().all(|b| b.is_image_updated));
    assert_eq!(views.pending.len(), 1);

    state
        .business_service
        .review_images(business.id, ImageReview::Reject)
        .await
        .unwrap();
    let views = RecordViews::load(&state, business.id).await;
    assert!(views.all().iter().all(|b| b.image_urls.is_empty()));
    assert!(views.pending.is_empty());
}

#[tokio::test]
async fn test_verify_and_toggle_refresh_every_record_view() {
    let (state, _) = cached_state().await;
    let business = state.business_service.register(bakery()).await.unwrap();
    state
        .business_service
        .update_image(business.id, ImageAction::Add, "https://img.example/a.jpg")
        .await
        .unwrap();

    let views = RecordViews::load(&state, business.id).await;
    assert!(!views.pending[0].is_verified);

    state.business_service.verify(business.id).await.unwrap();
    let views = RecordViews::load(&state, business.id).await;
    assert!(views.all().iter().all(|b| b.is_verified));
    assert!(views.pending[0].is_verified);

    state
        .business_service
        .set_open_state(business.id, OpenState::Close)
        .await
        .unwrap();
    let views = RecordViews::load(&state, business.id).await;
    assert!(views.all().iter().all(|b| !b.is_open));
    assert!(!views.pending[0].is_open);
}

#[tokio::test]
async fn test_business_rename_reaches_every_view() {
    let (state, _) = cached_state().await;
    let business = state.business_service.register(bakery()).await.unwrap();
    let user = register_user(&state, "Cy", "cy@example.com").await;
    approved_review(&state, business.id, user.id).await;

    RecordViews::load(&state, business.id).await;
    let before = state.review_service.list_by_status(true).await.unwrap();
    assert_eq!(before[0].business_name.as_deref(), Some("Corner Bakery"));
    state.review_service.business_reviews(business.id).await.unwrap();
    state
        .analytics_service
        .top_businesses_by_views()
        .await
        .unwrap();

    state
        .business_service
        .update(
            business.id,
            UpdateBusinessRequest {
                name: Some("Elm Street Bakery".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let renamed = Some("Elm Street Bakery");
    let views = RecordViews::load(&state, business.id).await;
    assert!(views.all().iter().all(|b| b.name == "Elm Street Bakery"));

    let detail = state.business_service.get(business.id).await.unwrap();
    assert_eq!(detail.reviews[0].business_name.as_deref(), renamed);
    let verified = state.review_service.list_by_status(true).await.unwrap();
    assert_eq!(verified[0].business_name.as_deref(), renamed);
    let reviews = state.review_service.business_reviews(business.id).await.unwrap();
    assert_eq!(reviews[0].business_name.as_deref(), renamed);
    let top = state
        .analytics_service
        .top_businesses_by_views()
        .await
        .unwrap();
    assert_eq!(top[0].name.as_deref(), renamed);
}

#[tokio::test]
async fn test_user_rename_reaches_reviews_and_user_list() {
    let (state, _) = cached_state().await;
    let business = state.business_service.register(bakery()).await.unwrap();
    let user = register_user(&state, "Dee", "dee@example.com").await;
    approved_review(&state, business.id, user.id).await;

    state.business_service.get(business.id).await.unwrap();
    state.review_service.list_by_status(true).await.unwrap();
    state.review_service.business_reviews(business.id).await.unwrap();
    state.user_service.list().await.unwrap();

    state
        .user_service
        .update(
            user.id,
            UpdateUserRequest {
                name: Some("Dee Dee".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let renamed = Some("Dee Dee");
    let detail = state.business_service.get(business.id).await.unwrap();
    assert_eq!(detail.reviews[0].user_name.as_deref(), renamed);
    let verified = state.review_service.list_by_status(true).await.unwrap();
    assert_eq!(verified[0].user_name.as_deref(), renamed);
    let reviews = state.review_service.business_reviews(business.id).await.unwrap();
    assert_eq!(reviews[0].user_name.as_deref(), renamed);
    let users = state.user_service.list().await.unwrap();
    assert_eq!(users[0].name, "Dee Dee");
}

#[tokio::test]
async fn test_deleting_user_refreshes_favorites_and_reviews() {
    let (state, _) = cached_state().await;
    let business = state.business_service.register(bakery()).await.unwrap();
    let user = register_user(&state, "Eli", "eli@example.com").await;
    approved_review(&state, business.id, user.id).await;
    state
        .user_service
        .add_favorite(user.id, business.id)
        .await
        .unwrap();

    let views = RecordViews::load(&state, business.id).await;
    assert!(views.all().iter().all(|b| b.favorite_count == 1));
    assert_eq!(state.user_service.list().await.unwrap().len(), 1);

    state.user_service.delete(user.id).await.unwrap();

    let views = RecordViews::load(&state, business.id).await;
    assert!(views.all().iter().all(|b| b.favorite_count == 0));
    let detail = state.business_service.get(business.id).await.unwrap();
    assert!(detail.reviews.is_empty());
    assert_eq!(detail.rating, None);
    assert!(state.user_service.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_deleted_business_leaves_cached_lists() {
    let (state, _) = cached_state().await;
    let business = state.business_service.register(bakery()).await.unwrap();
    state
        .business_service
        .update_image(business.id, ImageAction::Add, "https://img.example/b.jpg")
        .await
        .unwrap();
    RecordViews::load(&state, business.id).await;

    state.business_service.delete(business.id).await.unwrap();

    assert!(state.business_service.list().await.unwrap().is_empty());
    assert!(state.business_service.export().await.unwrap().is_empty());
    assert!(
        state
            .business_service
            .list_pending_images()
            .await
            .unwrap()
            .is_empty()
    );
    assert!(matches!(
        state.business_service.get(business.id).await,
        Err(BusinessError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_new_records_appear_in_cached_lists() {
    let (state, _) = cached_state().await;
    assert!(state.business_service.list().await.unwrap().is_empty());
    assert!(state.user_service.list().await.unwrap().is_empty());

    let mut with_image = bakery();
    with_image.image_urls = vec!["https://img.example/c.jpg".to_string()];
    state.business_service.register(with_image).await.unwrap();
    register_user(&state, "Fay", "fay@example.com").await;

    assert_eq!(state.business_service.list().await.unwrap().len(), 1);
    assert_eq!(state.business_service.export().await.unwrap().len(), 1);
    assert_eq!(state.user_service.list().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_views_refresh_analytics_and_leaderboard() {
    let (state, _) = cached_state().await;
    let business = state.business_service.register(bakery()).await.unwrap();

    state.business_service.get(business.id).await.unwrap();
    let analytics = state.business_service.analytics(business.id).await.unwrap();
    assert_eq!(analytics.days.last().unwrap().views, 1);
    let top = state
        .analytics_service
        .top_businesses_by_views()
        .await
        .unwrap();
    assert_eq!(top[0].total_views, 1);
    assert_eq!(state.business_service.export().await.unwrap()[0].total_views, 1);

    state.business_service.get(business.id).await.unwrap();

    let analytics = state.business_service.analytics(business.id).await.unwrap();
    assert_eq!(analytics.days.last().unwrap().views, 2);
    let top = state
        .analytics_service
        .top_businesses_by_views()
        .await
        .unwrap();
    assert_eq!(top[0].total_views, 2);
    assert_eq!(state.business_service.export().await.unwrap()[0].total_views, 2);
    let by_day = state.analytics_service.views_by_day().await.unwrap();
    assert_eq!(by_day.last().unwrap().count, 2);
}

#[tokio::test]
async fn test_searches_refresh_top_items() {
    let (state, _) = cached_state().await;
    let query = SearchQuery {
        text: "ramen".to_string(),
        latitude: 40.7,
        longitude: -74.0,
        page: None,
        page_size: None,
    };

    state.search_service.search(&query).await.unwrap();
    let top = state.analytics_service.top_items().await.unwrap();
    assert_eq!(top[0].count, 1);
    let locations = state.analytics_service.top_locations().await.unwrap();
    assert_eq!(locations[0].count, 1);

    state.search_service.search(&query).await.unwrap();
    let top = state.analytics_service.top_items().await.unwrap();
    assert_eq!(top[0].item, "ramen");
    assert_eq!(top[0].count, 2);
    let locations = state.analytics_service.top_locations().await.unwrap();
    assert_eq!(locations[0].count, 2);
}

#[tokio::test]
async fn test_page_save_replaces_cached_text() {
    let (state, memory) = cached_state().await;

    state
        .content_service
        .save("terms", "Be kind")
        .await
        .unwrap();
    assert_eq!(
        state.content_service.get("terms").await.unwrap().text,
        "Be kind"
    );
    assert!(memory.get("pageContent:terms").await.unwrap().is_some());

    state
        .content_service
        .save("terms", "Be kind and honest")
        .await
        .unwrap();
    assert_eq!(
        state.content_service.get("terms").await.unwrap().text,
        "Be kind and honest"
    );
}

#[tokio::test]
async fn test_deleting_review_refreshes_lists_and_rating() {
    let (state, _) = cached_state().await;
    let business = state.business_service.register(bakery()).await.unwrap();
    let user = register_user(&state, "Gus", "gus@example.com").await;
    let review = approved_review(&state, business.id, user.id).await;

    assert_eq!(
        state.business_service.get(business.id).await.unwrap().rating,
        Some(4.0)
    );
    assert_eq!(state.review_service.list_by_status(true).await.unwrap().len(), 1);
    assert_eq!(
        state
            .review_service
            .business_reviews(business.id)
            .await
            .unwrap()
            .len(),
        1
    );

    state
        .review_service
        .moderate(review.id, ModerationDecision::Delete)
        .await
        .unwrap();

    let detail = state.business_service.get(business.id).await.unwrap();
    assert!(detail.reviews.is_empty());
    assert_eq!(detail.rating, None);
    assert!(state.review_service.list_by_status(true).await.unwrap().is_empty());
    assert!(
        state
            .review_service
            .business_reviews(business.id)
            .await
            .unwrap()
            .is_empty()
    );
}
