use std::sync::Arc;
use tokio::sync::RwLock;

use crate::cache::Cache;
use crate::config::Config;
use crate::db::Store;
use crate::services::{
    AnalyticsService, BusinessService, ContentService, ReviewService, SeaOrmBusinessService, SeaOrmReviewService,
    SeaOrmUserService, SearchService, UserService,
};

#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<RwLock<Config>>,

    pub store: Store,

    pub cache: Cache,

    pub search_service: Arc<SearchService>,

    pub business_service: Arc<dyn BusinessService>,

    pub review_service: Arc<dyn ReviewService>,

    pub user_service: Arc<dyn UserService>,

    pub analytics_service: Arc<AnalyticsService>,

    pub content_service: Arc<ContentService>,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;
        let cache = Cache::from_config(&config.cache, &store).await;

        Ok(Self::with_parts(config, store, cache))
    }

    /// Wires the services around an already opened store and cache.
    #[must_use]
    pub fn with_parts(config: Config, store: Store, cache: Cache) -> Self {
        let store_arc = Arc::new(store.clone());

        let search_service = Arc::new(SearchService::new(
            store_arc.clone(),
            config.search.clone(),
            cache.clone(),
        ));

        let business_service = Arc::new(SeaOrmBusinessService::new(
            store_arc.clone(),
            cache.clone(),
        )) as Arc<dyn BusinessService + Send + Sync + 'static>;

        let review_service = Arc::new(SeaOrmReviewService::new(
            store_arc.clone(),
            cache.clone(),
        )) as Arc<dyn ReviewService + Send + Sync + 'static>;

        let user_service = Arc::new(SeaOrmUserService::new(store_arc.clone(), cache.clone()))
            as Arc<dyn UserService + Send + Sync + 'static>;

        let analytics_service = Arc::new(AnalyticsService::new(store_arc.clone(), cache.clone()));

        let content_service = Arc::new(ContentService::new(store_arc, cache.clone()));

        Self {
            config: Arc::new(RwLock::new(config)),
            store,
            cache,
            search_service,
            business_service,
            review_service,
            user_service,
            analytics_service,
            content_service,
        }
    }

    pub async fn config(&self) -> Config {
        self.config.read().await.clone()
    }
}
