use axum::{
    Router,
    http::HeaderValue,
    middleware,
    routing::{delete, get, post, put},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::cache::Cache;
use crate::config::Config;
use crate::state::SharedState;

mod admin;
mod businesses;
mod content;
mod error;
mod observability;
mod reviews;
mod search;
mod system;
mod types;
mod users;
mod validation;

pub use error::ApiError;
pub use types::*;

use tokio::sync::RwLock;

use crate::services::{
    AnalyticsService, BusinessService, ContentService, ReviewService, SearchService, UserService,
};
use metrics_exporter_prometheus::PrometheusHandle;

#[derive(Clone)]
pub struct AppState {
    pub shared: Arc<SharedState>,

    pub start_time: std::time::Instant,

    pub prometheus_handle: Option<PrometheusHandle>,
}

impl AppState {
    #[must_use]
    pub fn config(&self) -> &Arc<RwLock<Config>> {
        &self.shared.config
    }

    #[must_use]
    pub fn store(&self) -> &crate::db::Store {
        &self.shared.store
    }

    #[must_use]
    pub fn cache(&self) -> &Cache {
        &self.shared.cache
    }

    #[must_use]
    pub fn search_service(&self) -> &Arc<SearchService> {
        &self.shared.search_service
    }

    #[must_use]
    pub fn business_service(&self) -> &Arc<dyn BusinessService> {
        &self.shared.business_service
    }

    #[must_use]
    pub fn review_service(&self) -> &Arc<dyn ReviewService> {
        &self.shared.review_service
    }

    #[must_use]
    pub fn user_service(&self) -> &Arc<dyn UserService> {
        &self.shared.user_service
    }

    #[must_use]
    pub fn analytics_service(&self) -> &Arc<AnalyticsService> {
        &self.shared.analytics_service
    }

    #[must_use]
    pub fn content_service(&self) -> &Arc<ContentService> {
        &self.shared.content_service
    }
}

#[must_use]
pub fn create_app_state(
    shared: Arc<SharedState>,
    prometheus_handle: Option<PrometheusHandle>,
) -> Arc<AppState> {
    Arc::new(AppState {
        shared,
        start_time: std::time::Instant::now(),
        prometheus_handle,
    })
}

pub async fn create_app_state_from_config(
    config: Config,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    let shared = Arc::new(SharedState::new(config).await?);
    Ok(create_app_state(shared, prometheus_handle))
}

pub async fn router(state: Arc<AppState>) -> Router {
    let cors_origins = state.config().read().await.server.cors_allowed_origins.clone();

    let api_router = api_routes().with_state(state);

    let cors_layer = if cors_origins.contains(&"*".to_string()) {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins)
    };

    Router::new()
        .nest("/api", api_router)
        .layer(cors_layer.allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(observability::logging_middleware))
}

fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/search", get(search::search))
        .route("/search/category", get(search::search_by_category))
        .route("/search/keywords", get(search::keyword_suggestions))
        .route("/search/businesses", get(search::business_suggestions))
        .route("/businesses", post(businesses::register_business))
        .route("/businesses/{id}", get(businesses::get_business))
        .route("/businesses/{id}", put(businesses::update_business))
        .route("/businesses/{id}/status", put(businesses::set_open_state))
        .route("/businesses/{id}/images", post(businesses::update_image))
        .route("/businesses/{id}/stats", get(businesses::get_stats))
        .route("/businesses/{id}/analytics", get(businesses::get_analytics))
        .route("/businesses/{id}/reviews", get(reviews::list_business_reviews))
        .route("/reviews", post(reviews::post_review))
        .route("/users", post(users::register_user))
        .route("/users/{id}", get(users::get_user))
        .route("/users/{id}", put(users::update_user))
        .route("/users/{id}", delete(users::delete_user))
        .route("/users/{id}/reviews", get(reviews::list_user_reviews))
        .route("/users/{id}/favorites", get(users::list_favorites))
        .route(
            "/users/{id}/favorites/{business_id}",
            post(users::add_favorite),
        )
        .route(
            "/users/{id}/favorites/{business_id}",
            delete(users::remove_favorite),
        )
        .route("/admin/businesses", get(admin::list_businesses))
        .route("/admin/businesses/export", get(admin::export_businesses))
        .route("/admin/businesses/images", get(admin::list_pending_images))
        .route("/admin/businesses/{id}", delete(admin::delete_business))
        .route("/admin/businesses/{id}/verify", post(admin::verify_business))
        .route("/admin/businesses/{id}/images", post(admin::review_images))
        .route("/admin/reviews", get(admin::list_reviews))
        .route("/admin/reviews/{id}", post(admin::moderate_review))
        .route("/admin/users", get(admin::list_users))
        .route("/admin/analytics/users", get(admin::users_by_day))
        .route("/admin/analytics/businesses", get(admin::businesses_by_day))
        .route("/admin/analytics/views", get(admin::views_by_day))
        .route("/admin/analytics/top-items", get(admin::top_items))
        .route("/admin/analytics/top-locations", get(admin::top_locations))
        .route(
            "/admin/analytics/top-businesses",
            get(admin::top_businesses),
        )
        .route("/admin/activities", get(admin::latest_activities))
        .route("/admin/notifications", get(admin::notifications))
        .route("/admin/page-content", post(content::save_page_content))
        .route("/page-content", get(content::get_page_content))
        .route("/system/status", get(system::get_status))
        .route("/system/health/live", get(system::health_live))
        .route("/system/health/ready", get(system::health_ready))
        .route("/metrics", get(observability::get_metrics))
}
