//! Admin dashboard endpoints: verification, moderation and analytics.
//!
//! There is no authentication layer; deployments are expected to keep
//! `/api/admin` behind their own gateway.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use std::sync::Arc;

use super::validation::{validate_business_id, validate_review_id};
use super::{Ack, ApiError, ApiResponse, AppState};
use crate::services::AnalyticsError;
use crate::services::analytics::{
    ActivityDto, BusinessViews, DailyCount, ItemCount, LocationCount, Notifications,
};
use crate::services::business_service::{BusinessExportRow, BusinessRecord, ImageReview};
use crate::services::review_service::{ModerationDecision, ReviewDto};
use crate::services::user_service::UserDto;

impl From<AnalyticsError> for ApiError {
    fn from(err: AnalyticsError) -> Self {
        match err {
            AnalyticsError::Database(msg) => Self::DatabaseError(msg),
            AnalyticsError::Internal(msg) => Self::internal(msg),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ReviewListQuery {
    #[serde(default)]
    pub verified: bool,
}

#[derive(Debug, Deserialize)]
pub struct ModerationRequest {
    pub decision: ModerationDecision,
}

#[derive(Debug, Deserialize)]
pub struct ImageReviewRequest {
    pub decision: ImageReview,
}

/// `GET /api/admin/businesses`
pub async fn list_businesses(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<BusinessRecord>>>, ApiError> {
    let businesses = state.business_service().list().await?;
    Ok(Json(ApiResponse::success(businesses)))
}

/// `GET /api/admin/businesses/export`
pub async fn export_businesses(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<BusinessExportRow>>>, ApiError> {
    let rows = state.business_service().export().await?;
    Ok(Json(ApiResponse::success(rows)))
}

/// `GET /api/admin/businesses/images`
///
/// Businesses with images uploaded since their last review.
pub async fn list_pending_images(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<BusinessRecord>>>, ApiError> {
    let businesses = state.business_service().list_pending_images().await?;
    Ok(Json(ApiResponse::success(businesses)))
}

/// `DELETE /api/admin/businesses/{id}`
pub async fn delete_business(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<Ack>>, ApiError> {
    let id = validate_business_id(id)?;
    state.business_service().delete(id).await?;
    Ok(Json(ApiResponse::success(Ack { id })))
}

/// `POST /api/admin/businesses/{id}/verify`
pub async fn verify_business(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<BusinessRecord>>, ApiError> {
    let id = validate_business_id(id)?;
    let business = state.business_service().verify(id).await?;
    Ok(Json(ApiResponse::success(business)))
}

/// `POST /api/admin/businesses/{id}/images`
pub async fn review_images(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Json(request): Json<ImageReviewRequest>,
) -> Result<Json<ApiResponse<BusinessRecord>>, ApiError> {
    let id = validate_business_id(id)?;
    let business = state
        .business_service()
        .review_images(id, request.decision)
        .await?;
    Ok(Json(ApiResponse::success(business)))
}

/// `GET /api/admin/reviews?verified=`
pub async fn list_reviews(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ReviewListQuery>,
) -> Result<Json<ApiResponse<Vec<ReviewDto>>>, ApiError> {
    let reviews = state.review_service().list_by_status(query.verified).await?;
    Ok(Json(ApiResponse::success(reviews)))
}

/// `POST /api/admin/reviews/{id}`
pub async fn moderate_review(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Json(request): Json<ModerationRequest>,
) -> Result<Json<ApiResponse<Ack>>, ApiError> {
    let id = validate_review_id(id)?;
    state.review_service().moderate(id, request.decision).await?;
    Ok(Json(ApiResponse::success(Ack { id })))
}

/// `GET /api/admin/users`
pub async fn list_users(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<UserDto>>>, ApiError> {
    let users = state.user_service().list().await?;
    Ok(Json(ApiResponse::success(users)))
}

pub async fn users_by_day(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<DailyCount>>>, ApiError> {
    let counts = state.analytics_service().users_created_by_day().await?;
    Ok(Json(ApiResponse::success(counts)))
}

pub async fn businesses_by_day(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<DailyCount>>>, ApiError> {
    let counts = state.analytics_service().businesses_created_by_day().await?;
    Ok(Json(ApiResponse::success(counts)))
}

pub async fn views_by_day(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<DailyCount>>>, ApiError> {
    let counts = state.analytics_service().views_by_day().await?;
    Ok(Json(ApiResponse::success(counts)))
}

pub async fn top_items(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<ItemCount>>>, ApiError> {
    let items = state.analytics_service().top_items().await?;
    Ok(Json(ApiResponse::success(items)))
}

pub async fn top_locations(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<LocationCount>>>, ApiError> {
    let locations = state.analytics_service().top_locations().await?;
    Ok(Json(ApiResponse::success(locations)))
}

pub async fn top_businesses(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<BusinessViews>>>, ApiError> {
    let businesses = state.analytics_service().top_businesses_by_views().await?;
    Ok(Json(ApiResponse::success(businesses)))
}

pub async fn latest_activities(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<ActivityDto>>>, ApiError> {
    let activities = state.analytics_service().latest_activities().await?;
    Ok(Json(ApiResponse::success(activities)))
}

/// `GET /api/admin/notifications`
pub async fn notifications(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Notifications>>, ApiError> {
    let counts = state.analytics_service().notifications().await?;
    Ok(Json(ApiResponse::success(counts)))
}
