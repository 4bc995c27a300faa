//! Business self-service endpoints.
//!
//! Handlers only map HTTP to [`BusinessService`] calls; caching, view
//! counting and invalidation happen in the service.
//!
//! [`BusinessService`]: crate::services::BusinessService

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;
use std::sync::Arc;

use super::validation::validate_business_id;
use super::{ApiError, ApiResponse, AppState};
use crate::services::BusinessError;
use crate::services::business_service::{
    BusinessAnalytics, BusinessDetail, BusinessRecord, BusinessStats, ImageAction, OpenState,
    RegisterBusinessRequest, UpdateBusinessRequest,
};

impl From<BusinessError> for ApiError {
    fn from(err: BusinessError) -> Self {
        match err {
            BusinessError::NotFound(id) => Self::business_not_found(id),
            BusinessError::Validation(msg) => Self::validation(msg),
            BusinessError::Database(msg) => Self::DatabaseError(msg),
            BusinessError::Internal(msg) => Self::internal(msg),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct OpenStateRequest {
    pub state: OpenState,
}

#[derive(Debug, Deserialize)]
pub struct ImageRequest {
    pub action: ImageAction,
    pub url: String,
}

/// `POST /api/businesses`
pub async fn register_business(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RegisterBusinessRequest>,
) -> Result<Json<ApiResponse<BusinessRecord>>, ApiError> {
    let business = state.business_service().register(request).await?;
    Ok(Json(ApiResponse::success(business)))
}

/// `GET /api/businesses/{id}`
///
/// Public detail page; each call counts as one view.
pub async fn get_business(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<BusinessDetail>>, ApiError> {
    let id = validate_business_id(id)?;
    let detail = state.business_service().get(id).await?;
    Ok(Json(ApiResponse::success(detail)))
}

/// `PUT /api/businesses/{id}`
pub async fn update_business(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Json(request): Json<UpdateBusinessRequest>,
) -> Result<Json<ApiResponse<BusinessRecord>>, ApiError> {
    let id = validate_business_id(id)?;
    let business = state.business_service().update(id, request).await?;
    Ok(Json(ApiResponse::success(business)))
}

/// `PUT /api/businesses/{id}/status`
pub async fn set_open_state(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Json(request): Json<OpenStateRequest>,
) -> Result<Json<ApiResponse<BusinessRecord>>, ApiError> {
    let id = validate_business_id(id)?;
    let business = state
        .business_service()
        .set_open_state(id, request.state)
        .await?;
    Ok(Json(ApiResponse::success(business)))
}

/// `POST /api/businesses/{id}/images`
pub async fn update_image(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Json(request): Json<ImageRequest>,
) -> Result<Json<ApiResponse<Vec<String>>>, ApiError> {
    let id = validate_business_id(id)?;
    let urls = state
        .business_service()
        .update_image(id, request.action, &request.url)
        .await?;
    Ok(Json(ApiResponse::success(urls)))
}

/// `GET /api/businesses/{id}/stats`
pub async fn get_stats(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<BusinessStats>>, ApiError> {
    let id = validate_business_id(id)?;
    let stats = state.business_service().stats(id).await?;
    Ok(Json(ApiResponse::success(stats)))
}

/// `GET /api/businesses/{id}/analytics`
pub async fn get_analytics(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<BusinessAnalytics>>, ApiError> {
    let id = validate_business_id(id)?;
    let analytics = state.business_service().analytics(id).await?;
    Ok(Json(ApiResponse::success(analytics)))
}
