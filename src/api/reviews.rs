use axum::{
    Json,
    extract::{Path, State},
};
use std::sync::Arc;

use super::validation::{validate_business_id, validate_user_id};
use super::{ApiError, ApiResponse, AppState};
use crate::services::ReviewError;
use crate::services::review_service::{PostReviewRequest, ReviewDto};

impl From<ReviewError> for ApiError {
    fn from(err: ReviewError) -> Self {
        match err {
            ReviewError::NotFound(id) => Self::not_found("Review", id),
            ReviewError::BusinessNotFound(id) => Self::business_not_found(id),
            ReviewError::UserNotFound(id) => Self::user_not_found(id),
            ReviewError::Validation(msg) => Self::validation(msg),
            ReviewError::Database(msg) => Self::DatabaseError(msg),
            ReviewError::Internal(msg) => Self::internal(msg),
        }
    }
}

/// `POST /api/reviews`
pub async fn post_review(
    State(state): State<Arc<AppState>>,
    Json(request): Json<PostReviewRequest>,
) -> Result<Json<ApiResponse<ReviewDto>>, ApiError> {
    validate_business_id(request.business_id)?;
    validate_user_id(request.user_id)?;
    let review = state.review_service().post(request).await?;
    Ok(Json(ApiResponse::success(review)))
}

/// `GET /api/businesses/{id}/reviews`
pub async fn list_business_reviews(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<Vec<ReviewDto>>>, ApiError> {
    let id = validate_business_id(id)?;
    let reviews = state.review_service().business_reviews(id).await?;
    Ok(Json(ApiResponse::success(reviews)))
}

/// `GET /api/users/{id}/reviews`
pub async fn list_user_reviews(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<Vec<ReviewDto>>>, ApiError> {
    let id = validate_user_id(id)?;
    let reviews = state.review_service().user_reviews(id).await?;
    Ok(Json(ApiResponse::success(reviews)))
}
