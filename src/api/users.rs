use axum::{
    Json,
    extract::{Path, State},
};
use std::sync::Arc;

use super::validation::{validate_business_id, validate_user_id};
use super::{Ack, ApiError, ApiResponse, AppState};
use crate::services::UserError;
use crate::services::business_service::BusinessSummary;
use crate::services::user_service::{
    FavoriteChange, RegisterUserRequest, UpdateUserRequest, UserDto,
};

impl From<UserError> for ApiError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::NotFound(id) => Self::user_not_found(id),
            UserError::BusinessNotFound(id) => Self::business_not_found(id),
            UserError::Conflict(email) => Self::conflict(format!("Email {email} is already registered")),
            UserError::Validation(msg) => Self::validation(msg),
            UserError::Database(msg) => Self::DatabaseError(msg),
            UserError::Internal(msg) => Self::internal(msg),
        }
    }
}

/// `POST /api/users`
pub async fn register_user(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RegisterUserRequest>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    let user = state.user_service().register(request).await?;
    Ok(Json(ApiResponse::success(user)))
}

/// `GET /api/users/{id}`
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    let id = validate_user_id(id)?;
    let user = state.user_service().get(id).await?;
    Ok(Json(ApiResponse::success(user)))
}

/// `PUT /api/users/{id}`
pub async fn update_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Json(request): Json<UpdateUserRequest>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    let id = validate_user_id(id)?;
    let user = state.user_service().update(id, request).await?;
    Ok(Json(ApiResponse::success(user)))
}

/// `DELETE /api/users/{id}`
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<Ack>>, ApiError> {
    let id = validate_user_id(id)?;
    state.user_service().delete(id).await?;
    Ok(Json(ApiResponse::success(Ack { id })))
}

/// `GET /api/users/{id}/favorites`
pub async fn list_favorites(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<Vec<BusinessSummary>>>, ApiError> {
    let id = validate_user_id(id)?;
    let favorites = state.user_service().favorites(id).await?;
    Ok(Json(ApiResponse::success(favorites)))
}

/// `POST /api/users/{id}/favorites/{business_id}`
pub async fn add_favorite(
    State(state): State<Arc<AppState>>,
    Path((id, business_id)): Path<(i32, i32)>,
) -> Result<Json<ApiResponse<FavoriteChange>>, ApiError> {
    let id = validate_user_id(id)?;
    let business_id = validate_business_id(business_id)?;
    let change = state.user_service().add_favorite(id, business_id).await?;
    Ok(Json(ApiResponse::success(change)))
}

/// `DELETE /api/users/{id}/favorites/{business_id}`
pub async fn remove_favorite(
    State(state): State<Arc<AppState>>,
    Path((id, business_id)): Path<(i32, i32)>,
) -> Result<Json<ApiResponse<FavoriteChange>>, ApiError> {
    let id = validate_user_id(id)?;
    let business_id = validate_business_id(business_id)?;
    let change = state
        .user_service()
        .remove_favorite(id, business_id)
        .await?;
    Ok(Json(ApiResponse::success(change)))
}
