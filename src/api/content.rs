use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState};
use crate::services::ContentError;
use crate::services::content::PageContentDto;

impl From<ContentError> for ApiError {
    fn from(err: ContentError) -> Self {
        match err {
            ContentError::NotFound(key) => Self::not_found("Page content", key),
            ContentError::Validation(msg) => Self::validation(msg),
            ContentError::Database(msg) => Self::DatabaseError(msg),
            ContentError::Internal(msg) => Self::internal(msg),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct PageContentQuery {
    pub key: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SavePageContentRequest {
    #[serde(default)]
    pub key: String,
    pub text: Option<String>,
}

/// `GET /api/page-content?key=about`
pub async fn get_page_content(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PageContentQuery>,
) -> Result<Json<ApiResponse<PageContentDto>>, ApiError> {
    let key = query
        .key
        .ok_or_else(|| ApiError::validation("key is required"))?;
    let content = state.content_service().get(&key).await?;
    Ok(Json(ApiResponse::success(content)))
}

/// `POST /api/admin/page-content`
pub async fn save_page_content(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SavePageContentRequest>,
) -> Result<Json<ApiResponse<PageContentDto>>, ApiError> {
    let text = request
        .text
        .ok_or_else(|| ApiError::validation("text is required"))?;
    let content = state.content_service().save(&request.key, &text).await?;
    Ok(Json(ApiResponse::success(content)))
}
