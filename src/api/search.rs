//! Business search endpoints.

use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;
use std::sync::Arc;

use super::validation::{validate_origin, validate_search_text, validate_suggestion_query};
use super::{ApiError, ApiResponse, AppState};
use crate::services::SearchError;
use crate::services::search::{
    BusinessSuggestion, CategoryResponse, SearchQuery, SearchResponse,
};

impl From<SearchError> for ApiError {
    fn from(err: SearchError) -> Self {
        match err {
            SearchError::InvalidInput(msg) => Self::validation(msg),
            SearchError::Database(msg) => Self::DatabaseError(msg),
            SearchError::Internal(msg) => Self::internal(msg),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
    pub lat: Option<String>,
    pub lng: Option<String>,
    pub page: Option<u64>,
    pub page_size: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct CategoryParams {
    #[serde(default)]
    pub category: String,
    pub lat: Option<String>,
    pub lng: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SuggestionParams {
    #[serde(default)]
    pub q: String,
}

/// `GET /api/search?q=&lat=&lng=&page=&page_size=`
///
/// Businesses within the search radius matching `q`, nearest first.
pub async fn search(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Result<Json<ApiResponse<SearchResponse>>, ApiError> {
    let text = validate_search_text(&params.q)?;
    let (latitude, longitude) = validate_origin(params.lat.as_deref(), params.lng.as_deref())?;

    let query = SearchQuery {
        text: text.to_string(),
        latitude,
        longitude,
        page: params.page,
        page_size: params.page_size,
    };

    let response = state.search_service().search(&query).await?;
    Ok(Json(ApiResponse::success(response)))
}

/// `GET /api/search/category?category=&lat=&lng=`
pub async fn search_by_category(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CategoryParams>,
) -> Result<Json<ApiResponse<CategoryResponse>>, ApiError> {
    let (latitude, longitude) = validate_origin(params.lat.as_deref(), params.lng.as_deref())?;
    let response = state
        .search_service()
        .search_by_category(&params.category, latitude, longitude)
        .await?;
    Ok(Json(ApiResponse::success(response)))
}

/// `GET /api/search/keywords?q=`
pub async fn keyword_suggestions(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SuggestionParams>,
) -> Result<Json<ApiResponse<Vec<String>>>, ApiError> {
    let q = validate_suggestion_query(&params.q)?;
    let keywords = state.search_service().keyword_suggestions(q).await?;
    Ok(Json(ApiResponse::success(keywords)))
}

/// `GET /api/search/businesses?q=`
pub async fn business_suggestions(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SuggestionParams>,
) -> Result<Json<ApiResponse<Vec<BusinessSuggestion>>>, ApiError> {
    let q = validate_suggestion_query(&params.q)?;
    let businesses = state.search_service().business_suggestions(q).await?;
    Ok(Json(ApiResponse::success(businesses)))
}
