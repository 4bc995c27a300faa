//! Domain service for business listings.
//!
//! Covers self-service registration and edits, the cached public detail
//! page, owner statistics and analytics, and the admin verification and
//! image-review workflows.

use crate::entities::businesses;
use crate::geo::GeoError;
use crate::services::review_service::ReviewDto;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

/// Decodes the stored JSON image list; a corrupt value reads as empty.
pub(crate) fn parse_image_urls(business_id: i32, raw: &str) -> Vec<String> {
    serde_json::from_str(raw).unwrap_or_else(|e| {
        warn!(business_id, error = %e, "Unreadable image list");
        Vec::new()
    })
}

/// The card shown in search results and lists.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BusinessSummary {
    pub id: i32,
    pub name: String,
    pub category: String,
    pub address: String,
    pub city: String,
    pub zipcode: String,
    pub image: Option<String>,
    pub is_open: bool,
    pub is_verified: bool,
    pub rating: Option<f64>,
    pub latitude: f64,
    pub longitude: f64,
}

impl BusinessSummary {
    #[must_use]
    pub fn from_model(model: &businesses::Model, rating: Option<f64>) -> Self {
        Self {
            id: model.id,
            name: model.name.clone(),
            category: model.category.clone(),
            address: model.address.clone(),
            city: model.city.clone(),
            zipcode: model.zipcode.clone(),
            image: parse_image_urls(model.id, &model.image_urls)
                .into_iter()
                .next(),
            is_open: model.is_open,
            is_verified: model.is_verified,
            rating,
            latitude: model.latitude,
            longitude: model.longitude,
        }
    }
}

/// Every stored column of a business.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BusinessRecord {
    pub id: i32,
    pub name: String,
    pub category: String,
    pub description: Option<String>,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zipcode: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub website: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub is_open: bool,
    pub is_verified: bool,
    pub is_image_updated: bool,
    pub image_urls: Vec<String>,
    pub favorite_count: i32,
    pub created_at: String,
    pub updated_at: String,
}

impl From<businesses::Model> for BusinessRecord {
    fn from(model: businesses::Model) -> Self {
        let image_urls = parse_image_urls(model.id, &model.image_urls);
        Self {
            id: model.id,
            name: model.name,
            category: model.category,
            description: model.description,
            address: model.address,
            city: model.city,
            state: model.state,
            zipcode: model.zipcode,
            phone: model.phone,
            email: model.email,
            website: model.website,
            latitude: model.latitude,
            longitude: model.longitude,
            is_open: model.is_open,
            is_verified: model.is_verified,
            is_image_updated: model.is_image_updated,
            image_urls,
            favorite_count: model.favorite_count,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// Public detail page: the record plus keywords and verified reviews.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BusinessDetail {
    #[serde(flatten)]
    pub business: BusinessRecord,
    pub keywords: Vec<String>,
    pub rating: Option<f64>,
    pub reviews: Vec<ReviewDto>,
}

/// Admin export row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BusinessExportRow {
    #[serde(flatten)]
    pub business: BusinessRecord,
    pub keywords: Vec<String>,
    pub total_views: i64,
}

/// Uncached owner dashboard numbers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BusinessStats {
    pub total_views: i64,
    pub review_count: usize,
    pub average_rating: f64,
    pub favorites: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DailyAnalytics {
    pub date: String,
    pub views: i64,
    pub average_rating: Option<f64>,
}

/// Views and ratings over the trailing seven days, oldest first.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BusinessAnalytics {
    pub business_id: i32,
    pub days: Vec<DailyAnalytics>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterBusinessRequest {
    pub name: String,
    pub category: String,
    #[serde(default)]
    pub description: Option<String>,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zipcode: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub image_urls: Vec<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UpdateBusinessRequest {
    pub name: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zipcode: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub website: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub keywords: Option<Vec<String>>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OpenState {
    Open,
    Close,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ImageAction {
    Add,
    Remove,
}

/// Admin decision on images uploaded since the last review.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ImageReview {
    Verify,
    Reject,
}

/// Errors specific to business operations.
#[derive(Debug, Error)]
pub enum BusinessError {
    #[error("Business not found: {0}")]
    NotFound(i32),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for BusinessError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for BusinessError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<GeoError> for BusinessError {
    fn from(err: GeoError) -> Self {
        Self::Validation(err.to_string())
    }
}

/// Domain service trait for businesses.
#[async_trait::async_trait]
pub trait BusinessService: Send + Sync {
    /// Registers a listing, creating any keywords it names.
    async fn register(
        &self,
        request: RegisterBusinessRequest,
    ) -> Result<BusinessRecord, BusinessError>;

    /// Public detail page. Served from `business:{id}`; every successful
    /// read adds one view for today.
    async fn get(&self, id: i32) -> Result<BusinessDetail, BusinessError>;

    async fn update(
        &self,
        id: i32,
        request: UpdateBusinessRequest,
    ) -> Result<BusinessRecord, BusinessError>;

    async fn set_open_state(
        &self,
        id: i32,
        state: OpenState,
    ) -> Result<BusinessRecord, BusinessError>;

    /// Adds or removes one image URL and flags the listing for image review.
    async fn update_image(
        &self,
        id: i32,
        action: ImageAction,
        url: &str,
    ) -> Result<Vec<String>, BusinessError>;

    async fn verify(&self, id: i32) -> Result<BusinessRecord, BusinessError>;

    async fn review_images(
        &self,
        id: i32,
        decision: ImageReview,
    ) -> Result<BusinessRecord, BusinessError>;

    /// Hard delete with reviews, views, favorites and keyword links.
    async fn delete(&self, id: i32) -> Result<(), BusinessError>;

    async fn stats(&self, id: i32) -> Result<BusinessStats, BusinessError>;

    async fn analytics(&self, id: i32) -> Result<BusinessAnalytics, BusinessError>;

    async fn list(&self) -> Result<Vec<BusinessRecord>, BusinessError>;

    async fn export(&self) -> Result<Vec<BusinessExportRow>, BusinessError>;

    async fn list_pending_images(&self) -> Result<Vec<BusinessRecord>, BusinessError>;
}
