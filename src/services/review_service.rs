//! Domain service for customer reviews and their moderation queue.

use crate::db::ReviewRow;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

pub const MIN_RATING: i32 = 1;
pub const MAX_RATING: i32 = 5;

/// One rated aspect of a visit, e.g. "service" or "price".
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AspectRating {
    pub aspect: String,
    pub rating: i32,
}

/// Overall rating: the mean of the aspect ratings, rounded half up.
#[must_use]
pub fn overall_rating(aspects: &[AspectRating]) -> Option<i32> {
    if aspects.is_empty() {
        return None;
    }
    let sum: i32 = aspects.iter().map(|a| a.rating).sum();
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
    let mean = (f64::from(sum) / aspects.len() as f64).round() as i32;
    Some(mean)
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReviewDto {
    pub id: i32,
    pub business_id: i32,
    pub business_name: Option<String>,
    pub user_id: i32,
    pub user_name: Option<String>,
    pub content: String,
    pub rating: i32,
    pub aspects: Vec<AspectRating>,
    pub image: Option<String>,
    pub is_verified: bool,
    pub created_at: String,
}

impl From<ReviewRow> for ReviewDto {
    fn from(row: ReviewRow) -> Self {
        let review = row.review;
        let aspects = serde_json::from_str(&review.aspects).unwrap_or_else(|e| {
            warn!(review_id = review.id, error = %e, "Unreadable review aspects");
            Vec::new()
        });
        Self {
            id: review.id,
            business_id: review.business_id,
            business_name: row.business_name,
            user_id: review.user_id,
            user_name: row.user_name,
            content: review.content,
            rating: review.rating,
            aspects,
            image: review.image,
            is_verified: review.is_verified,
            created_at: review.created_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PostReviewRequest {
    pub business_id: i32,
    pub user_id: i32,
    pub content: String,
    pub aspects: Vec<AspectRating>,
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ModerationDecision {
    Approve,
    Delete,
}

#[derive(Debug, Error)]
pub enum ReviewError {
    #[error("Review not found: {0}")]
    NotFound(i32),

    #[error("Business not found: {0}")]
    BusinessNotFound(i32),

    #[error("User not found: {0}")]
    UserNotFound(i32),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for ReviewError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for ReviewError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

#[async_trait::async_trait]
pub trait ReviewService: Send + Sync {
    /// Stores an unverified review; it joins the moderation queue.
    async fn post(&self, request: PostReviewRequest) -> Result<ReviewDto, ReviewError>;

    async fn moderate(
        &self,
        review_id: i32,
        decision: ModerationDecision,
    ) -> Result<(), ReviewError>;

    /// Admin queue, newest first. Cached per verification state.
    async fn list_by_status(&self, verified: bool) -> Result<Vec<ReviewDto>, ReviewError>;

    /// Owner view of every review on one business, newest first.
    async fn business_reviews(&self, business_id: i32) -> Result<Vec<ReviewDto>, ReviewError>;

    async fn user_reviews(&self, user_id: i32) -> Result<Vec<ReviewDto>, ReviewError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn aspect(rating: i32) -> AspectRating {
        AspectRating {
            aspect: "service".to_string(),
            rating,
        }
    }

    #[test]
    fn test_overall_rating_rounds_half_up() {
        assert_eq!(overall_rating(&[aspect(4), aspect(5)]), Some(5));
        assert_eq!(overall_rating(&[aspect(3), aspect(4), aspect(4)]), Some(4));
        assert_eq!(overall_rating(&[aspect(1)]), Some(1));
    }

    #[test]
    fn test_overall_rating_empty() {
        assert_eq!(overall_rating(&[]), None);
    }
}
