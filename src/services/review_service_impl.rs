//! `SeaORM` implementation of the [`ReviewService`] trait.

use crate::cache::{Cache, CacheKey, Mutation};
use crate::db::{NewReview, Store};
use crate::services::review_service::{
    AspectRating, MAX_RATING, MIN_RATING, ModerationDecision, PostReviewRequest, ReviewDto,
    ReviewError, ReviewService, overall_rating,
};
use std::sync::Arc;
use tracing::info;

fn validate_aspects(aspects: &[AspectRating]) -> Result<i32, ReviewError> {
    for aspect in aspects {
        if aspect.aspect.trim().is_empty() {
            return Err(ReviewError::Validation(
                "aspect name is required".to_string(),
            ));
        }
        if !(MIN_RATING..=MAX_RATING).contains(&aspect.rating) {
            return Err(ReviewError::Validation(format!(
                "rating for {} must be between {MIN_RATING} and {MAX_RATING}",
                aspect.aspect
            )));
        }
    }

    overall_rating(aspects)
        .ok_or_else(|| ReviewError::Validation("at least one aspect rating is required".to_string()))
}

pub struct SeaOrmReviewService {
    store: Arc<Store>,
    cache: Cache,
}

impl SeaOrmReviewService {
    #[must_use]
    pub const fn new(store: Arc<Store>, cache: Cache) -> Self {
        Self { store, cache }
    }
}

#[async_trait::async_trait]
impl ReviewService for SeaOrmReviewService {
    async fn post(&self, request: PostReviewRequest) -> Result<ReviewDto, ReviewError> {
        let content = request.content.trim().to_string();
        if content.is_empty() {
            return Err(ReviewError::Validation("content is required".to_string()));
        }
        let rating = validate_aspects(&request.aspects)?;

        let business = self
            .store
            .get_business(request.business_id)
            .await?
            .ok_or(ReviewError::BusinessNotFound(request.business_id))?;
        let user = self
            .store
            .get_user(request.user_id)
            .await?
            .ok_or(ReviewError::UserNotFound(request.user_id))?;

        let aspects_json = serde_json::to_string(&request.aspects)
            .map_err(|e| ReviewError::Internal(e.to_string()))?;

        let id = self
            .store
            .add_review(NewReview {
                business_id: business.id,
                user_id: user.id,
                content,
                rating,
                aspects_json,
                image: request.image.filter(|i| !i.trim().is_empty()),
            })
            .await?;

        self.cache
            .apply(&Mutation::PostReview {
                business_id: business.id,
            })
            .await;

        let review = self
            .store
            .get_review(id)
            .await?
            .ok_or(ReviewError::NotFound(id))?;

        info!(review_id = id, business_id = business.id, "Review posted");
        Ok(ReviewDto::from(crate::db::ReviewRow {
            review,
            user_name: Some(user.name),
            business_name: Some(business.name),
        }))
    }

    async fn moderate(
        &self,
        review_id: i32,
        decision: ModerationDecision,
    ) -> Result<(), ReviewError> {
        let review = self
            .store
            .get_review(review_id)
            .await?
            .ok_or(ReviewError::NotFound(review_id))?;

        let (kind, verb) = match decision {
            ModerationDecision::Approve => {
                self.store.set_review_verified(review_id, true).await?;
                ("review_approved", "approved")
            }
            ModerationDecision::Delete => {
                self.store.delete_review(review_id).await?;
                ("review_deleted", "deleted")
            }
        };

        self.store
            .add_activity(
                kind,
                &format!("Review {review_id} on business {} was {verb}", review.business_id),
            )
            .await?;
        self.cache
            .apply(&Mutation::ModerateReview {
                business_id: review.business_id,
            })
            .await;

        info!(review_id, ?decision, "Review moderated");
        Ok(())
    }

    async fn list_by_status(&self, verified: bool) -> Result<Vec<ReviewDto>, ReviewError> {
        let key = if verified {
            CacheKey::VerifiedReviews
        } else {
            CacheKey::NonVerifiedReviews
        };

        self.cache
            .cached(key, || async {
                let rows = self.store.list_reviews_by_verification(verified).await?;
                Ok::<_, ReviewError>(rows.into_iter().map(ReviewDto::from).collect())
            })
            .await
    }

    async fn business_reviews(&self, business_id: i32) -> Result<Vec<ReviewDto>, ReviewError> {
        self.cache
            .cached(CacheKey::BusinessReviews(business_id), || async {
                if self.store.get_business(business_id).await?.is_none() {
                    return Err(ReviewError::BusinessNotFound(business_id));
                }
                let rows = self.store.list_business_reviews(business_id, false).await?;
                Ok(rows.into_iter().map(ReviewDto::from).collect())
            })
            .await
    }

    async fn user_reviews(&self, user_id: i32) -> Result<Vec<ReviewDto>, ReviewError> {
        if self.store.get_user(user_id).await?.is_none() {
            return Err(ReviewError::UserNotFound(user_id));
        }
        let rows = self.store.list_user_reviews(user_id).await?;
        Ok(rows.into_iter().map(ReviewDto::from).collect())
    }
}
