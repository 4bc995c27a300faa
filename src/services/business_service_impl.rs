//! `SeaORM` implementation of the [`BusinessService`] trait.

use crate::cache::{Cache, CacheKey, Mutation};
use crate::db::{BusinessChanges, NewBusiness, Store};
use crate::entities::businesses;
use crate::geo::{Coordinate, round2};
use crate::services::business_service::{
    BusinessAnalytics, BusinessDetail, BusinessError, BusinessExportRow, BusinessRecord,
    BusinessService, BusinessStats, DailyAnalytics, ImageAction, ImageReview, OpenState,
    RegisterBusinessRequest, UpdateBusinessRequest, parse_image_urls,
};
use crate::services::review_service::ReviewDto;
use chrono::{Days, Utc};
use std::sync::Arc;
use tracing::info;

const ANALYTICS_DAYS: u64 = 7;

fn today() -> String {
    Utc::now().format("%Y-%m-%d").to_string()
}

fn required(field: &str, value: &str) -> Result<String, BusinessError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(BusinessError::Validation(format!("{field} is required")));
    }
    Ok(value.to_string())
}

fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn clean_list(keywords: Vec<String>) -> Vec<String> {
    keywords
        .into_iter()
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty())
        .collect()
}

fn mean(ratings: impl Iterator<Item = i32>) -> Option<f64> {
    let (sum, count) = ratings.fold((0_i64, 0_u32), |(s, c), r| (s + i64::from(r), c + 1));
    if count == 0 {
        return None;
    }
    #[allow(clippy::cast_precision_loss)]
    let avg = sum as f64 / f64::from(count);
    Some(round2(avg))
}

pub struct SeaOrmBusinessService {
    store: Arc<Store>,
    cache: Cache,
}

impl SeaOrmBusinessService {
    #[must_use]
    pub const fn new(store: Arc<Store>, cache: Cache) -> Self {
        Self { store, cache }
    }

    async fn require_business(&self, id: i32) -> Result<businesses::Model, BusinessError> {
        self.store
            .get_business(id)
            .await?
            .ok_or(BusinessError::NotFound(id))
    }

    async fn load_detail(&self, id: i32) -> Result<BusinessDetail, BusinessError> {
        let business = self.require_business(id).await?;
        let ids = [id];

        let (keywords, reviews, ratings) = tokio::join!(
            self.store.keywords_for_business(id),
            self.store.list_business_reviews(id, true),
            self.store.average_ratings(&ids),
        );

        Ok(BusinessDetail {
            business: business.into(),
            keywords: keywords?,
            rating: ratings?.get(&id).copied().map(round2),
            reviews: reviews?.into_iter().map(ReviewDto::from).collect(),
        })
    }

    async fn load_analytics(&self, id: i32) -> Result<BusinessAnalytics, BusinessError> {
        self.require_business(id).await?;

        let today = Utc::now().date_naive();
        let first = today
            .checked_sub_days(Days::new(ANALYTICS_DAYS - 1))
            .unwrap_or(today);
        let since = first.format("%Y-%m-%d").to_string();

        let views = self.store.business_views_since(id, &since).await?;
        let ratings = self.store.business_ratings(id).await?;

        let days = first
            .iter_days()
            .take_while(|d| *d <= today)
            .map(|day| {
                let date = day.format("%Y-%m-%d").to_string();
                let views = views
                    .iter()
                    .find(|(d, _)| *d == date)
                    .map_or(0, |(_, v)| *v);
                let average_rating = mean(
                    ratings
                        .iter()
                        .filter(|(_, created_at)| created_at.starts_with(&date))
                        .map(|(rating, _)| *rating),
                );
                DailyAnalytics {
                    date,
                    views,
                    average_rating,
                }
            })
            .collect();

        Ok(BusinessAnalytics {
            business_id: id,
            days,
        })
    }
}

#[async_trait::async_trait]
impl BusinessService for SeaOrmBusinessService {
    async fn register(
        &self,
        request: RegisterBusinessRequest,
    ) -> Result<BusinessRecord, BusinessError> {
        let location = Coordinate::new(request.latitude, request.longitude)?;

        let business = NewBusiness {
            name: required("name", &request.name)?,
            category: required("category", &request.category)?,
            description: optional(request.description),
            address: required("address", &request.address)?,
            city: required("city", &request.city)?,
            state: required("state", &request.state)?,
            zipcode: required("zipcode", &request.zipcode)?,
            phone: optional(request.phone),
            email: optional(request.email),
            website: optional(request.website),
            latitude: location.latitude,
            longitude: location.longitude,
            image_urls: clean_list(request.image_urls),
            keywords: clean_list(request.keywords),
        };

        let id = self.store.add_business(business).await?;
        self.cache.apply(&Mutation::RegisterBusiness).await;

        info!(business_id = id, "Business registered");
        Ok(self.require_business(id).await?.into())
    }

    async fn get(&self, id: i32) -> Result<BusinessDetail, BusinessError> {
        let detail = self
            .cache
            .cached(CacheKey::Business(id), || self.load_detail(id))
            .await?;

        self.store.record_view(id, &today()).await?;
        self.cache
            .apply(&Mutation::RecordView { business_id: id })
            .await;

        Ok(detail)
    }

    async fn update(
        &self,
        id: i32,
        request: UpdateBusinessRequest,
    ) -> Result<BusinessRecord, BusinessError> {
        let current = self.require_business(id).await?;

        let latitude = request.latitude.unwrap_or(current.latitude);
        let longitude = request.longitude.unwrap_or(current.longitude);
        if request.latitude.is_some() || request.longitude.is_some() {
            Coordinate::new(latitude, longitude)?;
        }

        let changes = BusinessChanges {
            name: request.name.as_deref().map(|v| required("name", v)).transpose()?,
            category: request
                .category
                .as_deref()
                .map(|v| required("category", v))
                .transpose()?,
            description: request.description,
            address: request
                .address
                .as_deref()
                .map(|v| required("address", v))
                .transpose()?,
            city: request.city.as_deref().map(|v| required("city", v)).transpose()?,
            state: request
                .state
                .as_deref()
                .map(|v| required("state", v))
                .transpose()?,
            zipcode: request
                .zipcode
                .as_deref()
                .map(|v| required("zipcode", v))
                .transpose()?,
            phone: request.phone,
            email: request.email,
            website: request.website,
            latitude: request.latitude,
            longitude: request.longitude,
            keywords: request.keywords.map(clean_list),
        };

        if !self.store.update_business(id, changes).await? {
            return Err(BusinessError::NotFound(id));
        }
        self.cache
            .apply(&Mutation::EditBusiness { business_id: id })
            .await;

        Ok(self.require_business(id).await?.into())
    }

    async fn set_open_state(
        &self,
        id: i32,
        state: OpenState,
    ) -> Result<BusinessRecord, BusinessError> {
        if !self
            .store
            .set_business_open(id, state == OpenState::Open)
            .await?
        {
            return Err(BusinessError::NotFound(id));
        }
        self.cache
            .apply(&Mutation::ToggleBusinessOpen { business_id: id })
            .await;

        Ok(self.require_business(id).await?.into())
    }

    async fn update_image(
        &self,
        id: i32,
        action: ImageAction,
        url: &str,
    ) -> Result<Vec<String>, BusinessError> {
        let url = url.trim();
        if url.is_empty() {
            return Err(BusinessError::Validation("image url is required".to_string()));
        }

        let business = self.require_business(id).await?;
        let mut urls = parse_image_urls(id, &business.image_urls);
        match action {
            ImageAction::Add => {
                if !urls.iter().any(|u| u == url) {
                    urls.push(url.to_string());
                }
            }
            ImageAction::Remove => urls.retain(|u| u != url),
        }

        self.store.set_business_images(id, &urls, true).await?;
        self.cache
            .apply(&Mutation::UpdateBusinessImage { business_id: id })
            .await;

        Ok(urls)
    }

    async fn verify(&self, id: i32) -> Result<BusinessRecord, BusinessError> {
        let business = self.require_business(id).await?;
        self.store.set_business_verified(id, true).await?;
        self.store
            .add_activity(
                "business_verified",
                &format!("Business \"{}\" was verified", business.name),
            )
            .await?;
        self.cache
            .apply(&Mutation::VerifyBusiness { business_id: id })
            .await;

        info!(business_id = id, "Business verified");
        Ok(self.require_business(id).await?.into())
    }

    async fn review_images(
        &self,
        id: i32,
        decision: ImageReview,
    ) -> Result<BusinessRecord, BusinessError> {
        let business = self.require_business(id).await?;

        let message = match decision {
            ImageReview::Verify => {
                self.store.set_business_image_updated(id, false).await?;
                format!("Images of \"{}\" were approved", business.name)
            }
            ImageReview::Reject => {
                self.store.set_business_images(id, &[], false).await?;
                format!("Images of \"{}\" were rejected", business.name)
            }
        };
        self.store.add_activity("image_review", &message).await?;
        self.cache
            .apply(&Mutation::ReviewBusinessImage { business_id: id })
            .await;

        Ok(self.require_business(id).await?.into())
    }

    async fn delete(&self, id: i32) -> Result<(), BusinessError> {
        let business = self.require_business(id).await?;
        if !self.store.delete_business(id).await? {
            return Err(BusinessError::NotFound(id));
        }
        self.store
            .add_activity(
                "business_deleted",
                &format!("Business \"{}\" was deleted", business.name),
            )
            .await?;
        self.cache
            .apply(&Mutation::DeleteBusiness { business_id: id })
            .await;

        info!(business_id = id, "Business deleted");
        Ok(())
    }

    async fn stats(&self, id: i32) -> Result<BusinessStats, BusinessError> {
        let business = self.require_business(id).await?;
        let total_views = self.store.total_views(id).await?;
        let ratings = self.store.business_ratings(id).await?;

        Ok(BusinessStats {
            total_views,
            review_count: ratings.len(),
            average_rating: mean(ratings.iter().map(|(r, _)| *r)).unwrap_or(0.0),
            favorites: business.favorite_count,
        })
    }

    async fn analytics(&self, id: i32) -> Result<BusinessAnalytics, BusinessError> {
        self.cache
            .cached(CacheKey::BusinessAnalytics(id), || self.load_analytics(id))
            .await
    }

    async fn list(&self) -> Result<Vec<BusinessRecord>, BusinessError> {
        self.cache
            .cached(CacheKey::ListBusinesses, || async {
                let rows = self.store.list_businesses().await?;
                Ok::<_, BusinessError>(rows.into_iter().map(BusinessRecord::from).collect())
            })
            .await
    }

    async fn export(&self) -> Result<Vec<BusinessExportRow>, BusinessError> {
        self.cache
            .cached(CacheKey::ExportBusinesses, || async {
                let rows = self.store.list_businesses().await?;
                let ids: Vec<i32> = rows.iter().map(|b| b.id).collect();
                let views = self.store.total_views_for(&ids).await?;

                let mut export = Vec::with_capacity(rows.len());
                for row in rows {
                    let keywords = self.store.keywords_for_business(row.id).await?;
                    let total_views = views.get(&row.id).copied().unwrap_or(0);
                    export.push(BusinessExportRow {
                        business: row.into(),
                        keywords,
                        total_views,
                    });
                }
                Ok::<_, BusinessError>(export)
            })
            .await
    }

    async fn list_pending_images(&self) -> Result<Vec<BusinessRecord>, BusinessError> {
        self.cache
            .cached(CacheKey::ImageBusinesses, || async {
                let rows = self.store.list_image_updated_businesses().await?;
                Ok::<_, BusinessError>(rows.into_iter().map(BusinessRecord::from).collect())
            })
            .await
    }
}
