//! Geo-bounded business search.
//!
//! A search validates the origin, bumps the item and location counters,
//! pulls candidates inside a bounding box from the database, then computes
//! exact great-circle distances and keeps the ones within the radius.

use crate::cache::{Cache, Mutation};
use crate::config::SearchConfig;
use crate::db::Store;
use crate::entities::businesses;
use crate::geo::{BoundingBox, Coordinate, GeoError, LocationBucket};
use crate::services::business_service::BusinessSummary;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<GeoError> for SearchError {
    fn from(err: GeoError) -> Self {
        Self::InvalidInput(err.to_string())
    }
}

impl From<sea_orm::DbErr> for SearchError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for SearchError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub text: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub page: Option<u64>,
    #[serde(default)]
    pub page_size: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchHit {
    #[serde(flatten)]
    pub business: BusinessSummary,
    /// Miles from the search origin, rounded to 2 decimals.
    pub distance: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchResponse {
    /// Every match within the radius, across all pages.
    pub total: usize,
    pub page: u64,
    pub page_size: u64,
    pub results: Vec<SearchHit>,
    pub matching_keywords: Vec<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Placement {
    /// Within the search radius.
    Nearby,
    /// Global most-viewed, returned because nothing was nearby.
    Fallback,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategoryHit {
    #[serde(flatten)]
    pub business: BusinessSummary,
    pub distance: Option<f64>,
    pub total_views: i64,
    pub placement: Placement,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategoryResponse {
    pub fallback: bool,
    pub results: Vec<CategoryHit>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BusinessSuggestion {
    pub id: i32,
    pub name: String,
    pub zipcode: String,
}

pub struct SearchService {
    store: Arc<Store>,
    config: SearchConfig,
    cache: Cache,
}

impl SearchService {
    #[must_use]
    pub const fn new(store: Arc<Store>, config: SearchConfig, cache: Cache) -> Self {
        Self {
            store,
            config,
            cache,
        }
    }

    fn page_window(&self, page: Option<u64>, page_size: Option<u64>) -> Result<(u64, u64), SearchError> {
        let page = page.unwrap_or(1);
        if page == 0 {
            return Err(SearchError::InvalidInput("page starts at 1".to_string()));
        }
        let page_size = page_size
            .unwrap_or(self.config.default_page_size)
            .clamp(1, self.config.max_page_size.max(1));
        Ok((page, page_size))
    }

    /// Candidates inside the window paired with their distance, nearest first.
    fn within_radius(
        &self,
        origin: Coordinate,
        candidates: Vec<businesses::Model>,
    ) -> Vec<(businesses::Model, f64)> {
        let mut hits: Vec<_> = candidates
            .into_iter()
            .map(|b| {
                let point = Coordinate {
                    latitude: b.latitude,
                    longitude: b.longitude,
                };
                let distance = origin.miles_to(&point);
                (b, distance)
            })
            .filter(|(_, distance)| *distance <= self.config.radius_miles)
            .collect();

        hits.sort_by(|a, b| {
            a.1.partial_cmp(&b.1)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.0.id.cmp(&b.0.id))
        });
        hits
    }

    /// Text search around a point.
    ///
    /// Invalid coordinates or paging are rejected before any counter moves.
    /// An empty `text` matches every business in range.
    pub async fn search(&self, query: &SearchQuery) -> Result<SearchResponse, SearchError> {
        let origin = Coordinate::new(query.latitude, query.longitude)?;
        let (page, page_size) = self.page_window(query.page, query.page_size)?;
        let text = query.text.trim();

        self.store
            .record_search(text, LocationBucket::from_coordinate(origin))
            .await?;
        self.cache.apply(&Mutation::RecordSearch).await;
        metrics::counter!("searches_total").increment(1);

        let bbox = BoundingBox::around(origin, self.config.radius_miles);
        let candidates = self.store.find_businesses_in_box(&bbox, text).await?;
        let candidate_count = candidates.len();
        let hits = self.within_radius(origin, candidates);
        let total = hits.len();

        let offset = usize::try_from((page - 1).saturating_mul(page_size)).unwrap_or(usize::MAX);
        let take = usize::try_from(page_size).unwrap_or(usize::MAX);
        let page_hits: Vec<_> = hits.into_iter().skip(offset).take(take).collect();

        let ids: Vec<i32> = page_hits.iter().map(|(b, _)| b.id).collect();
        let ratings = self.store.average_ratings(&ids).await?;

        let tokens: Vec<&str> = text.split_whitespace().collect();
        let matching_keywords = self
            .store
            .keywords_matching_any(&tokens, self.config.suggestion_limit)
            .await?;

        debug!(
            text,
            candidates = candidate_count,
            total,
            "Search window evaluated"
        );

        Ok(SearchResponse {
            total,
            page,
            page_size,
            results: page_hits
                .into_iter()
                .map(|(business, distance)| SearchHit {
                    business: BusinessSummary::from_model(&business, ratings.get(&business.id).copied()),
                    distance,
                })
                .collect(),
            matching_keywords,
        })
    }

    /// Most-viewed businesses of a category near a point.
    ///
    /// When nothing in the category lies within the radius, the globally
    /// most-viewed businesses of the category are returned instead, tagged
    /// [`Placement::Fallback`] and without a distance. An empty category
    /// matches every business.
    pub async fn search_by_category(
        &self,
        category: &str,
        latitude: f64,
        longitude: f64,
    ) -> Result<CategoryResponse, SearchError> {
        let origin = Coordinate::new(latitude, longitude)?;
        let category = category.trim();
        let limit = usize::try_from(self.config.category_limit).unwrap_or(usize::MAX);

        let bbox = BoundingBox::around(origin, self.config.radius_miles);
        let nearby = self
            .within_radius(
                origin,
                self.store
                    .find_businesses_by_category(category, Some(&bbox))
                    .await?,
            );

        if !nearby.is_empty() {
            let ids: Vec<i32> = nearby.iter().map(|(b, _)| b.id).collect();
            let views = self.store.total_views_for(&ids).await?;

            let mut ranked: Vec<_> = nearby
                .into_iter()
                .map(|(b, d)| {
                    let total = views.get(&b.id).copied().unwrap_or(0);
                    (b, Some(d), total)
                })
                .collect();
            // Already nearest first; the stable sort keeps that as tiebreak.
            ranked.sort_by(|a, b| b.2.cmp(&a.2));
            ranked.truncate(limit);

            return self.category_response(ranked, Placement::Nearby).await;
        }

        let all = self.store.find_businesses_by_category(category, None).await?;
        let ids: Vec<i32> = all.iter().map(|b| b.id).collect();
        let views = self.store.total_views_for(&ids).await?;

        let mut ranked: Vec<_> = all
            .into_iter()
            .map(|b| {
                let total = views.get(&b.id).copied().unwrap_or(0);
                (b, None, total)
            })
            .collect();
        ranked.sort_by(|a, b| b.2.cmp(&a.2).then_with(|| a.0.id.cmp(&b.0.id)));
        ranked.truncate(limit);

        info!(
            category,
            latitude, longitude, "No nearby businesses in category, using global fallback"
        );
        self.category_response(ranked, Placement::Fallback).await
    }

    async fn category_response(
        &self,
        ranked: Vec<(businesses::Model, Option<f64>, i64)>,
        placement: Placement,
    ) -> Result<CategoryResponse, SearchError> {
        let ids: Vec<i32> = ranked.iter().map(|(b, _, _)| b.id).collect();
        let ratings: HashMap<i32, f64> = self.store.average_ratings(&ids).await?;

        Ok(CategoryResponse {
            fallback: placement == Placement::Fallback,
            results: ranked
                .into_iter()
                .map(|(business, distance, total_views)| CategoryHit {
                    business: BusinessSummary::from_model(&business, ratings.get(&business.id).copied()),
                    distance,
                    total_views,
                    placement,
                })
                .collect(),
        })
    }

    /// Keyword names containing `text`, alphabetical.
    pub async fn keyword_suggestions(&self, text: &str) -> Result<Vec<String>, SearchError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(SearchError::InvalidInput("query is required".to_string()));
        }
        Ok(self
            .store
            .suggest_keywords(text, self.config.suggestion_limit)
            .await?)
    }

    pub async fn business_suggestions(
        &self,
        text: &str,
    ) -> Result<Vec<BusinessSuggestion>, SearchError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(SearchError::InvalidInput("query is required".to_string()));
        }
        let rows = self
            .store
            .suggest_businesses(text, self.config.suggestion_limit)
            .await?;
        Ok(rows
            .into_iter()
            .map(|b| BusinessSuggestion {
                id: b.id,
                name: b.name,
                zipcode: b.zipcode,
            })
            .collect())
    }
}
