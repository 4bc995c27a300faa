use crate::db::repositories::keyword::connect_or_create;
use crate::db::repositories::{contains_pattern, fold};
use crate::entities::{
    business_keywords, businesses, favorites, keywords, prelude::*, reviews, view_interactions,
};
use crate::geo::BoundingBox;
use anyhow::{Context, Result};
use sea_orm::sea_query::{Expr, Query};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};

/// Fields accepted when a business registers.
#[derive(Debug, Clone)]
pub struct NewBusiness {
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
    pub image_urls: Vec<String>,
    pub keywords: Vec<String>,
}

/// Partial update; `None` leaves the column untouched.
#[derive(Debug, Clone, Default)]
pub struct BusinessChanges {
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
    /// Replaces the whole keyword set when present.
    pub keywords: Option<Vec<String>>,
}

pub struct BusinessRepository {
    conn: DatabaseConnection,
}

impl BusinessRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn insert(&self, business: NewBusiness) -> Result<i32> {
        let now = chrono::Utc::now().to_rfc3339();
        let image_urls = serde_json::to_string(&business.image_urls)?;

        let txn = self.conn.begin().await?;

        let model = businesses::ActiveModel {
            search_name: Set(fold(&business.name)),
            search_category: Set(fold(&business.category)),
            name: Set(business.name),
            category: Set(business.category),
            description: Set(business.description),
            address: Set(business.address),
            city: Set(business.city),
            state: Set(business.state),
            zipcode: Set(business.zipcode),
            phone: Set(business.phone),
            email: Set(business.email),
            website: Set(business.website),
            latitude: Set(business.latitude),
            longitude: Set(business.longitude),
            is_open: Set(true),
            is_verified: Set(false),
            is_image_updated: Set(false),
            image_urls: Set(image_urls),
            favorite_count: Set(0),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        let id = Businesses::insert(model).exec(&txn).await?.last_insert_id;

        let keyword_ids = connect_or_create(&txn, &business.keywords).await?;
        link_keywords(&txn, id, &keyword_ids).await?;

        txn.commit().await?;

        Ok(id)
    }

    pub async fn get(&self, id: i32) -> Result<Option<businesses::Model>> {
        let row = Businesses::find_by_id(id).one(&self.conn).await?;
        Ok(row)
    }

    /// Applies `changes` and bumps `updated_at`. Returns `false` if the
    /// business does not exist.
    pub async fn update(&self, id: i32, changes: BusinessChanges) -> Result<bool> {
        let txn = self.conn.begin().await?;

        let Some(existing) = Businesses::find_by_id(id).one(&txn).await? else {
            return Ok(false);
        };

        let mut active: businesses::ActiveModel = existing.into();
        if let Some(v) = changes.name {
            active.search_name = Set(fold(&v));
            active.name = Set(v);
        }
        if let Some(v) = changes.category {
            active.search_category = Set(fold(&v));
            active.category = Set(v);
        }
        if let Some(v) = changes.description {
            active.description = Set(Some(v));
        }
        if let Some(v) = changes.address {
            active.address = Set(v);
        }
        if let Some(v) = changes.city {
            active.city = Set(v);
        }
        if let Some(v) = changes.state {
            active.state = Set(v);
        }
        if let Some(v) = changes.zipcode {
            active.zipcode = Set(v);
        }
        if let Some(v) = changes.phone {
            active.phone = Set(Some(v));
        }
        if let Some(v) = changes.email {
            active.email = Set(Some(v));
        }
        if let Some(v) = changes.website {
            active.website = Set(Some(v));
        }
        if let Some(v) = changes.latitude {
            active.latitude = Set(v);
        }
        if let Some(v) = changes.longitude {
            active.longitude = Set(v);
        }
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());
        active.update(&txn).await?;

        if let Some(names) = changes.keywords {
            BusinessKeywords::delete_many()
                .filter(business_keywords::Column::BusinessId.eq(id))
                .exec(&txn)
                .await?;
            let keyword_ids = connect_or_create(&txn, &names).await?;
            link_keywords(&txn, id, &keyword_ids).await?;
        }

        txn.commit().await?;
        Ok(true)
    }

    pub async fn set_open(&self, id: i32, is_open: bool) -> Result<bool> {
        self.update_flags(id, |active| active.is_open = Set(is_open))
            .await
    }

    pub async fn set_verified(&self, id: i32, is_verified: bool) -> Result<bool> {
        self.update_flags(id, |active| active.is_verified = Set(is_verified))
            .await
    }

    pub async fn set_image_updated(&self, id: i32, is_image_updated: bool) -> Result<bool> {
        self.update_flags(id, |active| {
            active.is_image_updated = Set(is_image_updated);
        })
        .await
    }

    pub async fn set_images(&self, id: i32, urls: &[String], is_image_updated: bool) -> Result<bool> {
        let image_urls = serde_json::to_string(urls)?;
        self.update_flags(id, |active| {
            active.image_urls = Set(image_urls);
            active.is_image_updated = Set(is_image_updated);
        })
        .await
    }

    async fn update_flags<F>(&self, id: i32, apply: F) -> Result<bool>
    where
        F: FnOnce(&mut businesses::ActiveModel),
    {
        let Some(existing) = Businesses::find_by_id(id).one(&self.conn).await? else {
            return Ok(false);
        };

        let mut active: businesses::ActiveModel = existing.into();
        apply(&mut active);
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());
        active.update(&self.conn).await?;

        Ok(true)
    }

    /// Removes the business and everything hanging off it in one transaction.
    pub async fn delete(&self, id: i32) -> Result<bool> {
        let txn = self.conn.begin().await?;

        Reviews::delete_many()
            .filter(reviews::Column::BusinessId.eq(id))
            .exec(&txn)
            .await?;
        ViewInteractions::delete_many()
            .filter(view_interactions::Column::BusinessId.eq(id))
            .exec(&txn)
            .await?;
        Favorites::delete_many()
            .filter(favorites::Column::BusinessId.eq(id))
            .exec(&txn)
            .await?;
        BusinessKeywords::delete_many()
            .filter(business_keywords::Column::BusinessId.eq(id))
            .exec(&txn)
            .await?;
        let result = Businesses::delete_by_id(id).exec(&txn).await?;

        txn.commit().await?;
        Ok(result.rows_affected > 0)
    }

    /// Candidates inside `bbox` whose name, category or any keyword contains
    /// `text` as a literal, case-insensitive substring. An empty `text`
    /// matches everything in the box.
    pub async fn find_in_box(&self, bbox: &BoundingBox, text: &str) -> Result<Vec<businesses::Model>> {
        let mut query = Businesses::find()
            .filter(businesses::Column::Latitude.between(bbox.min_latitude, bbox.max_latitude))
            .filter(businesses::Column::Longitude.between(bbox.min_longitude, bbox.max_longitude));

        if !text.is_empty() {
            let keyword_match = Query::select()
                .column((BusinessKeywords, business_keywords::Column::BusinessId))
                .from(BusinessKeywords)
                .inner_join(
                    Keywords,
                    Expr::col((Keywords, keywords::Column::Id))
                        .equals((BusinessKeywords, business_keywords::Column::KeywordId)),
                )
                .and_where(
                    Expr::col((Keywords, keywords::Column::SearchName)).like(contains_pattern(text)),
                )
                .to_owned();

            query = query.filter(
                Condition::any()
                    .add(
                        Expr::col((Businesses, businesses::Column::SearchName))
                            .like(contains_pattern(text)),
                    )
                    .add(
                        Expr::col((Businesses, businesses::Column::SearchCategory))
                            .like(contains_pattern(text)),
                    )
                    .add(businesses::Column::Id.in_subquery(keyword_match)),
            );
        }

        query
            .all(&self.conn)
            .await
            .context("Failed to query businesses in bounding box")
    }

    /// Businesses whose category equals `category` ignoring case, optionally
    /// limited to `bbox`. An empty category matches all.
    pub async fn find_by_category(
        &self,
        category: &str,
        bbox: Option<&BoundingBox>,
    ) -> Result<Vec<businesses::Model>> {
        let mut query = Businesses::find();

        if !category.is_empty() {
            query = query.filter(businesses::Column::SearchCategory.eq(fold(category)));
        }

        if let Some(bbox) = bbox {
            query = query
                .filter(businesses::Column::Latitude.between(bbox.min_latitude, bbox.max_latitude))
                .filter(
                    businesses::Column::Longitude.between(bbox.min_longitude, bbox.max_longitude),
                );
        }

        query
            .all(&self.conn)
            .await
            .context("Failed to query businesses by category")
    }

    pub async fn suggest_by_name(&self, text: &str, limit: u64) -> Result<Vec<businesses::Model>> {
        let rows = Businesses::find()
            .filter(
                Expr::col((Businesses, businesses::Column::SearchName))
                    .like(contains_pattern(text)),
            )
            .order_by_asc(businesses::Column::Name)
            .limit(limit)
            .all(&self.conn)
            .await?;
        Ok(rows)
    }

    pub async fn list(&self) -> Result<Vec<businesses::Model>> {
        let rows = Businesses::find()
            .order_by_desc(businesses::Column::CreatedAt)
            .all(&self.conn)
            .await?;
        Ok(rows)
    }

    /// Businesses with images waiting for admin review.
    pub async fn list_image_updated(&self) -> Result<Vec<businesses::Model>> {
        let rows = Businesses::find()
            .filter(businesses::Column::IsImageUpdated.eq(true))
            .order_by_desc(businesses::Column::UpdatedAt)
            .all(&self.conn)
            .await?;
        Ok(rows)
    }

    pub async fn names_for(&self, ids: &[i32]) -> Result<Vec<(i32, String)>> {
        let rows = Businesses::find()
            .select_only()
            .column(businesses::Column::Id)
            .column(businesses::Column::Name)
            .filter(businesses::Column::Id.is_in(ids.iter().copied()))
            .into_tuple::<(i32, String)>()
            .all(&self.conn)
            .await?;
        Ok(rows)
    }

    pub async fn count_created_since(&self, since: &str) -> Result<u64> {
        let count = Businesses::find()
            .filter(businesses::Column::CreatedAt.gte(since))
            .count(&self.conn)
            .await?;
        Ok(count)
    }

    pub async fn created_timestamps(&self) -> Result<Vec<String>> {
        let rows = Businesses::find()
            .select_only()
            .column(businesses::Column::CreatedAt)
            .into_tuple::<String>()
            .all(&self.conn)
            .await?;
        Ok(rows)
    }
}

async fn link_keywords<C: ConnectionTrait>(conn: &C, business_id: i32, keyword_ids: &[i32]) -> Result<()> {
    if keyword_ids.is_empty() {
        return Ok(());
    }

    let links = keyword_ids
        .iter()
        .map(|keyword_id| business_keywords::ActiveModel {
            business_id: Set(business_id),
            keyword_id: Set(*keyword_id),
        });

    BusinessKeywords::insert_many(links)
        .exec_without_returning(conn)
        .await?;

    Ok(())
}
