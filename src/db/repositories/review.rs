use crate::entities::{businesses, prelude::*, reviews, users};
use anyhow::Result;
use sea_orm::sea_query::{Expr, Func, SimpleExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct NewReview {
    pub business_id: i32,
    pub user_id: i32,
    pub content: String,
    pub rating: i32,
    pub aspects_json: String,
    pub image: Option<String>,
}

/// A review joined with the names an admin or visitor sees next to it.
#[derive(Debug, Clone)]
pub struct ReviewRow {
    pub review: reviews::Model,
    pub user_name: Option<String>,
    pub business_name: Option<String>,
}

pub struct ReviewRepository {
    conn: DatabaseConnection,
}

impl ReviewRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn insert(&self, review: NewReview) -> Result<i32> {
        let model = reviews::ActiveModel {
            business_id: Set(review.business_id),
            user_id: Set(review.user_id),
            content: Set(review.content),
            rating: Set(review.rating),
            aspects: Set(review.aspects_json),
            image: Set(review.image),
            is_verified: Set(false),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
            ..Default::default()
        };

        let result = Reviews::insert(model).exec(&self.conn).await?;
        Ok(result.last_insert_id)
    }

    pub async fn get(&self, id: i32) -> Result<Option<reviews::Model>> {
        Ok(Reviews::find_by_id(id).one(&self.conn).await?)
    }

    pub async fn count_created_since(&self, since: &str) -> Result<u64> {
        let count = Reviews::find()
            .filter(reviews::Column::CreatedAt.gte(since))
            .count(&self.conn)
            .await?;
        Ok(count)
    }

    /// Distinct businesses the user has reviewed.
    pub async fn business_ids_for_user(&self, user_id: i32) -> Result<Vec<i32>> {
        let mut ids: Vec<i32> = Reviews::find()
            .select_only()
            .column(reviews::Column::BusinessId)
            .filter(reviews::Column::UserId.eq(user_id))
            .into_tuple::<i32>()
            .all(&self.conn)
            .await?;
        ids.sort_unstable();
        ids.dedup();
        Ok(ids)
    }

    pub async fn set_verified(&self, id: i32, is_verified: bool) -> Result<bool> {
        let Some(existing) = Reviews::find_by_id(id).one(&self.conn).await? else {
            return Ok(false);
        };
        let mut active: reviews::ActiveModel = existing.into();
        active.is_verified = Set(is_verified);
        active.update(&self.conn).await?;
        Ok(true)
    }

    pub async fn delete(&self, id: i32) -> Result<bool> {
        let result = Reviews::delete_by_id(id).exec(&self.conn).await?;
        Ok(result.rows_affected > 0)
    }

    /// All reviews in the given moderation state, newest first.
    pub async fn list_by_verification(&self, is_verified: bool) -> Result<Vec<ReviewRow>> {
        let rows = Reviews::find()
            .filter(reviews::Column::IsVerified.eq(is_verified))
            .order_by_desc(reviews::Column::CreatedAt)
            .find_also_related(Users)
            .all(&self.conn)
            .await?;

        self.attach_business_names(rows).await
    }

    pub async fn list_for_business(
        &self,
        business_id: i32,
        verified_only: bool,
    ) -> Result<Vec<ReviewRow>> {
        let mut query = Reviews::find().filter(reviews::Column::BusinessId.eq(business_id));
        if verified_only {
            query = query.filter(reviews::Column::IsVerified.eq(true));
        }

        let rows = query
            .order_by_desc(reviews::Column::CreatedAt)
            .find_also_related(Users)
            .all(&self.conn)
            .await?;

        self.attach_business_names(rows).await
    }

    pub async fn list_by_user(&self, user_id: i32) -> Result<Vec<ReviewRow>> {
        let rows = Reviews::find()
            .filter(reviews::Column::UserId.eq(user_id))
            .order_by_desc(reviews::Column::CreatedAt)
            .find_also_related(Users)
            .all(&self.conn)
            .await?;

        self.attach_business_names(rows).await
    }

    async fn attach_business_names(
        &self,
        rows: Vec<(reviews::Model, Option<users::Model>)>,
    ) -> Result<Vec<ReviewRow>> {
        let mut ids: Vec<i32> = rows.iter().map(|(r, _)| r.business_id).collect();
        ids.sort_unstable();
        ids.dedup();

        let names: HashMap<i32, String> = Businesses::find()
            .select_only()
            .column(businesses::Column::Id)
            .column(businesses::Column::Name)
            .filter(businesses::Column::Id.is_in(ids))
            .into_tuple::<(i32, String)>()
            .all(&self.conn)
            .await?
            .into_iter()
            .collect();

        Ok(rows
            .into_iter()
            .map(|(review, user)| ReviewRow {
                business_name: names.get(&review.business_id).cloned(),
                user_name: user.map(|u| u.name),
                review,
            })
            .collect())
    }

    /// `(rating, created_at)` for every review of a business.
    pub async fn ratings_for_business(&self, business_id: i32) -> Result<Vec<(i32, String)>> {
        let rows = Reviews::find()
            .select_only()
            .column(reviews::Column::Rating)
            .column(reviews::Column::CreatedAt)
            .filter(reviews::Column::BusinessId.eq(business_id))
            .into_tuple::<(i32, String)>()
            .all(&self.conn)
            .await?;
        Ok(rows)
    }

    /// Mean verified rating per business.
    pub async fn average_ratings(&self, business_ids: &[i32]) -> Result<HashMap<i32, f64>> {
        if business_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = Reviews::find()
            .select_only()
            .column(reviews::Column::BusinessId)
            .column_as(
                SimpleExpr::from(Func::avg(Expr::col((Reviews, reviews::Column::Rating)))),
                "average",
            )
            .filter(reviews::Column::BusinessId.is_in(business_ids.iter().copied()))
            .filter(reviews::Column::IsVerified.eq(true))
            .group_by(reviews::Column::BusinessId)
            .into_tuple::<(i32, Option<f64>)>()
            .all(&self.conn)
            .await?;

        Ok(rows
            .into_iter()
            .filter_map(|(id, avg)| avg.map(|a| (id, a)))
            .collect())
    }
}
