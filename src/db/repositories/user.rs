use crate::entities::{businesses, favorites, prelude::*, reviews, users};
use anyhow::Result;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};

/// What a user deletion touched, so callers can drop dependent views.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeletedUser {
    pub reviewed_business_ids: Vec<i32>,
    pub favorited_business_ids: Vec<i32>,
}

/// Profile fields to overwrite; `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub occupation: Option<String>,
    pub avatar: Option<String>,
}

pub struct UserRepository {
    conn: DatabaseConnection,
}

impl UserRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn insert(&self, name: &str, email: &str) -> Result<i32> {
        let model = users::ActiveModel {
            name: Set(name.to_string()),
            email: Set(email.to_string()),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
            ..Default::default()
        };

        let result = Users::insert(model).exec(&self.conn).await?;
        Ok(result.last_insert_id)
    }

    pub async fn get(&self, id: i32) -> Result<Option<users::Model>> {
        Ok(Users::find_by_id(id).one(&self.conn).await?)
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<users::Model>> {
        let user = Users::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.conn)
            .await?;
        Ok(user)
    }

    pub async fn list(&self) -> Result<Vec<users::Model>> {
        let rows = Users::find()
            .order_by_desc(users::Column::CreatedAt)
            .all(&self.conn)
            .await?;
        Ok(rows)
    }

    /// Returns `false` if the user does not exist.
    pub async fn update(&self, id: i32, changes: UserChanges) -> Result<bool> {
        let Some(existing) = Users::find_by_id(id).one(&self.conn).await? else {
            return Ok(false);
        };

        let mut active: users::ActiveModel = existing.into();
        if let Some(v) = changes.name {
            active.name = Set(v);
        }
        if let Some(v) = changes.email {
            active.email = Set(v);
        }
        if let Some(v) = changes.phone {
            active.phone = Set(Some(v));
        }
        if let Some(v) = changes.occupation {
            active.occupation = Set(Some(v));
        }
        if let Some(v) = changes.avatar {
            active.avatar = Set(Some(v));
        }
        active.update(&self.conn).await?;

        Ok(true)
    }

    pub async fn count_created_since(&self, since: &str) -> Result<u64> {
        let count = Users::find()
            .filter(users::Column::CreatedAt.gte(since))
            .count(&self.conn)
            .await?;
        Ok(count)
    }

    pub async fn created_timestamps(&self) -> Result<Vec<String>> {
        let rows = Users::find()
            .select_only()
            .column(users::Column::CreatedAt)
            .into_tuple::<String>()
            .all(&self.conn)
            .await?;
        Ok(rows)
    }

    /// Deletes the user with their reviews and favorites, keeping the
    /// businesses' favorite counts in step. `None` if no such user.
    pub async fn delete(&self, id: i32) -> Result<Option<DeletedUser>> {
        let txn = self.conn.begin().await?;

        if Users::find_by_id(id).one(&txn).await?.is_none() {
            return Ok(None);
        }

        let mut reviewed_business_ids: Vec<i32> = Reviews::find()
            .select_only()
            .column(reviews::Column::BusinessId)
            .filter(reviews::Column::UserId.eq(id))
            .into_tuple::<i32>()
            .all(&txn)
            .await?;
        reviewed_business_ids.sort_unstable();
        reviewed_business_ids.dedup();

        let favorited_business_ids: Vec<i32> = Favorites::find()
            .select_only()
            .column(favorites::Column::BusinessId)
            .filter(favorites::Column::UserId.eq(id))
            .into_tuple::<i32>()
            .all(&txn)
            .await?;

        if !favorited_business_ids.is_empty() {
            Businesses::update_many()
                .col_expr(
                    businesses::Column::FavoriteCount,
                    Expr::col(businesses::Column::FavoriteCount).sub(1),
                )
                .filter(businesses::Column::Id.is_in(favorited_business_ids.iter().copied()))
                .filter(businesses::Column::FavoriteCount.gt(0))
                .exec(&txn)
                .await?;
        }

        Reviews::delete_many()
            .filter(reviews::Column::UserId.eq(id))
            .exec(&txn)
            .await?;
        Favorites::delete_many()
            .filter(favorites::Column::UserId.eq(id))
            .exec(&txn)
            .await?;
        Users::delete_by_id(id).exec(&txn).await?;

        txn.commit().await?;

        Ok(Some(DeletedUser {
            reviewed_business_ids,
            favorited_business_ids,
        }))
    }
}
