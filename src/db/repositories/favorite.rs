use crate::entities::{businesses, favorites, prelude::*};
use anyhow::Result;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};

pub struct FavoriteRepository {
    conn: DatabaseConnection,
}

impl FavoriteRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Links user and business and bumps the business's count in one
    /// transaction. Returns `false` if the pair already existed.
    pub async fn add(&self, user_id: i32, business_id: i32) -> Result<bool> {
        let txn = self.conn.begin().await?;

        if Favorites::find_by_id((user_id, business_id))
            .one(&txn)
            .await?
            .is_some()
        {
            return Ok(false);
        }

        let model = favorites::ActiveModel {
            user_id: Set(user_id),
            business_id: Set(business_id),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
        };
        Favorites::insert(model).exec_without_returning(&txn).await?;

        Businesses::update_many()
            .col_expr(
                businesses::Column::FavoriteCount,
                Expr::col(businesses::Column::FavoriteCount).add(1),
            )
            .filter(businesses::Column::Id.eq(business_id))
            .exec(&txn)
            .await?;

        txn.commit().await?;
        Ok(true)
    }

    /// Inverse of [`Self::add`]. Returns `false` if the pair did not exist.
    pub async fn remove(&self, user_id: i32, business_id: i32) -> Result<bool> {
        let txn = self.conn.begin().await?;

        let result = Favorites::delete_by_id((user_id, business_id))
            .exec(&txn)
            .await?;
        if result.rows_affected == 0 {
            return Ok(false);
        }

        Businesses::update_many()
            .col_expr(
                businesses::Column::FavoriteCount,
                Expr::col(businesses::Column::FavoriteCount).sub(1),
            )
            .filter(businesses::Column::Id.eq(business_id))
            .filter(businesses::Column::FavoriteCount.gt(0))
            .exec(&txn)
            .await?;

        txn.commit().await?;
        Ok(true)
    }

    pub async fn list_for_user(&self, user_id: i32) -> Result<Vec<businesses::Model>> {
        let rows = Businesses::find()
            .inner_join(Favorites)
            .filter(favorites::Column::UserId.eq(user_id))
            .order_by_desc(favorites::Column::CreatedAt)
            .all(&self.conn)
            .await?;
        Ok(rows)
    }
}
