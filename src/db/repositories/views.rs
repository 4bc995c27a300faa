use crate::entities::{prelude::*, view_interactions};
use anyhow::Result;
use sea_orm::sea_query::{Expr, Func, OnConflict, SimpleExpr};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use std::collections::HashMap;

fn total_views() -> SimpleExpr {
    SimpleExpr::from(Func::sum(Expr::col((
        ViewInteractions,
        view_interactions::Column::Views,
    ))))
}

pub struct ViewRepository {
    conn: DatabaseConnection,
}

impl ViewRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Atomically adds one view to the (business, day) row.
    pub async fn record(&self, business_id: i32, date: &str) -> Result<()> {
        let model = view_interactions::ActiveModel {
            business_id: Set(business_id),
            date: Set(date.to_string()),
            views: Set(1),
            ..Default::default()
        };

        ViewInteractions::insert(model)
            .on_conflict(
                OnConflict::columns([
                    view_interactions::Column::BusinessId,
                    view_interactions::Column::Date,
                ])
                .value(
                    view_interactions::Column::Views,
                    Expr::col((ViewInteractions, view_interactions::Column::Views)).add(1),
                )
                .to_owned(),
            )
            .exec_without_returning(&self.conn)
            .await?;

        Ok(())
    }

    pub async fn total_for(&self, business_id: i32) -> Result<i64> {
        let total = ViewInteractions::find()
            .select_only()
            .column_as(total_views(), "total")
            .filter(view_interactions::Column::BusinessId.eq(business_id))
            .into_tuple::<Option<i64>>()
            .one(&self.conn)
            .await?
            .flatten()
            .unwrap_or(0);
        Ok(total)
    }

    /// Cumulative views per business; businesses without views are absent.
    pub async fn totals_for(&self, business_ids: &[i32]) -> Result<HashMap<i32, i64>> {
        if business_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = ViewInteractions::find()
            .select_only()
            .column(view_interactions::Column::BusinessId)
            .column_as(total_views(), "total")
            .filter(view_interactions::Column::BusinessId.is_in(business_ids.iter().copied()))
            .group_by(view_interactions::Column::BusinessId)
            .into_tuple::<(i32, Option<i64>)>()
            .all(&self.conn)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(id, total)| (id, total.unwrap_or(0)))
            .collect())
    }

    /// Views across all businesses per day, oldest first.
    pub async fn by_day(&self) -> Result<Vec<(String, i64)>> {
        let rows = ViewInteractions::find()
            .select_only()
            .column(view_interactions::Column::Date)
            .column_as(total_views(), "total")
            .group_by(view_interactions::Column::Date)
            .order_by_asc(view_interactions::Column::Date)
            .into_tuple::<(String, Option<i64>)>()
            .all(&self.conn)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(date, total)| (date, total.unwrap_or(0)))
            .collect())
    }

    /// Daily views of one business on or after `since` (`YYYY-MM-DD`).
    pub async fn for_business_since(
        &self,
        business_id: i32,
        since: &str,
    ) -> Result<Vec<(String, i64)>> {
        let rows = ViewInteractions::find()
            .select_only()
            .column(view_interactions::Column::Date)
            .column(view_interactions::Column::Views)
            .filter(view_interactions::Column::BusinessId.eq(business_id))
            .filter(view_interactions::Column::Date.gte(since))
            .order_by_asc(view_interactions::Column::Date)
            .into_tuple::<(String, i64)>()
            .all(&self.conn)
            .await?;
        Ok(rows)
    }

    /// Business ids with the most cumulative views.
    pub async fn top_businesses(&self, limit: u64) -> Result<Vec<(i32, i64)>> {
        let rows = ViewInteractions::find()
            .select_only()
            .column(view_interactions::Column::BusinessId)
            .column_as(total_views(), "total")
            .group_by(view_interactions::Column::BusinessId)
            .order_by_desc(total_views())
            .order_by_asc(view_interactions::Column::BusinessId)
            .limit(limit)
            .into_tuple::<(i32, Option<i64>)>()
            .all(&self.conn)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(id, total)| (id, total.unwrap_or(0)))
            .collect())
    }
}
