use crate::entities::{activities, prelude::*};
use anyhow::Result;
use sea_orm::{DatabaseConnection, EntityTrait, QueryOrder, QuerySelect, Set};

pub struct ActivityRepository {
    conn: DatabaseConnection,
}

impl ActivityRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn insert(&self, kind: &str, message: &str) -> Result<()> {
        let model = activities::ActiveModel {
            kind: Set(kind.to_string()),
            message: Set(message.to_string()),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
            ..Default::default()
        };
        Activities::insert(model).exec(&self.conn).await?;
        Ok(())
    }

    pub async fn latest(&self, limit: u64) -> Result<Vec<activities::Model>> {
        let rows = Activities::find()
            .order_by_desc(activities::Column::Id)
            .limit(limit)
            .all(&self.conn)
            .await?;
        Ok(rows)
    }
}
