use crate::entities::{page_contents, prelude::*};
use anyhow::Result;
use sea_orm::sea_query::OnConflict;
use sea_orm::{DatabaseConnection, EntityTrait, Set};

pub struct PageContentRepository {
    conn: DatabaseConnection,
}

impl PageContentRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn get(&self, key: &str) -> Result<Option<page_contents::Model>> {
        Ok(PageContents::find_by_id(key.to_string())
            .one(&self.conn)
            .await?)
    }

    /// Inserts or replaces the text stored under `key`.
    pub async fn upsert(&self, key: &str, text: &str) -> Result<page_contents::Model> {
        let model = page_contents::ActiveModel {
            key: Set(key.to_string()),
            text: Set(text.to_string()),
            updated_at: Set(chrono::Utc::now().to_rfc3339()),
        };

        PageContents::insert(model)
            .on_conflict(
                OnConflict::column(page_contents::Column::Key)
                    .update_columns([page_contents::Column::Text, page_contents::Column::UpdatedAt])
                    .to_owned(),
            )
            .exec_without_returning(&self.conn)
            .await?;

        self.get(key)
            .await?
            .ok_or_else(|| anyhow::anyhow!("page content {key} missing after save"))
    }
}
