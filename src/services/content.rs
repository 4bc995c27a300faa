//! Editable text for the static pages (about, terms, contact and so on).

use crate::cache::{Cache, CacheKey, Mutation};
use crate::db::Store;
use crate::entities::page_contents;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

pub const MAX_KEY_LEN: usize = 64;

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("Page content not found: {0}")]
    NotFound(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for ContentError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for ContentError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PageContentDto {
    pub key: String,
    pub text: String,
    pub updated_at: String,
}

impl From<page_contents::Model> for PageContentDto {
    fn from(model: page_contents::Model) -> Self {
        Self {
            key: model.key,
            text: model.text,
            updated_at: model.updated_at,
        }
    }
}

fn page_key(key: &str) -> Result<String, ContentError> {
    let key = key.trim();
    if key.is_empty() {
        return Err(ContentError::Validation("key is required".to_string()));
    }
    if key.len() > MAX_KEY_LEN {
        return Err(ContentError::Validation(format!(
            "key is longer than {MAX_KEY_LEN} bytes"
        )));
    }
    Ok(key.to_string())
}

pub struct ContentService {
    store: Arc<Store>,
    cache: Cache,
}

impl ContentService {
    #[must_use]
    pub const fn new(store: Arc<Store>, cache: Cache) -> Self {
        Self { store, cache }
    }

    pub async fn get(&self, key: &str) -> Result<PageContentDto, ContentError> {
        let key = page_key(key)?;
        self.cache
            .cached(CacheKey::PageContent(key.clone()), || async {
                self.store
                    .get_page_content(&key)
                    .await?
                    .map(PageContentDto::from)
                    .ok_or_else(|| ContentError::NotFound(key.clone()))
            })
            .await
    }

    /// Creates or replaces the text of a page. Empty text is allowed.
    pub async fn save(&self, key: &str, text: &str) -> Result<PageContentDto, ContentError> {
        let key = page_key(key)?;
        let saved = self.store.save_page_content(&key, text).await?;
        self.cache
            .apply(&Mutation::SavePageContent { key: key.clone() })
            .await;

        info!(key = %key, "Page content saved");
        Ok(saved.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_key_trims_and_bounds() {
        assert_eq!(page_key("  about ").unwrap(), "about");
        assert!(matches!(page_key("   "), Err(ContentError::Validation(_))));
        assert!(matches!(
            page_key(&"k".repeat(MAX_KEY_LEN + 1)),
            Err(ContentError::Validation(_))
        ));
    }
}
