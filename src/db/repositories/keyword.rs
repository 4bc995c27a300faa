use crate::db::repositories::{contains_pattern, fold};
use crate::entities::{business_keywords, keywords, prelude::*};
use anyhow::Result;
use regex::Regex;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use std::sync::OnceLock;

/// Lowercased, trimmed, whitespace runs collapsed to `-`.
#[must_use]
pub fn slugify(name: &str) -> String {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"\s+").expect("Invalid regex"));
    re.replace_all(name.trim(), "-").to_lowercase()
}

/// Finds each keyword by slug, inserting the missing ones, and returns the
/// ids in input order with duplicates removed.
pub(crate) async fn connect_or_create<C: ConnectionTrait>(
    conn: &C,
    names: &[String],
) -> Result<Vec<i32>> {
    let mut ids = Vec::with_capacity(names.len());

    for name in names {
        let name = name.trim();
        if name.is_empty() {
            continue;
        }
        let slug = slugify(name);

        let existing = Keywords::find()
            .filter(keywords::Column::Slug.eq(&slug))
            .one(conn)
            .await?;

        let id = if let Some(keyword) = existing {
            keyword.id
        } else {
            let model = keywords::ActiveModel {
                name: Set(name.to_string()),
                search_name: Set(fold(name)),
                slug: Set(slug),
                ..Default::default()
            };
            Keywords::insert(model).exec(conn).await?.last_insert_id
        };

        if !ids.contains(&id) {
            ids.push(id);
        }
    }

    Ok(ids)
}

pub struct KeywordRepository {
    conn: DatabaseConnection,
}

impl KeywordRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Keywords whose name contains `text`, alphabetical.
    pub async fn suggest(&self, text: &str, limit: u64) -> Result<Vec<String>> {
        let names = Keywords::find()
            .select_only()
            .column(keywords::Column::Name)
            .filter(
                Expr::col((Keywords, keywords::Column::SearchName)).like(contains_pattern(text)),
            )
            .order_by_asc(keywords::Column::Name)
            .limit(limit)
            .into_tuple::<String>()
            .all(&self.conn)
            .await?;

        Ok(names)
    }

    /// Keywords containing any of `tokens`. No tokens means no filter.
    pub async fn matching_any(&self, tokens: &[&str], limit: u64) -> Result<Vec<String>> {
        let mut query = Keywords::find()
            .select_only()
            .column(keywords::Column::Name);

        if !tokens.is_empty() {
            let condition = tokens.iter().fold(Condition::any(), |cond, token| {
                cond.add(
                    Expr::col((Keywords, keywords::Column::SearchName)).like(contains_pattern(token)),
                )
            });
            query = query.filter(condition);
        }

        let names = query
            .order_by_asc(keywords::Column::Name)
            .limit(limit)
            .into_tuple::<String>()
            .all(&self.conn)
            .await?;

        Ok(names)
    }

    pub async fn names_for_business(&self, business_id: i32) -> Result<Vec<String>> {
        let names = Keywords::find()
            .select_only()
            .column(keywords::Column::Name)
            .inner_join(BusinessKeywords)
            .filter(business_keywords::Column::BusinessId.eq(business_id))
            .order_by_asc(keywords::Column::Name)
            .into_tuple::<String>()
            .all(&self.conn)
            .await?;

        Ok(names)
    }
}
