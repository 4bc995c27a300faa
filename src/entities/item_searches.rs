use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "item_searches")]
pub struct Model {
    /// Trimmed search text; the empty string is a valid key.
    #[sea_orm(primary_key, auto_increment = false)]
    pub item: String,

    pub count: i64,

    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
