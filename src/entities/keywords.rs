use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "keywords")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub name: String,

    pub search_name: String,

    /// Lowercased name with whitespace runs replaced by `-`. Dedup key.
    #[sea_orm(unique)]
    pub slug: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::business_keywords::Entity")]
    BusinessKeywords,
}

impl Related<super::business_keywords::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BusinessKeywords.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
