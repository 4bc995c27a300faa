use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "businesses")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub name: String,

    pub category: String,

    /// Lowercased `name`, matched by text search.
    pub search_name: String,

    /// Lowercased `category`, matched by category search.
    pub search_category: String,

    pub description: Option<String>,

    pub address: String,

    pub city: String,

    pub state: String,

    pub zipcode: String,

    pub phone: Option<String>,

    pub email: Option<String>,

    pub website: Option<String>,

    pub latitude: f64,

    pub longitude: f64,

    pub is_open: bool,

    /// Set by an admin once the listing has been checked.
    pub is_verified: bool,

    /// Images changed since the last admin review.
    pub is_image_updated: bool,

    /// JSON array of image URLs
    pub image_urls: String,

    /// Denormalized count of `favorites` rows, kept in the same transaction.
    pub favorite_count: i32,

    pub created_at: String,

    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::reviews::Entity")]
    Reviews,
    #[sea_orm(has_many = "super::view_interactions::Entity")]
    ViewInteractions,
    #[sea_orm(has_many = "super::business_keywords::Entity")]
    BusinessKeywords,
    #[sea_orm(has_many = "super::favorites::Entity")]
    Favorites,
}

impl Related<super::reviews::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Reviews.def()
    }
}

impl Related<super::view_interactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ViewInteractions.def()
    }
}

impl Related<super::business_keywords::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BusinessKeywords.def()
    }
}

impl Related<super::favorites::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Favorites.def()
    }
}

impl Related<super::keywords::Entity> for Entity {
    fn to() -> RelationDef {
        super::business_keywords::Relation::Keyword.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::business_keywords::Relation::Business.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
