use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "location_searches")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub lat_tenths: i32,
    #[sea_orm(primary_key, auto_increment = false)]
    pub lng_tenths: i32,

    pub count: i64,

    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
