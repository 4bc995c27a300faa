use sea_orm_migration::prelude::*;

mod m20260301_initial;
mod m20260302_add_search_counters;
mod m20260303_add_cache_entries;
mod m20260304_add_page_contents;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260301_initial::Migration),
            Box::new(m20260302_add_search_counters::Migration),
            Box::new(m20260303_add_cache_entries::Migration),
            Box::new(m20260304_add_page_contents::Migration),
        ]
    }
}
