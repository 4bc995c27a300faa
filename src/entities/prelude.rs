pub use super::activities::Entity as Activities;
pub use super::business_keywords::Entity as BusinessKeywords;
pub use super::businesses::Entity as Businesses;
pub use super::cache_entries::Entity as CacheEntries;
pub use super::favorites::Entity as Favorites;
pub use super::item_searches::Entity as ItemSearches;
pub use super::keywords::Entity as Keywords;
pub use super::location_searches::Entity as LocationSearches;
pub use super::page_contents::Entity as PageContents;
pub use super::reviews::Entity as Reviews;
pub use super::users::Entity as Users;
pub use super::view_interactions::Entity as ViewInteractions;
