pub mod prelude;

pub mod activities;
pub mod business_keywords;
pub mod businesses;
pub mod cache_entries;
pub mod favorites;
pub mod item_searches;
pub mod keywords;
pub mod location_searches;
pub mod page_contents;
pub mod reviews;
pub mod users;
pub mod view_interactions;
