use crate::config::CacheConfig;
use std::fmt;
use std::time::Duration;

/// Every cached read shape. The string form is the storage key.
///
/// Global aggregates use a fixed name, per-entity views `entity:{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    Business(i32),
    BusinessReviews(i32),
    BusinessAnalytics(i32),
    VerifiedReviews,
    NonVerifiedReviews,
    UserCreatedCountByDay,
    BusinessCreatedCountByDay,
    TotalViewsByDay,
    Users,
    ListBusinesses,
    TopItems,
    TopLocations,
    TopBusinessesByViews,
    /// Businesses whose images await admin review.
    ImageBusinesses,
    ExportBusinesses,
    /// Editable static page text, by page key.
    PageContent(String),
}

impl CacheKey {
    #[must_use]
    pub const fn ttl(&self, config: &CacheConfig) -> Duration {
        match self {
            Self::TopBusinessesByViews => Duration::from_secs(config.leaderboard_ttl_seconds),
            _ => Duration::from_secs(config.default_ttl_seconds),
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Business(id) => write!(f, "business:{id}"),
            Self::BusinessReviews(id) => write!(f, "businessReviews:{id}"),
            Self::BusinessAnalytics(id) => write!(f, "businessAnalytics:{id}"),
            Self::VerifiedReviews => f.write_str("verifiedReviews"),
            Self::NonVerifiedReviews => f.write_str("nonVerifiedReviews"),
            Self::UserCreatedCountByDay => f.write_str("userCreatedCountByDay"),
            Self::BusinessCreatedCountByDay => f.write_str("businessCreatedCountByDay"),
            Self::TotalViewsByDay => f.write_str("totalViewsByDay"),
            Self::Users => f.write_str("users"),
            Self::ListBusinesses => f.write_str("listBusinesses"),
            Self::TopItems => f.write_str("topItems"),
            Self::TopLocations => f.write_str("topLocations"),
            Self::TopBusinessesByViews => f.write_str("topBusinessesByViews"),
            Self::ImageBusinesses => f.write_str("verifiedBusinesses"),
            Self::ExportBusinesses => f.write_str("exportbus"),
            Self::PageContent(key) => write!(f, "pageContent:{key}"),
        }
    }
}
