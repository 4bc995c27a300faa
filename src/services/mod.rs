pub mod analytics;
pub use analytics::{AnalyticsError, AnalyticsService};

pub mod content;
pub use content::{ContentError, ContentService};

pub mod business_service;
pub use business_service::{BusinessError, BusinessService};

pub mod business_service_impl;
pub use business_service_impl::SeaOrmBusinessService;

pub mod review_service;
pub use review_service::{ReviewError, ReviewService};

pub mod review_service_impl;
pub use review_service_impl::SeaOrmReviewService;

pub mod search;
pub use search::{SearchError, SearchService};

pub mod user_service;
pub use user_service::{UserError, UserService};

pub mod user_service_impl;
pub use user_service_impl::SeaOrmUserService;
