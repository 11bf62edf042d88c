pub mod analytics;
pub mod config;
pub mod dates;
pub mod distribution;
pub mod error;
pub mod insights;
pub mod model;
pub mod request;
pub mod store;
pub mod timer;
pub mod water;

pub use analytics::StatisticsService;
pub use error::{StatsError, StatsResult};
pub use model::{
    ActivityDistribution, Category, DailyMetricRecord, Granularity, MetricKind, ProductivityData,
    TimeEntry, UserIdentity,
};
