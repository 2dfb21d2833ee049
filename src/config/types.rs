//! Configuration types and re-exports

pub use super::{
    AlertsConfig, AppConfig, DashboardConfig, FeedConfig, PersistenceConfig, StatsConfig,
};
