//! # VotePulse
//!
//! Growth and forecasting analytics for the voting platform. Buckets raw
//! vote, user and payment records into calendar periods, derives growth,
//! velocity, retention and least-squares forecasts from them, and serves
//! the results behind a read-through cache.
//!
//! The service is storage-agnostic: callers hand it a [`DataStore`] for the
//! record collections and a [`CacheStore`] for the cache backend.
//!
//! ```no_run
//! use std::sync::Arc;
//! use vote_pulse::services::core::analytics::{GrowthAnalyticsService, MetricFilter, PeriodType};
//! # use vote_pulse::services::core::infrastructure::{CacheStore, DataStore};
//! # async fn run(store: Arc<dyn DataStore>, cache: Arc<dyn CacheStore>) -> anyhow::Result<()> {
//! let service = GrowthAnalyticsService::new(store, cache);
//! let response = service
//!     .comprehensive_analytics(PeriodType::Weekly, &MetricFilter::default(), false)
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod services;
pub mod types;
pub mod utils;

pub use services::core::analytics::{
    ComprehensiveAnalytics, GrowthAnalyticsService, GrowthReport, Metric, MetricFilter,
    PeriodType,
};
pub use services::core::infrastructure::{CacheStore, DataStore};
pub use types::{AnalyticsResponse, ResponseMetadata};
pub use utils::{AnalyticsError, AnalyticsResult};
