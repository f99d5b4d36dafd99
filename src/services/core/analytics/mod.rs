// src/services/core/analytics/mod.rs

pub mod engine;
pub mod forecast;
pub mod growth;
pub mod insights;
pub mod period;
pub mod retention;
pub mod sampler;
pub mod trend;
pub mod velocity;

pub use engine::{ComprehensiveAnalytics, GrowthAnalyticsService, GrowthReport, MetricSnapshot};
pub use forecast::{Forecast, ForecastOutcome, ForecastPoint, Forecaster};
pub use growth::{GrowthCalculator, GrowthPoint, GrowthSummary};
pub use insights::{Insight, InsightGenerator, InsightKind, InsightPriority, MetricGrowth};
pub use period::{CalendarPeriods, Granularity, Period, PeriodGenerator, PeriodType};
pub use retention::{RetentionCalculator, RetentionOutcome, RetentionPoint, RetentionReport};
pub use sampler::{Metric, MetricFilter, MetricSample, MetricSampler};
pub use trend::{classify_rate, TrendLabel};
pub use velocity::{IntervalSample, VelocityEstimator, VelocitySeries};
