// Growth Analytics Service - Composition Root of the Engine
// Wires the period generator, sampler and derived calculators behind the
// cache gate, and exposes the operations the platform's dashboards call.
// Each request computes a fresh, immutable result; the cache gate is the
// only stateful piece.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::services::core::analytics::forecast::{
    ForecastOutcome, Forecaster, DEFAULT_HORIZON,
};
use crate::services::core::analytics::growth::{GrowthCalculator, GrowthPoint, GrowthSummary};
use crate::services::core::analytics::insights::{Insight, InsightGenerator, MetricGrowth};
use crate::services::core::analytics::period::{
    Granularity, Period, PeriodGenerator, PeriodType,
};
use crate::services::core::analytics::retention::{RetentionCalculator, RetentionOutcome};
use crate::services::core::analytics::sampler::{Metric, MetricFilter, MetricSampler};
use crate::services::core::analytics::velocity::{
    VelocityEstimator, VelocitySeries, DEFAULT_INTERVAL_COUNT,
};
use crate::services::core::infrastructure::cache::{
    CacheGate, CacheGateStats, CacheKeyBuilder, CacheStore, CacheTtl, KeyPrefix,
};
use crate::services::core::infrastructure::data_store::DataStore;
use crate::types::{AnalyticsResponse, ResponseMetadata};
use crate::utils::helpers::{mean, round_to_decimal_places};
use crate::utils::{AnalyticsError, AnalyticsResult, LogLevel, Logger, TimeService};

/// Growth series plus its summary and insights for one metric
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrowthReport {
    pub metric: Metric,
    pub points: Vec<GrowthPoint>,
    pub summary: GrowthSummary,
    pub insights: Vec<Insight>,
}

/// Current-vs-prior snapshot of one metric inside the fan-out
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSnapshot {
    pub metric: Metric,
    pub current: f64,
    pub previous: f64,
    pub growth: GrowthPoint,
}

/// Multi-metric dashboard result. One metric failing lands in `errors`
/// without sinking the others.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComprehensiveAnalytics {
    pub period_type: PeriodType,
    pub metrics: BTreeMap<String, MetricSnapshot>,
    pub errors: BTreeMap<String, String>,
    pub overall_growth_rate: f64,
    pub insights: Vec<Insight>,
}

pub struct GrowthAnalyticsService {
    sampler: MetricSampler,
    velocity: VelocityEstimator,
    retention: RetentionCalculator,
    cache_gate: CacheGate,
    time: TimeService,
    logger: Logger,
}

impl GrowthAnalyticsService {
    pub fn new(store: Arc<dyn DataStore>, cache: Arc<dyn CacheStore>) -> Self {
        let logger =
            Logger::new(LogLevel::Info).with_field("service", serde_json::json!("analytics"));
        let sampler = MetricSampler::new(store.clone());
        Self {
            velocity: VelocityEstimator::new(sampler.clone()),
            retention: RetentionCalculator::new(store),
            cache_gate: CacheGate::new(
                cache,
                logger.with_field("component", serde_json::json!("cache_gate")),
            ),
            sampler,
            time: TimeService::new(),
            logger,
        }
    }

    // ---- growth ----

    /// Vote-count growth over a date range
    pub async fn voting_growth(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        granularity: Granularity,
        filter: &MetricFilter,
        force_refresh: bool,
    ) -> AnalyticsResult<AnalyticsResponse<GrowthReport>> {
        self.metric_growth(Metric::Votes, start, end, granularity, filter, force_refresh)
            .await
    }

    /// New-user registration growth over a date range
    pub async fn registration_growth(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        granularity: Granularity,
        filter: &MetricFilter,
        force_refresh: bool,
    ) -> AnalyticsResult<AnalyticsResponse<GrowthReport>> {
        self.metric_growth(
            Metric::NewUsers,
            start,
            end,
            granularity,
            filter,
            force_refresh,
        )
        .await
    }

    /// Revenue growth over a date range (currency filter honored)
    pub async fn revenue_growth(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        granularity: Granularity,
        filter: &MetricFilter,
        force_refresh: bool,
    ) -> AnalyticsResult<AnalyticsResponse<GrowthReport>> {
        self.metric_growth(
            Metric::Revenue,
            start,
            end,
            granularity,
            filter,
            force_refresh,
        )
        .await
    }

    /// Growth series for any registry metric, cached per
    /// (metric, granularity, window, filters).
    pub async fn metric_growth(
        &self,
        metric: Metric,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        granularity: Granularity,
        filter: &MetricFilter,
        force_refresh: bool,
    ) -> AnalyticsResult<AnalyticsResponse<GrowthReport>> {
        let key = CacheKeyBuilder::new(KeyPrefix::Growth)
            .add_component(metric.as_str())
            .add_component(granularity.as_str())
            .add_component(start.timestamp())
            .add_component(end.timestamp())
            .add_component(filter.cache_component())
            .build();

        let result = self
            .cache_gate
            .get_or_compute(&key, CacheTtl::Medium, force_refresh, || {
                self.compute_growth(metric, start, end, granularity, filter)
            })
            .await?;

        self.logger.info(&format!(
            "Computed {} growth: {} points, cached={}",
            metric.as_str(),
            result.data.points.len(),
            result.cached
        ));

        Ok(AnalyticsResponse::ok(
            result.data,
            result.cached,
            ResponseMetadata::new(),
        ))
    }

    async fn compute_growth(
        &self,
        metric: Metric,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        granularity: Granularity,
        filter: &MetricFilter,
    ) -> AnalyticsResult<GrowthReport> {
        let periods = PeriodGenerator::calendar(start, end, granularity)?;
        let samples = self.sampler.sample_series(&periods, metric, filter).await?;
        let points = GrowthCalculator::growth_series(&samples);
        let summary = GrowthCalculator::summarize(&samples, &points);
        let insights = InsightGenerator::generate(
            summary.overall_rate,
            &[MetricGrowth {
                metric,
                rate: summary.overall_rate,
            }],
        );

        Ok(GrowthReport {
            metric,
            points,
            summary,
            insights,
        })
    }

    // ---- velocity ----

    /// Vote momentum inside a single period
    pub async fn vote_velocity(
        &self,
        period: &Period,
        filter: &MetricFilter,
        interval_count: Option<usize>,
        force_refresh: bool,
    ) -> AnalyticsResult<AnalyticsResponse<VelocitySeries>> {
        let intervals = interval_count.unwrap_or(DEFAULT_INTERVAL_COUNT);
        let key = CacheKeyBuilder::new(KeyPrefix::Velocity)
            .add_component(Metric::Votes.as_str())
            .add_component(period.start.timestamp())
            .add_component(period.end.timestamp())
            .add_component(intervals)
            .add_component(filter.cache_component())
            .build();

        let result = self
            .cache_gate
            .get_or_compute(&key, CacheTtl::RealTime, force_refresh, || {
                self.velocity.estimate(period, Metric::Votes, filter, intervals)
            })
            .await?;

        Ok(AnalyticsResponse::ok(
            result.data,
            result.cached,
            ResponseMetadata::new(),
        ))
    }

    // ---- retention ----

    /// User retention across the buckets of a date range
    pub async fn user_retention(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        granularity: Granularity,
        force_refresh: bool,
    ) -> AnalyticsResult<AnalyticsResponse<RetentionOutcome>> {
        let key = CacheKeyBuilder::new(KeyPrefix::Retention)
            .add_component(granularity.as_str())
            .add_component(start.timestamp())
            .add_component(end.timestamp())
            .build();

        let result = self
            .cache_gate
            .get_or_compute(&key, CacheTtl::Medium, force_refresh, || async {
                let periods = PeriodGenerator::calendar(start, end, granularity)?;
                self.retention.user_retention(&periods).await
            })
            .await?;

        Ok(AnalyticsResponse::ok(
            result.data,
            result.cached,
            ResponseMetadata::new(),
        ))
    }

    // ---- forecasting ----

    /// Project a metric `horizon` steps past a sampled history of
    /// `history_periods` buckets ending now.
    pub async fn forecast_metric(
        &self,
        metric: Metric,
        filter: &MetricFilter,
        granularity: Granularity,
        history_periods: usize,
        horizon: Option<usize>,
        force_refresh: bool,
    ) -> AnalyticsResult<AnalyticsResponse<ForecastOutcome>> {
        if history_periods == 0 {
            return Err(AnalyticsError::invalid_range(
                "history_periods must be at least 1",
            ));
        }
        let horizon = horizon.unwrap_or(DEFAULT_HORIZON);
        let end = self.time.now_utc();
        let start = end - granularity.step() * history_periods as i32;

        // The history window slides with the clock, so the key carries the
        // current bucket index; a hit never outlives the window it was
        // computed for.
        let anchor = end.timestamp() / granularity.step().num_seconds();

        let key = CacheKeyBuilder::new(KeyPrefix::Forecast)
            .add_component(metric.as_str())
            .add_component(granularity.as_str())
            .add_component(anchor)
            .add_component(history_periods)
            .add_component(horizon)
            .add_component(filter.cache_component())
            .build();

        let result = self
            .cache_gate
            .get_or_compute(&key, CacheTtl::Medium, force_refresh, || async move {
                let periods = PeriodGenerator::calendar(start, end, granularity)?;
                let samples = self.sampler.sample_series(&periods, metric, filter).await?;
                let values: Vec<f64> = samples.iter().map(|s| s.value).collect();
                Ok(Forecaster::forecast(&values, horizon))
            })
            .await?;

        Ok(AnalyticsResponse::ok(
            result.data,
            result.cached,
            ResponseMetadata::new(),
        ))
    }

    // ---- comprehensive fan-out ----

    /// Dashboard snapshot across votes, registrations, revenue and
    /// transactions for a named lookback window. Sub-metric store calls run
    /// concurrently; a failing metric is reported next to the others'
    /// successes instead of failing the request.
    pub async fn comprehensive_analytics(
        &self,
        period_type: PeriodType,
        filter: &MetricFilter,
        force_refresh: bool,
    ) -> AnalyticsResult<AnalyticsResponse<ComprehensiveAnalytics>> {
        let key = CacheKeyBuilder::new(KeyPrefix::Comprehensive)
            .add_component(period_type.as_str())
            .add_component(filter.cache_component())
            .build();

        let result = self
            .cache_gate
            .get_or_compute(&key, CacheTtl::Short, force_refresh, || {
                self.compute_comprehensive(period_type, filter)
            })
            .await?;

        self.cache_gate.flush_stats("comprehensive").await;

        Ok(AnalyticsResponse::ok(
            result.data,
            result.cached,
            ResponseMetadata::new().with_period_type(period_type),
        ))
    }

    async fn compute_comprehensive(
        &self,
        period_type: PeriodType,
        filter: &MetricFilter,
    ) -> AnalyticsResult<ComprehensiveAnalytics> {
        let now = self.time.now_utc();
        let (cur_start, cur_end) = period_type.window(now);
        let (prev_start, prev_end) = period_type.previous_window(now);

        let current = Period {
            label: format!("current {}", period_type.as_str()),
            start: cur_start,
            end: cur_end,
        };
        let previous = if prev_start < prev_end {
            Some(Period {
                label: format!("previous {}", period_type.as_str()),
                start: prev_start,
                end: prev_end,
            })
        } else {
            None
        };

        let (votes, new_users, revenue, transactions) = futures::join!(
            self.metric_snapshot(Metric::Votes, &current, previous.as_ref(), filter),
            self.metric_snapshot(Metric::NewUsers, &current, previous.as_ref(), filter),
            self.metric_snapshot(Metric::Revenue, &current, previous.as_ref(), filter),
            self.metric_snapshot(Metric::Transactions, &current, previous.as_ref(), filter),
        );

        let mut metrics = BTreeMap::new();
        let mut errors = BTreeMap::new();
        let mut metric_rates = Vec::new();

        for (metric, outcome) in [
            (Metric::Votes, votes),
            (Metric::NewUsers, new_users),
            (Metric::Revenue, revenue),
            (Metric::Transactions, transactions),
        ] {
            match outcome {
                Ok(snapshot) => {
                    metric_rates.push(MetricGrowth {
                        metric,
                        rate: snapshot.growth.raw_rate,
                    });
                    metrics.insert(metric.as_str().to_string(), snapshot);
                }
                Err(e) => {
                    self.logger.warn(&format!(
                        "Metric {} failed in comprehensive fan-out: {}",
                        metric.as_str(),
                        e
                    ));
                    errors.insert(metric.as_str().to_string(), e.to_string());
                }
            }
        }

        let overall_raw = mean(&metric_rates.iter().map(|m| m.rate).collect::<Vec<f64>>());
        let insights = InsightGenerator::generate(overall_raw, &metric_rates);

        Ok(ComprehensiveAnalytics {
            period_type,
            metrics,
            errors,
            overall_growth_rate: round_to_decimal_places(overall_raw, 2),
            insights,
        })
    }

    async fn metric_snapshot(
        &self,
        metric: Metric,
        current: &Period,
        previous: Option<&Period>,
        filter: &MetricFilter,
    ) -> AnalyticsResult<MetricSnapshot> {
        let current_sample = self.sampler.sample(current, metric, filter).await?;
        let previous_value = match previous {
            Some(p) => self.sampler.sample(p, metric, filter).await?.value,
            None => 0.0,
        };
        let growth =
            GrowthCalculator::growth_values(&current_sample.period, current_sample.value, previous_value);

        Ok(MetricSnapshot {
            metric,
            current: current_sample.value,
            previous: previous_value,
            growth,
        })
    }

    // ---- cache control ----

    /// Invalidate one analytics domain. Coarse: the backing cache exposes no
    /// prefix scan, so the whole cache is cleared.
    pub async fn invalidate(&self, prefix: KeyPrefix) -> AnalyticsResult<()> {
        self.cache_gate.clear_prefix(prefix.as_str()).await
    }

    pub fn cache_stats(&self) -> CacheGateStats {
        self.cache_gate.stats()
    }
}
