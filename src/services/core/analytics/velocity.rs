// Velocity/Acceleration Estimator - Intra-Period Momentum
// Splits one period into N equal intervals, samples the metric per interval,
// and reads first differences as velocity and the first-to-last velocity
// change as acceleration. The trend label classifies the raw average
// velocity on the shared ladder; normalize upstream if a relative reading
// is wanted.

use serde::{Deserialize, Serialize};

use crate::services::core::analytics::period::{Period, PeriodGenerator};
use crate::services::core::analytics::sampler::{Metric, MetricFilter, MetricSampler};
use crate::services::core::analytics::trend::{classify_rate, TrendLabel};
use crate::utils::helpers::mean;
use crate::utils::AnalyticsResult;

pub const DEFAULT_INTERVAL_COUNT: usize = 4;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntervalSample {
    pub interval: usize,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VelocitySeries {
    pub metric: Metric,
    pub intervals: Vec<IntervalSample>,
    /// `velocities[i] = value[i+1] - value[i]`
    pub velocities: Vec<f64>,
    pub average_velocity: f64,
    /// `(last velocity - first velocity) / (velocity count - 1)`;
    /// 0 with fewer than 2 velocities
    pub acceleration: f64,
    pub trend: TrendLabel,
}

#[derive(Clone)]
pub struct VelocityEstimator {
    sampler: MetricSampler,
}

impl VelocityEstimator {
    pub fn new(sampler: MetricSampler) -> Self {
        Self { sampler }
    }

    pub async fn estimate(
        &self,
        period: &Period,
        metric: Metric,
        filter: &MetricFilter,
        interval_count: usize,
    ) -> AnalyticsResult<VelocitySeries> {
        let sub_periods =
            PeriodGenerator::equal_subdivision(period.start, period.end, interval_count)?;

        // Buckets are independent; sequential sampling keeps store load flat
        let samples = self
            .sampler
            .sample_series(&sub_periods, metric, filter)
            .await?;

        let intervals: Vec<IntervalSample> = samples
            .iter()
            .enumerate()
            .map(|(i, s)| IntervalSample {
                interval: i + 1,
                value: s.value,
            })
            .collect();

        let velocities: Vec<f64> = samples
            .windows(2)
            .map(|pair| pair[1].value - pair[0].value)
            .collect();

        let average_velocity = mean(&velocities);
        let acceleration = match (velocities.first(), velocities.last()) {
            (Some(first), Some(last)) if velocities.len() >= 2 => {
                (last - first) / (velocities.len() - 1) as f64
            }
            _ => 0.0,
        };

        Ok(VelocitySeries {
            metric,
            intervals,
            velocities,
            average_velocity,
            acceleration,
            trend: classify_rate(average_velocity),
        })
    }
}
