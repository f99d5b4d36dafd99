// Growth Calculator - Period-over-Period Change
// Absolute and percentage change between adjacent samples, plus the summary
// aggregates (overall rate, average rate, volatility, rolling average) the
// dashboards display. Zero-previous buckets yield a growth rate of 0, never
// NaN or infinity.

use serde::{Deserialize, Serialize};

use crate::services::core::analytics::sampler::MetricSample;
use crate::services::core::analytics::trend::{classify_rate, TrendLabel};
use crate::utils::helpers::{mean, moving_average, population_std_dev, round_to_decimal_places};

/// Change between one bucket and the one before it.
///
/// `percent_change` is rounded to 2 decimal places for display; `raw_rate`
/// keeps the unrounded value for aggregation and is not serialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrowthPoint {
    pub period: crate::services::core::analytics::period::Period,
    pub current: f64,
    pub previous: f64,
    pub absolute_change: f64,
    pub percent_change: f64,
    pub trend: TrendLabel,
    #[serde(skip)]
    pub raw_rate: f64,
}

/// Aggregates over a whole growth series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrowthSummary {
    /// Last sample vs first sample, percent (0 when the first is 0)
    pub overall_rate: f64,
    /// Mean of the unrounded per-period rates
    pub average_rate: f64,
    /// Population standard deviation of the per-period rates
    pub volatility: f64,
    /// 3-period moving average of the sampled values
    pub rolling_average: Vec<f64>,
    pub trend: TrendLabel,
}

const ROLLING_WINDOW: usize = 3;

pub struct GrowthCalculator;

impl GrowthCalculator {
    /// Growth of `current` relative to `previous` (same metric, adjacent or
    /// corresponding prior-period buckets).
    pub fn growth_between(current: &MetricSample, previous: &MetricSample) -> GrowthPoint {
        Self::growth_values(&current.period, current.value, previous.value)
    }

    /// Growth from raw values, attributed to `period`.
    pub fn growth_values(
        period: &crate::services::core::analytics::period::Period,
        current: f64,
        previous: f64,
    ) -> GrowthPoint {
        let absolute_change = current - previous;
        let raw_rate = if previous > 0.0 {
            (absolute_change / previous) * 100.0
        } else {
            0.0
        };

        GrowthPoint {
            period: period.clone(),
            current,
            previous,
            absolute_change,
            percent_change: round_to_decimal_places(raw_rate, 2),
            trend: classify_rate(raw_rate),
            raw_rate,
        }
    }

    /// Consecutive-bucket growth over an ordered sample series. A series of
    /// n samples yields n-1 points, attributed to the later bucket of each
    /// pair.
    pub fn growth_series(samples: &[MetricSample]) -> Vec<GrowthPoint> {
        samples
            .windows(2)
            .map(|pair| Self::growth_between(&pair[1], &pair[0]))
            .collect()
    }

    /// Summary aggregates for a series and its growth points.
    pub fn summarize(samples: &[MetricSample], points: &[GrowthPoint]) -> GrowthSummary {
        let overall_raw = match (samples.first(), samples.last()) {
            (Some(first), Some(last)) if first.value > 0.0 => {
                (last.value - first.value) / first.value * 100.0
            }
            _ => 0.0,
        };

        let rates: Vec<f64> = points.iter().map(|p| p.raw_rate).collect();
        let values: Vec<f64> = samples.iter().map(|s| s.value).collect();

        GrowthSummary {
            overall_rate: round_to_decimal_places(overall_raw, 2),
            average_rate: round_to_decimal_places(mean(&rates), 2),
            volatility: round_to_decimal_places(population_std_dev(&rates), 2),
            rolling_average: moving_average(&values, ROLLING_WINDOW),
            trend: classify_rate(overall_raw),
        }
    }
}
