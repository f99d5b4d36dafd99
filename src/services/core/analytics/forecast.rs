// Forecaster - Short-Horizon Linear Projection
// Ordinary least squares over (index, value); projected values are floored
// at zero because every platform metric is a non-negative count or amount.
// Confidence decays linearly with the horizon and never drops below 0.5.

use serde::{Deserialize, Serialize};

use crate::utils::helpers::{clamp, mean, round_to_decimal_places};

pub const DEFAULT_HORIZON: usize = 3;
pub const MIN_HISTORY_POINTS: usize = 3;

const CONFIDENCE_DECAY_PER_STEP: f64 = 0.15;
const CONFIDENCE_FLOOR: f64 = 0.5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    /// 1-indexed step past the end of the history
    pub horizon_index: usize,
    /// OLS projection, floored at 0
    pub predicted_value: f64,
    /// In [0.5, 1.0], strictly non-increasing across the horizon
    pub confidence: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Increasing,
    Decreasing,
    Stable,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    pub points: Vec<ForecastPoint>,
    pub slope: f64,
    pub intercept: f64,
    pub direction: Direction,
    /// `|slope| / mean(history)` as a percentage (0 for an all-zero history)
    pub strength: f64,
}

/// A 2-point fit is technically possible but deliberately rejected as
/// unreliable, so thin history is a typed sentinel rather than an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ForecastOutcome {
    Computed(Forecast),
    InsufficientData { note: String },
}

pub struct Forecaster;

impl Forecaster {
    /// Fit a line to an equally-spaced history and project `horizon` steps.
    pub fn forecast(history: &[f64], horizon: usize) -> ForecastOutcome {
        if history.len() < MIN_HISTORY_POINTS {
            return ForecastOutcome::InsufficientData {
                note: "insufficient data".to_string(),
            };
        }

        let (slope, intercept) = Self::least_squares(history);

        let n = history.len();
        let points: Vec<ForecastPoint> = (1..=horizon)
            .map(|i| {
                let x = (n - 1 + i) as f64;
                let predicted = (slope * x + intercept).max(0.0);
                let confidence = clamp(
                    1.0 - i as f64 * CONFIDENCE_DECAY_PER_STEP,
                    CONFIDENCE_FLOOR,
                    1.0,
                );
                ForecastPoint {
                    horizon_index: i,
                    predicted_value: round_to_decimal_places(predicted, 2),
                    confidence: round_to_decimal_places(confidence, 2),
                }
            })
            .collect();

        let direction = if slope > f64::EPSILON {
            Direction::Increasing
        } else if slope < -f64::EPSILON {
            Direction::Decreasing
        } else {
            Direction::Stable
        };

        let history_mean = mean(history);
        let strength = if history_mean > 0.0 {
            round_to_decimal_places(slope.abs() / history_mean * 100.0, 2)
        } else {
            0.0
        };

        ForecastOutcome::Computed(Forecast {
            points,
            slope,
            intercept,
            direction,
            strength,
        })
    }

    /// Ordinary least squares over `(index, value)` pairs.
    fn least_squares(values: &[f64]) -> (f64, f64) {
        let n = values.len() as f64;
        let sum_x: f64 = (0..values.len()).map(|i| i as f64).sum();
        let sum_y: f64 = values.iter().sum();
        let sum_xy: f64 = values.iter().enumerate().map(|(i, y)| i as f64 * y).sum();
        let sum_xx: f64 = (0..values.len()).map(|i| (i as f64).powi(2)).sum();

        let denominator = n * sum_xx - sum_x * sum_x;
        if denominator.abs() < f64::EPSILON {
            return (0.0, mean(values));
        }
        let slope = (n * sum_xy - sum_x * sum_y) / denominator;
        let intercept = (sum_y - slope * sum_x) / n;
        (slope, intercept)
    }
}
