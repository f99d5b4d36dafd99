// Retention Calculator - Who Came Back
// For each consecutive period pair, the fraction of users first active in
// the prior period that were active again in the current one. A prior
// period with nobody in it yields a rate of 0 flagged as not meaningful;
// fewer than two periods is a typed sentinel, not an error.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::services::core::analytics::period::Period;
use crate::services::core::infrastructure::data_store::{DataStore, RecordFilter};
use crate::utils::helpers::round_to_decimal_places;
use crate::utils::AnalyticsResult;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetentionPoint {
    pub period: Period,
    pub total_prior: u64,
    pub retained: u64,
    pub retention_rate: f64,
    /// false when `total_prior == 0` - the rate is a placeholder, not a signal
    pub meaningful: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetentionReport {
    pub points: Vec<RetentionPoint>,
    pub avg_retention_rate: f64,
    /// Last point's rate minus first point's rate
    pub trend: f64,
}

/// Retention over a single period is undefined, not a failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RetentionOutcome {
    Computed(RetentionReport),
    InsufficientPeriods { note: String },
}

pub struct RetentionCalculator {
    store: Arc<dyn DataStore>,
}

impl RetentionCalculator {
    pub fn new(store: Arc<dyn DataStore>) -> Self {
        Self { store }
    }

    /// User retention over an ordered period list: "first active" means the
    /// user record was created in the prior period, "still active" means the
    /// user's last activity falls in the current period or later within it.
    pub async fn user_retention(&self, periods: &[Period]) -> AnalyticsResult<RetentionOutcome> {
        if periods.len() < 2 {
            return Ok(RetentionOutcome::InsufficientPeriods {
                note: "insufficient periods".to_string(),
            });
        }

        let mut points = Vec::with_capacity(periods.len() - 1);
        for pair in periods.windows(2) {
            let (prior, current) = (&pair[0], &pair[1]);

            let prior_filter = RecordFilter::scoped("users", "created_at", prior);
            let prior_ids = self.store.distinct_ids(&prior_filter, "user_id").await?;

            let current_filter = RecordFilter::scoped("users", "last_active_at", current);
            let active_ids = self.store.distinct_ids(&current_filter, "user_id").await?;

            let total_prior = prior_ids.len() as u64;
            let retained = prior_ids.intersection(&active_ids).count() as u64;
            let (retention_rate, meaningful) = if total_prior > 0 {
                (
                    round_to_decimal_places(retained as f64 / total_prior as f64 * 100.0, 2),
                    true,
                )
            } else {
                (0.0, false)
            };

            points.push(RetentionPoint {
                period: current.clone(),
                total_prior,
                retained,
                retention_rate,
                meaningful,
            });
        }

        let rates: Vec<f64> = points.iter().map(|p| p.retention_rate).collect();
        let avg_retention_rate =
            round_to_decimal_places(crate::utils::helpers::mean(&rates), 2);
        let trend = match (rates.first(), rates.last()) {
            (Some(first), Some(last)) => round_to_decimal_places(last - first, 2),
            _ => 0.0,
        };

        Ok(RetentionOutcome::Computed(RetentionReport {
            points,
            avg_retention_rate,
            trend,
        }))
    }
}
