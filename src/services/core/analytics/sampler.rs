// Metric Sampler - One Number Per (Period, Metric)
// Resolves a metric name to the collection, timestamp field and aggregate
// operation it needs, issues the scoped store query, and always comes back
// with a number (0 for an empty bucket). Store failures propagate unchanged.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::services::core::analytics::period::Period;
use crate::services::core::infrastructure::data_store::{DataStore, RecordFilter};
use crate::utils::AnalyticsResult;

/// Fixed metric registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Votes,
    NewUsers,
    ActiveUsers,
    Revenue,
    Transactions,
}

impl Metric {
    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::Votes => "votes",
            Metric::NewUsers => "new_users",
            Metric::ActiveUsers => "active_users",
            Metric::Revenue => "revenue",
            Metric::Transactions => "transactions",
        }
    }

    pub fn from_str(s: &str) -> Option<Metric> {
        match s {
            "votes" => Some(Metric::Votes),
            "new_users" => Some(Metric::NewUsers),
            "active_users" => Some(Metric::ActiveUsers),
            "revenue" => Some(Metric::Revenue),
            "transactions" => Some(Metric::Transactions),
            _ => None,
        }
    }

    /// Backing collection in the document store
    pub fn collection(&self) -> &'static str {
        match self {
            Metric::Votes => "votes",
            Metric::NewUsers | Metric::ActiveUsers => "users",
            Metric::Revenue | Metric::Transactions => "payments",
        }
    }

    /// Timestamp field the period window scopes on
    pub fn time_field(&self) -> &'static str {
        match self {
            Metric::ActiveUsers => "last_active_at",
            _ => "created_at",
        }
    }
}

/// Optional domain filters applied on top of the time window
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricFilter {
    pub event_id: Option<String>,
    pub category_id: Option<String>,
    pub currency: Option<String>,
}

impl MetricFilter {
    pub fn for_event(event_id: impl Into<String>) -> Self {
        Self {
            event_id: Some(event_id.into()),
            ..Default::default()
        }
    }

    /// Stable cache-key component ("all" when unfiltered)
    pub fn cache_component(&self) -> String {
        let mut parts = Vec::new();
        if let Some(ref e) = self.event_id {
            parts.push(format!("e={}", e));
        }
        if let Some(ref c) = self.category_id {
            parts.push(format!("c={}", c));
        }
        if let Some(ref cur) = self.currency {
            parts.push(format!("cur={}", cur));
        }
        if parts.is_empty() {
            "all".to_string()
        } else {
            parts.join("|")
        }
    }
}

/// One sampled value. Exactly one sample exists per (period, metric).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSample {
    pub period: Period,
    pub metric: Metric,
    pub value: f64,
}

#[derive(Clone)]
pub struct MetricSampler {
    store: Arc<dyn DataStore>,
}

impl MetricSampler {
    pub fn new(store: Arc<dyn DataStore>) -> Self {
        Self { store }
    }

    /// Aggregate `metric` over one period. Counts for votes, new users and
    /// transactions; a sum over `amount` for revenue; a distinct user count
    /// for active users.
    pub async fn sample(
        &self,
        period: &Period,
        metric: Metric,
        filter: &MetricFilter,
    ) -> AnalyticsResult<MetricSample> {
        let record_filter = RecordFilter::scoped(metric.collection(), metric.time_field(), period)
            .with_event(filter.event_id.clone())
            .with_category(filter.category_id.clone())
            .with_currency(filter.currency.clone());

        let value = match metric {
            Metric::Revenue => self.store.sum(&record_filter, "amount").await?,
            Metric::ActiveUsers => {
                self.store.distinct_count(&record_filter, "user_id").await? as f64
            }
            Metric::Votes | Metric::NewUsers | Metric::Transactions => {
                self.store.count(&record_filter).await? as f64
            }
        };

        Ok(MetricSample {
            period: period.clone(),
            metric,
            value,
        })
    }

    /// Sample every period in order. Buckets are independent; sequential
    /// sampling keeps the store load predictable.
    pub async fn sample_series(
        &self,
        periods: &[Period],
        metric: Metric,
        filter: &MetricFilter,
    ) -> AnalyticsResult<Vec<MetricSample>> {
        let mut samples = Vec::with_capacity(periods.len());
        for period in periods {
            samples.push(self.sample(period, metric, filter).await?);
        }
        Ok(samples)
    }
}
