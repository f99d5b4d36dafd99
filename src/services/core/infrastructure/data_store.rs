// Data Store Collaborator - Time-Scoped Aggregate Queries
// The document database behind the platform (votes, users, payments) is
// reached exclusively through this trait; the engine never sees raw records,
// only counts, sums and distinct-id sets scoped to a time window.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

use crate::services::core::analytics::period::Period;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("store query failed: {0}")]
    Query(String),
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("unknown collection: {0}")]
    UnknownCollection(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Time-range filter over one collection, scoped as
/// `start <= time_field < end`, with optional domain filters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordFilter {
    pub collection: String,
    pub time_field: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub event_id: Option<String>,
    pub category_id: Option<String>,
    pub currency: Option<String>,
}

impl RecordFilter {
    /// Filter scoped to a period's half-open window.
    pub fn scoped(collection: &str, time_field: &str, period: &Period) -> Self {
        Self {
            collection: collection.to_string(),
            time_field: time_field.to_string(),
            start: period.start,
            end: period.end,
            event_id: None,
            category_id: None,
            currency: None,
        }
    }

    pub fn with_event(mut self, event_id: Option<String>) -> Self {
        self.event_id = event_id;
        self
    }

    pub fn with_category(mut self, category_id: Option<String>) -> Self {
        self.category_id = category_id;
        self
    }

    pub fn with_currency(mut self, currency: Option<String>) -> Self {
        self.currency = currency;
        self
    }
}

/// Aggregate-query interface over the external document store.
///
/// Implementations decide how the scoping is expressed (aggregation
/// pipelines, SQL, in-memory scans); the engine only depends on the results.
/// Errors propagate unchanged - the engine neither retries nor swallows them.
#[async_trait]
pub trait DataStore: Send + Sync {
    /// Number of records matching the filter.
    async fn count(&self, filter: &RecordFilter) -> StoreResult<u64>;

    /// Sum of a numeric field over the matching records; 0.0 when none match.
    async fn sum(&self, filter: &RecordFilter, field: &str) -> StoreResult<f64>;

    /// Number of distinct values of a field over the matching records.
    async fn distinct_count(&self, filter: &RecordFilter, field: &str) -> StoreResult<u64>;

    /// Distinct values of a field over the matching records.
    async fn distinct_ids(&self, filter: &RecordFilter, field: &str)
        -> StoreResult<HashSet<String>>;
}
