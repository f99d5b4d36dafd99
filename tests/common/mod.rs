// tests/common/mod.rs
// In-memory collaborators for integration tests: a seedable document store
// and a cache backend with switchable failure injection.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use vote_pulse::services::core::infrastructure::cache::{CacheBackendError, CacheResult, CacheStore};
use vote_pulse::services::core::infrastructure::data_store::{
    DataStore, RecordFilter, StoreError, StoreResult,
};

/// One seeded document. Only the fields the aggregate queries touch.
#[derive(Debug, Clone)]
pub struct MockRecord {
    pub collection: &'static str,
    pub created_at: DateTime<Utc>,
    pub last_active_at: Option<DateTime<Utc>>,
    pub user_id: Option<String>,
    pub event_id: Option<String>,
    pub category_id: Option<String>,
    pub currency: Option<String>,
    pub amount: f64,
}

impl MockRecord {
    pub fn vote(created_at: DateTime<Utc>) -> Self {
        Self {
            collection: "votes",
            created_at,
            last_active_at: None,
            user_id: None,
            event_id: None,
            category_id: None,
            currency: None,
            amount: 0.0,
        }
    }

    pub fn user(id: &str, created_at: DateTime<Utc>, last_active_at: DateTime<Utc>) -> Self {
        Self {
            collection: "users",
            created_at,
            last_active_at: Some(last_active_at),
            user_id: Some(id.to_string()),
            event_id: None,
            category_id: None,
            currency: None,
            amount: 0.0,
        }
    }

    pub fn payment(created_at: DateTime<Utc>, amount: f64, currency: &str) -> Self {
        Self {
            collection: "payments",
            created_at,
            last_active_at: None,
            user_id: None,
            event_id: None,
            category_id: None,
            currency: Some(currency.to_string()),
            amount,
        }
    }

    pub fn for_event(mut self, event_id: &str) -> Self {
        self.event_id = Some(event_id.to_string());
        self
    }

    fn timestamp(&self, time_field: &str) -> Option<DateTime<Utc>> {
        match time_field {
            "created_at" => Some(self.created_at),
            "last_active_at" => self.last_active_at,
            _ => None,
        }
    }

    fn matches(&self, filter: &RecordFilter) -> bool {
        if self.collection != filter.collection {
            return false;
        }
        let ts = match self.timestamp(&filter.time_field) {
            Some(ts) => ts,
            None => return false,
        };
        if ts < filter.start || ts >= filter.end {
            return false;
        }
        if let Some(event_id) = &filter.event_id {
            if self.event_id.as_ref() != Some(event_id) {
                return false;
            }
        }
        if let Some(category_id) = &filter.category_id {
            if self.category_id.as_ref() != Some(category_id) {
                return false;
            }
        }
        if let Some(currency) = &filter.currency {
            if self.currency.as_ref() != Some(currency) {
                return false;
            }
        }
        true
    }
}

/// Seedable in-memory document store with per-collection failure injection.
#[derive(Default)]
pub struct MockDataStore {
    records: Vec<MockRecord>,
    failing_collections: HashSet<String>,
}

impl MockDataStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(mut self, records: Vec<MockRecord>) -> Self {
        self.records.extend(records);
        self
    }

    pub fn fail_collection(mut self, collection: &str) -> Self {
        self.failing_collections.insert(collection.to_string());
        self
    }

    /// Seed `count` vote records spread inside `[start, start + span)`.
    pub fn seed_votes(mut self, start: DateTime<Utc>, span: Duration, count: usize) -> Self {
        let step = span / (count.max(1) as i32);
        for i in 0..count {
            self.records
                .push(MockRecord::vote(start + step * (i as i32)));
        }
        self
    }

    fn check_available(&self, filter: &RecordFilter) -> StoreResult<()> {
        if self.failing_collections.contains(&filter.collection) {
            return Err(StoreError::Unavailable(format!(
                "collection '{}' is down",
                filter.collection
            )));
        }
        Ok(())
    }

    fn matching(&self, filter: &RecordFilter) -> Vec<&MockRecord> {
        self.records.iter().filter(|r| r.matches(filter)).collect()
    }
}

#[async_trait]
impl DataStore for MockDataStore {
    async fn count(&self, filter: &RecordFilter) -> StoreResult<u64> {
        self.check_available(filter)?;
        Ok(self.matching(filter).len() as u64)
    }

    async fn sum(&self, filter: &RecordFilter, field: &str) -> StoreResult<f64> {
        self.check_available(filter)?;
        match field {
            "amount" => Ok(self.matching(filter).iter().map(|r| r.amount).sum()),
            other => Err(StoreError::Query(format!("unknown sum field '{}'", other))),
        }
    }

    async fn distinct_count(&self, filter: &RecordFilter, field: &str) -> StoreResult<u64> {
        let ids = self.distinct_ids(filter, field).await?;
        Ok(ids.len() as u64)
    }

    async fn distinct_ids(
        &self,
        filter: &RecordFilter,
        field: &str,
    ) -> StoreResult<HashSet<String>> {
        self.check_available(filter)?;
        match field {
            "user_id" => Ok(self
                .matching(filter)
                .iter()
                .filter_map(|r| r.user_id.clone())
                .collect()),
            other => Err(StoreError::Query(format!(
                "unknown distinct field '{}'",
                other
            ))),
        }
    }
}

/// In-memory cache backend. TTLs are honored on read; `set_failing(true)`
/// makes every operation return a backend error.
pub struct MockCacheStore {
    entries: Mutex<HashMap<String, (String, i64)>>,
    failing: AtomicBool,
}

impl MockCacheStore {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            failing: AtomicBool::new(false),
        }
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn keys(&self) -> Vec<String> {
        self.entries
            .lock()
            .map(|e| e.keys().cloned().collect())
            .unwrap_or_default()
    }

    fn check_available(&self) -> CacheResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(CacheBackendError::Backend("cache is down".to_string()));
        }
        Ok(())
    }
}

impl Default for MockCacheStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheStore for MockCacheStore {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        self.check_available()?;
        let entries = self
            .entries
            .lock()
            .map_err(|e| CacheBackendError::Backend(e.to_string()))?;
        let now_ms = Utc::now().timestamp_millis();
        Ok(entries
            .get(key)
            .filter(|(_, expires_at)| *expires_at > now_ms)
            .map(|(value, _)| value.clone()))
    }

    async fn set(&self, key: &str, value: &str, ttl_seconds: u64) -> CacheResult<bool> {
        self.check_available()?;
        let mut entries = self
            .entries
            .lock()
            .map_err(|e| CacheBackendError::Backend(e.to_string()))?;
        let expires_at = Utc::now().timestamp_millis() + (ttl_seconds as i64) * 1000;
        entries.insert(key.to_string(), (value.to_string(), expires_at));
        Ok(true)
    }

    async fn delete(&self, key: &str) -> CacheResult<bool> {
        self.check_available()?;
        let mut entries = self
            .entries
            .lock()
            .map_err(|e| CacheBackendError::Backend(e.to_string()))?;
        Ok(entries.remove(key).is_some())
    }

    async fn increment(&self, key: &str) -> CacheResult<i64> {
        self.check_available()?;
        let mut entries = self
            .entries
            .lock()
            .map_err(|e| CacheBackendError::Backend(e.to_string()))?;
        let expires_at = Utc::now().timestamp_millis() + 86_400_000;
        let next = entries
            .get(key)
            .and_then(|(value, _)| value.parse::<i64>().ok())
            .unwrap_or(0)
            + 1;
        entries.insert(key.to_string(), (next.to_string(), expires_at));
        Ok(next)
    }

    async fn clear_all(&self) -> CacheResult<()> {
        self.check_available()?;
        let mut entries = self
            .entries
            .lock()
            .map_err(|e| CacheBackendError::Backend(e.to_string()))?;
        entries.clear();
        Ok(())
    }
}
