// Cache Gate - Read-Through Caching Over the External Cache Collaborator
// Consolidates every cache decision (keys, TTLs, envelopes, invalidation) so
// the calculators stay pure and recomputation is avoided per (metric,
// period, filters) key.

use async_trait::async_trait;
use chrono::Utc;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::future::Future;
use std::sync::Mutex;
use thiserror::Error;

use crate::utils::{AnalyticsResult, Logger};

#[derive(Error, Debug)]
pub enum CacheBackendError {
    #[error("cache backend error: {0}")]
    Backend(String),
    #[error("cache serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type CacheResult<T> = Result<T, CacheBackendError>;

/// Interface over the external transient cache (Redis in production).
///
/// Values are opaque strings; the gate owns serialization. Concurrent writes
/// to one key are last-write-wins; no cross-key guarantees exist.
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &str) -> CacheResult<Option<String>>;
    async fn set(&self, key: &str, value: &str, ttl_seconds: u64) -> CacheResult<bool>;
    async fn delete(&self, key: &str) -> CacheResult<bool>;
    async fn increment(&self, key: &str) -> CacheResult<i64>;
    async fn clear_all(&self) -> CacheResult<()>;
}

/// Standard TTL policies for different result types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheTtl {
    /// Very short-lived data (30 seconds) - live velocity snapshots
    RealTime = 30,
    /// Short-lived data (5 minutes) - dashboard fan-out results
    Short = 300,
    /// Medium-lived data (1 hour) - growth series, forecasts
    Medium = 3600,
    /// Long-lived data (24 hours) - closed historical windows
    Long = 86400,
}

impl CacheTtl {
    pub fn as_seconds(&self) -> u64 {
        *self as u64
    }
}

/// Standard key prefixes for the analytics domains
#[derive(Debug, Clone, Copy)]
pub enum KeyPrefix {
    Growth,
    Velocity,
    Retention,
    Forecast,
    Comprehensive,
    Metrics,
}

impl KeyPrefix {
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyPrefix::Growth => "growth",
            KeyPrefix::Velocity => "velocity",
            KeyPrefix::Retention => "retention",
            KeyPrefix::Forecast => "forecast",
            KeyPrefix::Comprehensive => "comprehensive",
            KeyPrefix::Metrics => "metrics",
        }
    }
}

/// Standardized cache key builder (`prefix:component:component:...`)
#[derive(Debug, Clone)]
pub struct CacheKeyBuilder {
    prefix: KeyPrefix,
    components: Vec<String>,
}

impl CacheKeyBuilder {
    pub fn new(prefix: KeyPrefix) -> Self {
        Self {
            prefix,
            components: Vec::new(),
        }
    }

    pub fn add_component<T: ToString>(mut self, component: T) -> Self {
        self.components.push(component.to_string());
        self
    }

    pub fn build(self) -> String {
        let mut key = format!("analytics:{}", self.prefix.as_str());
        for component in self.components {
            key.push(':');
            key.push_str(&component);
        }
        key
    }
}

/// Serialized wrapper stored in the backend alongside its own expiry, so a
/// backend that ignores TTLs still never serves stale data.
#[derive(Debug, Clone, Deserialize)]
struct CachedEnvelope<T> {
    data: T,
    #[allow(dead_code)]
    cached_at: i64,
    expires_at: i64,
}

/// Borrowing twin of `CachedEnvelope` used on the write path.
#[derive(Serialize)]
struct CachedEnvelopeRef<'a, T> {
    data: &'a T,
    cached_at: i64,
    expires_at: i64,
}

/// Result of a gated computation, tagged with cache provenance
#[derive(Debug, Clone)]
pub struct Cached<T> {
    pub data: T,
    pub cached: bool,
}

/// Hit/miss counters for monitoring
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CacheGateStats {
    pub hits: u64,
    pub misses: u64,
    pub writes: u64,
    pub write_failures: u64,
}

impl CacheGateStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Read-through cache wrapper around any computation.
pub struct CacheGate {
    store: std::sync::Arc<dyn CacheStore>,
    stats: Mutex<CacheGateStats>,
    logger: Logger,
}

impl CacheGate {
    pub fn new(store: std::sync::Arc<dyn CacheStore>, logger: Logger) -> Self {
        Self {
            store,
            stats: Mutex::new(CacheGateStats::default()),
            logger,
        }
    }

    /// Look up `key`; on a live hit return the cached value tagged
    /// `cached: true`, otherwise run `compute`, write through with `ttl` and
    /// return the fresh value tagged `cached: false`. `force_refresh`
    /// bypasses the lookup but still writes through. Cache backend failures
    /// degrade to recomputation - they never fail the request.
    pub async fn get_or_compute<T, F, Fut>(
        &self,
        key: &str,
        ttl: CacheTtl,
        force_refresh: bool,
        compute: F,
    ) -> AnalyticsResult<Cached<T>>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = AnalyticsResult<T>>,
    {
        let now_ms = Utc::now().timestamp_millis();

        if !force_refresh {
            match self.store.get(key).await {
                Ok(Some(raw)) => match serde_json::from_str::<CachedEnvelope<T>>(&raw) {
                    Ok(envelope) if envelope.expires_at > now_ms => {
                        self.record(CacheOp::Hit);
                        return Ok(Cached {
                            data: envelope.data,
                            cached: true,
                        });
                    }
                    Ok(_) => {
                        // Expired envelope still present in the backend
                        let _ = self.store.delete(key).await;
                    }
                    Err(e) => {
                        self.logger.warn(&format!(
                            "Discarding undecodable cache entry '{}': {}",
                            key, e
                        ));
                        let _ = self.store.delete(key).await;
                    }
                },
                Ok(None) => {}
                Err(e) => {
                    self.logger
                        .warn(&format!("Cache lookup failed for '{}': {}", key, e));
                }
            }
        }

        self.record(CacheOp::Miss);
        let data = compute().await?;

        let envelope = CachedEnvelopeRef {
            data: &data,
            cached_at: now_ms,
            expires_at: now_ms + (ttl.as_seconds() as i64) * 1000,
        };
        match serde_json::to_string(&envelope) {
            Ok(serialized) => match self.store.set(key, &serialized, ttl.as_seconds()).await {
                Ok(_) => self.record(CacheOp::Write),
                Err(e) => {
                    self.record(CacheOp::WriteFailure);
                    self.logger
                        .warn(&format!("Cache write failed for '{}': {}", key, e));
                }
            },
            Err(e) => {
                self.record(CacheOp::WriteFailure);
                self.logger
                    .warn(&format!("Cache envelope serialization failed: {}", e));
            }
        }

        Ok(Cached {
            data,
            cached: false,
        })
    }

    /// Drop all entries sharing a key prefix.
    ///
    /// Known limitation: the cache collaborator exposes no prefix scan, so
    /// this clears the whole cache rather than just the prefix. Coarse, but
    /// explicit - callers invalidating one domain pay with a cold cache for
    /// the others.
    pub async fn clear_prefix(&self, prefix: &str) -> AnalyticsResult<()> {
        self.logger.info(&format!(
            "Invalidating cache prefix '{}' via full clear (no prefix scan in backend)",
            prefix
        ));
        self.store.clear_all().await.map_err(Into::into)
    }

    pub fn stats(&self) -> CacheGateStats {
        self.stats.lock().map(|s| s.clone()).unwrap_or_default()
    }

    fn record(&self, op: CacheOp) {
        if let Ok(mut stats) = self.stats.lock() {
            match op {
                CacheOp::Hit => stats.hits += 1,
                CacheOp::Miss => stats.misses += 1,
                CacheOp::Write => stats.writes += 1,
                CacheOp::WriteFailure => stats.write_failures += 1,
            }
        }
    }

    /// Mirror the in-process counters into the backend for dashboards.
    pub async fn flush_stats(&self, op_name: &str) {
        let key = CacheKeyBuilder::new(KeyPrefix::Metrics)
            .add_component("cache")
            .add_component(op_name)
            .build();
        // Fire and forget
        let _ = self.store.increment(&key).await;
    }
}

enum CacheOp {
    Hit,
    Miss,
    Write,
    WriteFailure,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::LogLevel;
    use std::collections::HashMap;
    use std::sync::Arc;

    #[derive(Default)]
    struct MemoryStore {
        entries: Mutex<HashMap<String, String>>,
    }

    #[async_trait]
    impl CacheStore for MemoryStore {
        async fn get(&self, key: &str) -> CacheResult<Option<String>> {
            let entries = self
                .entries
                .lock()
                .map_err(|e| CacheBackendError::Backend(e.to_string()))?;
            Ok(entries.get(key).cloned())
        }

        async fn set(&self, key: &str, value: &str, _ttl_seconds: u64) -> CacheResult<bool> {
            let mut entries = self
                .entries
                .lock()
                .map_err(|e| CacheBackendError::Backend(e.to_string()))?;
            entries.insert(key.to_string(), value.to_string());
            Ok(true)
        }

        async fn delete(&self, key: &str) -> CacheResult<bool> {
            let mut entries = self
                .entries
                .lock()
                .map_err(|e| CacheBackendError::Backend(e.to_string()))?;
            Ok(entries.remove(key).is_some())
        }

        async fn increment(&self, key: &str) -> CacheResult<i64> {
            let mut entries = self
                .entries
                .lock()
                .map_err(|e| CacheBackendError::Backend(e.to_string()))?;
            let next = entries
                .get(key)
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(0)
                + 1;
            entries.insert(key.to_string(), next.to_string());
            Ok(next)
        }

        async fn clear_all(&self) -> CacheResult<()> {
            let mut entries = self
                .entries
                .lock()
                .map_err(|e| CacheBackendError::Backend(e.to_string()))?;
            entries.clear();
            Ok(())
        }
    }

    fn gate() -> CacheGate {
        CacheGate::new(Arc::new(MemoryStore::default()), Logger::new(LogLevel::Error))
    }

    #[test]
    fn test_second_read_hits_the_cache() {
        tokio_test::block_on(async {
            let gate = gate();

            let first = gate
                .get_or_compute("k", CacheTtl::Short, false, || async { Ok(7u32) })
                .await
                .unwrap();
            let second = gate
                .get_or_compute("k", CacheTtl::Short, false, || async { Ok(9u32) })
                .await
                .unwrap();

            assert!(!first.cached);
            assert!(second.cached);
            assert_eq!(second.data, 7);

            let stats = gate.stats();
            assert_eq!(stats.hits, 1);
            assert_eq!(stats.misses, 1);
        });
    }

    #[test]
    fn test_force_refresh_bypasses_the_lookup() {
        tokio_test::block_on(async {
            let gate = gate();

            gate.get_or_compute("k", CacheTtl::Short, false, || async { Ok(1u32) })
                .await
                .unwrap();
            let refreshed = gate
                .get_or_compute("k", CacheTtl::Short, true, || async { Ok(2u32) })
                .await
                .unwrap();

            assert!(!refreshed.cached);
            assert_eq!(refreshed.data, 2);
            assert_eq!(gate.stats().writes, 2);
        });
    }

    #[test]
    fn test_compute_error_propagates() {
        tokio_test::block_on(async {
            let gate = gate();

            let result = gate
                .get_or_compute::<u32, _, _>("k", CacheTtl::Short, false, || async {
                    Err(crate::utils::AnalyticsError::internal_error("boom"))
                })
                .await;

            assert!(result.is_err());
            assert_eq!(gate.stats().writes, 0);
        });
    }

    #[test]
    fn test_key_builder() {
        let key = CacheKeyBuilder::new(KeyPrefix::Growth)
            .add_component("votes")
            .add_component("daily")
            .build();

        assert_eq!(key, "analytics:growth:votes:daily");
    }

    #[test]
    fn test_ttl_values() {
        assert_eq!(CacheTtl::RealTime.as_seconds(), 30);
        assert_eq!(CacheTtl::Short.as_seconds(), 300);
        assert_eq!(CacheTtl::Medium.as_seconds(), 3600);
        assert_eq!(CacheTtl::Long.as_seconds(), 86400);
    }

    #[test]
    fn test_hit_rate() {
        let stats = CacheGateStats {
            hits: 3,
            misses: 1,
            writes: 1,
            write_failures: 0,
        };
        assert_eq!(stats.hit_rate(), 0.75);
        assert_eq!(CacheGateStats::default().hit_rate(), 0.0);
    }
}
