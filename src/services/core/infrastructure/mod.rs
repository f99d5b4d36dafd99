// src/services/core/infrastructure/mod.rs

pub mod cache;
pub mod data_store;

pub use cache::{CacheGate, CacheKeyBuilder, CacheStore, CacheTtl, Cached, KeyPrefix};
pub use data_store::{DataStore, RecordFilter, StoreError};
