//! Key/value storage with per-entry expiry.
//!
//! The cache only needs get/set/delete of JSON values by string key. Entries
//! expire independently; an expired entry reads exactly like a missing one.

use std::sync::Mutex;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use lru::LruCache;
use metrics::counter;
use serde_json::Value;
use thiserror::Error;

use super::config::CacheConfig;
use super::lock::mutex_lock;
use super::metrics::METRIC_STORE_EVICT;

const SOURCE: &str = "cache::store";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("store value could not be encoded: {0}")]
    Codec(String),
}

impl StoreError {
    pub fn unavailable(err: impl std::fmt::Display) -> Self {
        Self::Unavailable(err.to_string())
    }
}

/// Generic key/value store with expiry, supplied by the host environment.
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Fetch a live entry. Expired entries return `Ok(None)`.
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError>;

    /// Write an entry that expires after `ttl`, replacing any previous value.
    async fn set(&self, key: &str, value: Value, ttl: Duration) -> Result<(), StoreError>;

    /// Remove an entry. Removing a missing key is not an error.
    async fn delete(&self, key: &str) -> Result<(), StoreError>;
}

struct Entry {
    value: Value,
    expires_at: Instant,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

/// Process-local store.
///
/// Bounded by `memory_capacity`; an entry pushed out by capacity behaves like
/// an expired one.
pub struct MemoryKvStore {
    entries: Mutex<LruCache<String, Entry>>,
}

impl MemoryKvStore {
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            entries: Mutex::new(LruCache::new(config.memory_capacity_non_zero())),
        }
    }

    /// Number of entries currently held, expired ones included.
    pub fn len(&self) -> usize {
        mutex_lock(&self.entries, SOURCE, "len").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop expired entries, returning how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = mutex_lock(&self.entries, SOURCE, "purge_expired");
        let expired: Vec<String> = entries
            .iter()
            .filter(|(_, entry)| !entry.is_live(now))
            .map(|(key, _)| key.clone())
            .collect();
        for key in &expired {
            entries.pop(key);
        }
        expired.len()
    }
}

#[async_trait]
impl KvStore for MemoryKvStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        let now = Instant::now();
        let mut entries = mutex_lock(&self.entries, SOURCE, "get");
        let lookup = entries
            .get(key)
            .map(|entry| entry.is_live(now).then(|| entry.value.clone()));
        match lookup {
            Some(Some(value)) => Ok(Some(value)),
            Some(None) => {
                entries.pop(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: Value, ttl: Duration) -> Result<(), StoreError> {
        let expires_at = Instant::now()
            .checked_add(ttl)
            .ok_or_else(|| StoreError::Codec(format!("ttl {ttl:?} overflows the clock")))?;
        let evicted = mutex_lock(&self.entries, SOURCE, "set")
            .push(key.to_string(), Entry { value, expires_at })
            .filter(|(evicted_key, _)| evicted_key != key);
        if evicted.is_some() {
            counter!(METRIC_STORE_EVICT).increment(1);
        }
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        mutex_lock(&self.entries, SOURCE, "delete").pop(key);
        Ok(())
    }
}
