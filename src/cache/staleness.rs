//! Staleness registry.
//!
//! One store entry maps group index -> stale flag. The map is always read and
//! written whole. Anything unknown counts as stale: a missing flag, a missing
//! map, an unreadable map.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::keys::{CacheKey, GroupIndex};
use super::metrics::store_error;
use super::store::{KvStore, StoreError};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StalenessMap {
    flags: BTreeMap<i64, bool>,
}

impl StalenessMap {
    /// Missing flags are stale.
    pub fn is_stale(&self, index: GroupIndex) -> bool {
        self.flags.get(&index.get()).copied().unwrap_or(true)
    }

    pub fn set(&mut self, index: GroupIndex, stale: bool) {
        self.flags.insert(index.get(), stale);
    }

    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }
}

pub struct StalenessRegistry {
    store: Arc<dyn KvStore>,
    key: String,
    ttl: Duration,
}

impl StalenessRegistry {
    pub fn new(store: Arc<dyn KvStore>, key_prefix: &str, ttl: Duration) -> Self {
        Self {
            store,
            key: CacheKey::Staleness.render(key_prefix),
            ttl,
        }
    }

    /// Current map, or `None` when it is absent or cannot be read.
    pub async fn load(&self) -> Option<StalenessMap> {
        let value = match self.store.get(&self.key).await {
            Ok(value) => value?,
            Err(err) => {
                store_error("staleness.load", &self.key, &err);
                return None;
            }
        };

        match serde_json::from_value(value) {
            Ok(map) => Some(map),
            Err(err) => {
                store_error("staleness.decode", &self.key, &StoreError::Codec(err.to_string()));
                None
            }
        }
    }

    /// Whether `index` must be refreshed before its snapshot is trusted.
    pub async fn is_stale(&self, index: GroupIndex) -> bool {
        self.load()
            .await
            .is_none_or(|map| map.is_stale(index))
    }

    /// Read-modify-write of the whole map.
    pub async fn mark(&self, index: GroupIndex, stale: bool) {
        let mut map = self.load().await.unwrap_or_default();
        map.set(index, stale);

        let value = match serde_json::to_value(&map) {
            Ok(value) => value,
            Err(err) => {
                store_error("staleness.encode", &self.key, &StoreError::Codec(err.to_string()));
                return;
            }
        };

        match self.store.set(&self.key, value, self.ttl).await {
            Ok(()) => debug!(group = %index, stale, "Staleness flag written"),
            Err(err) => store_error("staleness.mark", &self.key, &err),
        }
    }

    /// Drop the whole map, making every group stale.
    pub async fn clear_all(&self) {
        if let Err(err) = self.store.delete(&self.key).await {
            store_error("staleness.clear_all", &self.key, &err);
        }
    }
}
