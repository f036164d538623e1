//! Cache configuration.
//!
//! Controls group partitioning and entry expiry via `participant-cache.toml`.

use std::num::{NonZeroU64, NonZeroUsize};
use std::time::Duration;

use serde::Deserialize;

// Default values for cache configuration
const DEFAULT_GROUP_SIZE: u64 = 100;
const DEFAULT_TTL_SECONDS: u64 = 24 * 60 * 60;
const DEFAULT_KEY_PREFIX: &str = "pdb";
const DEFAULT_MEMORY_CAPACITY: usize = 1024;

/// Cache configuration from `participant-cache.toml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Number of consecutive record ids held by one group snapshot.
    pub group_size: u64,
    /// Lifetime of group snapshots and of the staleness map, in seconds.
    pub ttl_seconds: u64,
    /// Prefix applied to every key written to the store.
    pub key_prefix: String,
    /// Maximum entries held by the in-memory store.
    pub memory_capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            group_size: DEFAULT_GROUP_SIZE,
            ttl_seconds: DEFAULT_TTL_SECONDS,
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
            memory_capacity: DEFAULT_MEMORY_CAPACITY,
        }
    }
}

impl From<&crate::config::CacheSettings> for CacheConfig {
    fn from(settings: &crate::config::CacheSettings) -> Self {
        Self {
            group_size: settings.group_size.get(),
            ttl_seconds: settings.ttl.as_secs(),
            key_prefix: settings.key_prefix.clone(),
            memory_capacity: settings.memory_capacity.get(),
        }
    }
}

impl CacheConfig {
    /// Returns the group size as NonZeroU64, clamping to 1 if zero.
    pub fn group_size_non_zero(&self) -> NonZeroU64 {
        NonZeroU64::new(self.group_size).unwrap_or(NonZeroU64::MIN)
    }

    /// Returns the memory store capacity as NonZeroUsize, clamping to 1 if zero.
    pub fn memory_capacity_non_zero(&self) -> NonZeroUsize {
        NonZeroUsize::new(self.memory_capacity).unwrap_or(NonZeroUsize::MIN)
    }

    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_values() {
        let config = CacheConfig::default();
        assert_eq!(config.group_size, 100);
        assert_eq!(config.ttl(), Duration::from_secs(86_400));
        assert_eq!(config.key_prefix, "pdb");
        assert_eq!(config.memory_capacity, 1024);
    }

    #[test]
    fn non_zero_clamps_to_min() {
        let config = CacheConfig {
            group_size: 0,
            memory_capacity: 0,
            ..Default::default()
        };
        assert_eq!(config.group_size_non_zero().get(), 1);
        assert_eq!(config.memory_capacity_non_zero().get(), 1);
    }

    #[test]
    fn deserializes_partial_tables() {
        let config: CacheConfig =
            serde_json::from_value(serde_json::json!({ "group_size": 25 })).expect("partial");
        assert_eq!(config.group_size, 25);
        assert_eq!(config.ttl_seconds, 86_400);
    }
}
