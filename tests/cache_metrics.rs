use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use metrics_util::debugging::DebuggingRecorder;
use participant_cache::cache::{
    CacheConfig, KvStore, MemoryKvStore, ParticipantCache, ParticipantSource, SourceError,
    StoreError,
};
use participant_cache::domain::{ParticipantId, ParticipantRecord};
use serde_json::Value;

struct FixedSource;

#[async_trait]
impl ParticipantSource for FixedSource {
    async fn fetch_range(
        &self,
        first: i64,
        last: i64,
    ) -> Result<Vec<ParticipantRecord>, SourceError> {
        if first < 0 {
            return Err(SourceError::query("negative ranges are offline"));
        }
        Ok((first..=last)
            .filter(|id| id % 2 == 0)
            .map(|id| ParticipantRecord::new(ParticipantId::new(id)))
            .collect())
    }
}

struct DownStore;

#[async_trait]
impl KvStore for DownStore {
    async fn get(&self, _key: &str) -> Result<Option<Value>, StoreError> {
        Err(StoreError::unavailable("connection refused"))
    }

    async fn set(&self, _key: &str, _value: Value, _ttl: Duration) -> Result<(), StoreError> {
        Err(StoreError::unavailable("connection refused"))
    }

    async fn delete(&self, _key: &str) -> Result<(), StoreError> {
        Err(StoreError::unavailable("connection refused"))
    }
}

#[tokio::test]
async fn cache_paths_emit_expected_metric_keys() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();
    recorder
        .install()
        .expect("debug metrics recorder should install in this test process");

    // hit, refresh, not found
    let config = CacheConfig::default();
    let store = Arc::new(MemoryKvStore::new(&config));
    let cache = ParticipantCache::new(config, store, Arc::new(FixedSource));
    assert!(cache.get_participant(ParticipantId::new(2)).await.is_some());
    assert!(cache.get_participant(ParticipantId::new(3)).await.is_none());

    // source failure
    assert!(cache.get_participant(ParticipantId::new(-5)).await.is_none());

    // capacity eviction
    let evicting = MemoryKvStore::new(&CacheConfig {
        memory_capacity: 1,
        ..Default::default()
    });
    evicting
        .set("a", Value::Null, Duration::from_secs(60))
        .await
        .expect("memory set");
    evicting
        .set("b", Value::Null, Duration::from_secs(60))
        .await
        .expect("memory set");

    // absorbed store errors
    let degraded = ParticipantCache::new(
        CacheConfig::default(),
        Arc::new(DownStore),
        Arc::new(FixedSource),
    );
    assert!(degraded.get_participant(ParticipantId::new(4)).await.is_some());

    let names: HashSet<String> = snapshotter
        .snapshot()
        .into_vec()
        .into_iter()
        .map(|(composite_key, _, _, _)| composite_key.key().name().to_string())
        .collect();

    let expected = [
        "participant_cache_hit_total",
        "participant_cache_refresh_total",
        "participant_cache_not_found_total",
        "participant_cache_store_error_total",
        "participant_cache_source_error_total",
        "participant_cache_refresh_ms",
        "participant_cache_store_evict_total",
    ];

    for metric in expected {
        assert!(names.contains(metric), "missing metric: {metric}");
    }
}
