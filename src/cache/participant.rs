//! Read-through participant cache.
//!
//! Ids are partitioned into groups of `group_size`. A lookup loads the whole
//! owning group in one range query whenever its snapshot is missing or marked
//! stale, stores it, and answers from the snapshot.

use std::num::NonZeroU64;
use std::sync::Arc;
use std::time::Instant;

use metrics::{counter, histogram};
use tracing::{debug, error, info, instrument};

use crate::domain::{ParticipantId, ParticipantRecord};

use super::config::CacheConfig;
use super::keys::{CacheKey, GroupIndex};
use super::metrics::{
    METRIC_CACHE_HIT, METRIC_CACHE_NOT_FOUND, METRIC_CACHE_REFRESH, METRIC_REFRESH_MS,
    METRIC_SOURCE_ERROR, store_error,
};
use super::snapshot::GroupSnapshot;
use super::source::{ParticipantSource, SourceError};
use super::staleness::StalenessRegistry;
use super::store::KvStore;

/// A record id resolved to its group and snapshot key.
#[derive(Debug, Clone)]
struct GroupLookup {
    index: GroupIndex,
    key: String,
}

/// Why a group is being reloaded.
#[derive(Debug, Clone, Copy)]
enum RefreshReason {
    Missing,
    Stale,
}

impl RefreshReason {
    fn as_str(self) -> &'static str {
        match self {
            Self::Missing => "missing",
            Self::Stale => "stale",
        }
    }
}

pub struct ParticipantCache {
    config: CacheConfig,
    group_size: NonZeroU64,
    store: Arc<dyn KvStore>,
    source: Arc<dyn ParticipantSource>,
    staleness: StalenessRegistry,
}

impl ParticipantCache {
    pub fn new(
        config: CacheConfig,
        store: Arc<dyn KvStore>,
        source: Arc<dyn ParticipantSource>,
    ) -> Self {
        let group_size = config.group_size_non_zero();
        let staleness = StalenessRegistry::new(store.clone(), &config.key_prefix, config.ttl());
        Self {
            config,
            group_size,
            store,
            source,
            staleness,
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Group owning `id`.
    pub fn group_of(&self, id: ParticipantId) -> GroupIndex {
        GroupIndex::of(id, self.group_size)
    }

    fn lookup(&self, id: ParticipantId) -> GroupLookup {
        let index = self.group_of(id);
        GroupLookup {
            index,
            key: CacheKey::GroupSnapshot(index).render(&self.config.key_prefix),
        }
    }

    /// Current record for `id`, or `None` when the fresh group does not hold it.
    ///
    /// Not found is an ordinary outcome (deleted or never created ids), never
    /// an error. A failed range query also yields `None` and leaves the store
    /// untouched so the next call retries.
    pub async fn get_participant(&self, id: ParticipantId) -> Option<ParticipantRecord> {
        self.try_get_participant(id).await.ok().flatten()
    }

    /// Like [`get_participant`](Self::get_participant), but a failed range
    /// query is returned instead of being folded into "not found".
    #[instrument(skip(self))]
    pub async fn try_get_participant(
        &self,
        id: ParticipantId,
    ) -> Result<Option<ParticipantRecord>, SourceError> {
        let lookup = self.lookup(id);
        let snapshot = self.fresh_snapshot(&lookup).await?;

        let record = snapshot.get(id).cloned();
        if record.is_none() {
            counter!(METRIC_CACHE_NOT_FOUND).increment(1);
            debug!(group = %lookup.index, "Participant not present in group snapshot");
        }
        Ok(record)
    }

    /// Fresh snapshot of the group owning `id`, `None` when the reload failed.
    #[instrument(skip(self))]
    pub async fn group_snapshot(&self, id: ParticipantId) -> Option<GroupSnapshot> {
        let lookup = self.lookup(id);
        self.fresh_snapshot(&lookup).await.ok()
    }

    /// Delete the owning group's snapshot. The staleness map is left alone.
    #[instrument(skip(self))]
    pub async fn clear_cache(&self, id: ParticipantId) {
        let lookup = self.lookup(id);
        match self.store.delete(&lookup.key).await {
            Ok(()) => debug!(group = %lookup.index, "Group snapshot cleared"),
            Err(err) => store_error("snapshot.clear", &lookup.key, &err),
        }
    }

    /// Flag the owning group stale so the next read reloads it.
    ///
    /// Call after any write to the system of record touching `id`.
    #[instrument(skip(self))]
    pub async fn is_now_stale(&self, id: ParticipantId) {
        let index = self.group_of(id);
        self.staleness.mark(index, true).await;
    }

    /// Drop the staleness map, invalidating every group at once.
    #[instrument(skip(self))]
    pub async fn make_all_stale(&self) {
        self.staleness.clear_all().await;
        info!("All participant cache groups marked stale");
    }

    async fn fresh_snapshot(&self, lookup: &GroupLookup) -> Result<GroupSnapshot, SourceError> {
        let Some(cached) = self.read_snapshot(lookup).await else {
            return self.refresh(lookup, RefreshReason::Missing).await;
        };

        if self.staleness.is_stale(lookup.index).await {
            return self.refresh(lookup, RefreshReason::Stale).await;
        }

        counter!(METRIC_CACHE_HIT).increment(1);
        Ok(cached)
    }

    async fn read_snapshot(&self, lookup: &GroupLookup) -> Option<GroupSnapshot> {
        let value = match self.store.get(&lookup.key).await {
            Ok(value) => value?,
            Err(err) => {
                store_error("snapshot.get", &lookup.key, &err);
                return None;
            }
        };

        match GroupSnapshot::from_value(value) {
            Ok(snapshot) => Some(snapshot),
            Err(err) => {
                store_error("snapshot.decode", &lookup.key, &err);
                None
            }
        }
    }

    async fn refresh(
        &self,
        lookup: &GroupLookup,
        reason: RefreshReason,
    ) -> Result<GroupSnapshot, SourceError> {
        let started_at = Instant::now();
        let (first, last) = lookup.index.bounds(self.group_size);

        let records = match self.source.fetch_range(first, last).await {
            Ok(records) => records,
            Err(err) => {
                counter!(METRIC_SOURCE_ERROR).increment(1);
                error!(
                    group = %lookup.index,
                    first,
                    last,
                    error = %err,
                    "Participant group refresh failed; nothing cached"
                );
                return Err(err);
            }
        };

        let snapshot = GroupSnapshot::from_records(lookup.index, records);
        let ttl = self.config.ttl();

        match snapshot.to_value() {
            Ok(value) => {
                if let Err(err) = self.store.set(&lookup.key, value, ttl).await {
                    store_error("snapshot.set", &lookup.key, &err);
                }
            }
            Err(err) => store_error("snapshot.encode", &lookup.key, &err),
        }
        self.staleness.mark(lookup.index, false).await;

        let elapsed_ms = started_at.elapsed().as_secs_f64() * 1000.0;
        counter!(METRIC_CACHE_REFRESH, "reason" => reason.as_str()).increment(1);
        histogram!(METRIC_REFRESH_MS).record(elapsed_ms);
        debug!(
            group = %lookup.index,
            reason = reason.as_str(),
            records = snapshot.len(),
            elapsed_ms,
            "Participant group refreshed"
        );

        Ok(snapshot)
    }
}
