//! Metric names emitted by the cache.

use metrics::counter;
use tracing::warn;

use super::store::StoreError;

pub const METRIC_CACHE_HIT: &str = "participant_cache_hit_total";
pub const METRIC_CACHE_REFRESH: &str = "participant_cache_refresh_total";
pub const METRIC_CACHE_NOT_FOUND: &str = "participant_cache_not_found_total";
pub const METRIC_STORE_ERROR: &str = "participant_cache_store_error_total";
pub const METRIC_SOURCE_ERROR: &str = "participant_cache_source_error_total";
pub const METRIC_REFRESH_MS: &str = "participant_cache_refresh_ms";
pub const METRIC_STORE_EVICT: &str = "participant_cache_store_evict_total";

/// Log and count a store failure the cache is about to absorb.
pub(crate) fn store_error(op: &'static str, key: &str, error: &StoreError) {
    counter!(METRIC_STORE_ERROR, "op" => op).increment(1);
    warn!(
        op,
        key,
        error = %error,
        result = "absorbed",
        "Cache store operation failed"
    );
}
