use std::sync::Once;

use metrics::{Unit, describe_counter, describe_histogram};
use tracing_error::ErrorLayer;
use tracing_subscriber::{
    EnvFilter, fmt,
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
};

use crate::cache::metrics::{
    METRIC_CACHE_HIT, METRIC_CACHE_NOT_FOUND, METRIC_CACHE_REFRESH, METRIC_REFRESH_MS,
    METRIC_SOURCE_ERROR, METRIC_STORE_ERROR, METRIC_STORE_EVICT,
};
use crate::config::{LogFormat, LoggingSettings};

use super::error::InfraError;

static METRIC_DESCRIPTIONS: Once = Once::new();

/// Install a global tracing subscriber using the provided logging settings.
pub fn init(logging: &LoggingSettings) -> Result<(), InfraError> {
    describe_metrics();

    let env_filter = EnvFilter::builder()
        .with_default_directive(logging.level.into())
        .from_env_lossy();

    let fmt_layer = match logging.format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_target(true)
            .with_writer(std::io::stderr)
            .boxed(),
        LogFormat::Compact => fmt::layer()
            .compact()
            .with_target(true)
            .with_writer(std::io::stderr)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(ErrorLayer::default())
        .with(fmt_layer)
        .try_init()
        .map_err(|err| {
            InfraError::telemetry(format!("failed to install tracing subscriber: {err}"))
        })
}

pub fn describe_metrics() {
    METRIC_DESCRIPTIONS.call_once(|| {
        describe_counter!(
            METRIC_CACHE_HIT,
            Unit::Count,
            "Lookups answered from a fresh group snapshot."
        );
        describe_counter!(
            METRIC_CACHE_REFRESH,
            Unit::Count,
            "Group reloads from the system of record, labelled by reason."
        );
        describe_counter!(
            METRIC_CACHE_NOT_FOUND,
            Unit::Count,
            "Lookups whose id was absent from its fresh group."
        );
        describe_counter!(
            METRIC_STORE_ERROR,
            Unit::Count,
            "Store operations that failed and were absorbed."
        );
        describe_counter!(
            METRIC_SOURCE_ERROR,
            Unit::Count,
            "Range queries against the system of record that failed."
        );
        describe_counter!(
            METRIC_STORE_EVICT,
            Unit::Count,
            "In-memory store entries evicted due to capacity."
        );
        describe_histogram!(
            METRIC_REFRESH_MS,
            Unit::Milliseconds,
            "Group refresh latency in milliseconds."
        );
    });
}
