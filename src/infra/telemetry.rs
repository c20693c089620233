use std::sync::Once;

use metrics::{Unit, describe_counter, describe_histogram};
use tracing_error::ErrorLayer;
use tracing_subscriber::{
    EnvFilter, fmt,
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
};

use crate::application::products::{
    METRIC_CACHE_ERROR, METRIC_REPORT_CACHE_HIT, METRIC_REPORT_CACHE_MISS,
    METRIC_REPORT_INVALIDATED,
};
use crate::cache::METRIC_CACHE_OP_MS;
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
            .boxed(),
        LogFormat::Compact => fmt::layer().compact().with_target(true).boxed(),
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

fn describe_metrics() {
    METRIC_DESCRIPTIONS.call_once(|| {
        describe_counter!(
            METRIC_REPORT_CACHE_HIT,
            Unit::Count,
            "Total number of product reports served from the cache."
        );
        describe_counter!(
            METRIC_REPORT_CACHE_MISS,
            Unit::Count,
            "Total number of product reports computed from the database."
        );
        describe_counter!(
            METRIC_REPORT_INVALIDATED,
            Unit::Count,
            "Total number of cached report invalidations after product writes."
        );
        describe_counter!(
            METRIC_CACHE_ERROR,
            Unit::Count,
            "Total number of cache failures swallowed by the product service."
        );
        describe_histogram!(
            METRIC_CACHE_OP_MS,
            Unit::Milliseconds,
            "Redis operation latency in milliseconds."
        );
    });
}
