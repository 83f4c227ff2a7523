use std::sync::Once;

use metrics::{Unit, describe_counter, describe_histogram};
use tracing_error::ErrorLayer;
use tracing_subscriber::{
    EnvFilter, fmt,
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
};

use crate::{
    application::target::{METRIC_RESOLUTION_NOT_FOUND, METRIC_RESOLUTION_PROBES},
    cache::{METRIC_TARGET_CACHE_HIT, METRIC_TARGET_CACHE_MISS, METRIC_TARGET_CACHE_STORE},
    config::{LogFormat, LoggingSettings},
};

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

pub fn describe_metrics() {
    METRIC_DESCRIPTIONS.call_once(|| {
        describe_counter!(
            METRIC_TARGET_CACHE_HIT,
            Unit::Count,
            "Total number of resolutions answered from the target cache."
        );
        describe_counter!(
            METRIC_TARGET_CACHE_MISS,
            Unit::Count,
            "Total number of resolutions that had to search the content store."
        );
        describe_counter!(
            METRIC_TARGET_CACHE_STORE,
            Unit::Count,
            "Total number of verified targets written to the target cache."
        );
        describe_counter!(
            METRIC_RESOLUTION_NOT_FOUND,
            Unit::Count,
            "Total number of searches that exhausted every fallback level."
        );
        describe_histogram!(
            METRIC_RESOLUTION_PROBES,
            Unit::Count,
            "Existence probes issued per fallback search."
        );
    });
}
