//! Logging setup and metric macros for the runner.

use anyhow::{anyhow, Result};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_FILTER: &str = "info,humus_world=debug,humus_runner=debug";

/// Install the global subscriber. `HUMUS_LOG_FORMAT=json` switches to JSON lines.
pub fn init_telemetry() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into());
    let json = std::env::var("HUMUS_LOG_FORMAT").is_ok_and(|format| format.eq_ignore_ascii_case("json"));

    let registry = tracing_subscriber::registry().with(filter);
    let installed = if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_target(true))
            .try_init()
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_target(true))
            .try_init()
    };
    installed.map_err(|e| anyhow!("failed to install tracing subscriber: {e}"))?;

    info!(json, "Telemetry initialized");
    Ok(())
}

/// Record a counter metric
#[macro_export]
macro_rules! record_counter {
    ($name:expr, $value:expr) => {
        tracing::info!(
            counter_name = $name,
            counter_value = $value,
            "Counter metric"
        );
    };
    ($name:expr, $value:expr, $($field:tt)+) => {
        tracing::info!(
            counter_name = $name,
            counter_value = $value,
            $($field)+,
            "Counter metric"
        );
    };
}

/// Record a gauge metric
#[macro_export]
macro_rules! record_gauge {
    ($name:expr, $value:expr) => {
        tracing::info!(
            gauge_name = $name,
            gauge_value = $value,
            "Gauge metric"
        );
    };
    ($name:expr, $value:expr, $($field:tt)+) => {
        tracing::info!(
            gauge_name = $name,
            gauge_value = $value,
            $($field)+,
            "Gauge metric"
        );
    };
}
