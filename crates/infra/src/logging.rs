//! Tracing subscriber setup
//!
//! `RUST_LOG` wins over the configured level when set.

use std::sync::Once;

use presencesync_domain::{LogFormat, LoggingConfig};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

static INIT: Once = Once::new();

/// Install the global subscriber. Later calls are no-ops.
pub fn init(config: &LoggingConfig) {
    INIT.call_once(|| {
        let filter = env_filter(&config.level);
        let registry = tracing_subscriber::registry().with(filter);

        // try_init: a test harness may already own the global subscriber
        let _ = match config.format {
            LogFormat::Json => registry.with(fmt::layer().json().with_current_span(true)).try_init(),
            LogFormat::Pretty => registry.with(fmt::layer().with_target(true)).try_init(),
        };
    });
}

fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}
