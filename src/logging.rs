//! Diagnostic logging setup.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Variable holding the filter directives.
pub const LOG_ENV: &str = "HOOK_LOG";

/// Build the filter from `HOOK_LOG`, defaulting to silence.
pub fn filter_from(value: Option<&str>) -> EnvFilter {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(directives) => {
            EnvFilter::try_new(directives).unwrap_or_else(|_| EnvFilter::new("off"))
        }
        None => EnvFilter::new("off"),
    }
}

/// Install a stderr subscriber; stdout carries only the decision.
pub fn init() {
    let value = std::env::var(LOG_ENV).ok();
    // A second init (e.g. from tests) is ignored.
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(filter_from(value.as_deref()))
        .try_init();
}
