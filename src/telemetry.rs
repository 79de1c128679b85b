//! Logging setup.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LoggingConfig;

/// Filter used for the subscriber: `RUST_LOG` when set, otherwise the
/// configured directives, otherwise `info`.
pub fn env_filter(config: &LoggingConfig) -> EnvFilter {
    match std::env::var("RUST_LOG") {
        Ok(directives) if !directives.trim().is_empty() => EnvFilter::new(directives),
        _ => EnvFilter::try_new(&config.filter).unwrap_or_else(|_| EnvFilter::new("info")),
    }
}

/// Install the global tracing subscriber.
///
/// Safe to call multiple times; only the first call installs anything.
pub fn init_tracing(config: &LoggingConfig) {
    if tracing::dispatcher::has_been_set() {
        tracing::debug!("tracing subscriber already initialized, skipping");
        return;
    }

    let fmt_layer = tracing_subscriber::fmt::layer()
        .compact()
        .with_ansi(config.ansi)
        .with_target(true);

    let _ = tracing_subscriber::registry()
        .with(env_filter(config))
        .with(fmt_layer)
        .try_init();
}
