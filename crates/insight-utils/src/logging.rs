//! Logging and tracing utilities

use crate::config::Config;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used when `RUST_LOG` is not set
pub const DEFAULT_FILTER: &str = "warn,insight_stock=info";

/// Initialize tracing subscriber with default configuration
pub fn init_tracing() {
    init_tracing_with_default(DEFAULT_FILTER);
}

/// Initialize tracing, falling back to `default_filter` when `RUST_LOG` is unset or invalid.
///
/// Events go to stderr. Safe to call more than once; later calls are ignored.
pub fn init_tracing_with_default(default_filter: &str) {
    init_subscriber(default_filter, false);
}

/// Initialize tracing for `config`: JSON lines in production, human-readable otherwise
pub fn init_tracing_for(config: &Config, default_filter: &str) {
    init_subscriber(default_filter, config.is_production());
}

fn init_subscriber(default_filter: &str, json: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let json_layer = json.then(|| {
        fmt::layer()
            .json()
            .with_current_span(true)
            .with_writer(std::io::stderr)
    });
    let text_layer = (!json).then(|| {
        fmt::layer()
            .with_target(false)
            .with_writer(std::io::stderr)
    });

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(json_layer)
        .with(text_layer)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repeated_init_is_ignored() {
        let production = Config {
            environment: "production".to_string(),
            ..Config::default()
        };
        init_tracing_for(&production, DEFAULT_FILTER);
        init_tracing_for(&Config::default(), "debug");
        init_tracing();
        tracing::info!(app = %production.app_name, "still logging");
    }
}
