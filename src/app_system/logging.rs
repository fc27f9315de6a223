use tracing_subscriber::EnvFilter;

use crate::config::MarketConfig;

/// Installs the global subscriber for the whole application.
///
/// `RUST_LOG` wins when set; otherwise the configured level applies. Output is
/// compact with an uptime timer, or JSON when `json_logs` is on.
///
/// ```bash
/// RUST_LOG=service_market::clients=debug cargo run
/// MARKET_JSON_LOGS=1 cargo run
/// ```
///
/// Calling it twice is harmless; the second subscriber is simply not installed.
pub fn setup_tracing(config: &MarketConfig) {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_timer(tracing_subscriber::fmt::time::uptime());

    let installed = if config.json_logs {
        builder.json().with_current_span(true).try_init()
    } else {
        builder.compact().try_init()
    };
    if let Err(e) = installed {
        tracing::debug!(error = %e, "Tracing subscriber already installed");
    }
}
