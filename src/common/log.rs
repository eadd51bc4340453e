//! Logging setup emitting JSON lines (or human readable text) through `tracing`.

use tracing_subscriber::EnvFilter;

use super::config::{AppCfg, LogFormat};

/// Install the global subscriber described by `cfg`.
///
/// Safe to call more than once; only the first call installs a subscriber.
/// Returns `false` when a subscriber was already present.
pub fn init(cfg: &AppCfg) -> bool {
    // TODO: warn once the subscriber is up when DIAGSTAT_LOG failed to parse.
    let filter = EnvFilter::try_new(&cfg.log_filter).unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    match cfg.log_format {
        LogFormat::Json => builder.json().flatten_event(true).try_init().is_ok(),
        LogFormat::Pretty => builder.pretty().try_init().is_ok(),
    }
}
