//! Tracing subscriber setup for the binary.

use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "ALPHATRACK_LOG";
pub const DEFAULT_FILTER: &str = "warn";

/// Pick the filter directive: the environment wins over the config value,
/// which wins over the built-in default.
pub fn resolve_filter(env_value: Option<String>, config_value: Option<String>) -> String {
    env_value
        .filter(|v| !v.trim().is_empty())
        .or(config_value.filter(|v| !v.trim().is_empty()))
        .unwrap_or_else(|| DEFAULT_FILTER.to_string())
}

/// Install a stderr `fmt` subscriber. A second call is a no-op.
pub fn init_tracing(config_filter: Option<String>) -> Result<(), String> {
    let filter = resolve_filter(std::env::var(LOG_ENV).ok(), config_filter);
    let env_filter =
        EnvFilter::try_new(&filter).map_err(|err| format!("invalid log filter {filter:?}: {err}"))?;

    // Already installed (tests, repeated runs in one process).
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();

    Ok(())
}
