use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

/// Installs the global fmt subscriber.
///
/// `RUST_LOG` wins over `default_level` when set. Returns an error if a
/// global subscriber is already installed or the directive is invalid.
pub fn init(default_level: &str) -> Result<(), String> {
    let filter = match std::env::var("RUST_LOG") {
        Ok(directives) if !directives.trim().is_empty() => EnvFilter::try_new(directives),
        _ => EnvFilter::try_new(default_level),
    }
    .map_err(|e| format!("invalid log filter: {}", e))?;

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_thread_names(true))
        .try_init()
        .map_err(|e| format!("failed to install tracing subscriber: {}", e))
}
