//! Logging setup
//!
//! Installs a `tracing_subscriber` fmt subscriber writing to stderr, so
//! stdout stays reserved for the editor response. `RUST_LOG`, when set,
//! takes precedence over the configured level.

use crate::config::LoggingConfig;
use tracing_subscriber::EnvFilter;

/// Build the env filter for `level`, letting `RUST_LOG` override it
pub fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.to_lowercase()))
}

/// Install the global subscriber
///
/// Returns an error if a global subscriber was already set.
pub fn init(config: &LoggingConfig) -> Result<(), tracing::subscriber::SetGlobalDefaultError> {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter(&config.level))
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(true);

    if config.json {
        tracing::subscriber::set_global_default(builder.json().finish())
    } else {
        tracing::subscriber::set_global_default(builder.finish())
    }
}
