use crate::common::config::{ConfigError, LoggingConfig};
use tracing_subscriber::fmt;
use tracing_subscriber::EnvFilter;

/// Installs the global `tracing` subscriber.
///
/// `RUST_LOG` takes precedence over `config.level`. Returns `Ok(false)` when
/// the host application already installed a subscriber.
pub fn init_logging(config: &LoggingConfig) -> Result<bool, ConfigError> {
    let directives = std::env::var("RUST_LOG").unwrap_or_else(|_| config.level.clone());
    let env_filter = build_filter(&directives)?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_timer(fmt::time::uptime());

    let installed = if config.json {
        builder.json().try_init().is_ok()
    } else {
        builder.try_init().is_ok()
    };

    if installed {
        tracing::debug!(json = config.json, "Logging initialised");
    }
    Ok(installed)
}

fn build_filter(directives: &str) -> Result<EnvFilter, ConfigError> {
    EnvFilter::builder()
        .parse(directives)
        .map_err(|e| ConfigError::LoggingError(format!("Invalid log filter: {}", e)))
}
