pub mod config;
pub mod error;
pub mod logging;

pub use config::{Config, ConfigError, FcmConfig, LoggingConfig};
pub use error::MessagingError;
pub use logging::init_logging;
