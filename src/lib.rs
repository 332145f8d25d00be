//! Sends push notifications through Firebase Cloud Messaging.
//!
//! [`PushService`] turns a [`NotificationOptions`] value into an FCM v1
//! message, hands it to a [`MessagingClient`] and normalises the outcome.

pub mod common;
pub mod services;

pub use common::config::{Config, ConfigError, FcmConfig, LoggingConfig};
pub use common::error::MessagingError;
pub use common::logging::init_logging;
pub use services::push::{
    FcmProvider, MessagingClient, MulticastResult, NotificationOptions, PushService, SendResult,
    SendResults,
};
