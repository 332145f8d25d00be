pub mod credentials;
mod fcm;

pub use credentials::{
    ServiceAccountKey, ServiceAccountTokenSource, StaticTokenSource, TokenSource,
};
pub use fcm::FcmProvider;

use super::message::{Message, MulticastMessage};
use crate::common::error::MessagingError;
use async_trait::async_trait;

/// Outcome for one token inside a batch.
#[derive(Debug, Clone, PartialEq)]
pub struct SendResponse {
    pub message_id: Option<String>,
    pub error: Option<MessagingError>,
}

impl SendResponse {
    pub fn success(message_id: impl Into<String>) -> Self {
        Self {
            message_id: Some(message_id.into()),
            error: None,
        }
    }

    pub fn failure(error: MessagingError) -> Self {
        Self {
            message_id: None,
            error: Some(error),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

impl From<Result<String, MessagingError>> for SendResponse {
    fn from(result: Result<String, MessagingError>) -> Self {
        match result {
            Ok(id) => Self::success(id),
            Err(error) => Self::failure(error),
        }
    }
}

/// Per-token responses, in the order of `MulticastMessage::tokens`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BatchResponse {
    pub responses: Vec<SendResponse>,
}

impl BatchResponse {
    pub fn new(responses: Vec<SendResponse>) -> Self {
        Self { responses }
    }

    pub fn success_count(&self) -> usize {
        self.responses.iter().filter(|r| r.is_success()).count()
    }

    pub fn failure_count(&self) -> usize {
        self.responses.len() - self.success_count()
    }
}

/// The delivery backend the push service talks to.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessagingClient: Send + Sync {
    fn name(&self) -> &'static str;

    /// Sends one message and returns the provider's message id.
    async fn send(&self, message: &Message, dry_run: bool) -> Result<String, MessagingError>;

    /// Sends to every token of `message`. An `Err` means the whole call was
    /// rejected; per-token failures are reported inside the batch response.
    async fn send_multicast(
        &self,
        message: &MulticastMessage,
        dry_run: bool,
    ) -> Result<BatchResponse, MessagingError>;
}
