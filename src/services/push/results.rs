use crate::common::error::MessagingError;
use serde::Serialize;

/// Outcome of a unicast send: either the provider's message id or the error.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SendResult {
    Data(String),
    Error(MessagingError),
}

impl SendResult {
    pub fn is_success(&self) -> bool {
        matches!(self, SendResult::Data(_))
    }

    pub fn message_id(&self) -> Option<&str> {
        match self {
            SendResult::Data(id) => Some(id),
            SendResult::Error(_) => None,
        }
    }

    pub fn error(&self) -> Option<&MessagingError> {
        match self {
            SendResult::Data(_) => None,
            SendResult::Error(error) => Some(error),
        }
    }
}

impl From<Result<String, MessagingError>> for SendResult {
    fn from(result: Result<String, MessagingError>) -> Self {
        match result {
            Ok(id) => SendResult::Data(id),
            Err(error) => SendResult::Error(error),
        }
    }
}

/// Unicast responses are wrapped in a one-element `results` list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SendResults {
    pub results: Vec<SendResult>,
}

impl SendResults {
    pub fn single(result: SendResult) -> Self {
        Self {
            results: vec![result],
        }
    }
}

/// Per-token outcome of a multicast send. `error` is `None` iff `success`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MulticastResult {
    pub success: bool,
    pub error: Option<MessagingError>,
}

impl MulticastResult {
    pub fn success() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    pub fn failure(error: MessagingError) -> Self {
        Self {
            success: false,
            error: Some(error),
        }
    }
}
