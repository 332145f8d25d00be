use serde::Serialize;
use thiserror::Error;

/// Errors raised while building or delivering a message.
///
/// `InvalidArgument` covers client-side value checks as well as the provider
/// rejecting a request as malformed. The remaining kinds mirror the FCM v1
/// error vocabulary so callers can tell a dead token from a transient outage.
#[derive(Debug, Error, Serialize, Clone, PartialEq, Eq)]
#[serde(tag = "code", content = "message", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MessagingError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Unregistered: {0}")]
    Unregistered(String),

    #[error("Sender ID mismatch: {0}")]
    SenderIdMismatch(String),

    #[error("Quota exceeded: {0}")]
    QuotaExceeded(String),

    #[error("Third-party auth error: {0}")]
    #[serde(rename = "THIRD_PARTY_AUTH_ERROR")]
    ThirdPartyAuth(String),

    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unavailable: {0}")]
    Unavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl MessagingError {
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::Unauthenticated(message.into())
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidArgument(_) => "INVALID_ARGUMENT",
            Self::Unregistered(_) => "UNREGISTERED",
            Self::SenderIdMismatch(_) => "SENDER_ID_MISMATCH",
            Self::QuotaExceeded(_) => "QUOTA_EXCEEDED",
            Self::ThirdPartyAuth(_) => "THIRD_PARTY_AUTH_ERROR",
            Self::Unauthenticated(_) => "UNAUTHENTICATED",
            Self::PermissionDenied(_) => "PERMISSION_DENIED",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Unavailable(_) => "UNAVAILABLE",
            Self::Internal(_) => "INTERNAL",
            Self::Transport(_) => "TRANSPORT",
            Self::Unknown(_) => "UNKNOWN",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::InvalidArgument(msg)
            | Self::Unregistered(msg)
            | Self::SenderIdMismatch(msg)
            | Self::QuotaExceeded(msg)
            | Self::ThirdPartyAuth(msg)
            | Self::Unauthenticated(msg)
            | Self::PermissionDenied(msg)
            | Self::NotFound(msg)
            | Self::Unavailable(msg)
            | Self::Internal(msg)
            | Self::Transport(msg)
            | Self::Unknown(msg) => msg,
        }
    }

    /// Maps an FCM-specific `errorCode` from the error details.
    pub fn from_fcm_code(code: &str, message: impl Into<String>) -> Option<Self> {
        let message = message.into();
        let error = match code {
            "UNREGISTERED" => Self::Unregistered(message),
            "SENDER_ID_MISMATCH" => Self::SenderIdMismatch(message),
            "QUOTA_EXCEEDED" => Self::QuotaExceeded(message),
            "THIRD_PARTY_AUTH_ERROR" | "APNS_AUTH_ERROR" => Self::ThirdPartyAuth(message),
            "INVALID_ARGUMENT" => Self::InvalidArgument(message),
            "UNAVAILABLE" => Self::Unavailable(message),
            "INTERNAL" => Self::Internal(message),
            _ => return None,
        };
        Some(error)
    }

    /// Maps a canonical Google API status string.
    pub fn from_status(status: &str, message: impl Into<String>) -> Option<Self> {
        let message = message.into();
        let error = match status {
            "INVALID_ARGUMENT" | "FAILED_PRECONDITION" | "OUT_OF_RANGE" => {
                Self::InvalidArgument(message)
            }
            "UNAUTHENTICATED" => Self::Unauthenticated(message),
            "PERMISSION_DENIED" => Self::PermissionDenied(message),
            "NOT_FOUND" => Self::NotFound(message),
            "RESOURCE_EXHAUSTED" => Self::QuotaExceeded(message),
            "UNAVAILABLE" => Self::Unavailable(message),
            "INTERNAL" => Self::Internal(message),
            _ => return None,
        };
        Some(error)
    }

    pub fn from_http_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            400 => Self::InvalidArgument(message),
            401 => Self::Unauthenticated(message),
            403 => Self::PermissionDenied(message),
            404 => Self::NotFound(message),
            429 => Self::QuotaExceeded(message),
            500 => Self::Internal(message),
            503 => Self::Unavailable(message),
            _ => Self::Unknown(message),
        }
    }
}
