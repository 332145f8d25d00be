use super::credentials::{ServiceAccountTokenSource, StaticTokenSource, TokenSource};
use super::{BatchResponse, MessagingClient, SendResponse};
use crate::common::config::{ConfigError, FcmConfig};
use crate::common::error::MessagingError;
use crate::services::push::message::{Message, MulticastMessage, Target};
use async_trait::async_trait;
use futures::future::join_all;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

const FCM_ERROR_TYPE: &str = "type.googleapis.com/google.firebase.fcm.v1.FcmError";

#[derive(Debug, Serialize)]
struct SendRequest<'a> {
    message: &'a Message,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    validate_only: bool,
}

#[derive(Debug, Deserialize)]
struct SendResponseBody {
    name: String,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    details: Vec<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(rename = "@type", default)]
    type_url: String,
    #[serde(rename = "errorCode", default)]
    error_code: Option<String>,
}

/// A failed send, noting whether FCM refused the bearer token itself
/// rather than the message or its target.
#[derive(Debug)]
struct RequestFailure {
    error: MessagingError,
    credentials_rejected: bool,
}

impl From<MessagingError> for RequestFailure {
    fn from(error: MessagingError) -> Self {
        Self {
            error,
            credentials_rejected: false,
        }
    }
}

/// Client for the FCM HTTP v1 API.
pub struct FcmProvider {
    config: FcmConfig,
    client: Client,
    credentials: Arc<dyn TokenSource>,
}

impl fmt::Debug for FcmProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FcmProvider")
            .field("project_id", &self.config.project_id)
            .field("endpoint", &self.config.endpoint)
            .finish_non_exhaustive()
    }
}

impl FcmProvider {
    pub fn new(config: FcmConfig, credentials: Arc<dyn TokenSource>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            config,
            client,
            credentials,
        }
    }

    pub fn with_access_token(
        project_id: impl Into<String>,
        access_token: impl Into<String>,
    ) -> Self {
        let config = FcmConfig {
            project_id: project_id.into(),
            ..Default::default()
        };
        Self::new(config, Arc::new(StaticTokenSource::new(access_token)))
    }

    /// Builds a provider with the credential source named in `config`.
    pub fn from_config(config: FcmConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let credentials: Arc<dyn TokenSource> =
            match (&config.credentials_file, &config.access_token) {
                (Some(path), _) => Arc::new(ServiceAccountTokenSource::from_file(
                    path,
                    Duration::from_secs(config.timeout_secs),
                )?),
                (None, Some(token)) => Arc::new(StaticTokenSource::new(token.clone())),
                (None, None) => {
                    return Err(ConfigError::ValidationError(
                        "no FCM credentials configured".to_string(),
                    ))
                }
            };

        Ok(Self::new(config, credentials))
    }

    pub fn project_id(&self) -> &str {
        &self.config.project_id
    }

    async fn send_request(
        &self,
        message: &Message,
        dry_run: bool,
        access_token: &str,
    ) -> Result<String, RequestFailure> {
        let body = SendRequest {
            message,
            validate_only: dry_run,
        };

        let response = self
            .client
            .post(self.config.send_url())
            .bearer_auth(access_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| MessagingError::transport(format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| MessagingError::transport(format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            return Err(parse_error(status, &text));
        }

        let parsed: SendResponseBody = serde_json::from_str(&text).map_err(|e| {
            MessagingError::Unknown(format!("Failed to parse FCM response: {} - Body: {}", e, text))
        })?;
        Ok(parsed.name)
    }
}

#[async_trait]
impl MessagingClient for FcmProvider {
    fn name(&self) -> &'static str {
        "fcm"
    }

    async fn send(&self, message: &Message, dry_run: bool) -> Result<String, MessagingError> {
        message.validate()?;

        info!(
            "Sending FCM message to {} (dry_run={})",
            describe_target(&message.target),
            dry_run
        );

        let access_token = self.credentials.access_token().await?;
        match self.send_request(message, dry_run, &access_token).await {
            Ok(name) => {
                debug!("FCM accepted message: {}", name);
                Ok(name)
            }
            Err(failure) => {
                warn!("FCM send failed: {}", failure.error);
                Err(failure.error)
            }
        }
    }

    async fn send_multicast(
        &self,
        message: &MulticastMessage,
        dry_run: bool,
    ) -> Result<BatchResponse, MessagingError> {
        message.validate()?;

        info!(
            "Sending FCM multicast to {} tokens (dry_run={})",
            message.tokens.len(),
            dry_run
        );

        let access_token = self.credentials.access_token().await.map_err(|e| {
            error!("Unable to obtain FCM access token: {}", e);
            e
        })?;
        let access_token = access_token.as_str();

        let sends = message.tokens.iter().map(|token| {
            let single = message.message_for(token);
            async move {
                let result = self.send_request(&single, dry_run, access_token).await;
                if let Err(failure) = &result {
                    warn!("FCM send to {} failed: {}", redact(token), failure.error);
                }
                result
            }
        });

        let mut responses = Vec::with_capacity(message.tokens.len());
        for result in join_all(sends).await {
            match result {
                Ok(name) => responses.push(SendResponse::success(name)),
                Err(failure) if failure.credentials_rejected => {
                    error!("FCM rejected the access token: {}", failure.error);
                    return Err(failure.error);
                }
                Err(failure) => responses.push(SendResponse::failure(failure.error)),
            }
        }

        let batch = BatchResponse::new(responses);
        debug!(
            "FCM multicast finished: {} succeeded, {} failed",
            batch.success_count(),
            batch.failure_count()
        );
        Ok(batch)
    }
}

/// Turns a non-2xx response into the most specific error kind available:
/// the FCM `errorCode` detail, then the canonical status, then HTTP status.
///
/// An auth error without an FCM `errorCode` means the bearer token was
/// refused, which applies to every request sent with it.
fn parse_error(status: StatusCode, body: &str) -> RequestFailure {
    let envelope = match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => envelope,
        Err(_) => {
            let message = format!("Unexpected HTTP response with status {}: {}", status, body);
            let error = MessagingError::from_http_status(status.as_u16(), message);
            return RequestFailure {
                credentials_rejected: is_auth_error(&error),
                error,
            };
        }
    };

    let error = envelope.error;
    let message = error
        .message
        .unwrap_or_else(|| format!("Unexpected HTTP response with status {}", status));

    let fcm_code = error
        .details
        .iter()
        .filter(|d| d.type_url == FCM_ERROR_TYPE)
        .find_map(|d| d.error_code.as_deref());

    let error = fcm_code
        .and_then(|code| MessagingError::from_fcm_code(code, message.clone()))
        .or_else(|| {
            error
                .status
                .as_deref()
                .and_then(|s| MessagingError::from_status(s, message.clone()))
        })
        .unwrap_or_else(|| MessagingError::from_http_status(status.as_u16(), message));

    RequestFailure {
        credentials_rejected: fcm_code.is_none() && is_auth_error(&error),
        error,
    }
}

fn is_auth_error(error: &MessagingError) -> bool {
    matches!(
        error,
        MessagingError::Unauthenticated(_) | MessagingError::PermissionDenied(_)
    )
}

fn describe_target(target: &Target) -> String {
    match target {
        Target::Token(token) => format!("token {}", redact(token)),
        Target::Topic(topic) => format!("topic {}", topic),
        Target::Condition(condition) => format!("condition {}", condition),
    }
}

fn redact(token: &str) -> String {
    let prefix: String = token.chars().take(12).collect();
    if prefix.len() < token.len() {
        format!("{}...", prefix)
    } else {
        prefix
    }
}
