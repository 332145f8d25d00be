use crate::common::config::ConfigError;
use crate::common::error::MessagingError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use parking_lot::Mutex;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tracing::{debug, error};

pub const FCM_SCOPE: &str = "https://www.googleapis.com/auth/firebase.messaging";

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;
const EXPIRY_MARGIN_SECS: i64 = 60;

/// Supplies OAuth 2.0 bearer tokens for FCM requests.
#[async_trait]
pub trait TokenSource: Send + Sync {
    async fn access_token(&self) -> Result<String, MessagingError>;
}

/// A token minted elsewhere, e.g. by a sidecar or metadata server.
#[derive(Debug, Clone)]
pub struct StaticTokenSource {
    token: String,
}

impl StaticTokenSource {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

#[async_trait]
impl TokenSource for StaticTokenSource {
    async fn access_token(&self) -> Result<String, MessagingError> {
        if self.token.is_empty() {
            return Err(MessagingError::unauthenticated("access token is empty"));
        }
        Ok(self.token.clone())
    }
}

/// The JSON key file Google issues for a service account.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    #[serde(rename = "type", default)]
    pub key_type: Option<String>,
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub private_key_id: Option<String>,
    pub private_key: String,
    pub client_email: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    "https://oauth2.googleapis.com/token".to_string()
}

impl ServiceAccountKey {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let key: ServiceAccountKey = serde_json::from_str(json)
            .map_err(|e| ConfigError::ParseError(format!("Invalid service account key: {}", e)))?;

        if let Some(key_type) = key.key_type.as_deref() {
            if key_type != "service_account" {
                return Err(ConfigError::ValidationError(format!(
                    "Expected a service_account key, got {}",
                    key_type
                )));
            }
        }
        Ok(key)
    }

    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            ConfigError::LoadError(format!("Failed to read credentials file {}: {}", path, e))
        })?;
        Self::from_json(&json)
    }
}

#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: i64,
}

fn default_expires_in() -> i64 {
    ASSERTION_LIFETIME_SECS
}

#[derive(Debug, Deserialize)]
struct TokenErrorResponse {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

#[derive(Debug, Clone)]
struct CachedToken {
    token: String,
    expires_at: DateTime<Utc>,
}

/// Exchanges a signed service-account assertion for an access token and
/// caches it until shortly before it expires.
///
/// Concurrent callers on a cold cache wait for a single exchange.
pub struct ServiceAccountTokenSource {
    key: ServiceAccountKey,
    encoding_key: EncodingKey,
    client: Client,
    cached: Mutex<Option<CachedToken>>,
    refresh: tokio::sync::Mutex<()>,
}

impl fmt::Debug for ServiceAccountTokenSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccountTokenSource")
            .field("client_email", &self.key.client_email)
            .field("token_uri", &self.key.token_uri)
            .finish_non_exhaustive()
    }
}

impl ServiceAccountTokenSource {
    pub fn new(key: ServiceAccountKey, timeout: Duration) -> Result<Self, ConfigError> {
        let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes()).map_err(|e| {
            ConfigError::ParseError(format!("Invalid service account private key: {}", e))
        })?;

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Ok(Self {
            key,
            encoding_key,
            client,
            cached: Mutex::new(None),
            refresh: tokio::sync::Mutex::new(()),
        })
    }

    pub fn from_file(path: &str, timeout: Duration) -> Result<Self, ConfigError> {
        Self::new(ServiceAccountKey::from_file(path)?, timeout)
    }

    pub fn project_id(&self) -> Option<&str> {
        self.key.project_id.as_deref()
    }

    fn cached_token(&self, now: DateTime<Utc>) -> Option<String> {
        let margin = chrono::Duration::seconds(EXPIRY_MARGIN_SECS);
        self.cached
            .lock()
            .as_ref()
            .filter(|cached| cached.expires_at - margin > now)
            .map(|cached| cached.token.clone())
    }

    fn sign_assertion(&self, now: DateTime<Utc>) -> Result<String, MessagingError> {
        let iat = now.timestamp();
        let claims = AssertionClaims {
            iss: &self.key.client_email,
            scope: FCM_SCOPE,
            aud: &self.key.token_uri,
            iat,
            exp: iat + ASSERTION_LIFETIME_SECS,
        };

        let mut header = Header::new(Algorithm::RS256);
        header.kid = self.key.private_key_id.clone();

        encode(&header, &claims, &self.encoding_key).map_err(|e| {
            MessagingError::unauthenticated(format!("Failed to sign assertion: {}", e))
        })
    }

    async fn fetch_token(&self, now: DateTime<Utc>) -> Result<CachedToken, MessagingError> {
        let assertion = self.sign_assertion(now)?;

        debug!("Requesting access token for {}", self.key.client_email);

        let response = self
            .client
            .post(&self.key.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await
            .map_err(|e| MessagingError::transport(format!("Token request failed: {}", e)))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            MessagingError::transport(format!("Failed to read token response: {}", e))
        })?;

        if !status.is_success() {
            let reason = serde_json::from_str::<TokenErrorResponse>(&body)
                .map(|e| match e.error_description {
                    Some(description) => format!("{}: {}", e.error, description),
                    None => e.error,
                })
                .unwrap_or(body);
            error!("Token endpoint returned {}: {}", status, reason);
            return Err(MessagingError::unauthenticated(format!(
                "Token endpoint returned {}: {}",
                status, reason
            )));
        }

        let token: TokenResponse = serde_json::from_str(&body).map_err(|e| {
            MessagingError::unauthenticated(format!("Failed to parse token response: {}", e))
        })?;

        Ok(CachedToken {
            token: token.access_token,
            expires_at: now + chrono::Duration::seconds(token.expires_in),
        })
    }
}

#[async_trait]
impl TokenSource for ServiceAccountTokenSource {
    async fn access_token(&self) -> Result<String, MessagingError> {
        if let Some(token) = self.cached_token(Utc::now()) {
            return Ok(token);
        }

        let _refresh = self.refresh.lock().await;
        let now = Utc::now();
        if let Some(token) = self.cached_token(now) {
            return Ok(token);
        }

        let fresh = self.fetch_token(now).await?;
        let token = fresh.token.clone();
        *self.cached.lock() = Some(fresh);
        Ok(token)
    }
}
