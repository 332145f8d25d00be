use config::Config as ConfigBuilder;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config load error: {0}")]
    LoadError(String),
    #[error("Config parse error: {0}")]
    ParseError(String),
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("Logging error: {0}")]
    LoggingError(String),
}

/// Top-level relay configuration.
///
/// Loaded from a YAML file and overridden by `FCM_RELAY__*` environment
/// variables, e.g. `FCM_RELAY__FCM__PROJECT_ID=my-project`.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub fcm: FcmConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Connection settings for the FCM HTTP v1 API.
#[derive(Debug, Clone, Deserialize)]
pub struct FcmConfig {
    /// Firebase project that owns the registration tokens.
    #[serde(default)]
    pub project_id: String,

    /// API base URL, without the `/v1/...` path.
    #[serde(default = "default_fcm_endpoint")]
    pub endpoint: String,

    /// Path to a Google service-account JSON key.
    #[serde(default)]
    pub credentials_file: Option<String>,

    /// Pre-minted OAuth 2.0 access token, used instead of a key file.
    #[serde(default)]
    pub access_token: Option<String>,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for FcmConfig {
    fn default() -> Self {
        Self {
            project_id: String::new(),
            endpoint: default_fcm_endpoint(),
            credentials_file: None,
            access_token: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_fcm_endpoint() -> String {
    "https://fcm.googleapis.com".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl FcmConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.project_id.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "fcm.project_id must be set".to_string(),
            ));
        }

        match (&self.credentials_file, &self.access_token) {
            (Some(_), Some(_)) => Err(ConfigError::ValidationError(
                "set only one of fcm.credentials_file and fcm.access_token".to_string(),
            )),
            (None, None) => Err(ConfigError::ValidationError(
                "one of fcm.credentials_file or fcm.access_token must be set".to_string(),
            )),
            _ if self.timeout_secs == 0 => Err(ConfigError::ValidationError(
                "fcm.timeout_secs must be greater than zero".to_string(),
            )),
            _ => Ok(()),
        }
    }

    pub fn send_url(&self) -> String {
        format!(
            "{}/v1/projects/{}/messages:send",
            self.endpoint.trim_end_matches('/'),
            self.project_id
        )
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is not set.
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

fn default_log_level() -> String {
    "info,fcm_relay=debug".to_string()
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = std::env::var("FCM_RELAY_CONFIG_PATH")
            .unwrap_or_else(|_| "config/fcm.yaml".to_string());

        Self::load_from(&config_path)
    }

    pub fn load_from(path: &str) -> Result<Self, ConfigError> {
        let config = ConfigBuilder::builder()
            .add_source(config::File::new(path, config::FileFormat::Yaml))
            .add_source(config::Environment::with_prefix("FCM_RELAY").separator("__"))
            .build()
            .map_err(|e| ConfigError::LoadError(e.to_string()))?;

        let config_values: Config = config
            .try_deserialize()
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;

        config_values.fcm.validate()?;
        Ok(config_values)
    }
}
