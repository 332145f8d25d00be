use crate::common::error::MessagingError;
use lazy_regex::regex_is_match;
use serde::{Serialize, Serializer};
use std::collections::HashMap;
use std::time::Duration;

/// Upper bound the provider accepts for a single multicast call.
pub const MAX_MULTICAST_TOKENS: usize = 500;

/// Who a message is addressed to. FCM accepts exactly one per message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Target {
    Token(String),
    Topic(String),
    Condition(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub title: String,
    pub body: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AndroidPriority {
    Normal,
    High,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AndroidConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collapse_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<AndroidPriority>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_ttl"
    )]
    pub ttl: Option<Duration>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub restricted_package_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notification: Option<AndroidNotification>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AndroidNotification {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sound: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub click_action: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body_loc_key: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub body_loc_args: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title_loc_key: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub title_loc_args: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ApnsConfig {
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub headers: HashMap<String, String>,
    pub payload: ApnsPayload,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ApnsPayload {
    pub aps: Aps,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Aps {
    #[serde(skip_serializing_if = "ApsAlert::is_empty")]
    pub alert: ApsAlert,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub badge: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sound: Option<ApnsSound>,
    #[serde(
        rename = "content-available",
        skip_serializing_if = "is_false",
        serialize_with = "serialize_flag"
    )]
    pub content_available: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ApsAlert {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loc_key: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub loc_args: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title_loc_key: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub title_loc_args: Vec<String>,
}

impl ApsAlert {
    pub fn is_empty(&self) -> bool {
        self.loc_key.is_none()
            && self.loc_args.is_empty()
            && self.title_loc_key.is_none()
            && self.title_loc_args.is_empty()
    }
}

/// APNs `sound`: either a bundled sound name or a critical-alert dictionary.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ApnsSound {
    Named(String),
    Critical(CriticalSound),
}

/// Critical alerts play even when the device is muted or in Do Not Disturb.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CriticalSound {
    #[serde(skip_serializing_if = "is_false", serialize_with = "serialize_flag")]
    pub critical: bool,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume: Option<f64>,
}

impl CriticalSound {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            critical: true,
            name: name.into(),
            volume: None,
        }
    }
}

/// A message for exactly one target, serialised as the FCM v1 `Message`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Message {
    #[serde(flatten)]
    pub target: Target,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notification: Option<Notification>,
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub data: HashMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub android: Option<AndroidConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub apns: Option<ApnsConfig>,
}

impl Message {
    pub fn validate(&self) -> Result<(), MessagingError> {
        validate_target(&self.target)?;
        validate_blocks(self.android.as_ref(), self.apns.as_ref())
    }
}

/// The same notification fanned out to several registration tokens.
#[derive(Debug, Clone, PartialEq)]
pub struct MulticastMessage {
    pub tokens: Vec<String>,
    pub notification: Option<Notification>,
    pub data: HashMap<String, String>,
    pub android: Option<AndroidConfig>,
    pub apns: Option<ApnsConfig>,
}

impl MulticastMessage {
    pub fn validate(&self) -> Result<(), MessagingError> {
        if self.tokens.is_empty() {
            return Err(MessagingError::invalid_argument(
                "MulticastMessage.tokens must not be empty",
            ));
        }
        if self.tokens.len() > MAX_MULTICAST_TOKENS {
            return Err(MessagingError::invalid_argument(format!(
                "MulticastMessage.tokens must not contain more than {} tokens, got {}",
                MAX_MULTICAST_TOKENS,
                self.tokens.len()
            )));
        }
        if let Some(index) = self.tokens.iter().position(|t| t.trim().is_empty()) {
            return Err(MessagingError::invalid_argument(format!(
                "MulticastMessage.tokens[{}] must be a non-empty string",
                index
            )));
        }
        validate_blocks(self.android.as_ref(), self.apns.as_ref())
    }

    /// Expands the shared blocks into a single-token message.
    pub fn message_for(&self, token: &str) -> Message {
        Message {
            target: Target::Token(token.to_string()),
            notification: self.notification.clone(),
            data: self.data.clone(),
            android: self.android.clone(),
            apns: self.apns.clone(),
        }
    }
}

fn validate_target(target: &Target) -> Result<(), MessagingError> {
    match target {
        Target::Token(token) if token.trim().is_empty() => Err(
            MessagingError::invalid_argument("Message.token must be a non-empty string"),
        ),
        Target::Topic(topic) => {
            let name = topic.strip_prefix("/topics/").unwrap_or(topic);
            if regex_is_match!(r"^[a-zA-Z0-9\-_.~%]+$", name) {
                Ok(())
            } else {
                Err(MessagingError::invalid_argument(format!(
                    "Malformed topic name: {}",
                    topic
                )))
            }
        }
        Target::Condition(condition) if condition.trim().is_empty() => Err(
            MessagingError::invalid_argument("Message.condition must be a non-empty string"),
        ),
        _ => Ok(()),
    }
}

fn validate_blocks(
    android: Option<&AndroidConfig>,
    apns: Option<&ApnsConfig>,
) -> Result<(), MessagingError> {
    if let Some(notification) = android.and_then(|a| a.notification.as_ref()) {
        if let Some(color) = &notification.color {
            if !regex_is_match!(r"^#[0-9a-fA-F]{6}$", color) {
                return Err(MessagingError::invalid_argument(format!(
                    "AndroidNotification.color must be in the form #RRGGBB, got {}",
                    color
                )));
            }
        }
        if !notification.body_loc_args.is_empty() && notification.body_loc_key.is_none() {
            return Err(MessagingError::invalid_argument(
                "AndroidNotification.body_loc_key is required when specifying body_loc_args",
            ));
        }
        if !notification.title_loc_args.is_empty() && notification.title_loc_key.is_none() {
            return Err(MessagingError::invalid_argument(
                "AndroidNotification.title_loc_key is required when specifying title_loc_args",
            ));
        }
    }

    if let Some(aps) = apns.map(|a| &a.payload.aps) {
        if !aps.alert.loc_args.is_empty() && aps.alert.loc_key.is_none() {
            return Err(MessagingError::invalid_argument(
                "ApsAlert.loc_key is required when specifying loc_args",
            ));
        }
        if !aps.alert.title_loc_args.is_empty() && aps.alert.title_loc_key.is_none() {
            return Err(MessagingError::invalid_argument(
                "ApsAlert.title_loc_key is required when specifying title_loc_args",
            ));
        }
        if let Some(ApnsSound::Critical(sound)) = &aps.sound {
            if sound.name.is_empty() {
                return Err(MessagingError::invalid_argument(
                    "CriticalSound.name must be a non-empty string",
                ));
            }
            if let Some(volume) = sound.volume {
                if !(0.0..=1.0).contains(&volume) {
                    return Err(MessagingError::invalid_argument(
                        "CriticalSound.volume must be in the interval [0, 1]",
                    ));
                }
            }
        }
    }

    Ok(())
}

/// Protobuf `Duration` JSON form: whole seconds, or nine fractional digits.
pub fn encode_ttl(ttl: &Duration) -> String {
    let nanos = ttl.subsec_nanos();
    if nanos == 0 {
        format!("{}s", ttl.as_secs())
    } else {
        format!("{}.{:09}s", ttl.as_secs(), nanos)
    }
}

fn serialize_ttl<S>(ttl: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match ttl {
        Some(ttl) => serializer.serialize_str(&encode_ttl(ttl)),
        None => serializer.serialize_none(),
    }
}

fn serialize_flag<S>(flag: &bool, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_u8(u8::from(*flag))
}

fn is_false(value: &bool) -> bool {
    !*value
}
