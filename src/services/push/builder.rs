use super::message::{
    AndroidConfig, AndroidNotification, AndroidPriority, ApnsConfig, ApnsPayload, ApnsSound,
    Aps, ApsAlert, CriticalSound, Message, MulticastMessage, Notification, Target,
};
use super::options::{NotificationOptions, NotificationText};
use std::collections::HashMap;

const CRITICAL_SOUND_NAME: &str = "default";

/// Maps caller-facing [`NotificationOptions`] onto the provider request schema.
///
/// The derived blocks are computed once and shared by the unicast and
/// multicast forms, so both paths apply identical rules.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageBuilder {
    notification: Option<Notification>,
    data: HashMap<String, String>,
    android: AndroidConfig,
    apns: ApnsConfig,
}

impl MessageBuilder {
    pub fn from_options(options: &NotificationOptions) -> Self {
        Self {
            notification: Self::notification(&options.text),
            data: options.data.clone(),
            android: Self::android_config(options),
            apns: Self::apns_config(options),
        }
    }

    /// A visible block only when both title and body are non-empty.
    pub fn notification(text: &NotificationText) -> Option<Notification> {
        match (text.title.as_deref(), text.body.as_deref()) {
            (Some(title), Some(body)) if !title.is_empty() && !body.is_empty() => {
                Some(Notification {
                    title: title.to_string(),
                    body: body.to_string(),
                    image: text.image.clone(),
                })
            }
            _ => None,
        }
    }

    pub fn apns_sound(options: &NotificationOptions) -> Option<ApnsSound> {
        if options.apns.critical {
            Some(ApnsSound::Critical(CriticalSound::new(CRITICAL_SOUND_NAME)))
        } else {
            options.text.sound.clone().map(ApnsSound::Named)
        }
    }

    fn android_config(options: &NotificationOptions) -> AndroidConfig {
        let text = &options.text;
        let android = &options.android;

        AndroidConfig {
            collapse_key: android.collapse_key.clone(),
            priority: options
                .delivery
                .low_priority
                .then_some(AndroidPriority::Normal),
            ttl: android.time_to_live,
            restricted_package_name: android.restricted_package_name.clone(),
            notification: Some(AndroidNotification {
                color: android.color.clone(),
                sound: text.sound.clone(),
                tag: android.tag.clone(),
                click_action: android.click_action.clone(),
                body_loc_key: text.body_loc_key.clone(),
                body_loc_args: text.body_loc_args.clone(),
                title_loc_key: text.title_loc_key.clone(),
                title_loc_args: text.title_loc_args.clone(),
            }),
        }
    }

    fn apns_config(options: &NotificationOptions) -> ApnsConfig {
        let text = &options.text;

        let mut headers = HashMap::new();
        if options.delivery.low_priority {
            headers.insert("apns-priority".to_string(), "5".to_string());
        }

        ApnsConfig {
            headers,
            payload: ApnsPayload {
                aps: Aps {
                    alert: ApsAlert {
                        loc_key: text.body_loc_key.clone(),
                        loc_args: text.body_loc_args.clone(),
                        title_loc_key: text.title_loc_key.clone(),
                        title_loc_args: text.title_loc_args.clone(),
                    },
                    badge: options.apns.badge,
                    sound: Self::apns_sound(options),
                    content_available: options.apns.content_available,
                },
            },
        }
    }

    pub fn build_message(self, target: Target) -> Message {
        Message {
            target,
            notification: self.notification,
            data: self.data,
            android: Some(self.android),
            apns: Some(self.apns),
        }
    }

    pub fn build_multicast(self, tokens: Vec<String>) -> MulticastMessage {
        MulticastMessage {
            tokens,
            notification: self.notification,
            data: self.data,
            android: Some(self.android),
            apns: Some(self.apns),
        }
    }
}
