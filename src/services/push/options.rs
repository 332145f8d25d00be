use std::collections::HashMap;
use std::time::Duration;

/// Everything a caller can say about one notification, grouped by concern.
///
/// Construct a fresh value per send; `Default` means "not set" for every
/// field, so nothing leaks from one call into the next.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NotificationOptions {
    pub text: NotificationText,
    /// Key/value payload delivered to the app. Empty means no data block.
    pub data: HashMap<String, String>,
    pub android: AndroidOptions,
    pub apns: ApnsOptions,
    pub delivery: DeliveryOptions,
}

/// Visible content shared by every platform.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NotificationText {
    /// Both `title` and `body` must be non-empty for a visible
    /// notification block to be attached. Otherwise the message is data-only.
    pub title: Option<String>,
    pub body: Option<String>,
    /// Image URL shown in the notification.
    pub image: Option<String>,
    /// Sound name. Android uses it as-is; APNs uses it unless `critical`.
    pub sound: Option<String>,
    pub body_loc_key: Option<String>,
    pub body_loc_args: Vec<String>,
    pub title_loc_key: Option<String>,
    pub title_loc_args: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AndroidOptions {
    /// Newer messages with the same key replace undelivered older ones.
    pub collapse_key: Option<String>,
    /// How long FCM keeps the message while the device is offline.
    pub time_to_live: Option<Duration>,
    /// Only deliver to the app with this package name.
    pub restricted_package_name: Option<String>,
    /// Icon colour, `#rrggbb`.
    pub color: Option<String>,
    /// Notifications sharing a tag replace each other in the drawer.
    pub tag: Option<String>,
    pub click_action: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApnsOptions {
    pub badge: Option<u32>,
    /// Wakes the app in the background (`content-available: 1`).
    pub content_available: bool,
    /// Replaces the APNs sound with the default critical-alert sound.
    pub critical: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeliveryOptions {
    /// Ask the provider to validate without delivering. Unicast only.
    pub dry_run: bool,
    /// Send with normal Android priority and `apns-priority: 5`. Older FCM
    /// adapters accepted this flag and dropped it; here it is applied.
    pub low_priority: bool,
}

impl NotificationOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.text.title = Some(title.into());
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.text.body = Some(body.into());
        self
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.text.image = Some(image.into());
        self
    }

    pub fn with_sound(mut self, sound: impl Into<String>) -> Self {
        self.text.sound = Some(sound.into());
        self
    }

    pub fn with_data(mut self, data: HashMap<String, String>) -> Self {
        self.data = data;
        self
    }

    pub fn with_data_entry(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    pub fn with_badge(mut self, badge: u32) -> Self {
        self.apns.badge = Some(badge);
        self
    }

    pub fn with_critical(mut self, critical: bool) -> Self {
        self.apns.critical = critical;
        self
    }

    pub fn with_content_available(mut self, content_available: bool) -> Self {
        self.apns.content_available = content_available;
        self
    }

    pub fn with_collapse_key(mut self, collapse_key: impl Into<String>) -> Self {
        self.android.collapse_key = Some(collapse_key.into());
        self
    }

    pub fn with_time_to_live(mut self, ttl: Duration) -> Self {
        self.android.time_to_live = Some(ttl);
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.android.color = Some(color.into());
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.android.tag = Some(tag.into());
        self
    }

    pub fn with_click_action(mut self, click_action: impl Into<String>) -> Self {
        self.android.click_action = Some(click_action.into());
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.delivery.dry_run = dry_run;
        self
    }

    pub fn with_low_priority(mut self, low_priority: bool) -> Self {
        self.delivery.low_priority = low_priority;
        self
    }
}
