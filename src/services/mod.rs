pub mod push;

pub use push::{FcmProvider, MessagingClient, NotificationOptions, PushService};
