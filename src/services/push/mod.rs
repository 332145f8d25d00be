pub mod builder;
pub mod message;
pub mod options;
pub mod providers;
pub mod results;
pub mod service;

pub use builder::MessageBuilder;
pub use message::{Message, MulticastMessage, Target, MAX_MULTICAST_TOKENS};
pub use options::{
    AndroidOptions, ApnsOptions, DeliveryOptions, NotificationOptions, NotificationText,
};
pub use providers::{BatchResponse, FcmProvider, MessagingClient, SendResponse, TokenSource};
pub use results::{MulticastResult, SendResult, SendResults};
pub use service::PushService;
