use super::builder::MessageBuilder;
use super::message::Target;
use super::options::NotificationOptions;
use super::providers::MessagingClient;
use super::results::{MulticastResult, SendResult, SendResults};
use crate::common::error::MessagingError;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Entry point for sending notifications to device tokens.
///
/// Unicast sends never fail as a call: every error, including a rejected
/// argument, comes back inside [`SendResults`]. Multicast sends return `Err`
/// when the provider rejects the whole batch and report per-token failures
/// in the returned list.
#[derive(Clone)]
pub struct PushService {
    client: Arc<dyn MessagingClient>,
}

impl PushService {
    pub fn new(client: Arc<dyn MessagingClient>) -> Self {
        Self { client }
    }

    pub fn provider_name(&self) -> &'static str {
        self.client.name()
    }

    pub async fn send_single(&self, token: &str, options: NotificationOptions) -> SendResults {
        self.send_unicast(Target::Token(token.to_string()), options)
            .await
    }

    /// Like [`send_single`](Self::send_single), with `data_message` as the
    /// data payload.
    pub async fn send_single_data(
        &self,
        token: &str,
        options: NotificationOptions,
        data_message: HashMap<String, String>,
    ) -> SendResults {
        self.send_single(token, with_data_message(options, data_message))
            .await
    }

    /// Sends to every device matching a topic condition such as
    /// `'news' in topics && 'sports' in topics`.
    pub async fn send_to_condition(
        &self,
        condition: &str,
        options: NotificationOptions,
    ) -> SendResults {
        self.send_unicast(Target::Condition(condition.to_string()), options)
            .await
    }

    pub async fn send_multicast(
        &self,
        tokens: &[String],
        options: NotificationOptions,
    ) -> Result<Vec<MulticastResult>, MessagingError> {
        if options.delivery.dry_run {
            debug!("dry_run is not forwarded for multicast sends");
        }

        let multicast = MessageBuilder::from_options(&options).build_multicast(tokens.to_vec());
        let batch = self.client.send_multicast(&multicast, false).await?;

        if batch.responses.len() != tokens.len() {
            return Err(MessagingError::internal(format!(
                "{} returned {} responses for {} tokens",
                self.client.name(),
                batch.responses.len(),
                tokens.len()
            )));
        }

        info!(
            "Multicast via {}: {} succeeded, {} failed",
            self.client.name(),
            batch.success_count(),
            batch.failure_count()
        );

        Ok(batch
            .responses
            .into_iter()
            .map(|response| match response.error {
                None => MulticastResult::success(),
                Some(error) => MulticastResult::failure(error),
            })
            .collect())
    }

    pub async fn send_multicast_data(
        &self,
        tokens: &[String],
        options: NotificationOptions,
        data_message: HashMap<String, String>,
    ) -> Result<Vec<MulticastResult>, MessagingError> {
        self.send_multicast(tokens, with_data_message(options, data_message))
            .await
    }

    async fn send_unicast(&self, target: Target, options: NotificationOptions) -> SendResults {
        let message = MessageBuilder::from_options(&options).build_message(target);

        let result = match message.validate() {
            Ok(()) => {
                self.client
                    .send(&message, options.delivery.dry_run)
                    .await
            }
            Err(e) => Err(e),
        };

        if let Err(e) = &result {
            warn!("Unicast send via {} failed: {}", self.client.name(), e);
        }

        SendResults::single(SendResult::from(result))
    }
}

fn with_data_message(
    options: NotificationOptions,
    data_message: HashMap<String, String>,
) -> NotificationOptions {
    NotificationOptions {
        data: data_message,
        ..options
    }
}
