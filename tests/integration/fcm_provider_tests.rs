#[cfg(test)]
mod fcm_provider_integration_tests {
    use crate::{fcm_error, message_name, provider_for, ACCESS_TOKEN, SEND_PATH};
    use fcm_relay::services::push::{Message, MessageBuilder, Target};
    use fcm_relay::{MessagingClient, MessagingError, NotificationOptions};
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn options() -> NotificationOptions {
        NotificationOptions::new()
            .with_title("Hi")
            .with_body("there")
            .with_data_entry("k", "v")
    }

    fn message_to(token: &str) -> Message {
        MessageBuilder::from_options(&options()).build_message(Target::Token(token.to_string()))
    }

    #[tokio::test]
    async fn test_send_posts_v1_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(SEND_PATH))
            .and(header("authorization", format!("Bearer {}", ACCESS_TOKEN).as_str()))
            .and(body_partial_json(json!({
                "message": {
                    "token": "tok1",
                    "notification": {"title": "Hi", "body": "there"},
                    "data": {"k": "v"}
                }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(message_name("1")))
            .expect(1)
            .mount(&server)
            .await;

        let provider = provider_for(&server);
        let message = message_to("tok1");

        let name = provider.send(&message, false).await.unwrap();
        assert_eq!(name, "projects/demo-project/messages/1");
    }

    #[tokio::test]
    async fn test_send_dry_run_sets_validate_only() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(SEND_PATH))
            .and(body_partial_json(json!({"validate_only": true})))
            .respond_with(ResponseTemplate::new(200).set_body_json(message_name("fake")))
            .expect(1)
            .mount(&server)
            .await;

        let provider = provider_for(&server);
        let message = message_to("tok1");

        assert!(provider.send(&message, true).await.is_ok());
    }

    #[tokio::test]
    async fn test_send_maps_unregistered_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(SEND_PATH))
            .respond_with(
                ResponseTemplate::new(404)
                    .set_body_json(fcm_error(404, "NOT_FOUND", Some("UNREGISTERED"))),
            )
            .mount(&server)
            .await;

        let provider = provider_for(&server);
        let message = message_to("stale");

        let error = provider.send(&message, false).await.unwrap_err();
        assert!(matches!(error, MessagingError::Unregistered(_)));
    }

    #[tokio::test]
    async fn test_send_maps_quota_error_from_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(SEND_PATH))
            .respond_with(
                ResponseTemplate::new(429)
                    .set_body_json(fcm_error(429, "RESOURCE_EXHAUSTED", None)),
            )
            .mount(&server)
            .await;

        let provider = provider_for(&server);
        let message = message_to("tok1");

        let error = provider.send(&message, false).await.unwrap_err();
        assert_eq!(error.code(), "QUOTA_EXCEEDED");
    }

    #[tokio::test]
    async fn test_send_multicast_collects_per_token_results() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(SEND_PATH))
            .and(body_partial_json(json!({"message": {"token": "tokA"}})))
            .respond_with(ResponseTemplate::new(200).set_body_json(message_name("a")))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path(SEND_PATH))
            .and(body_partial_json(json!({"message": {"token": "tokB"}})))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_json(fcm_error(400, "INVALID_ARGUMENT", Some("INVALID_ARGUMENT"))),
            )
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path(SEND_PATH))
            .and(body_partial_json(json!({"message": {"token": "tokC"}})))
            .respond_with(ResponseTemplate::new(200).set_body_json(message_name("c")))
            .expect(1)
            .mount(&server)
            .await;

        let provider = provider_for(&server);
        let multicast = MessageBuilder::from_options(&options()).build_multicast(vec![
            "tokA".to_string(),
            "tokB".to_string(),
            "tokC".to_string(),
        ]);

        let batch = provider.send_multicast(&multicast, false).await.unwrap();
        assert_eq!(batch.responses.len(), 3);
        assert_eq!(batch.success_count(), 2);
        assert_eq!(
            batch.responses[0].message_id.as_deref(),
            Some("projects/demo-project/messages/a")
        );
        assert_eq!(
            batch.responses[1].error.as_ref().map(|e| e.code()),
            Some("INVALID_ARGUMENT")
        );
        assert!(batch.responses[2].is_success());
    }

    #[tokio::test]
    async fn test_send_multicast_rejects_oversized_batch_without_requests() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(message_name("x")))
            .expect(0)
            .mount(&server)
            .await;

        let provider = provider_for(&server);
        let tokens = (0..501).map(|i| format!("tok{}", i)).collect();
        let multicast = MessageBuilder::from_options(&options()).build_multicast(tokens);

        let error = provider.send_multicast(&multicast, false).await.unwrap_err();
        assert_eq!(error.code(), "INVALID_ARGUMENT");
    }

    #[tokio::test]
    async fn test_send_reports_unparseable_success_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(SEND_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let provider = provider_for(&server);
        let message = message_to("tok1");

        let error = provider.send(&message, false).await.unwrap_err();
        assert_eq!(error.code(), "UNKNOWN");
    }
}
