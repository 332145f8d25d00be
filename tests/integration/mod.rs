mod fcm_provider_tests;
mod service_account_tests;

use fcm_relay::common::config::FcmConfig;
use fcm_relay::services::push::providers::StaticTokenSource;
use fcm_relay::FcmProvider;
use std::sync::Arc;
use wiremock::MockServer;

pub const PROJECT_ID: &str = "demo-project";
pub const SEND_PATH: &str = "/v1/projects/demo-project/messages:send";
pub const ACCESS_TOKEN: &str = "ya29.test-token";

pub fn provider_for(server: &MockServer) -> FcmProvider {
    let config = FcmConfig {
        project_id: PROJECT_ID.to_string(),
        endpoint: server.uri(),
        access_token: Some(ACCESS_TOKEN.to_string()),
        timeout_secs: 5,
        ..Default::default()
    };
    FcmProvider::new(config, Arc::new(StaticTokenSource::new(ACCESS_TOKEN)))
}

pub fn message_name(id: &str) -> serde_json::Value {
    serde_json::json!({ "name": format!("projects/{}/messages/{}", PROJECT_ID, id) })
}

pub fn fcm_error(status: u16, grpc_status: &str, error_code: Option<&str>) -> serde_json::Value {
    let details = match error_code {
        Some(code) => serde_json::json!([{
            "@type": "type.googleapis.com/google.firebase.fcm.v1.FcmError",
            "errorCode": code
        }]),
        None => serde_json::json!([]),
    };
    serde_json::json!({
        "error": {
            "code": status,
            "message": format!("{} from test server", grpc_status),
            "status": grpc_status,
            "details": details
        }
    })
}
