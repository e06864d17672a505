use std::sync::Arc;

use assert_matches::assert_matches;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use chrono::Utc;
use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use shared_config::AppConfig;
use shared_models::error::AppError;
use shared_utils::test_utils::{MockRows, TestConfig, WebhookTestUtils};
use user_cell::handlers;

fn test_config(server: &MockServer) -> Arc<AppConfig> {
    TestConfig::with_store_url(&server.uri()).to_arc()
}

fn signed_headers(secret: &str, payload: &[u8]) -> HeaderMap {
    let timestamp = Utc::now().timestamp().to_string();
    let signature = WebhookTestUtils::sign_payload(secret, "msg_1", &timestamp, payload);

    let mut headers = HeaderMap::new();
    headers.insert("svix-id", "msg_1".parse().expect("valid header"));
    headers.insert("svix-timestamp", timestamp.parse().expect("valid header"));
    headers.insert("svix-signature", signature.parse().expect("valid header"));
    headers
}

fn user_created_payload(external_id: &str) -> Vec<u8> {
    json!({
        "type": "user.created",
        "data": {
            "id": external_id,
            "email_addresses": [{ "email_address": "new@example.com" }],
            "username": "newuser",
            "image_url": "https://img.example.com/avatar.png"
        }
    })
    .to_string()
    .into_bytes()
}

#[tokio::test]
async fn user_created_event_inserts_directory_record() {
    let server = MockServer::start().await;
    let config = test_config(&server);
    let payload = user_created_payload("user_new");

    Mock::given(method("POST"))
        .and(path("/rest/v1/users"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            MockRows::user(Uuid::new_v4(), "user_new", "new@example.com", "user")
        ])))
        .mount(&server)
        .await;

    let headers = signed_headers(&config.clerk_webhook_secret, &payload);
    let result = handlers::handle_identity_webhook(
        State(config),
        headers,
        Bytes::from(payload),
    )
    .await;

    let Json(body) = result.expect("webhook should be accepted");
    assert_eq!(body["message"], "Webhook received and processed");
}

#[tokio::test]
async fn user_deleted_event_removes_directory_record() {
    let server = MockServer::start().await;
    let config = test_config(&server);
    let payload = json!({
        "type": "user.deleted",
        "data": { "id": "user_gone" }
    })
    .to_string()
    .into_bytes();

    Mock::given(method("DELETE"))
        .and(path("/rest/v1/users"))
        .and(query_param("external_id", "eq.user_gone"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let headers = signed_headers(&config.clerk_webhook_secret, &payload);
    let result = handlers::handle_identity_webhook(
        State(config),
        headers,
        Bytes::from(payload),
    )
    .await;

    assert!(result.is_ok());
}

#[tokio::test]
async fn tampered_payload_is_rejected() {
    let server = MockServer::start().await;
    let config = test_config(&server);
    let payload = user_created_payload("user_new");

    let headers = signed_headers(&config.clerk_webhook_secret, &payload);
    let result = handlers::handle_identity_webhook(
        State(config),
        headers,
        Bytes::from_static(b"{\"type\":\"user.created\",\"data\":{\"id\":\"attacker\"}}"),
    )
    .await;

    assert_matches!(result, Err(AppError::BadRequest(msg)) => {
        assert_eq!(msg, "Invalid webhook signature");
    });
}

#[tokio::test]
async fn missing_signature_headers_are_rejected() {
    let server = MockServer::start().await;
    let config = test_config(&server);

    let result = handlers::handle_identity_webhook(
        State(config),
        HeaderMap::new(),
        Bytes::from(user_created_payload("user_new")),
    )
    .await;

    assert_matches!(result, Err(AppError::BadRequest(msg)) => {
        assert_eq!(msg, "Missing webhook signature headers");
    });
}

#[tokio::test]
async fn unknown_event_type_is_acknowledged() {
    let server = MockServer::start().await;
    let config = test_config(&server);
    let payload = json!({
        "type": "session.created",
        "data": { "id": "sess_1" }
    })
    .to_string()
    .into_bytes();

    let headers = signed_headers(&config.clerk_webhook_secret, &payload);
    let result = handlers::handle_identity_webhook(
        State(config),
        headers,
        Bytes::from(payload),
    )
    .await;

    // Acknowledged without any store traffic.
    assert!(result.is_ok());
}

#[tokio::test]
async fn unconfigured_secret_is_a_server_error() {
    let server = MockServer::start().await;
    let mut test_config = TestConfig::with_store_url(&server.uri());
    test_config.clerk_webhook_secret = String::new();

    let result = handlers::handle_identity_webhook(
        State(test_config.to_arc()),
        HeaderMap::new(),
        Bytes::from(user_created_payload("user_new")),
    )
    .await;

    assert_matches!(result, Err(AppError::Internal(_)));
}
