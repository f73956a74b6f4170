//! Integration tests for the Customer.io adapter

use super::*;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, ResponseTemplate};

fn config() -> MailerConfigBuilder {
    MailerConfig::builder().api_key("app-key")
}

#[tokio::test]
async fn test_customerio_send_success() {
    let server = setup_mock_server().await;

    Mock::given(method("POST"))
        .and(path("/v1/send/email"))
        .and(header("Authorization", "Bearer app-key"))
        .and(body_partial_json(json!({
            "from": "Acme <no-reply@acme.test>",
            "to": "Jane Doe <jane@example.com>",
            "subject": "Your receipt",
            "plaintext_body": "Thanks for your order.",
            "bcc": "ops@acme.test,audit@acme.test"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "delivery_id": "ZGVsaXZlcnk=",
            "queued_at": 1_700_000_000
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut mailer = mailer_for(Driver::CustomerIo, &server, config());
    compose(&mut mailer);
    mailer.cc("", "ops@acme.test").bcc("", "audit@acme.test");

    mailer.send().await.expect("send should succeed");

    let requests = server.received_requests().await.expect("recording enabled");
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).expect("json body");
    assert!(body["identifiers"]["id"].is_string());
}

#[tokio::test]
async fn test_customerio_rejection_returns_body() {
    let server = setup_mock_server().await;

    Mock::given(method("POST"))
        .and(path("/v1/send/email"))
        .respond_with(
            ResponseTemplate::new(400).set_body_string(r#"{"meta":{"error":"missing identifiers"}}"#),
        )
        .mount(&server)
        .await;

    let mut mailer = mailer_for(Driver::CustomerIo, &server, config());
    compose(&mut mailer);

    let err = mailer.send().await.unwrap_err();
    assert_eq!(err.to_string(), r#"{"meta":{"error":"missing identifiers"}}"#);
}
