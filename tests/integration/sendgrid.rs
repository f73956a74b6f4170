//! Integration tests for the SendGrid adapter

use super::*;
use integrations_mailer::MailerError;
use serde_json::json;
use std::io::Cursor;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, ResponseTemplate};

fn config() -> MailerConfigBuilder {
    MailerConfig::builder().api_key("SG.test-key")
}

#[tokio::test]
async fn test_sendgrid_send_success() {
    let server = setup_mock_server().await;

    Mock::given(method("POST"))
        .and(path("/mail/send"))
        .and(header("Authorization", "Bearer SG.test-key"))
        .and(header("Content-Type", "application/json"))
        .and(body_partial_json(json!({
            "from": {"name": "Acme", "email": "no-reply@acme.test"},
            "personalizations": [{
                "to": [{"name": "Jane Doe", "email": "jane@example.com"}],
                "subject": "Your receipt"
            }],
            "content": [{"type": "text/plain", "value": "Thanks for your order."}]
        })))
        .respond_with(ResponseTemplate::new(202))
        .expect(1)
        .mount(&server)
        .await;

    let mut mailer = mailer_for(Driver::SendGrid, &server, config());
    compose(&mut mailer);
    mailer.attachment_reader("invoice.txt", Cursor::new(b"total: 10".to_vec()));

    mailer.send().await.expect("send should succeed");

    let requests = server.received_requests().await.expect("recording enabled");
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).expect("json body");
    assert_eq!(body["attachments"][0]["filename"], "invoice.txt");
    assert_eq!(body["attachments"][0]["content"], "dG90YWw6IDEw");
}

#[tokio::test]
async fn test_sendgrid_rejection_returns_body() {
    let server = setup_mock_server().await;
    let error_body = r#"{"errors":[{"message":"The provided authorization grant is invalid, expired, or revoked","field":null,"help":null}]}"#;

    Mock::given(method("POST"))
        .and(path("/mail/send"))
        .respond_with(ResponseTemplate::new(401).set_body_string(error_body))
        .mount(&server)
        .await;

    let mut mailer = mailer_for(Driver::SendGrid, &server, config());
    compose(&mut mailer);

    let err = mailer.send().await.unwrap_err();
    assert_eq!(err.status(), Some(401));
    assert_eq!(err.to_string(), error_body);
}

#[tokio::test]
async fn test_sendgrid_200_is_treated_as_failure() {
    let server = setup_mock_server().await;

    Mock::given(method("POST"))
        .and(path("/mail/send"))
        .respond_with(ResponseTemplate::new(200).set_body_string("unexpected"))
        .mount(&server)
        .await;

    let mut mailer = mailer_for(Driver::SendGrid, &server, config());
    compose(&mut mailer);

    let err = mailer.send().await.unwrap_err();
    assert!(matches!(err, MailerError::Api { status: 200, .. }));
}

#[tokio::test]
async fn test_sendgrid_missing_body_makes_no_request() {
    let server = setup_mock_server().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(202))
        .expect(0)
        .mount(&server)
        .await;

    let mut mailer = mailer_for(Driver::SendGrid, &server, config());
    mailer
        .from("", "no-reply@acme.test")
        .to("", "jane@example.com")
        .subject("Empty");

    assert!(matches!(
        mailer.send().await,
        Err(MailerError::Validation { .. })
    ));
}
