//! Integration tests for the Postmark adapter

use super::*;
use integrations_mailer::MailerError;
use serde_json::json;
use std::io::Cursor;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, ResponseTemplate};

fn config() -> MailerConfigBuilder {
    MailerConfig::builder().server_token("server-token")
}

#[tokio::test]
async fn test_postmark_send_success() {
    let server = setup_mock_server().await;

    Mock::given(method("POST"))
        .and(path("/email"))
        .and(header("X-Postmark-Server-Token", "server-token"))
        .and(header("Accept", "application/json"))
        .and(body_partial_json(json!({
            "From": "Acme <no-reply@acme.test>",
            "To": "Jane Doe <jane@example.com>",
            "Cc": "Ops <ops@acme.test>",
            "Subject": "Your receipt",
            "TextBody": "Thanks for your order."
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ErrorCode": 0,
            "Message": "OK",
            "MessageID": "b7bc2f4a-e38e-4336-af7d-e6c392c2f817"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut mailer = mailer_for(Driver::Postmark, &server, config());
    compose(&mut mailer);
    mailer.cc("Ops", "ops@acme.test");

    mailer.send().await.expect("send should succeed");
}

#[tokio::test]
async fn test_postmark_recipient_ceiling_makes_no_request() {
    let server = setup_mock_server().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut mailer = mailer_for(Driver::Postmark, &server, config());
    compose(&mut mailer);
    for i in 0..50 {
        mailer.bcc("", format!("user{i}@example.com"));
    }

    let err = mailer.send().await.unwrap_err();
    assert!(matches!(
        err,
        MailerError::TooManyRecipients { limit: 50, actual: 51, .. }
    ));
}

#[tokio::test]
async fn test_postmark_attachment_ceiling_makes_no_request() {
    let server = setup_mock_server().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut mailer = mailer_for(Driver::Postmark, &server, config());
    compose(&mut mailer);
    mailer
        .attachment_reader("a.bin", Cursor::new(vec![0u8; 3_000_000]))
        .attachment_reader("b.bin", Cursor::new(vec![0u8; 2_000_001]));

    let err = mailer.send().await.unwrap_err();
    assert!(matches!(
        err,
        MailerError::AttachmentTooLarge { limit: 5_000_000, actual: 5_000_001, .. }
    ));
}
