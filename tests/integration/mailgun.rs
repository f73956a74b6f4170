//! Integration tests for the Mailgun adapter

use super::*;
use integrations_mailer::MailerError;
use std::io::Write;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, ResponseTemplate};

fn config() -> MailerConfigBuilder {
    MailerConfig::builder()
        .api_key("key-123")
        .domain("mg.acme.test")
}

#[tokio::test]
async fn test_mailgun_send_multipart_form() {
    let server = setup_mock_server().await;

    Mock::given(method("POST"))
        .and(path("/mg.acme.test/messages"))
        // base64("api:key-123")
        .and(header("Authorization", "Basic YXBpOmtleS0xMjM="))
        .and(body_string_contains("name=\"from\""))
        .and(body_string_contains("Acme <no-reply@acme.test>"))
        .and(body_string_contains("name=\"attachment[0]\""))
        .and(body_string_contains("filename=\"report.csv\""))
        .and(body_string_contains("name=\"inline[0]\""))
        .and(body_string_contains("filename=\"logo.png\""))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(r#"{"id":"<1@mg.acme.test>","message":"Queued. Thank you."}"#),
        )
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().expect("tempdir");
    let report = dir.path().join("report.csv");
    std::fs::File::create(&report)
        .and_then(|mut f| f.write_all(b"a,b\n1,2\n"))
        .expect("write report");

    let mut mailer = mailer_for(Driver::Mailgun, &server, config());
    compose(&mut mailer);
    mailer
        .attachment_file(&report)
        .attachment_inline_reader("logo.png", std::io::Cursor::new(b"PNG".to_vec()));

    mailer.send().await.expect("send should succeed");
}

#[tokio::test]
async fn test_mailgun_missing_domain_makes_no_request() {
    let server = setup_mock_server().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut mailer = mailer_for(
        Driver::Mailgun,
        &server,
        MailerConfig::builder().api_key("key-123"),
    );
    compose(&mut mailer);

    let err = mailer.send().await.unwrap_err();
    assert!(matches!(
        err,
        MailerError::MissingCredentials { provider: Driver::Mailgun, .. }
    ));
}

#[tokio::test]
async fn test_mailgun_rejection_returns_body() {
    let server = setup_mock_server().await;

    Mock::given(method("POST"))
        .and(path("/mg.acme.test/messages"))
        .respond_with(ResponseTemplate::new(400).set_body_string("'from' parameter is missing"))
        .mount(&server)
        .await;

    let mut mailer = mailer_for(Driver::Mailgun, &server, config());
    compose(&mut mailer);

    let err = mailer.send().await.unwrap_err();
    assert_eq!(err.to_string(), "'from' parameter is missing");
}
