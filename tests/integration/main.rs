//! Integration tests using WireMock
//!
//! Each test points a real `Mailer` at a mock HTTP server and checks the
//! complete send cycle: validation, attachment resolution, serialization,
//! authentication and status handling.

mod customerio;
mod mailgun;
mod mailjet;
mod postmark;
mod sendgrid;

use integrations_mailer::{Driver, Mailer, MailerConfig, MailerConfigBuilder, MailerError};
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Starts a mock server.
pub async fn setup_mock_server() -> MockServer {
    MockServer::start().await
}

/// Builds a mailer whose provider base URL points at the mock server.
pub fn mailer_for(driver: Driver, server: &MockServer, config: MailerConfigBuilder) -> Mailer {
    let config = config
        .base_url(server.uri())
        .timeout_secs(5)
        .build()
        .expect("valid config");
    Mailer::new(driver, config).expect("mailer")
}

/// Fills in the fields every provider requires.
pub fn compose(mailer: &mut Mailer) {
    mailer
        .from("Acme", "no-reply@acme.test")
        .to("Jane Doe", "jane@example.com")
        .subject("Your receipt")
        .body_text("Thanks for your order.");
}

#[tokio::test]
async fn test_unknown_driver_name_is_rejected() {
    let result = Mailer::from_name("carrier-pigeon", MailerConfig::default());
    assert!(matches!(
        result,
        Err(MailerError::UnsupportedDriver { .. })
    ));
}

#[tokio::test]
async fn test_slow_provider_times_out() {
    let server = setup_mock_server().await;

    Mock::given(method("POST"))
        .and(path("/mail/send"))
        .respond_with(ResponseTemplate::new(202).set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;

    let config = MailerConfig::builder()
        .api_key("SG.test-key")
        .base_url(server.uri())
        .timeout_secs(1)
        .build()
        .expect("valid config");
    let mut mailer = Mailer::new(Driver::SendGrid, config).expect("mailer");
    compose(&mut mailer);

    let err = mailer.send().await.unwrap_err();
    assert!(matches!(err, MailerError::Timeout { timeout } if timeout == Duration::from_secs(1)));
    assert!(err.is_retryable());
}
