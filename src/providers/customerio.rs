//! Customer.io adapter (transactional send API).

use async_trait::async_trait;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

use super::{check_status, Driver, Provider};
use crate::auth::{AuthProvider, BearerAuth};
use crate::config::MailerConfig;
use crate::errors::{MailerError, MailerResult};
use crate::transport::{HttpRequest, HttpTransport};
use crate::types::{Address, Attachment, Message};

/// Default Customer.io API base URL (US region).
pub const CUSTOMERIO_BASE_URL: &str = "https://api.customer.io";

#[derive(Debug, Serialize)]
struct SendEmailRequest<'a> {
    identifiers: BTreeMap<&'static str, String>,
    from: String,
    to: String,
    subject: &'a str,
    #[serde(skip_serializing_if = "str::is_empty")]
    body: &'a str,
    #[serde(skip_serializing_if = "str::is_empty")]
    plaintext_body: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_to: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    bcc: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    attachments: BTreeMap<&'a str, String>,
}

/// Customer.io adapter.
pub struct CustomerIoProvider {
    config: MailerConfig,
    transport: Arc<dyn HttpTransport>,
}

impl CustomerIoProvider {
    /// Creates a new Customer.io adapter.
    pub fn new(config: MailerConfig, transport: Arc<dyn HttpTransport>) -> Self {
        Self { config, transport }
    }

    fn auth(&self) -> BearerAuth {
        BearerAuth::new(self.config.api_key().unwrap_or_default())
    }

    fn build_body<'a>(
        message: &'a Message,
        attachments: &'a [Attachment],
    ) -> MailerResult<SendEmailRequest<'a>> {
        let from = message
            .sender()
            .ok_or_else(|| MailerError::validation_field("you must provide from", "from"))?;

        // The API has no cc field; cc recipients travel as bcc.
        let hidden: Vec<Address> = message.cc.iter().chain(&message.bcc).cloned().collect();

        let mut identifiers = BTreeMap::new();
        identifiers.insert("id", Uuid::new_v4().to_string());

        Ok(SendEmailRequest {
            identifiers,
            from: from.format(),
            to: Address::join(&message.to),
            subject: &message.subject,
            body: &message.body_html,
            plaintext_body: &message.body_text,
            reply_to: message.reply_address().map(Address::format),
            bcc: (!hidden.is_empty()).then(|| Address::join(&hidden)),
            attachments: attachments
                .iter()
                .map(|a| (a.filename.as_str(), a.content()))
                .collect(),
        })
    }
}

#[async_trait]
impl Provider for CustomerIoProvider {
    fn driver(&self) -> Driver {
        Driver::CustomerIo
    }

    fn endpoint(&self) -> MailerResult<String> {
        Ok(format!(
            "{}/v1/send/email",
            self.config.base_url_or(CUSTOMERIO_BASE_URL)
        ))
    }

    fn check_credentials(&self) -> MailerResult<()> {
        self.auth().validate().map_err(|_| {
            MailerError::missing_credentials(Driver::CustomerIo, "you must provide APIKey in config")
        })
    }

    #[instrument(skip_all, fields(provider = "customerio", attachments = attachments.len()))]
    async fn deliver(&self, message: &Message, attachments: &[Attachment]) -> MailerResult<()> {
        let body = Self::build_body(message, attachments)?;
        let mut request = HttpRequest::post_json(self.endpoint()?, &body)?;

        self.auth().apply_auth(&mut request.headers);

        let response = self.transport.send(request).await?;
        check_status(Driver::CustomerIo, &response, |status| {
            (200..300).contains(&status)
        })
    }
}

impl std::fmt::Debug for CustomerIoProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CustomerIoProvider")
            .field("config", &self.config)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::{MockResponse, MockTransport};
    use crate::types::Disposition;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn provider(transport: Arc<MockTransport>) -> CustomerIoProvider {
        let config = MailerConfig::builder().api_key("app-key").build().unwrap();
        CustomerIoProvider::new(config, transport)
    }

    #[test]
    fn test_requires_api_key() {
        let config = MailerConfig::builder().api_key("").build().unwrap();
        let provider = CustomerIoProvider::new(config, Arc::new(MockTransport::default()));
        assert!(matches!(
            provider.check_credentials(),
            Err(MailerError::MissingCredentials { provider: Driver::CustomerIo, .. })
        ));
    }

    #[tokio::test]
    async fn test_deliver_builds_body() {
        let transport = Arc::new(MockTransport::with_status(200));
        let mut message = Message::new();
        message
            .from("Sender", "sender@example.com")
            .to("Jane", "jane@example.com")
            .cc("", "cc@example.com")
            .bcc("", "bcc@example.com")
            .subject("Reset")
            .body_text("Reset your password")
            .body_html("<p>Reset your password</p>");
        let attachments = vec![Attachment::from_bytes(
            "note.txt",
            b"total".to_vec(),
            Disposition::Attachment,
        )];

        provider(Arc::clone(&transport))
            .deliver(&message, &attachments)
            .await
            .unwrap();

        let request = transport.last_request().unwrap();
        assert_eq!(request.url(), "https://api.customer.io/v1/send/email");
        assert_eq!(
            request.headers().get("Authorization"),
            Some(&"Bearer app-key".to_string())
        );

        let mut body = request.json().unwrap();
        let id = body["identifiers"]["id"].as_str().unwrap().to_string();
        assert!(Uuid::parse_str(&id).is_ok());
        body.as_object_mut().unwrap().remove("identifiers");

        assert_eq!(
            body,
            json!({
                "from": "Sender <sender@example.com>",
                "to": "Jane <jane@example.com>",
                "subject": "Reset",
                "body": "<p>Reset your password</p>",
                "plaintext_body": "Reset your password",
                "bcc": "cc@example.com,bcc@example.com",
                "attachments": {"note.txt": "dG90YWw="}
            })
        );
    }

    #[tokio::test]
    async fn test_any_2xx_is_success() {
        let transport = Arc::new(MockTransport::with_status(201));
        let mut message = Message::new();
        message
            .from("", "sender@example.com")
            .to("", "jane@example.com")
            .body_text("x");

        assert!(provider(Arc::clone(&transport))
            .deliver(&message, &[])
            .await
            .is_ok());

        transport.queue(MockResponse::new(400, r#"{"meta":{"error":"bad"}}"#));
        let err = provider(transport).deliver(&message, &[]).await.unwrap_err();
        assert_eq!(err.to_string(), r#"{"meta":{"error":"bad"}}"#);
    }
}
