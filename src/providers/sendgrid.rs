//! SendGrid adapter (v3 Mail Send API).

use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use tracing::instrument;

use super::{check_status, is_empty_slice, Driver, Provider};
use crate::auth::{AuthProvider, BearerAuth};
use crate::config::MailerConfig;
use crate::errors::{MailerError, MailerResult};
use crate::transport::{HttpRequest, HttpTransport};
use crate::types::{Address, Attachment, Message};

/// Default SendGrid API base URL.
pub const SENDGRID_BASE_URL: &str = "https://api.sendgrid.com/v3";

#[derive(Debug, Serialize)]
struct SendGridRequest<'a> {
    from: &'a Address,
    personalizations: Vec<Personalization<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_to: Option<&'a Address>,
    content: Vec<SendGridContent<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    attachments: Vec<SendGridAttachment<'a>>,
}

#[derive(Debug, Serialize)]
struct Personalization<'a> {
    to: &'a [Address],
    #[serde(skip_serializing_if = "is_empty_slice")]
    cc: &'a [Address],
    #[serde(skip_serializing_if = "is_empty_slice")]
    bcc: &'a [Address],
    subject: &'a str,
}

#[derive(Debug, Serialize)]
struct SendGridContent<'a> {
    #[serde(rename = "type")]
    content_type: &'static str,
    value: &'a str,
}

#[derive(Debug, Serialize)]
struct SendGridAttachment<'a> {
    content: String,
    #[serde(rename = "type")]
    content_type: &'a str,
    filename: &'a str,
    content_id: &'a str,
    disposition: &'static str,
}

impl<'a> From<&'a Attachment> for SendGridAttachment<'a> {
    fn from(a: &'a Attachment) -> Self {
        Self {
            content: a.content(),
            content_type: &a.content_type,
            filename: &a.filename,
            content_id: &a.content_id,
            disposition: a.disposition.as_str(),
        }
    }
}

/// SendGrid adapter.
pub struct SendGridProvider {
    config: MailerConfig,
    transport: Arc<dyn HttpTransport>,
}

impl SendGridProvider {
    /// Creates a new SendGrid adapter.
    pub fn new(config: MailerConfig, transport: Arc<dyn HttpTransport>) -> Self {
        Self { config, transport }
    }

    fn auth(&self) -> BearerAuth {
        BearerAuth::new(self.config.api_key().unwrap_or_default())
    }

    fn build_body<'a>(
        message: &'a Message,
        attachments: &'a [Attachment],
    ) -> MailerResult<SendGridRequest<'a>> {
        let from = message
            .sender()
            .ok_or_else(|| MailerError::validation_field("you must provide from", "from"))?;

        let mut content = Vec::with_capacity(2);
        if !message.body_text.is_empty() {
            content.push(SendGridContent {
                content_type: "text/plain",
                value: &message.body_text,
            });
        }
        if !message.body_html.is_empty() {
            content.push(SendGridContent {
                content_type: "text/html",
                value: &message.body_html,
            });
        }

        Ok(SendGridRequest {
            from,
            personalizations: vec![Personalization {
                to: &message.to,
                cc: &message.cc,
                bcc: &message.bcc,
                subject: &message.subject,
            }],
            reply_to: message.reply_address(),
            content,
            attachments: attachments.iter().map(SendGridAttachment::from).collect(),
        })
    }
}

#[async_trait]
impl Provider for SendGridProvider {
    fn driver(&self) -> Driver {
        Driver::SendGrid
    }

    fn endpoint(&self) -> MailerResult<String> {
        Ok(format!("{}/mail/send", self.config.base_url_or(SENDGRID_BASE_URL)))
    }

    fn check_credentials(&self) -> MailerResult<()> {
        self.auth().validate().map_err(|_| {
            MailerError::missing_credentials(Driver::SendGrid, "you must provide APIKey in config")
        })
    }

    #[instrument(skip_all, fields(provider = "sendgrid", attachments = attachments.len()))]
    async fn deliver(&self, message: &Message, attachments: &[Attachment]) -> MailerResult<()> {
        let body = Self::build_body(message, attachments)?;
        let mut request = HttpRequest::post_json(self.endpoint()?, &body)?;

        self.auth().apply_auth(&mut request.headers);

        let response = self.transport.send(request).await?;
        check_status(Driver::SendGrid, &response, |status| status == 202)
    }
}

impl std::fmt::Debug for SendGridProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SendGridProvider")
            .field("config", &self.config)
            .finish()
    }
}
