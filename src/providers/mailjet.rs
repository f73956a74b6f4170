//! Mailjet adapter (Send API v3.1).

use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use tracing::instrument;

use super::{check_status, Driver, Provider};
use crate::auth::{AuthProvider, BasicAuth};
use crate::config::MailerConfig;
use crate::errors::{MailerError, MailerResult};
use crate::transport::{HttpRequest, HttpTransport};
use crate::types::{Address, Attachment, Message};

/// Default Mailjet API base URL.
pub const MAILJET_BASE_URL: &str = "https://api.mailjet.com/v3.1";

#[derive(Debug, Serialize)]
struct MailjetRequest<'a> {
    #[serde(rename = "Messages")]
    messages: Vec<MailjetMessage<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct MailjetMessage<'a> {
    from: MailjetAddress<'a>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    to: Vec<MailjetAddress<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    cc: Vec<MailjetAddress<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    bcc: Vec<MailjetAddress<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_to: Option<MailjetAddress<'a>>,
    subject: &'a str,
    #[serde(skip_serializing_if = "str::is_empty")]
    text_part: &'a str,
    #[serde(rename = "HTMLPart", skip_serializing_if = "str::is_empty")]
    html_part: &'a str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    attachments: Vec<MailjetAttachment<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    inlined_attachments: Vec<MailjetAttachment<'a>>,
}

#[derive(Debug, Serialize)]
struct MailjetAddress<'a> {
    #[serde(rename = "Email")]
    email: &'a str,
    #[serde(rename = "Name", skip_serializing_if = "str::is_empty")]
    name: &'a str,
}

impl<'a> From<&'a Address> for MailjetAddress<'a> {
    fn from(a: &'a Address) -> Self {
        Self {
            email: &a.email,
            name: &a.name,
        }
    }
}

#[derive(Debug, Serialize)]
struct MailjetAttachment<'a> {
    #[serde(rename = "ContentType")]
    content_type: &'a str,
    #[serde(rename = "Filename")]
    filename: &'a str,
    #[serde(rename = "ContentID", skip_serializing_if = "Option::is_none")]
    content_id: Option<&'a str>,
    #[serde(rename = "Base64Content")]
    content: String,
}

impl<'a> From<&'a Attachment> for MailjetAttachment<'a> {
    fn from(a: &'a Attachment) -> Self {
        Self {
            content_type: &a.content_type,
            filename: &a.filename,
            content_id: a.is_inline().then_some(a.content_id.as_str()),
            content: a.content(),
        }
    }
}

fn addresses(list: &[Address]) -> Vec<MailjetAddress<'_>> {
    list.iter().map(MailjetAddress::from).collect()
}

/// Mailjet adapter.
pub struct MailjetProvider {
    config: MailerConfig,
    transport: Arc<dyn HttpTransport>,
}

impl MailjetProvider {
    /// Creates a new Mailjet adapter.
    pub fn new(config: MailerConfig, transport: Arc<dyn HttpTransport>) -> Self {
        Self { config, transport }
    }

    fn auth(&self) -> BasicAuth {
        BasicAuth::new(
            self.config.public_key().unwrap_or_default(),
            self.config.private_key().unwrap_or_default(),
        )
    }

    fn build_body<'a>(
        message: &'a Message,
        attachments: &'a [Attachment],
    ) -> MailerResult<MailjetRequest<'a>> {
        let from = message
            .sender()
            .ok_or_else(|| MailerError::validation_field("you must provide from", "from"))?;

        let (inline, regular): (Vec<&Attachment>, Vec<&Attachment>) =
            attachments.iter().partition(|a| a.is_inline());

        Ok(MailjetRequest {
            messages: vec![MailjetMessage {
                from: from.into(),
                to: addresses(&message.to),
                cc: addresses(&message.cc),
                bcc: addresses(&message.bcc),
                reply_to: message.reply_address().map(MailjetAddress::from),
                subject: &message.subject,
                text_part: &message.body_text,
                html_part: &message.body_html,
                attachments: regular.into_iter().map(MailjetAttachment::from).collect(),
                inlined_attachments: inline.into_iter().map(MailjetAttachment::from).collect(),
            }],
        })
    }
}

#[async_trait]
impl Provider for MailjetProvider {
    fn driver(&self) -> Driver {
        Driver::Mailjet
    }

    fn endpoint(&self) -> MailerResult<String> {
        Ok(format!("{}/send", self.config.base_url_or(MAILJET_BASE_URL)))
    }

    fn check_credentials(&self) -> MailerResult<()> {
        self.auth().validate().map_err(|_| {
            MailerError::missing_credentials(
                Driver::Mailjet,
                "you must provide PrivateKey and PublicKey in config",
            )
        })
    }

    #[instrument(skip_all, fields(provider = "mailjet", attachments = attachments.len()))]
    async fn deliver(&self, message: &Message, attachments: &[Attachment]) -> MailerResult<()> {
        let body = Self::build_body(message, attachments)?;
        let mut request = HttpRequest::post_json(self.endpoint()?, &body)?;

        self.auth().apply_auth(&mut request.headers);

        let response = self.transport.send(request).await?;
        check_status(Driver::Mailjet, &response, |status| status == 200)
    }
}

impl std::fmt::Debug for MailjetProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MailjetProvider")
            .field("config", &self.config)
            .finish()
    }
}
