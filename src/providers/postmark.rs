//! Postmark adapter.

use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use tracing::instrument;

use super::{check_status, Driver, Provider};
use crate::auth::{AuthProvider, HeaderTokenAuth};
use crate::config::MailerConfig;
use crate::errors::{MailerError, MailerResult};
use crate::transport::{HttpRequest, HttpTransport};
use crate::types::{Address, Attachment, Message};

/// Default Postmark API base URL.
pub const POSTMARK_BASE_URL: &str = "https://api.postmarkapp.com";

const ACCOUNT_TOKEN_HEADER: &str = "X-Postmark-Account-Token";
const SERVER_TOKEN_HEADER: &str = "X-Postmark-Server-Token";

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct PostmarkRequest<'a> {
    from: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    to: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    cc: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    bcc: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_to: Option<String>,
    subject: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    text_body: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    html_body: Option<&'a str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    attachments: Vec<PostmarkAttachment<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct PostmarkAttachment<'a> {
    name: &'a str,
    content: String,
    content_type: &'a str,
    #[serde(rename = "ContentID", skip_serializing_if = "Option::is_none")]
    content_id: Option<&'a str>,
}

impl<'a> From<&'a Attachment> for PostmarkAttachment<'a> {
    fn from(a: &'a Attachment) -> Self {
        Self {
            name: &a.filename,
            content: a.content(),
            content_type: &a.content_type,
            // A content ID makes Postmark embed the file, so only inline
            // attachments carry one.
            content_id: a.is_inline().then_some(a.content_id.as_str()),
        }
    }
}

fn joined(addresses: &[Address]) -> Option<String> {
    (!addresses.is_empty()).then(|| Address::join(addresses))
}

fn non_empty(s: &str) -> Option<&str> {
    (!s.is_empty()).then_some(s)
}

/// Postmark adapter.
pub struct PostmarkProvider {
    config: MailerConfig,
    transport: Arc<dyn HttpTransport>,
}

impl PostmarkProvider {
    /// Creates a new Postmark adapter.
    pub fn new(config: MailerConfig, transport: Arc<dyn HttpTransport>) -> Self {
        Self { config, transport }
    }

    fn auth(&self) -> HeaderTokenAuth {
        let mut auth = HeaderTokenAuth::new();
        if let Some(token) = self.config.account_token() {
            auth = auth.with_token(ACCOUNT_TOKEN_HEADER, token);
        }
        if let Some(token) = self.config.server_token() {
            auth = auth.with_token(SERVER_TOKEN_HEADER, token);
        }
        auth
    }

    fn build_body<'a>(
        message: &'a Message,
        attachments: &'a [Attachment],
    ) -> MailerResult<PostmarkRequest<'a>> {
        let from = message
            .sender()
            .ok_or_else(|| MailerError::validation_field("you must provide from", "from"))?;

        Ok(PostmarkRequest {
            from: from.format(),
            to: joined(&message.to),
            cc: joined(&message.cc),
            bcc: joined(&message.bcc),
            reply_to: message.reply_address().map(Address::format),
            subject: &message.subject,
            text_body: non_empty(&message.body_text),
            html_body: non_empty(&message.body_html),
            attachments: attachments.iter().map(PostmarkAttachment::from).collect(),
        })
    }
}

#[async_trait]
impl Provider for PostmarkProvider {
    fn driver(&self) -> Driver {
        Driver::Postmark
    }

    fn endpoint(&self) -> MailerResult<String> {
        Ok(format!("{}/email", self.config.base_url_or(POSTMARK_BASE_URL)))
    }

    fn check_credentials(&self) -> MailerResult<()> {
        self.auth().validate().map_err(|_| {
            MailerError::missing_credentials(
                Driver::Postmark,
                "you must provide AccountToken or ServerToken in config",
            )
        })
    }

    #[instrument(skip_all, fields(provider = "postmark", attachments = attachments.len()))]
    async fn deliver(&self, message: &Message, attachments: &[Attachment]) -> MailerResult<()> {
        let body = Self::build_body(message, attachments)?;
        let mut request = HttpRequest::post_json(self.endpoint()?, &body)?
            .with_header("Accept", "application/json");
        self.auth().apply_auth(&mut request.headers);

        let response = self.transport.send(request).await?;
        check_status(Driver::Postmark, &response, |status| status == 200)
    }
}

impl std::fmt::Debug for PostmarkProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostmarkProvider")
            .field("config", &self.config)
            .finish()
    }
}
