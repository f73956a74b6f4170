//! Mailgun adapter.
//!
//! Mailgun takes `multipart/form-data` with one text field per header and
//! indexed file parts for attachments.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::instrument;

use super::{check_status, Driver, Provider};
use crate::auth::{AuthProvider, BasicAuth};
use crate::config::MailerConfig;
use crate::errors::{MailerError, MailerResult};
use crate::transport::{HttpTransport, MultipartRequest};
use crate::types::{Address, Attachment, Message};

/// Default Mailgun API base URL.
pub const MAILGUN_BASE_URL: &str = "https://api.mailgun.net/v3";

/// Mailgun adapter.
pub struct MailgunProvider {
    config: MailerConfig,
    transport: Arc<dyn HttpTransport>,
}

impl MailgunProvider {
    /// Creates a new Mailgun adapter.
    pub fn new(config: MailerConfig, transport: Arc<dyn HttpTransport>) -> Self {
        Self { config, transport }
    }

    fn auth(&self) -> BasicAuth {
        BasicAuth::new("api", self.config.api_key().unwrap_or_default())
    }

    /// Builds the form, fields first and then attachments.
    fn build_form(
        &self,
        url: String,
        message: &Message,
        attachments: &[Attachment],
    ) -> MultipartRequest {
        let mut form = MultipartRequest::new(url);

        if let Some(from) = message.sender() {
            form = form.text("from", from.format());
        }
        form = form
            .text("to", Address::join(&message.to))
            .text("subject", message.subject.as_str());
        if !message.cc.is_empty() {
            form = form.text("cc", Address::join(&message.cc));
        }
        if !message.bcc.is_empty() {
            form = form.text("bcc", Address::join(&message.bcc));
        }
        if let Some(reply_to) = message.reply_address() {
            form = form.text("h:Reply-To", reply_to.format());
        }
        if !message.body_text.is_empty() {
            form = form.text("text", message.body_text.as_str());
        }
        if !message.body_html.is_empty() {
            form = form.text("html", message.body_html.as_str());
        }

        let (mut attachment_index, mut inline_index) = (0, 0);
        for attachment in attachments {
            let name = if attachment.is_inline() {
                inline_index += 1;
                format!("inline[{}]", inline_index - 1)
            } else {
                attachment_index += 1;
                format!("attachment[{}]", attachment_index - 1)
            };
            form = form.file(
                name,
                attachment.filename.as_str(),
                attachment.content_type.as_str(),
                attachment.data.clone(),
            );
        }

        form
    }
}

#[async_trait]
impl Provider for MailgunProvider {
    fn driver(&self) -> Driver {
        Driver::Mailgun
    }

    fn endpoint(&self) -> MailerResult<String> {
        let domain = self.config.domain().ok_or_else(|| {
            MailerError::missing_credentials(Driver::Mailgun, "you must provide domain name in config")
        })?;
        Ok(format!(
            "{}/{}/messages",
            self.config.base_url_or(MAILGUN_BASE_URL),
            domain
        ))
    }

    fn check_credentials(&self) -> MailerResult<()> {
        self.auth().validate().map_err(|_| {
            MailerError::missing_credentials(Driver::Mailgun, "you must provide APIKey in config")
        })?;
        self.endpoint().map(|_| ())
    }

    #[instrument(skip_all, fields(provider = "mailgun", attachments = attachments.len()))]
    async fn deliver(&self, message: &Message, attachments: &[Attachment]) -> MailerResult<()> {
        let url = self.endpoint()?;
        let mut form = self.build_form(url, message, attachments);

        self.auth().apply_auth(&mut form.headers);

        let response = self.transport.send_multipart(form).await?;
        check_status(Driver::Mailgun, &response, |status| status == 200)
    }
}

impl std::fmt::Debug for MailgunProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MailgunProvider")
            .field("config", &self.config)
            .finish()
    }
}
