//! The mailer facade.
//!
//! [`Mailer`] pairs one provider adapter with the message being composed.
//! Call sites stay the same whichever provider is selected.

use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::instrument;

use crate::config::MailerConfig;
use crate::errors::MailerResult;
use crate::providers::{create_provider, Driver, Provider};
use crate::transport::{HttpTransport, HttpTransportImpl};
use crate::types::{resolve_attachments, Message};

/// Composes a message and sends it through the selected provider.
///
/// # Example
///
/// ```rust,no_run
/// use integrations_mailer::{Driver, Mailer, MailerConfig};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = MailerConfig::builder()
///         .api_key("key-xxxxxxxx")
///         .domain("mg.example.com")
///         .build()?;
///
///     let mut mailer = Mailer::new(Driver::Mailgun, config)?;
///     mailer
///         .from("Example", "no-reply@example.com")
///         .to("Jane", "jane@example.com")
///         .subject("Welcome")
///         .body_text("Thanks for signing up.")
///         .attachment_file("terms.pdf");
///
///     mailer.send().await?;
///     Ok(())
/// }
/// ```
pub struct Mailer {
    provider: Box<dyn Provider>,
    message: Message,
}

impl Mailer {
    /// Creates a mailer for `driver` backed by a reqwest transport that uses
    /// the configured request timeout.
    pub fn new(driver: Driver, config: MailerConfig) -> MailerResult<Self> {
        let transport = Arc::new(HttpTransportImpl::new(config.request_timeout)?);
        Ok(Self::with_transport(driver, config, transport))
    }

    /// Creates a mailer from a driver name such as `"sendgrid"`.
    ///
    /// Fails with `MailerError::UnsupportedDriver` for unknown names.
    pub fn from_name(name: &str, config: MailerConfig) -> MailerResult<Self> {
        Self::new(name.parse()?, config)
    }

    /// Creates a mailer that dispatches through a custom transport.
    pub fn with_transport(
        driver: Driver,
        config: MailerConfig,
        transport: Arc<dyn HttpTransport>,
    ) -> Self {
        Self::with_provider(create_provider(driver, config, transport))
    }

    /// Creates a mailer around an existing adapter.
    pub fn with_provider(provider: Box<dyn Provider>) -> Self {
        Self {
            provider,
            message: Message::new(),
        }
    }

    /// Returns the selected provider.
    pub fn driver(&self) -> Driver {
        self.provider.driver()
    }

    /// Returns the message composed so far.
    pub fn message(&self) -> &Message {
        &self.message
    }

    /// Sets the sender.
    pub fn from(&mut self, name: impl Into<String>, email: impl Into<String>) -> &mut Self {
        self.message.from(name, email);
        self
    }

    /// Appends a recipient.
    pub fn to(&mut self, name: impl Into<String>, email: impl Into<String>) -> &mut Self {
        self.message.to(name, email);
        self
    }

    /// Appends a cc recipient.
    pub fn cc(&mut self, name: impl Into<String>, email: impl Into<String>) -> &mut Self {
        self.message.cc(name, email);
        self
    }

    /// Appends a bcc recipient.
    pub fn bcc(&mut self, name: impl Into<String>, email: impl Into<String>) -> &mut Self {
        self.message.bcc(name, email);
        self
    }

    /// Sets the reply-to address.
    pub fn reply_to(&mut self, name: impl Into<String>, email: impl Into<String>) -> &mut Self {
        self.message.reply_to(name, email);
        self
    }

    /// Sets the subject.
    pub fn subject(&mut self, subject: impl Into<String>) -> &mut Self {
        self.message.subject(subject);
        self
    }

    /// Sets the HTML body.
    pub fn body_html(&mut self, html: impl Into<String>) -> &mut Self {
        self.message.body_html(html);
        self
    }

    /// Sets the plain text body.
    pub fn body_text(&mut self, text: impl Into<String>) -> &mut Self {
        self.message.body_text(text);
        self
    }

    /// Attaches a file from disk.
    pub fn attachment_file(&mut self, path: impl Into<PathBuf>) -> &mut Self {
        self.message.attachment_file(path);
        self
    }

    /// Attaches a file from disk for inline display.
    pub fn attachment_inline_file(&mut self, path: impl Into<PathBuf>) -> &mut Self {
        self.message.attachment_inline_file(path);
        self
    }

    /// Attaches the contents of a reader under `filename`.
    pub fn attachment_reader<R>(&mut self, filename: impl Into<String>, reader: R) -> &mut Self
    where
        R: Read + Send + 'static,
    {
        self.message.attachment_reader(filename, reader);
        self
    }

    /// Attaches the contents of a reader under `filename` for inline display.
    pub fn attachment_inline_reader<R>(
        &mut self,
        filename: impl Into<String>,
        reader: R,
    ) -> &mut Self
    where
        R: Read + Send + 'static,
    {
        self.message.attachment_inline_reader(filename, reader);
        self
    }

    /// Validates, resolves attachments and dispatches the message.
    ///
    /// The composed message is consumed whatever the outcome. Validation,
    /// credential and attachment ceiling errors are returned before any
    /// request is made. A non-success response yields
    /// `MailerError::Api` whose message is the raw response body.
    #[instrument(
        skip(self),
        fields(
            provider = %self.provider.driver(),
            recipients = self.message.recipient_count(),
            attachments = self.message.attachments.len(),
        )
    )]
    pub async fn send(&mut self) -> MailerResult<()> {
        let mut message = std::mem::take(&mut self.message);
        let driver = self.provider.driver();
        let limits = self.provider.limits();

        message.validate(driver, &limits)?;
        self.provider.check_credentials()?;

        let sources = std::mem::take(&mut message.attachments);
        let attachments =
            resolve_attachments(sources, driver, limits.max_attachment_bytes).await?;

        tracing::debug!("Dispatching email");
        self.provider.deliver(&message, &attachments).await
    }
}

impl std::fmt::Debug for Mailer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mailer")
            .field("driver", &self.provider.driver())
            .field("message", &self.message)
            .finish()
    }
}
