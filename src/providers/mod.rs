//! Provider adapters.
//!
//! Each adapter translates the shared [`Message`] model into one provider's
//! wire format and dispatches it with a single HTTP request.

mod customerio;
mod mailgun;
mod mailjet;
mod postmark;
mod sendgrid;

pub use customerio::CustomerIoProvider;
pub use mailgun::MailgunProvider;
pub use mailjet::MailjetProvider;
pub use postmark::PostmarkProvider;
pub use sendgrid::SendGridProvider;

use async_trait::async_trait;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::config::MailerConfig;
use crate::errors::{MailerError, MailerResult};
use crate::transport::{HttpResponse, HttpTransport};
use crate::types::{Attachment, Message};

/// Supported email providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Driver {
    /// Mailgun.
    Mailgun,
    /// SendGrid.
    SendGrid,
    /// Postmark.
    Postmark,
    /// Mailjet.
    Mailjet,
    /// Customer.io transactional API.
    CustomerIo,
}

impl Driver {
    /// All supported drivers.
    pub const ALL: [Driver; 5] = [
        Driver::Mailgun,
        Driver::SendGrid,
        Driver::Postmark,
        Driver::Mailjet,
        Driver::CustomerIo,
    ];

    /// Returns the canonical lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Driver::Mailgun => "mailgun",
            Driver::SendGrid => "sendgrid",
            Driver::Postmark => "postmark",
            Driver::Mailjet => "mailjet",
            Driver::CustomerIo => "customerio",
        }
    }

    /// Returns the provider's documented per-message ceilings.
    pub fn limits(&self) -> ProviderLimits {
        match self {
            Driver::Mailgun => ProviderLimits::new(1000, 25),
            Driver::SendGrid => ProviderLimits::new(1000, 30),
            Driver::Postmark => ProviderLimits::new(50, 5),
            Driver::Mailjet => ProviderLimits::new(50, 15),
            Driver::CustomerIo => ProviderLimits::new(1000, 30),
        }
    }
}

impl fmt::Display for Driver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Driver {
    type Err = MailerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mailgun" => Ok(Driver::Mailgun),
            "sendgrid" => Ok(Driver::SendGrid),
            "postmark" | "postmarkapp" => Ok(Driver::Postmark),
            "mailjet" => Ok(Driver::Mailjet),
            "customerio" | "customer.io" | "customer_io" => Ok(Driver::CustomerIo),
            _ => Err(MailerError::UnsupportedDriver {
                name: s.to_string(),
            }),
        }
    }
}

/// Per-message ceilings enforced before dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProviderLimits {
    /// Maximum combined to/cc/bcc recipients.
    pub max_recipients: usize,
    /// Maximum total attachment size in bytes.
    pub max_attachment_bytes: u64,
}

impl ProviderLimits {
    const fn new(max_recipients: usize, max_attachment_mb: u64) -> Self {
        Self {
            max_recipients,
            max_attachment_bytes: max_attachment_mb * 1_000_000,
        }
    }
}

/// The contract every provider adapter implements.
#[async_trait]
pub trait Provider: Send + Sync {
    /// The provider this adapter talks to.
    fn driver(&self) -> Driver;

    /// Recipient and attachment ceilings.
    fn limits(&self) -> ProviderLimits {
        self.driver().limits()
    }

    /// The message endpoint URL.
    fn endpoint(&self) -> MailerResult<String>;

    /// Verifies that the credentials this provider needs are configured.
    fn check_credentials(&self) -> MailerResult<()>;

    /// Serializes the message and dispatches exactly one request.
    async fn deliver(&self, message: &Message, attachments: &[Attachment]) -> MailerResult<()>;
}

/// Creates the adapter for a driver.
pub fn create_provider(
    driver: Driver,
    config: MailerConfig,
    transport: Arc<dyn HttpTransport>,
) -> Box<dyn Provider> {
    match driver {
        Driver::Mailgun => Box::new(MailgunProvider::new(config, transport)),
        Driver::SendGrid => Box::new(SendGridProvider::new(config, transport)),
        Driver::Postmark => Box::new(PostmarkProvider::new(config, transport)),
        Driver::Mailjet => Box::new(MailjetProvider::new(config, transport)),
        Driver::CustomerIo => Box::new(CustomerIoProvider::new(config, transport)),
    }
}

/// Maps a response to success when its status matches `expected`, otherwise
/// to an error carrying the raw body.
pub(crate) fn check_status(
    driver: Driver,
    response: &HttpResponse,
    expected: impl Fn(u16) -> bool,
) -> MailerResult<()> {
    if expected(response.status) {
        tracing::info!(provider = %driver, status = response.status, "Email accepted");
        Ok(())
    } else {
        tracing::warn!(provider = %driver, status = response.status, "Email rejected");
        Err(MailerError::api(response.status, &response.body))
    }
}

pub(crate) fn is_empty_slice<T>(slice: &&[T]) -> bool {
    slice.is_empty()
}
