//! The logical email message shared by every provider.

use std::io::Read;
use std::path::PathBuf;

use super::address::Address;
use super::attachment::{AttachmentReader, AttachmentSource, Disposition};
use crate::errors::{MailerError, MailerResult};
use crate::providers::{Driver, ProviderLimits};

/// An email message built incrementally before a single send.
#[derive(Debug, Default)]
pub struct Message {
    /// Sender.
    pub from: Option<Address>,
    /// Primary recipients, in insertion order.
    pub to: Vec<Address>,
    /// Carbon copy recipients.
    pub cc: Vec<Address>,
    /// Blind carbon copy recipients.
    pub bcc: Vec<Address>,
    /// Reply-to address.
    pub reply_to: Option<Address>,
    /// Subject line.
    pub subject: String,
    /// Plain text body.
    pub body_text: String,
    /// HTML body.
    pub body_html: String,
    /// Attachment sources, resolved at send time.
    pub attachments: Vec<AttachmentSource>,
}

impl Message {
    /// Creates an empty message.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the sender, replacing any previous value.
    pub fn from(&mut self, name: impl Into<String>, email: impl Into<String>) -> &mut Self {
        self.from = Some(Address::new(name, email));
        self
    }

    /// Appends a primary recipient.
    pub fn to(&mut self, name: impl Into<String>, email: impl Into<String>) -> &mut Self {
        self.to.push(Address::new(name, email));
        self
    }

    /// Appends a carbon copy recipient.
    pub fn cc(&mut self, name: impl Into<String>, email: impl Into<String>) -> &mut Self {
        self.cc.push(Address::new(name, email));
        self
    }

    /// Appends a blind carbon copy recipient.
    pub fn bcc(&mut self, name: impl Into<String>, email: impl Into<String>) -> &mut Self {
        self.bcc.push(Address::new(name, email));
        self
    }

    /// Sets the reply-to address, replacing any previous value.
    pub fn reply_to(&mut self, name: impl Into<String>, email: impl Into<String>) -> &mut Self {
        self.reply_to = Some(Address::new(name, email));
        self
    }

    /// Sets the subject.
    pub fn subject(&mut self, subject: impl Into<String>) -> &mut Self {
        self.subject = subject.into();
        self
    }

    /// Sets the HTML body.
    pub fn body_html(&mut self, html: impl Into<String>) -> &mut Self {
        self.body_html = html.into();
        self
    }

    /// Sets the plain text body.
    pub fn body_text(&mut self, text: impl Into<String>) -> &mut Self {
        self.body_text = text.into();
        self
    }

    /// Appends a file attachment.
    pub fn attachment_file(&mut self, path: impl Into<PathBuf>) -> &mut Self {
        self.attach_file(path.into(), Disposition::Attachment)
    }

    /// Appends an inline file attachment.
    pub fn attachment_inline_file(&mut self, path: impl Into<PathBuf>) -> &mut Self {
        self.attach_file(path.into(), Disposition::Inline)
    }

    /// Appends a reader attachment under a logical filename.
    pub fn attachment_reader<R>(&mut self, filename: impl Into<String>, reader: R) -> &mut Self
    where
        R: Read + Send + 'static,
    {
        self.attach_reader(filename.into(), Box::new(reader), Disposition::Attachment)
    }

    /// Appends an inline reader attachment under a logical filename.
    pub fn attachment_inline_reader<R>(
        &mut self,
        filename: impl Into<String>,
        reader: R,
    ) -> &mut Self
    where
        R: Read + Send + 'static,
    {
        self.attach_reader(filename.into(), Box::new(reader), Disposition::Inline)
    }

    fn attach_file(&mut self, path: PathBuf, disposition: Disposition) -> &mut Self {
        self.attachments
            .push(AttachmentSource::File { path, disposition });
        self
    }

    fn attach_reader(
        &mut self,
        filename: String,
        reader: AttachmentReader,
        disposition: Disposition,
    ) -> &mut Self {
        self.attachments
            .push(AttachmentSource::reader(filename, reader, disposition));
        self
    }

    /// Returns the combined number of to, cc and bcc recipients.
    pub fn recipient_count(&self) -> usize {
        self.to.len() + self.cc.len() + self.bcc.len()
    }

    /// Returns the sender's address if one with a non-empty email is set.
    pub fn sender(&self) -> Option<&Address> {
        self.from.as_ref().filter(|a| a.is_present())
    }

    /// Returns the reply-to address if one with a non-empty email is set.
    pub fn reply_address(&self) -> Option<&Address> {
        self.reply_to.as_ref().filter(|a| a.is_present())
    }

    /// Checks the message against the rules shared by every provider and the
    /// provider's recipient ceiling.
    pub fn validate(&self, provider: Driver, limits: &ProviderLimits) -> MailerResult<()> {
        if self.sender().is_none() {
            return Err(MailerError::validation_field("you must provide from", "from"));
        }
        if self.to.is_empty() {
            return Err(MailerError::validation_field(
                "you must provide at least one recipient",
                "to",
            ));
        }
        let count = self.recipient_count();
        if count > limits.max_recipients {
            return Err(MailerError::TooManyRecipients {
                provider,
                limit: limits.max_recipients,
                actual: count,
            });
        }
        if self.body_text.is_empty() && self.body_html.is_empty() {
            return Err(MailerError::validation_field(
                "you must provide a Text or HTML body",
                "body",
            ));
        }
        Ok(())
    }
}
