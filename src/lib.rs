//! Unified Transactional Email Client
//!
//! One message-building API for sending transactional email through
//! Mailgun, SendGrid, Postmark, Mailjet or Customer.io. The caller picks a
//! provider, supplies credentials, composes a message and sends it; the
//! selected adapter translates the message into that provider's HTTP API.
//!
//! # Features
//!
//! - **One API, five providers**: switch providers by changing the [`Driver`]
//! - **Early validation**: missing fields, recipient ceilings and attachment
//!   size ceilings are reported before any network traffic
//! - **Attachments**: files from disk or in-memory readers, regular or inline
//! - **Verbatim provider errors**: a rejected send carries the provider's raw
//!   response body
//! - **Observability**: `tracing` spans and structured logging
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use integrations_mailer::{Driver, Mailer, MailerConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = MailerConfig::builder()
//!         .api_key("SG.your_api_key")
//!         .build()?;
//!
//!     let mut mailer = Mailer::new(Driver::SendGrid, config)?;
//!     mailer
//!         .from("Acme", "no-reply@acme.test")
//!         .to("Jane Doe", "jane@example.com")
//!         .subject("Your receipt")
//!         .body_text("Thanks for your order.")
//!         .body_html("<p>Thanks for your order.</p>");
//!
//!     mailer.send().await?;
//!     Ok(())
//! }
//! ```
//!
//! # Selecting a provider by name
//!
//! ```rust,no_run
//! use integrations_mailer::{Mailer, MailerConfig, MailerError};
//!
//! # fn main() -> Result<(), MailerError> {
//! let config = MailerConfig::builder()
//!     .public_key("public")
//!     .private_key("private")
//!     .build()?;
//!
//! let mailer = Mailer::from_name("mailjet", config)?;
//! # let _ = mailer;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod auth;
pub mod client;
pub mod config;
pub mod errors;
pub mod observability;
pub mod providers;
pub mod transport;
pub mod types;

// Re-exports for convenience
pub use client::Mailer;
pub use config::{MailerConfig, MailerConfigBuilder};
pub use errors::{MailerError, MailerResult};
pub use providers::{Driver, Provider, ProviderLimits};
pub use types::{Address, Attachment, Disposition, Message};

/// Mock implementations for testing.
#[cfg(any(test, feature = "mocks"))]
pub mod mocks;
