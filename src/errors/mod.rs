//! Error types for the mailer.
//!
//! Errors fall into two groups: problems with the message or configuration
//! that are detected before any I/O (validation, missing credentials,
//! ceilings), and operational failures raised while reading attachments or
//! talking to the provider.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::providers::Driver;
use crate::transport::TransportError;

/// Result type alias for mailer operations.
pub type MailerResult<T> = Result<T, MailerError>;

/// Error type for mailer operations.
#[derive(Debug, Error)]
pub enum MailerError {
    /// Configuration error (invalid base URL, missing domain, etc.)
    #[error("Configuration error: {message}")]
    Configuration {
        /// Error message describing the configuration issue.
        message: String,
    },

    /// The requested driver name does not match any supported provider.
    #[error("unsupported mail driver: {name}")]
    UnsupportedDriver {
        /// The name that failed to parse.
        name: String,
    },

    /// The message is incomplete.
    #[error("Validation error: {message}")]
    Validation {
        /// Error message describing the validation issue.
        message: String,
        /// The message field that caused the error.
        field: Option<String>,
    },

    /// Credentials required by the selected provider are absent.
    #[error("Missing credentials for {provider}: {message}")]
    MissingCredentials {
        /// The provider that rejected the configuration.
        provider: Driver,
        /// Error message naming the missing credential.
        message: String,
    },

    /// More recipients than the provider accepts in a single message.
    #[error("total number of recipients including to/cc/bcc can not be greater than {limit} for {provider} (got {actual})")]
    TooManyRecipients {
        /// The provider whose ceiling was exceeded.
        provider: Driver,
        /// The provider ceiling.
        limit: usize,
        /// The combined to/cc/bcc count.
        actual: usize,
    },

    /// Attachments exceed the provider's size ceiling.
    #[error("max attachment size for {provider} is {limit} bytes (got {actual})")]
    AttachmentTooLarge {
        /// The provider whose ceiling was exceeded.
        provider: Driver,
        /// Ceiling in bytes.
        limit: u64,
        /// Bytes counted when the ceiling was crossed. Reader sources stop
        /// one byte past the remaining budget, so this can be below the full
        /// attachment size.
        actual: u64,
    },

    /// Reading an attachment failed.
    #[error("failed to read attachment {}: {source}", path.display())]
    Io {
        /// Path or logical name of the attachment.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Network/connection error.
    #[error("Network error: {message}")]
    Network {
        /// Error message.
        message: String,
    },

    /// The request did not complete within the configured timeout.
    #[error("Request timeout after {timeout:?}")]
    Timeout {
        /// The timeout that elapsed.
        timeout: Duration,
    },

    /// Serialization error while building a request body.
    #[error("Serialization error: {message}")]
    Serialization {
        /// Error message.
        message: String,
    },

    /// The provider answered with a non-success status. Displays the raw
    /// response body.
    #[error("{body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body.
        body: String,
    },
}

impl MailerError {
    /// Returns true if a caller could reasonably retry the send.
    ///
    /// The mailer itself never retries.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            MailerError::Network { .. }
                | MailerError::Timeout { .. }
                | MailerError::Api { status: 429 | 500..=504, .. }
        )
    }

    /// Returns the HTTP status for provider errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            MailerError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        MailerError::Validation {
            message: message.into(),
            field: None,
        }
    }

    /// Creates a validation error tied to a message field.
    pub fn validation_field(message: impl Into<String>, field: impl Into<String>) -> Self {
        MailerError::Validation {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// Creates a missing credentials error.
    pub fn missing_credentials(provider: Driver, message: impl Into<String>) -> Self {
        MailerError::MissingCredentials {
            provider,
            message: message.into(),
        }
    }

    /// Creates a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        MailerError::Configuration {
            message: message.into(),
        }
    }

    /// Creates an I/O error for an attachment.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        MailerError::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates a provider error from a raw response.
    pub fn api(status: u16, body: &[u8]) -> Self {
        MailerError::Api {
            status,
            body: String::from_utf8_lossy(body).into_owned(),
        }
    }
}

impl From<TransportError> for MailerError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Timeout { timeout } => MailerError::Timeout { timeout },
            TransportError::Build { message } => MailerError::Configuration { message },
            other => MailerError::Network {
                message: other.to_string(),
            },
        }
    }
}

impl From<serde_json::Error> for MailerError {
    fn from(err: serde_json::Error) -> Self {
        MailerError::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<url::ParseError> for MailerError {
    fn from(err: url::ParseError) -> Self {
        MailerError::Configuration {
            message: format!("Invalid URL: {}", err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_displays_raw_body() {
        let error = MailerError::api(400, br#"{"message":"'from' parameter is missing"}"#);
        assert_eq!(error.to_string(), r#"{"message":"'from' parameter is missing"}"#);
        assert_eq!(error.status(), Some(400));
    }

    #[test]
    fn test_error_is_retryable() {
        assert!(MailerError::Network {
            message: "connection refused".to_string()
        }
        .is_retryable());
        assert!(MailerError::api(503, b"unavailable").is_retryable());
        assert!(MailerError::api(429, b"slow down").is_retryable());
        assert!(!MailerError::api(401, b"unauthorized").is_retryable());
        assert!(!MailerError::validation("you must provide from").is_retryable());
    }

    #[test]
    fn test_transport_timeout_maps_to_timeout() {
        let error: MailerError = TransportError::Timeout {
            timeout: Duration::from_secs(60),
        }
        .into();

        if let MailerError::Timeout { timeout } = error {
            assert_eq!(timeout, Duration::from_secs(60));
        } else {
            panic!("Expected Timeout error");
        }
    }

    #[test]
    fn test_ceiling_messages_name_provider() {
        let error = MailerError::AttachmentTooLarge {
            provider: Driver::Mailgun,
            limit: 25_000_000,
            actual: 25_000_001,
        };
        assert!(error.to_string().contains("mailgun"));
    }
}
