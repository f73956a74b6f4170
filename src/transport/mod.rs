//! HTTP transport layer for the mailer.
//!
//! Adapters describe a request with [`HttpRequest`] or [`MultipartRequest`]
//! and hand it to an [`HttpTransport`]. The default implementation is backed
//! by `reqwest`; tests substitute a recording mock.

mod http;

pub use http::{HttpRequest, HttpResponse, HttpTransport, HttpTransportImpl};

use std::collections::HashMap;
use std::time::Duration;

/// Multipart form request.
#[derive(Debug, Clone)]
pub struct MultipartRequest {
    /// Absolute request URL.
    pub url: String,
    /// Request headers.
    pub headers: HashMap<String, String>,
    /// Multipart form parts, in submission order.
    pub parts: Vec<MultipartPart>,
}

impl MultipartRequest {
    /// Creates an empty multipart request.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            headers: HashMap::new(),
            parts: Vec::new(),
        }
    }

    /// Appends a text field.
    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parts.push(MultipartPart::Text {
            name: name.into(),
            value: value.into(),
        });
        self
    }

    /// Appends a file field.
    pub fn file(
        mut self,
        name: impl Into<String>,
        filename: impl Into<String>,
        content_type: impl Into<String>,
        data: Vec<u8>,
    ) -> Self {
        self.parts.push(MultipartPart::File {
            name: name.into(),
            filename: filename.into(),
            content_type: content_type.into(),
            data,
        });
        self
    }

    /// Returns the value of the first text field with the given name.
    pub fn text_value(&self, name: &str) -> Option<&str> {
        self.parts.iter().find_map(|part| match part {
            MultipartPart::Text { name: n, value } if n == name => Some(value.as_str()),
            _ => None,
        })
    }
}

/// A part of a multipart form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MultipartPart {
    /// Text field.
    Text {
        /// Field name.
        name: String,
        /// Field value.
        value: String,
    },
    /// File field.
    File {
        /// Field name.
        name: String,
        /// File name.
        filename: String,
        /// Content type (empty when unknown).
        content_type: String,
        /// File data.
        data: Vec<u8>,
    },
}

/// Transport error types.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The HTTP client or request could not be built.
    #[error("Failed to build request: {message}")]
    Build {
        /// Error message.
        message: String,
    },

    /// Connection error.
    #[error("Connection error: {message}")]
    Connection {
        /// Error message.
        message: String,
    },

    /// Timeout error.
    #[error("Timeout after {timeout:?}")]
    Timeout {
        /// Timeout duration.
        timeout: Duration,
    },

    /// Invalid response.
    #[error("Invalid response: {message}")]
    InvalidResponse {
        /// Error message.
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multipart_request_keeps_part_order() {
        let request = MultipartRequest::new("https://api.mailgun.net/v3/mg.example.com/messages")
            .text("from", "Sender <sender@example.com>")
            .file("attachment[0]", "a.txt", "text/plain", b"hello".to_vec())
            .text("subject", "Hi");

        assert_eq!(request.parts.len(), 3);
        assert_eq!(request.text_value("from"), Some("Sender <sender@example.com>"));
        assert_eq!(request.text_value("subject"), Some("Hi"));
        assert_eq!(request.text_value("missing"), None);
        assert!(matches!(&request.parts[1], MultipartPart::File { name, .. } if name == "attachment[0]"));
    }
}
