//! Authentication schemes used by the providers.
//!
//! Mailgun and Mailjet use HTTP Basic authentication, SendGrid and
//! Customer.io use Bearer tokens, and Postmark sends its tokens in
//! dedicated headers.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use secrecy::{ExposeSecret, SecretString};
use std::collections::HashMap;

use crate::errors::MailerError;

/// Authentication provider trait.
///
/// Implementations add their credentials to the headers of an outgoing
/// request.
pub trait AuthProvider: Send + Sync {
    /// Apply authentication to request headers.
    fn apply_auth(&self, headers: &mut HashMap<String, String>);

    /// Validate the credentials.
    fn validate(&self) -> Result<(), MailerError>;
}

/// HTTP Basic authentication.
pub struct BasicAuth {
    username: String,
    password: SecretString,
}

impl BasicAuth {
    /// Creates a new Basic authentication provider.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: SecretString::new(password.into()),
        }
    }

    /// Returns the encoded `user:password` credentials.
    fn encoded(&self) -> String {
        BASE64.encode(format!("{}:{}", self.username, self.password.expose_secret()))
    }
}

impl AuthProvider for BasicAuth {
    fn apply_auth(&self, headers: &mut HashMap<String, String>) {
        headers.insert(
            "Authorization".to_string(),
            format!("Basic {}", self.encoded()),
        );
    }

    fn validate(&self) -> Result<(), MailerError> {
        if self.username.is_empty() || self.password.expose_secret().is_empty() {
            return Err(MailerError::configuration(
                "Basic authentication requires a username and password",
            ));
        }
        Ok(())
    }
}

impl std::fmt::Debug for BasicAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BasicAuth")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Bearer token authentication.
pub struct BearerAuth {
    token: SecretString,
}

impl BearerAuth {
    /// Creates a new Bearer authentication provider.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: SecretString::new(token.into()),
        }
    }
}

impl AuthProvider for BearerAuth {
    fn apply_auth(&self, headers: &mut HashMap<String, String>) {
        headers.insert(
            "Authorization".to_string(),
            format!("Bearer {}", self.token.expose_secret()),
        );
    }

    fn validate(&self) -> Result<(), MailerError> {
        if self.token.expose_secret().is_empty() {
            return Err(MailerError::configuration("Bearer token cannot be empty"));
        }
        Ok(())
    }
}

impl std::fmt::Debug for BearerAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BearerAuth")
            .field("token", &"[REDACTED]")
            .finish()
    }
}

/// Tokens carried in provider-specific headers.
#[derive(Default)]
pub struct HeaderTokenAuth {
    tokens: Vec<(String, SecretString)>,
}

impl HeaderTokenAuth {
    /// Creates an empty header token provider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a header carrying a token.
    pub fn with_token(mut self, header: impl Into<String>, token: impl Into<String>) -> Self {
        self.tokens
            .push((header.into(), SecretString::new(token.into())));
        self
    }
}

impl AuthProvider for HeaderTokenAuth {
    fn apply_auth(&self, headers: &mut HashMap<String, String>) {
        for (name, token) in &self.tokens {
            headers.insert(name.clone(), token.expose_secret().clone());
        }
    }

    fn validate(&self) -> Result<(), MailerError> {
        if self.tokens.is_empty() {
            return Err(MailerError::configuration("at least one token header is required"));
        }
        Ok(())
    }
}

impl std::fmt::Debug for HeaderTokenAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.tokens.iter().map(|(n, _)| n.as_str()).collect();
        f.debug_struct("HeaderTokenAuth")
            .field("headers", &names)
            .finish()
    }
}
