//! Configuration for the mailer.
//!
//! A single `MailerConfig` carries the credentials and options for every
//! supported provider. Only the fields the selected provider needs have to be
//! set, and their presence is checked when a message is sent.

use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;
use url::Url;

use crate::errors::MailerResult;

/// Default request timeout (60 seconds).
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Credentials and options shared by all providers.
#[derive(Clone)]
pub struct MailerConfig {
    pub(crate) server_token: Option<SecretString>,
    pub(crate) account_token: Option<SecretString>,
    pub(crate) api_key: Option<SecretString>,
    pub(crate) private_key: Option<SecretString>,
    /// Public key (Mailjet).
    pub public_key: Option<String>,
    /// Base URL override for the provider API.
    pub base_url: Option<String>,
    /// Sending domain (Mailgun).
    pub domain: Option<String>,
    /// Username for providers using username/password authentication.
    pub username: Option<String>,
    pub(crate) password: Option<SecretString>,
    /// Request timeout.
    pub request_timeout: Duration,
}

impl Default for MailerConfig {
    fn default() -> Self {
        Self {
            server_token: None,
            account_token: None,
            api_key: None,
            private_key: None,
            public_key: None,
            base_url: None,
            domain: None,
            username: None,
            password: None,
            request_timeout: DEFAULT_TIMEOUT,
        }
    }
}

fn exposed(secret: Option<&SecretString>) -> Option<&str> {
    secret
        .map(|s| s.expose_secret().as_str())
        .filter(|s| !s.is_empty())
}

impl MailerConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> MailerConfigBuilder {
        MailerConfigBuilder::new()
    }

    /// Returns the Postmark server token, if set and non-empty.
    pub(crate) fn server_token(&self) -> Option<&str> {
        exposed(self.server_token.as_ref())
    }

    /// Returns the Postmark account token, if set and non-empty.
    pub(crate) fn account_token(&self) -> Option<&str> {
        exposed(self.account_token.as_ref())
    }

    /// Returns the API key, if set and non-empty.
    pub(crate) fn api_key(&self) -> Option<&str> {
        exposed(self.api_key.as_ref())
    }

    /// Returns the private key, if set and non-empty.
    pub(crate) fn private_key(&self) -> Option<&str> {
        exposed(self.private_key.as_ref())
    }

    /// Returns the public key, if set and non-empty.
    pub(crate) fn public_key(&self) -> Option<&str> {
        self.public_key.as_deref().filter(|s| !s.is_empty())
    }

    /// Returns the domain, if set and non-empty.
    pub(crate) fn domain(&self) -> Option<&str> {
        self.domain.as_deref().filter(|s| !s.is_empty())
    }

    /// Returns the base URL override or the given provider default.
    pub fn base_url_or<'a>(&'a self, default: &'a str) -> &'a str {
        self.base_url
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or(default)
    }
}

impl std::fmt::Debug for MailerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let redact = |s: &Option<SecretString>| s.as_ref().map(|_| "[REDACTED]");
        f.debug_struct("MailerConfig")
            .field("server_token", &redact(&self.server_token))
            .field("account_token", &redact(&self.account_token))
            .field("api_key", &redact(&self.api_key))
            .field("private_key", &redact(&self.private_key))
            .field("public_key", &self.public_key)
            .field("base_url", &self.base_url)
            .field("domain", &self.domain)
            .field("username", &self.username)
            .field("password", &redact(&self.password))
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

/// Builder for `MailerConfig`.
#[derive(Default)]
pub struct MailerConfigBuilder {
    server_token: Option<String>,
    account_token: Option<String>,
    api_key: Option<String>,
    private_key: Option<String>,
    public_key: Option<String>,
    base_url: Option<String>,
    domain: Option<String>,
    username: Option<String>,
    password: Option<String>,
    request_timeout: Option<Duration>,
}

impl MailerConfigBuilder {
    /// Creates a new configuration builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the server token (Postmark).
    pub fn server_token(mut self, token: impl Into<String>) -> Self {
        self.server_token = Some(token.into());
        self
    }

    /// Sets the account token (Postmark).
    pub fn account_token(mut self, token: impl Into<String>) -> Self {
        self.account_token = Some(token.into());
        self
    }

    /// Sets the API key (Mailgun, SendGrid, Customer.io).
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Sets the private key (Mailjet).
    pub fn private_key(mut self, key: impl Into<String>) -> Self {
        self.private_key = Some(key.into());
        self
    }

    /// Sets the public key (Mailjet).
    pub fn public_key(mut self, key: impl Into<String>) -> Self {
        self.public_key = Some(key.into());
        self
    }

    /// Overrides the provider base URL.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Sets the sending domain (Mailgun).
    pub fn domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    /// Sets the username.
    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Sets the password.
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Sets the request timeout.
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Sets the request timeout in seconds.
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.request_timeout = Some(Duration::from_secs(secs));
        self
    }

    /// Builds the configuration.
    ///
    /// Credentials are not checked here; each provider verifies the fields it
    /// needs when a message is sent.
    pub fn build(self) -> MailerResult<MailerConfig> {
        let base_url = match self.base_url.filter(|u| !u.is_empty()) {
            Some(url) => {
                Url::parse(&url)?;
                Some(url.trim_end_matches('/').to_string())
            }
            None => None,
        };

        // A zero timeout would fail every request immediately.
        let request_timeout = self
            .request_timeout
            .filter(|t| !t.is_zero())
            .unwrap_or(DEFAULT_TIMEOUT);

        Ok(MailerConfig {
            server_token: self.server_token.map(SecretString::new),
            account_token: self.account_token.map(SecretString::new),
            api_key: self.api_key.map(SecretString::new),
            private_key: self.private_key.map(SecretString::new),
            public_key: self.public_key,
            base_url,
            domain: self.domain,
            username: self.username,
            password: self.password.map(SecretString::new),
            request_timeout,
        })
    }
}
