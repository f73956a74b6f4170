//! HTTP transport implementation.

use async_trait::async_trait;
use reqwest::{Client, ClientBuilder, RequestBuilder};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tracing::instrument;

use super::{MultipartPart, MultipartRequest, TransportError};
use crate::observability::{log_request, log_response};

/// HTTP POST request with a raw body.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    /// Absolute request URL.
    pub url: String,
    /// Request headers.
    pub headers: HashMap<String, String>,
    /// Request body.
    pub body: Vec<u8>,
}

impl HttpRequest {
    /// Creates a new POST request.
    pub fn post(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            headers: HashMap::new(),
            body: Vec::new(),
        }
    }

    /// Creates a POST request with a JSON body.
    pub fn post_json<T: serde::Serialize>(
        url: impl Into<String>,
        value: &T,
    ) -> Result<Self, serde_json::Error> {
        let body = serde_json::to_vec(value)?;
        Ok(Self::post(url)
            .with_header("Content-Type", "application/json")
            .with_body(body))
    }

    /// Sets the request body.
    pub fn with_body(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        self
    }

    /// Sets a header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Parses the body as JSON.
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }
}

/// HTTP response representation.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response headers.
    pub headers: HashMap<String, String>,
    /// Response body.
    pub body: Vec<u8>,
}

/// HTTP transport trait.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Send a request with a raw body.
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;

    /// Send a multipart form request.
    async fn send_multipart(
        &self,
        request: MultipartRequest,
    ) -> Result<HttpResponse, TransportError>;
}

/// HTTP transport implementation using reqwest.
pub struct HttpTransportImpl {
    client: Client,
    timeout: Duration,
}

impl HttpTransportImpl {
    /// Creates a new HTTP transport whose connect and total request time are
    /// bounded by `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let client = ClientBuilder::new()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()
            .map_err(|e| TransportError::Build {
                message: e.to_string(),
            })?;

        Ok(Self { client, timeout })
    }

    fn map_error(&self, e: &reqwest::Error) -> TransportError {
        if e.is_timeout() {
            TransportError::Timeout {
                timeout: self.timeout,
            }
        } else if e.is_connect() {
            TransportError::Connection {
                message: e.to_string(),
            }
        } else if e.is_builder() {
            TransportError::Build {
                message: e.to_string(),
            }
        } else {
            TransportError::InvalidResponse {
                message: e.to_string(),
            }
        }
    }

    async fn execute(
        &self,
        mut req_builder: RequestBuilder,
        headers: &HashMap<String, String>,
    ) -> Result<HttpResponse, TransportError> {
        for (name, value) in headers {
            req_builder = req_builder.header(name, value);
        }

        let start = Instant::now();
        let response = req_builder.send().await.map_err(|e| self.map_error(&e))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_str().unwrap_or_default().to_string()))
            .collect();
        let body = response
            .bytes()
            .await
            .map_err(|e| self.map_error(&e))?
            .to_vec();

        let duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
        log_response(status, duration_ms, &body);

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

#[async_trait]
impl HttpTransport for HttpTransportImpl {
    #[instrument(skip(self, request), fields(url = %request.url))]
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        log_request(&request.url, request.body.len());
        let req_builder = self.client.post(&request.url).body(request.body);
        self.execute(req_builder, &request.headers).await
    }

    #[instrument(skip(self, request), fields(url = %request.url, parts = request.parts.len()))]
    async fn send_multipart(
        &self,
        request: MultipartRequest,
    ) -> Result<HttpResponse, TransportError> {
        log_request(&request.url, request.parts.len());
        let mut form = reqwest::multipart::Form::new();

        for part in request.parts {
            form = match part {
                MultipartPart::Text { name, value } => form.text(name, value),
                MultipartPart::File {
                    name,
                    filename,
                    content_type,
                    data,
                } => {
                    let mut part = reqwest::multipart::Part::bytes(data).file_name(filename);
                    if !content_type.is_empty() {
                        part = part.mime_str(&content_type).map_err(|e| TransportError::Build {
                            message: e.to_string(),
                        })?;
                    }
                    form.part(name, part)
                }
            };
        }

        let req_builder = self.client.post(&request.url).multipart(form);
        self.execute(req_builder, &request.headers).await
    }
}

impl std::fmt::Debug for HttpTransportImpl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransportImpl")
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_json_sets_content_type() {
        let request = HttpRequest::post_json(
            "https://api.sendgrid.com/v3/mail/send",
            &serde_json::json!({"subject": "<b>hi</b>"}),
        )
        .unwrap();

        assert_eq!(
            request.headers.get("Content-Type"),
            Some(&"application/json".to_string())
        );
        // serde_json does not escape HTML characters.
        assert_eq!(request.body, br#"{"subject":"<b>hi</b>"}"#.to_vec());
    }

    #[test]
    fn test_transport_builds_with_timeout() {
        let transport = HttpTransportImpl::new(Duration::from_secs(5)).unwrap();
        assert!(format!("{:?}", transport).contains("5s"));
    }
}
