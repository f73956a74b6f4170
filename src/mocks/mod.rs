//! Mock implementations for testing.
//!
//! [`MockTransport`] records every request it receives and answers from a
//! queue of canned responses, so tests can assert on the exact wire payload
//! and on whether a request was made at all.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use crate::transport::{
    HttpRequest, HttpResponse, HttpTransport, MultipartRequest, TransportError,
};

/// A request captured by [`MockTransport`].
#[derive(Debug, Clone)]
pub enum RecordedRequest {
    /// A raw body request.
    Raw(HttpRequest),
    /// A multipart form request.
    Multipart(MultipartRequest),
}

impl RecordedRequest {
    /// Request URL.
    pub fn url(&self) -> &str {
        match self {
            RecordedRequest::Raw(r) => &r.url,
            RecordedRequest::Multipart(r) => &r.url,
        }
    }

    /// Request headers.
    pub fn headers(&self) -> &HashMap<String, String> {
        match self {
            RecordedRequest::Raw(r) => &r.headers,
            RecordedRequest::Multipart(r) => &r.headers,
        }
    }

    /// Parses a raw body as JSON. Returns `None` for multipart requests or
    /// invalid JSON.
    pub fn json(&self) -> Option<serde_json::Value> {
        match self {
            RecordedRequest::Raw(r) => r.json().ok(),
            RecordedRequest::Multipart(_) => None,
        }
    }

    /// Returns the multipart request, if this was one.
    pub fn multipart(&self) -> Option<&MultipartRequest> {
        match self {
            RecordedRequest::Multipart(r) => Some(r),
            RecordedRequest::Raw(_) => None,
        }
    }
}

/// A canned response.
#[derive(Debug, Clone)]
pub struct MockResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body.
    pub body: Vec<u8>,
}

impl MockResponse {
    /// Creates a response with a status and text body.
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into().into_bytes(),
        }
    }

    fn into_response(self) -> HttpResponse {
        HttpResponse {
            status: self.status,
            headers: HashMap::new(),
            body: self.body,
        }
    }
}

/// Mock HTTP transport for testing.
pub struct MockTransport {
    responses: Mutex<Vec<MockResponse>>,
    requests: Mutex<Vec<RecordedRequest>>,
    default_response: MockResponse,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}

impl MockTransport {
    /// Creates a mock answering every request with `status` and an empty body.
    pub fn with_status(status: u16) -> Self {
        Self {
            responses: Mutex::new(Vec::new()),
            requests: Mutex::new(Vec::new()),
            default_response: MockResponse::new(status, ""),
        }
    }

    /// Queues a response, used before falling back to the default.
    pub fn queue(&self, response: MockResponse) {
        lock(&self.responses).push(response);
    }

    /// Gets all recorded requests.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        lock(&self.requests).clone()
    }

    /// Gets the last recorded request.
    pub fn last_request(&self) -> Option<RecordedRequest> {
        lock(&self.requests).last().cloned()
    }

    /// Returns the number of requests made.
    pub fn request_count(&self) -> usize {
        lock(&self.requests).len()
    }

    fn respond(&self, request: RecordedRequest) -> HttpResponse {
        lock(&self.requests).push(request);
        let mut responses = lock(&self.responses);
        if responses.is_empty() {
            self.default_response.clone().into_response()
        } else {
            responses.remove(0).into_response()
        }
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::with_status(200)
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        Ok(self.respond(RecordedRequest::Raw(request)))
    }

    async fn send_multipart(
        &self,
        request: MultipartRequest,
    ) -> Result<HttpResponse, TransportError> {
        Ok(self.respond(RecordedRequest::Multipart(request)))
    }
}

/// Transport that fails every request with a connection error.
#[derive(Debug, Default)]
pub struct FailingTransport;

#[async_trait]
impl HttpTransport for FailingTransport {
    async fn send(&self, _request: HttpRequest) -> Result<HttpResponse, TransportError> {
        Err(TransportError::Connection {
            message: "connection refused".to_string(),
        })
    }

    async fn send_multipart(
        &self,
        _request: MultipartRequest,
    ) -> Result<HttpResponse, TransportError> {
        Err(TransportError::Connection {
            message: "connection refused".to_string(),
        })
    }
}
