//! Mock HTTP transport for testing.
//!
//! Streams are scripted as a list of byte chunks, so tests control exactly
//! where chunk boundaries fall. Every stream handed out is tracked, letting
//! tests assert that the consumer released it.

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use std::collections::HashMap;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};

use crate::traits::{ByteStream, Headers, HttpClient, HttpError, Params, Response};

/// A recorded HTTP request for verification in tests.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    /// HTTP method (GET or POST)
    pub method: String,
    /// Request URL without the query string
    pub url: String,
    /// Query parameters
    pub query: Params,
    /// Form body (for POST requests)
    pub form: Option<Params>,
    /// Request headers
    pub headers: Headers,
}

impl RecordedRequest {
    /// First query value for `key`
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// First form value for `key`
    pub fn form_value(&self, key: &str) -> Option<&str> {
        self.form
            .as_ref()?
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// The URL with its percent-encoded query string, as it would go on the wire
    pub fn full_url(&self) -> String {
        if self.query.is_empty() {
            return self.url.clone();
        }
        let query = self
            .query
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");
        format!("{}?{}", self.url, query)
    }
}

/// Configuration for a mock response.
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// Return a complete response
    Success(Response),
    /// Fail before any response
    Error(HttpError),
    /// Stream these chunks, then end
    Stream(Vec<Bytes>),
    /// Stream these chunks, then fail with the error
    StreamThenError(Vec<Bytes>, HttpError),
    /// Stream these chunks, then stay open without producing anything
    PendingStream(Vec<Bytes>),
}

/// Mock HTTP client for testing.
///
/// # Example
///
/// ```ignore
/// use cyf_chat::adapters::mock::{MockHttpClient, MockResponse};
/// use bytes::Bytes;
///
/// let client = MockHttpClient::new();
/// client.set_response(
///     "http://localhost/split",
///     MockResponse::Stream(vec![Bytes::from("data: {\"content\":\"hi\",\"done\":true}\n")]),
/// );
/// ```
#[derive(Debug, Clone)]
pub struct MockHttpClient {
    /// Configured responses by URL
    responses: Arc<Mutex<HashMap<String, MockResponse>>>,
    /// Default response when no specific match
    default_response: Arc<Mutex<Option<MockResponse>>>,
    /// Recorded requests for verification
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    /// Streams handed out
    opened: Arc<AtomicUsize>,
    /// Streams dropped by the consumer
    released: Arc<AtomicUsize>,
}

impl MockHttpClient {
    /// Create a new mock HTTP client.
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(HashMap::new())),
            default_response: Arc::new(Mutex::new(None)),
            requests: Arc::new(Mutex::new(Vec::new())),
            opened: Arc::new(AtomicUsize::new(0)),
            released: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Set a response for a specific URL (matched exactly, then by prefix).
    pub fn set_response(&self, url: &str, response: MockResponse) {
        let mut responses = self.responses.lock().unwrap();
        responses.insert(url.to_string(), response);
    }

    /// Set a default response for URLs without specific matches.
    pub fn set_default_response(&self, response: MockResponse) {
        let mut default = self.default_response.lock().unwrap();
        *default = Some(response);
    }

    /// Get all recorded requests.
    pub fn get_requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Number of byte streams handed out so far
    pub fn opened_streams(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    /// Number of byte streams the consumer has dropped
    pub fn released_streams(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }

    fn record_request(
        &self,
        method: &str,
        url: &str,
        query: &Params,
        form: Option<&Params>,
        headers: &Headers,
    ) {
        let mut requests = self.requests.lock().unwrap();
        requests.push(RecordedRequest {
            method: method.to_string(),
            url: url.to_string(),
            query: query.clone(),
            form: form.cloned(),
            headers: headers.clone(),
        });
    }

    fn get_response(&self, url: &str) -> Option<MockResponse> {
        let responses = self.responses.lock().unwrap();

        if let Some(response) = responses.get(url) {
            return Some(response.clone());
        }

        for (pattern, response) in responses.iter() {
            if url.starts_with(pattern) {
                return Some(response.clone());
            }
        }

        let default = self.default_response.lock().unwrap();
        default.clone()
    }

    fn track(&self, inner: ByteStream) -> ByteStream {
        self.opened.fetch_add(1, Ordering::SeqCst);
        Box::pin(TrackedStream {
            inner,
            released: Arc::clone(&self.released),
        })
    }
}

fn chunks(items: Vec<Bytes>) -> impl Stream<Item = Result<Bytes, HttpError>> + Send + 'static {
    futures::stream::iter(items.into_iter().map(Ok::<Bytes, HttpError>))
}

impl Default for MockHttpClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Byte stream wrapper that counts drops.
struct TrackedStream {
    inner: ByteStream,
    released: Arc<AtomicUsize>,
}

impl Stream for TrackedStream {
    type Item = Result<Bytes, HttpError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.as_mut().poll_next(cx)
    }
}

impl Drop for TrackedStream {
    fn drop(&mut self) {
        self.released.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl HttpClient for MockHttpClient {
    async fn post_form(
        &self,
        url: &str,
        query: &Params,
        form: &Params,
        headers: &Headers,
    ) -> Result<Response, HttpError> {
        self.record_request("POST", url, query, Some(form), headers);

        match self.get_response(url) {
            Some(MockResponse::Success(response)) => Ok(response),
            Some(MockResponse::Error(err)) => Err(err),
            Some(_) => Err(HttpError::Other(
                "Stream response on non-stream request".to_string(),
            )),
            None => Err(HttpError::Other(format!("No mock response for URL: {}", url))),
        }
    }

    async fn get_stream(
        &self,
        url: &str,
        query: &Params,
        headers: &Headers,
    ) -> Result<ByteStream, HttpError> {
        self.record_request("GET", url, query, None, headers);

        match self.get_response(url) {
            Some(MockResponse::Stream(items)) => Ok(self.track(Box::pin(chunks(items)))),
            Some(MockResponse::StreamThenError(items, err)) => {
                let tail = futures::stream::once(async move { Err::<Bytes, HttpError>(err) });
                Ok(self.track(Box::pin(futures::StreamExt::chain(chunks(items), tail))))
            }
            Some(MockResponse::PendingStream(items)) => {
                let tail = futures::stream::pending::<Result<Bytes, HttpError>>();
                Ok(self.track(Box::pin(futures::StreamExt::chain(chunks(items), tail))))
            }
            Some(MockResponse::Success(response)) if !response.is_success() => {
                Err(HttpError::ServerError {
                    status: response.status,
                    message: response.text().unwrap_or_default(),
                })
            }
            Some(MockResponse::Success(_)) => Err(HttpError::Other(
                "Non-stream response on stream request".to_string(),
            )),
            Some(MockResponse::Error(err)) => Err(err),
            None => Err(HttpError::Other(format!("No mock response for URL: {}", url))),
        }
    }
}
