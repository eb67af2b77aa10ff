//! Mock configuration for test fixtures.
//!
//! Re-exports the mock transport from `cyf_chat::adapters::mock` and adds a
//! builder for scripting its responses.

pub use cyf_chat::adapters::mock::{MockHttpClient, MockResponse};
pub use cyf_chat::traits::{HttpError, Response};

use bytes::Bytes;

/// Configuration for setting up mock HTTP responses.
pub struct MockHttpConfig {
    client: MockHttpClient,
}

#[allow(dead_code)]
impl MockHttpConfig {
    pub fn new() -> Self {
        Self {
            client: MockHttpClient::new(),
        }
    }

    /// Stream these chunks then end.
    pub fn with_stream(self, url: &str, chunks: &[&str]) -> Self {
        self.client
            .set_response(url, MockResponse::Stream(to_bytes(chunks)));
        self
    }

    /// Stream these chunks then hang until the consumer gives up.
    pub fn with_pending_stream(self, url: &str, chunks: &[&str]) -> Self {
        self.client
            .set_response(url, MockResponse::PendingStream(to_bytes(chunks)));
        self
    }

    /// Stream these chunks then fail.
    pub fn with_broken_stream(self, url: &str, chunks: &[&str], error: HttpError) -> Self {
        self.client
            .set_response(url, MockResponse::StreamThenError(to_bytes(chunks), error));
        self
    }

    /// Respond with a complete body.
    pub fn with_json_response(self, url: &str, status: u16, json: &str) -> Self {
        self.client.set_response(
            url,
            MockResponse::Success(Response::new(status, Bytes::from(json.to_string()))),
        );
        self
    }

    /// Fail before any response.
    pub fn with_error(self, url: &str, error: HttpError) -> Self {
        self.client.set_response(url, MockResponse::Error(error));
        self
    }

    pub fn build(self) -> MockHttpClient {
        self.client
    }
}

impl Default for MockHttpConfig {
    fn default() -> Self {
        Self::new()
    }
}

fn to_bytes(chunks: &[&str]) -> Vec<Bytes> {
    chunks.iter().map(|c| Bytes::from(c.to_string())).collect()
}
