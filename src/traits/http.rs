//! HTTP transport trait abstraction.
//!
//! Provides a trait-based abstraction for the two request shapes the chat
//! backend uses, enabling dependency injection and mocking in tests.

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use std::collections::HashMap;
use std::pin::Pin;
use thiserror::Error;

/// HTTP headers represented as a key-value map.
pub type Headers = HashMap<String, String>;

/// Ordered query-string or form fields.
pub type Params = Vec<(String, String)>;

/// Body of a streaming response, delivered in transport-sized chunks.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, HttpError>> + Send>>;

/// HTTP response wrapper.
#[derive(Debug, Clone)]
pub struct Response {
    /// HTTP status code
    pub status: u16,
    /// Response headers
    pub headers: Headers,
    /// Response body
    pub body: Bytes,
}

impl Response {
    /// Create a new response.
    pub fn new(status: u16, body: Bytes) -> Self {
        Self {
            status,
            headers: HashMap::new(),
            body,
        }
    }

    /// Create a new response with headers.
    pub fn with_headers(status: u16, headers: Headers, body: Bytes) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// Check if the response indicates success (2xx status).
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Get the response body as a string.
    pub fn text(&self) -> Result<String, std::string::FromUtf8Error> {
        String::from_utf8(self.body.to_vec())
    }

    /// Parse the response body as JSON.
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }
}

/// Transport errors.
#[derive(Debug, Clone, Error)]
pub enum HttpError {
    /// Connection failed
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),
    /// Request timeout
    #[error("Request timeout: {0}")]
    Timeout(String),
    /// Server returned an error status before any body was read
    #[error("Server error ({status}): {message}")]
    ServerError { status: u16, message: String },
    /// Request was cancelled
    #[error("Request cancelled")]
    Cancelled,
    /// IO error while reading the body
    #[error("IO error: {0}")]
    Io(String),
    /// Invalid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
    /// Other error
    #[error("HTTP error: {0}")]
    Other(String),
}

impl HttpError {
    /// Check if this error is likely transient.
    pub fn is_retryable(&self) -> bool {
        match self {
            HttpError::ConnectionFailed(_) | HttpError::Timeout(_) | HttpError::Io(_) => true,
            HttpError::ServerError { status, .. } => {
                *status >= 500 || *status == 429 || *status == 408
            }
            HttpError::Cancelled | HttpError::InvalidUrl(_) | HttpError::Other(_) => false,
        }
    }

    /// Get a user-friendly error message.
    pub fn user_message(&self) -> String {
        match self {
            HttpError::ConnectionFailed(_) => {
                "Unable to connect to the server. Please check your connection.".to_string()
            }
            HttpError::Timeout(_) => {
                "The server took too long to respond. Please try again.".to_string()
            }
            HttpError::ServerError { status, .. } => match *status {
                400 => "The request was invalid. Please try again.".to_string(),
                401 | 403 => "Access denied. Please sign in again.".to_string(),
                404 => "The chat service was not found.".to_string(),
                429 => "Too many requests. Please wait a moment and try again.".to_string(),
                500..=599 => {
                    "The server is experiencing issues. Please try again later.".to_string()
                }
                _ => format!(
                    "The server returned an error (HTTP {}). Please try again.",
                    status
                ),
            },
            HttpError::Cancelled => "The request was cancelled.".to_string(),
            HttpError::Io(_) => "The connection was interrupted. Please try again.".to_string(),
            HttpError::InvalidUrl(url) => format!("The server address '{}' is invalid.", url),
            HttpError::Other(msg) => format!("Network error: {}", msg),
        }
    }

    /// Get a short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            HttpError::ConnectionFailed(_) => "E_HTTP_CONN",
            HttpError::Timeout(_) => "E_HTTP_TIMEOUT",
            HttpError::ServerError { .. } => "E_HTTP_STATUS",
            HttpError::Cancelled => "E_HTTP_CANCELLED",
            HttpError::Io(_) => "E_HTTP_IO",
            HttpError::InvalidUrl(_) => "E_HTTP_URL",
            HttpError::Other(_) => "E_HTTP_OTHER",
        }
    }
}

/// Trait for HTTP transport operations.
///
/// Implementations include the production reqwest-based client and a mock
/// client for testing.
///
/// # Example
///
/// ```ignore
/// use cyf_chat::traits::{HttpClient, Headers, Params};
///
/// async fn open<C: HttpClient>(client: &C) -> Result<(), HttpError> {
///     let query: Params = vec![("model".into(), "gpt-4o".into())];
///     let mut body = client.get_stream("http://localhost:39997/chat", &query, &Headers::new()).await?;
///     while let Some(chunk) = body.next().await {
///         println!("{} bytes", chunk?.len());
///     }
///     Ok(())
/// }
/// ```
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// POST `form` as `application/x-www-form-urlencoded`, with `query`
    /// appended to the URL, and read the full response.
    async fn post_form(
        &self,
        url: &str,
        query: &Params,
        form: &Params,
        headers: &Headers,
    ) -> Result<Response, HttpError>;

    /// GET `url` with `query` and return the body as a byte stream.
    ///
    /// A non-2xx status must fail with [`HttpError::ServerError`] before any
    /// body bytes are handed out. Dropping the returned stream releases the
    /// underlying connection.
    async fn get_stream(
        &self,
        url: &str,
        query: &Params,
        headers: &Headers,
    ) -> Result<ByteStream, HttpError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_is_success() {
        assert!(Response::new(200, Bytes::new()).is_success());
        assert!(Response::new(204, Bytes::new()).is_success());
        assert!(!Response::new(300, Bytes::new()).is_success());
        assert!(!Response::new(500, Bytes::new()).is_success());
    }

    #[test]
    fn test_response_with_headers() {
        let mut headers = HashMap::new();
        headers.insert("Content-Type".to_string(), "text/event-stream".to_string());
        let response = Response::with_headers(200, headers, Bytes::from("{}"));
        assert_eq!(
            response.headers.get("Content-Type"),
            Some(&"text/event-stream".to_string())
        );
    }

    #[test]
    fn test_response_json() {
        #[derive(Debug, serde::Deserialize, PartialEq)]
        struct Reply {
            role: String,
            content: String,
        }

        let response = Response::new(
            200,
            Bytes::from(r#"{"role":"assistant","content":"hi"}"#),
        );
        let reply: Reply = response.json().unwrap();
        assert_eq!(reply.content, "hi");
        assert_eq!(response.text().unwrap().len(), 35);
    }

    #[test]
    fn test_http_error_display() {
        assert_eq!(
            HttpError::ConnectionFailed("refused".to_string()).to_string(),
            "Connection failed: refused"
        );
        assert_eq!(
            HttpError::ServerError {
                status: 500,
                message: "Internal Error".to_string()
            }
            .to_string(),
            "Server error (500): Internal Error"
        );
        assert_eq!(HttpError::Cancelled.to_string(), "Request cancelled");
    }

    #[test]
    fn test_http_error_retryable() {
        assert!(HttpError::Timeout("30s".to_string()).is_retryable());
        assert!(HttpError::ServerError {
            status: 503,
            message: String::new()
        }
        .is_retryable());
        assert!(HttpError::ServerError {
            status: 429,
            message: String::new()
        }
        .is_retryable());
        assert!(!HttpError::ServerError {
            status: 400,
            message: String::new()
        }
        .is_retryable());
        assert!(!HttpError::Cancelled.is_retryable());
    }

    #[test]
    fn test_http_error_user_message() {
        let err = HttpError::ServerError {
            status: 500,
            message: "trace".to_string(),
        };
        assert!(err.user_message().contains("try again later"));
        assert!(!err.user_message().contains("trace"));
    }
}
