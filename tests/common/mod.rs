//! Common test utilities for integration tests.
//!
//! Helpers for scripting SSE responses on the mock transport and for
//! building controllers and sessions around it.
//!
//! # Example
//!
//! ```ignore
//! use common::{MockHttpConfig, data_line, test_controller};
//!
//! let client = MockHttpConfig::new()
//!     .with_stream(CHAT_URL, &[&data_line("hi", true)])
//!     .build();
//! let controller = test_controller(&client);
//! ```

pub mod mocks;

#[allow(unused_imports)]
pub use mocks::*;

use cyf_chat::controller::ChatStreamController;
use cyf_chat::models::Credentials;
use cyf_chat::session::ChatSession;
use cyf_chat::startup::ClientConfig;

/// Streaming endpoint under the default configuration
#[allow(dead_code)]
pub const CHAT_URL: &str = "http://localhost:39997/never_guess_my_usage/split";

/// Credentials used across tests
#[allow(dead_code)]
pub fn test_credentials() -> Credentials {
    Credentials::new("test-user", "test-password")
}

/// One `data:` line carrying a content chunk, newline terminated
#[allow(dead_code)]
pub fn data_line(content: &str, done: bool) -> String {
    format!(
        "data: {}\n",
        serde_json::json!({ "content": content, "done": done })
    )
}

/// One `data:` line carrying a backend error
#[allow(dead_code)]
pub fn error_line(msg: &str) -> String {
    format!("data: {}\n", serde_json::json!({ "error": { "msg": msg } }))
}

/// Controller over the mock client with default configuration
#[allow(dead_code)]
pub fn test_controller(client: &MockHttpClient) -> ChatStreamController<MockHttpClient> {
    ChatStreamController::new(client.clone(), ClientConfig::default())
}

/// Session over the mock client with default configuration
#[allow(dead_code)]
pub fn test_session(client: &MockHttpClient) -> ChatSession<MockHttpClient> {
    ChatSession::new(test_controller(client), "test-model")
}
