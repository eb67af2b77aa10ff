//! Mock implementations for testing.
//!
//! Lets the stream controller be exercised without network access.

pub mod http;

pub use http::{MockHttpClient, MockResponse, RecordedRequest};
