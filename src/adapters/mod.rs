//! Concrete implementations of trait abstractions.
//!
//! - [`ReqwestHttpClient`] - HTTP transport using reqwest
//!
//! The [`mock`] submodule provides a scripted transport for tests:
//! - [`mock::MockHttpClient`] - configurable responses and chunked streams

pub mod mock;
pub mod reqwest_http;

pub use mock::MockHttpClient;
pub use reqwest_http::ReqwestHttpClient;
