//! Trait abstractions for dependency injection and testability.
//!
//! - [`HttpClient`] - HTTP transport (form POST, streaming GET)

pub mod http;

pub use http::{ByteStream, Headers, HttpClient, HttpError, Params, Response};
