//! cyf-chat - a streaming chat client
//!
//! Reads a server-sent-events chat stream, decodes it into content chunks,
//! and keeps a conversation in sync with it.
//!
//! This library exposes modules for use in integration tests and the binary.

pub mod adapters;
pub mod cli;
pub mod controller;
pub mod error;
pub mod models;
pub mod session;
pub mod sse;
pub mod startup;
pub mod state;
pub mod traits;
