//! Conversation state fed by the stream controller.

pub mod conversation;

pub use conversation::{ContentPolicy, Conversation, MessageRef};
