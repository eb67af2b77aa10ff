//! Data types shared by the chat client.

mod message;
mod request;

pub use message::{DialogSummary, HistoryEntry, Message, MessageRole};
pub use request::{ChatRequest, Credentials, DialogMode};
