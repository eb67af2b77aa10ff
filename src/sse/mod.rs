//! SSE (Server-Sent Events) decoding for the chat stream.
//!
//! The chat backend answers with lines of the form
//! `data: {"content": "...", "done": false}`; the last one has
//! `done: true`, and failures arrive as `data: {"error": {"msg": "..."}}`.
//!
//! # Module structure
//! - `decoder` - byte chunks to complete lines (LineDecoder)
//! - `events` - event types (ParsedEvent, ContentChunk, EventError)
//! - `payloads` - internal payload deserialization structs
//! - `parser` - line classification (parse_line)

mod decoder;
mod events;
mod parser;
mod payloads;

pub use decoder::LineDecoder;
pub use events::{ContentChunk, EventError, ParsedEvent, DATA_PREFIX};
pub use parser::{parse_line, parse_payload};
