//! Classification of decoded lines into chat stream events.
//!
//! Parsing is a pure function of the line: no state is carried between
//! calls, so the same line always yields the same [`ParsedEvent`].

use crate::sse::events::{ContentChunk, EventError, ParsedEvent, DATA_PREFIX};
use crate::sse::payloads::ChatPayload;

/// Parse a single line from the stream.
///
/// - Lines without the `data: ` prefix are [`ParsedEvent::Ignorable`].
/// - A blank payload after the prefix is ignorable as well.
/// - Invalid JSON becomes [`EventError::Malformed`].
/// - An `error` descriptor wins over `content`/`done` and becomes
///   [`EventError::Protocol`] with the backend's message verbatim.
pub fn parse_line(line: &str) -> ParsedEvent {
    let Some(rest) = line.strip_prefix(DATA_PREFIX) else {
        return ParsedEvent::Ignorable;
    };

    let data = rest.trim();
    if data.is_empty() {
        return ParsedEvent::Ignorable;
    }

    parse_payload(data)
}

/// Parse the JSON part of a `data:` line
pub fn parse_payload(data: &str) -> ParsedEvent {
    let payload: ChatPayload = match serde_json::from_str(data) {
        Ok(payload) => payload,
        Err(e) => {
            return ParsedEvent::Error(EventError::Malformed {
                payload: data.to_string(),
                message: e.to_string(),
            })
        }
    };

    if let Some(error) = payload.error {
        return ParsedEvent::Error(EventError::Protocol {
            message: error.into_message(),
        });
    }

    ParsedEvent::Content(ContentChunk {
        content: payload.content.unwrap_or_default(),
        done: payload.done,
    })
}
