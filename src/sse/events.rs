//! Event types produced by the SSE line parser.

use std::fmt;

/// Literal prefix that marks a protocol event line
pub const DATA_PREFIX: &str = "data: ";

/// One fragment of assistant output from a `data:` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentChunk {
    /// Incremental text carried by this event (may be empty)
    pub content: String,
    /// True on the terminal event of the stream
    pub done: bool,
}

impl ContentChunk {
    pub fn new(content: impl Into<String>, done: bool) -> Self {
        Self {
            content: content.into(),
            done,
        }
    }
}

/// Failure carried by a single event line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventError {
    /// The payload after `data: ` was not a valid chat payload
    Malformed { payload: String, message: String },
    /// The backend reported an error through `error.msg`
    Protocol { message: String },
}

impl EventError {
    /// The human readable part of the error
    pub fn message(&self) -> &str {
        match self {
            EventError::Malformed { message, .. } => message,
            EventError::Protocol { message } => message,
        }
    }
}

impl fmt::Display for EventError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventError::Malformed { message, .. } => write!(f, "Malformed event payload: {}", message),
            EventError::Protocol { message } => write!(f, "{}", message),
        }
    }
}

/// Classification of a single decoded line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedEvent {
    /// A content fragment, possibly the terminal one
    Content(ContentChunk),
    /// A malformed payload or a backend-reported error
    Error(EventError),
    /// Keep-alives, comments, blank lines and anything else without the data prefix
    Ignorable,
}

impl ParsedEvent {
    /// True if this event ends the stream successfully
    pub fn is_terminal(&self) -> bool {
        matches!(self, ParsedEvent::Content(ContentChunk { done: true, .. }))
    }
}
