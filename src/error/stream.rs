//! Streaming-related error types.
//!
//! Errors raised while a chat stream is being consumed, after the
//! transport has accepted the request.

use std::fmt;

use crate::sse::EventError;

/// Stream-specific error variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamError {
    /// A `data:` payload could not be parsed.
    Parse { payload: String, message: String },

    /// The backend reported an error in the stream (`error.msg`).
    Protocol { message: String },

    /// The transport failed after the stream had started.
    ConnectionLost { message: String },
}

impl StreamError {
    /// Check if a new stream is likely to succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, StreamError::ConnectionLost { .. })
    }

    /// Get a user-friendly error message.
    ///
    /// Protocol errors are shown verbatim.
    pub fn user_message(&self) -> String {
        match self {
            StreamError::Parse { .. } => {
                "Received invalid data from server. Please try again.".to_string()
            }
            StreamError::Protocol { message } => message.clone(),
            StreamError::ConnectionLost { .. } => {
                "Connection to the server was lost before the reply finished.".to_string()
            }
        }
    }

    /// Get a short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            StreamError::Parse { .. } => "E_STREAM_PARSE",
            StreamError::Protocol { .. } => "E_STREAM_PROTOCOL",
            StreamError::ConnectionLost { .. } => "E_STREAM_CONN_LOST",
        }
    }
}

impl fmt::Display for StreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamError::Parse { message, .. } => write!(f, "Failed to parse stream event: {}", message),
            StreamError::Protocol { message } => write!(f, "{}", message),
            StreamError::ConnectionLost { message } => {
                write!(f, "Stream connection lost: {}", message)
            }
        }
    }
}

impl std::error::Error for StreamError {}

impl From<EventError> for StreamError {
    fn from(err: EventError) -> Self {
        match err {
            EventError::Malformed { payload, message } => StreamError::Parse { payload, message },
            EventError::Protocol { message } => StreamError::Protocol { message },
        }
    }
}
