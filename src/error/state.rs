//! Conversation state misuse.
//!
//! These are programming errors, not user-facing failures: they mean a
//! caller broke the begin/apply/finish protocol of an assistant message.

use std::fmt;

/// Invalid-state errors raised by [`Conversation`](crate::state::Conversation).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateError {
    /// An assistant message is already loading.
    StreamInProgress { index: usize },

    /// The reference does not point at an in-progress assistant message.
    NotInProgress { index: usize },

    /// The reference is outside the message list.
    UnknownMessage { index: usize },
}

impl StateError {
    /// Get a short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            StateError::StreamInProgress { .. } => "E_STATE_IN_PROGRESS",
            StateError::NotInProgress { .. } => "E_STATE_NOT_IN_PROGRESS",
            StateError::UnknownMessage { .. } => "E_STATE_UNKNOWN_MESSAGE",
        }
    }

    pub fn user_message(&self) -> String {
        "The conversation is in an unexpected state. Please start a new message.".to_string()
    }
}

impl fmt::Display for StateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StateError::StreamInProgress { index } => write!(
                f,
                "Invalid state: assistant message {} is still loading",
                index
            ),
            StateError::NotInProgress { index } => write!(
                f,
                "Invalid state: message {} is not an in-progress assistant message",
                index
            ),
            StateError::UnknownMessage { index } => {
                write!(f, "Invalid state: no message at index {}", index)
            }
        }
    }
}

impl std::error::Error for StateError {}
