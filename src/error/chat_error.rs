//! Unified error type for the chat client.

use std::fmt;

use super::category::ErrorCategory;
use super::context::ErrorContext;
use super::state::StateError;
use super::stream::StreamError;
use crate::startup::ConfigError;
use crate::traits::HttpError;

/// Unified error type for the chat client.
///
/// Maps onto the failure taxonomy of a chat stream:
/// - `Transport`: non-2xx status or connection failure before the stream starts
/// - `Stream`: malformed frames, backend `error.msg` events, or a lost connection
/// - `State`: conversation state misuse (a programming error)
/// - `Config`: invalid client configuration
#[derive(Debug)]
pub enum ChatError {
    /// Transport-level failure.
    Transport(HttpError),

    /// Stream processing failure.
    Stream(StreamError),

    /// Conversation state misuse.
    State(StateError),

    /// Invalid configuration.
    Config(ConfigError),

    /// Wrapped error with additional context.
    WithContext {
        error: Box<ChatError>,
        context: ErrorContext,
    },
}

impl ChatError {
    /// Get the category of this error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            ChatError::Transport(HttpError::ServerError { status, .. }) if *status >= 500 => {
                ErrorCategory::Server
            }
            ChatError::Transport(HttpError::ServerError { status, .. }) if (400..500).contains(status) => {
                ErrorCategory::Client
            }
            ChatError::Transport(HttpError::InvalidUrl(_)) => ErrorCategory::Configuration,
            ChatError::Transport(_) => ErrorCategory::Network,
            ChatError::Stream(StreamError::ConnectionLost { .. }) => ErrorCategory::Network,
            ChatError::Stream(_) => ErrorCategory::Protocol,
            ChatError::State(_) => ErrorCategory::Client,
            ChatError::Config(_) => ErrorCategory::Configuration,
            ChatError::WithContext { error, .. } => error.category(),
        }
    }

    /// Check if starting a new stream is likely to help.
    pub fn is_retryable(&self) -> bool {
        match self {
            ChatError::Transport(err) => err.is_retryable(),
            ChatError::Stream(err) => err.is_retryable(),
            ChatError::State(_) | ChatError::Config(_) => false,
            ChatError::WithContext { error, .. } => error.is_retryable(),
        }
    }

    /// Get a message suitable for showing in place of the assistant reply.
    pub fn user_message(&self) -> String {
        match self {
            ChatError::Transport(err) => err.user_message(),
            ChatError::Stream(err) => err.user_message(),
            ChatError::State(err) => err.user_message(),
            ChatError::Config(err) => err.user_message(),
            ChatError::WithContext { error, .. } => error.user_message(),
        }
    }

    /// Get a short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            ChatError::Transport(err) => err.error_code(),
            ChatError::Stream(err) => err.error_code(),
            ChatError::State(err) => err.error_code(),
            ChatError::Config(_) => "E_CONFIG",
            ChatError::WithContext { error, .. } => error.error_code(),
        }
    }

    /// Attach context to this error.
    pub fn with_context(self, ctx: ErrorContext) -> Self {
        ChatError::WithContext {
            error: Box::new(self),
            context: ctx,
        }
    }

    /// Get the context if this error has one attached.
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            ChatError::WithContext { context, .. } => Some(context),
            _ => None,
        }
    }

    /// Get the inner error without context.
    pub fn inner(&self) -> &ChatError {
        match self {
            ChatError::WithContext { error, .. } => error.inner(),
            _ => self,
        }
    }

    /// Get the recovery hint for this error.
    pub fn recovery_hint(&self) -> &'static str {
        self.category().recovery_hint()
    }
}

impl fmt::Display for ChatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChatError::Transport(err) => write!(f, "{}", err),
            ChatError::Stream(err) => write!(f, "{}", err),
            ChatError::State(err) => write!(f, "{}", err),
            ChatError::Config(err) => write!(f, "{}", err),
            ChatError::WithContext { error, context } => write!(f, "{} ({})", error, context),
        }
    }
}

impl std::error::Error for ChatError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ChatError::Transport(err) => Some(err),
            ChatError::Stream(err) => Some(err),
            ChatError::State(err) => Some(err),
            ChatError::Config(err) => Some(err),
            ChatError::WithContext { error, .. } => error.source(),
        }
    }
}

// ============================================================================
// From implementations for automatic error conversion
// ============================================================================

impl From<HttpError> for ChatError {
    fn from(err: HttpError) -> Self {
        ChatError::Transport(err)
    }
}

impl From<StreamError> for ChatError {
    fn from(err: StreamError) -> Self {
        ChatError::Stream(err)
    }
}

impl From<StateError> for ChatError {
    fn from(err: StateError) -> Self {
        ChatError::State(err)
    }
}

impl From<ConfigError> for ChatError {
    fn from(err: ConfigError) -> Self {
        ChatError::Config(err)
    }
}

impl From<serde_json::Error> for ChatError {
    fn from(err: serde_json::Error) -> Self {
        ChatError::Stream(StreamError::Parse {
            payload: String::new(),
            message: err.to_string(),
        })
    }
}
