//! Result type alias for chat client operations.

use super::chat_error::ChatError;
use super::context::ErrorContext;

/// Type alias for Results using ChatError.
pub type ChatResult<T> = Result<T, ChatError>;

/// Extension trait for Result types to add context to errors.
pub trait ResultExt<T> {
    /// Add context to an error if the result is Err.
    fn context(self, ctx: ErrorContext) -> ChatResult<T>;

    /// Add context using a closure (only called on error).
    fn with_context<F>(self, f: F) -> ChatResult<T>
    where
        F: FnOnce() -> ErrorContext;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
    E: Into<ChatError>,
{
    fn context(self, ctx: ErrorContext) -> ChatResult<T> {
        self.map_err(|e| e.into().with_context(ctx))
    }

    fn with_context<F>(self, f: F) -> ChatResult<T>
    where
        F: FnOnce() -> ErrorContext,
    {
        self.map_err(|e| e.into().with_context(f()))
    }
}
