//! Unified error handling for the chat client.
//!
//! - **Error Categories**: high-level classification for handling decisions
//! - **Domain-specific Errors**: transport (`HttpError`), stream, and state errors
//! - **Unified Error Type**: `ChatError` consolidates all error types
//! - **Error Context**: debugging information attached to errors
//! - **Result Type Alias**: `ChatResult<T>` for consistent return types
//!
//! # Error Categories
//!
//! | Category | Description | Retryable |
//! |----------|-------------|-----------|
//! | Network | Connection, timeout, lost stream | Yes |
//! | Server | Backend errors (5xx) | Yes |
//! | Protocol | `error.msg` events, malformed frames | No |
//! | Client | Rejected requests (4xx), conversation state misuse | Mostly no |
//! | Configuration | Invalid settings | No |

mod category;
mod chat_error;
mod context;
mod result;
mod state;
mod stream;

pub use category::ErrorCategory;
pub use chat_error::ChatError;
pub use context::ErrorContext;
pub use result::{ChatResult, ResultExt};
pub use state::StateError;
pub use stream::StreamError;
