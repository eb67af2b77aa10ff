//! CLI module for the chat client.
//!
//! - Argument parsing
//! - Version display
//! - Reply printing
//!
//! ```ignore
//! use cyf_chat::cli::{parse_args, CliCommand};
//!
//! match parse_args(std::env::args()) {
//!     CliCommand::Version => println!("{}", cyf_chat::cli::version_string()),
//!     _ => {}
//! }
//! ```

pub mod args;
pub mod output;

pub use args::{parse_args, ChatArgs, CliCommand, DEFAULT_MODEL, USAGE};
pub use output::StreamPrinter;

/// Current version of the crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// `cyf-chat <version>`
pub fn version_string() -> String {
    format!("cyf-chat {}", VERSION)
}
