//! Startup configuration and logging.
//!
//! - [`config`] - backend address, endpoints, timeouts, history window
//! - [`logging`] - tracing subscriber for the binary

pub mod config;
pub mod logging;

pub use config::{ClientConfig, ConfigError};
pub use logging::init_tracing;
