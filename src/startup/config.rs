//! Client configuration.
//!
//! Defaults point at a local backend. Any field can be overridden with the
//! builder methods or from `CYF_*` environment variables.

use std::time::Duration;

use thiserror::Error;

use crate::state::ContentPolicy;

/// Default backend address
pub const DEFAULT_BASE_URL: &str = "http://localhost:39997";
/// Streaming chat endpoint
pub const DEFAULT_CHAT_PATH: &str = "/never_guess_my_usage/split";
/// Dialog list endpoint
pub const DEFAULT_HISTORY_PATH: &str = "/never_guess_my_usage/split_his";
/// Dialog content endpoint
pub const DEFAULT_HISTORY_CONTENT_PATH: &str = "/never_guess_my_usage/split_his_content";
/// Default connection timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
/// Default number of prior messages sent in multi-turn mode
pub const DEFAULT_CONTEXT_COUNT: usize = 10;

/// Errors raised while building a [`ClientConfig`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid base URL '{0}': expected http:// or https://")]
    InvalidUrl(String),

    #[error("Invalid value '{value}' for {key}: {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },
}

impl ConfigError {
    pub fn user_message(&self) -> String {
        match self {
            ConfigError::InvalidUrl(url) => format!("The server address '{}' is not valid.", url),
            ConfigError::InvalidValue { key, .. } => {
                format!("The setting {} has an invalid value.", key)
            }
        }
    }
}

/// Settings for talking to the chat backend.
///
/// # Example
///
/// ```ignore
/// use cyf_chat::startup::ClientConfig;
///
/// let config = ClientConfig::default()
///     .with_base_url("http://chat.internal:8080")
///     .with_context_count(4);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Backend address without a trailing slash
    pub base_url: String,
    /// Path of the streaming chat endpoint
    pub chat_path: String,
    /// Path of the dialog list endpoint
    pub history_path: String,
    /// Path of the dialog content endpoint
    pub history_content_path: String,
    /// Connection timeout
    pub request_timeout: Duration,
    /// Prior messages sent as history in multi-turn mode
    pub context_count: usize,
    /// How streamed chunks are combined
    pub content_policy: ContentPolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            chat_path: DEFAULT_CHAT_PATH.to_string(),
            history_path: DEFAULT_HISTORY_PATH.to_string(),
            history_content_path: DEFAULT_HISTORY_CONTENT_PATH.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            context_count: DEFAULT_CONTEXT_COUNT,
            content_policy: ContentPolicy::default(),
        }
    }
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the backend address. A trailing slash is dropped.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_chat_path(mut self, path: impl Into<String>) -> Self {
        self.chat_path = path.into();
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_context_count(mut self, count: usize) -> Self {
        self.context_count = count;
        self
    }

    pub fn with_content_policy(mut self, policy: ContentPolicy) -> Self {
        self.content_policy = policy;
        self
    }

    /// Defaults overlaid with `CYF_BASE_URL`, `CYF_TIMEOUT_SECS`,
    /// `CYF_CONTEXT_COUNT` and `CYF_CONTENT_POLICY`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`from_env`](Self::from_env) but reads variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup("CYF_BASE_URL") {
            config = config.with_base_url(url);
        }
        if let Some(secs) = lookup("CYF_TIMEOUT_SECS") {
            let secs: u64 = parse_number("CYF_TIMEOUT_SECS", &secs)?;
            if secs == 0 {
                return Err(ConfigError::InvalidValue {
                    key: "CYF_TIMEOUT_SECS".to_string(),
                    value: secs.to_string(),
                    reason: "must be greater than zero".to_string(),
                });
            }
            config.request_timeout = Duration::from_secs(secs);
        }
        if let Some(count) = lookup("CYF_CONTEXT_COUNT") {
            config.context_count = parse_number("CYF_CONTEXT_COUNT", &count)?;
        }
        if let Some(policy) = lookup("CYF_CONTENT_POLICY") {
            config.content_policy =
                policy
                    .parse::<ContentPolicy>()
                    .map_err(|reason| ConfigError::InvalidValue {
                        key: "CYF_CONTENT_POLICY".to_string(),
                        value: policy.clone(),
                        reason,
                    })?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Check the base URL scheme.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_url.starts_with("http://") || self.base_url.starts_with("https://") {
            Ok(())
        } else {
            Err(ConfigError::InvalidUrl(self.base_url.clone()))
        }
    }

    pub fn chat_url(&self) -> String {
        format!("{}{}", self.base_url, self.chat_path)
    }

    pub fn history_url(&self) -> String {
        format!("{}{}", self.base_url, self.history_path)
    }

    pub fn history_content_url(&self) -> String {
        format!("{}{}", self.base_url, self.history_content_path)
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e: T::Err| ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
            reason: e.to_string(),
        })
}
