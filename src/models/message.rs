use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Role of a message in a conversation
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
    System,
}

impl MessageRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
            MessageRole::System => "system",
        }
    }
}

/// A `{role, content}` pair as the backend sends and receives it.
///
/// Used for multi-turn history in requests, for non-streaming replies, and
/// for stored dialog content.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HistoryEntry {
    pub role: MessageRole,
    #[serde(default)]
    pub content: String,
}

impl HistoryEntry {
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// A message in the local conversation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    /// Backend id, when the message came from stored dialog content
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    /// Role of the message sender
    pub role: MessageRole,
    /// Content of the message
    pub content: String,
    /// When the message was created locally
    pub timestamp: DateTime<Utc>,
    /// True while an assistant reply is streaming into this message
    #[serde(default)]
    pub loading: bool,
    /// True if the reply failed
    #[serde(default)]
    pub error: bool,
    /// User-visible error text when `error` is set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl Message {
    fn with_role(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            id: None,
            role,
            content: content.into(),
            timestamp: Utc::now(),
            loading: false,
            error: false,
            error_message: None,
        }
    }

    /// A finished user message
    pub fn user(content: impl Into<String>) -> Self {
        Self::with_role(MessageRole::User, content)
    }

    /// A finished system message
    pub fn system(content: impl Into<String>) -> Self {
        Self::with_role(MessageRole::System, content)
    }

    /// A finished assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::with_role(MessageRole::Assistant, content)
    }

    /// An empty assistant message waiting for a streamed reply
    pub fn assistant_placeholder() -> Self {
        Self {
            loading: true,
            ..Self::with_role(MessageRole::Assistant, "")
        }
    }

    /// True while this is the target of an active stream
    pub fn is_in_progress(&self) -> bool {
        self.role == MessageRole::Assistant && self.loading
    }

    /// The `{role, content}` view sent back to the backend as history
    pub fn to_history_entry(&self) -> HistoryEntry {
        HistoryEntry::new(self.role, self.content.clone())
    }
}

impl From<HistoryEntry> for Message {
    fn from(entry: HistoryEntry) -> Self {
        Message::with_role(entry.role, entry.content)
    }
}

/// Stored dialog as listed by the history endpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DialogSummary {
    pub id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub model: String,
    #[serde(default, alias = "create_time")]
    pub create_time: String,
    #[serde(default, alias = "update_time")]
    pub update_time: String,
}
