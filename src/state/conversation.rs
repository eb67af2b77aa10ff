//! Message list driven by a chat stream.
//!
//! A conversation is append-only except for one assistant message that a
//! stream is writing into. That message is created with
//! [`Conversation::begin_assistant_message`], filled by
//! [`Conversation::apply_chunk`], and closed by the terminal chunk,
//! [`Conversation::mark_error`], or [`Conversation::finish`].

use std::str::FromStr;

use tracing::{debug, warn};

use crate::error::StateError;
use crate::models::{HistoryEntry, Message, MessageRole};

/// How a content chunk is combined with what the message already holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContentPolicy {
    /// Each chunk is a delta appended to the message
    #[default]
    Append,
    /// Each chunk is a full snapshot replacing the message
    Replace,
}

impl ContentPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentPolicy::Append => "append",
            ContentPolicy::Replace => "replace",
        }
    }
}

impl FromStr for ContentPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "append" => Ok(ContentPolicy::Append),
            "replace" => Ok(ContentPolicy::Replace),
            other => Err(format!("unknown content policy '{}'", other)),
        }
    }
}

/// Stable handle to a message in a [`Conversation`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MessageRef(usize);

impl MessageRef {
    /// Position of the message in the list
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Ordered messages plus dialog metadata
#[derive(Debug, Clone, Default)]
pub struct Conversation {
    messages: Vec<Message>,
    title: Option<String>,
    dialog_id: Option<i64>,
    policy: ContentPolicy,
    /// Index of the assistant message a stream is writing into
    active: Option<usize>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the content policy (builder pattern)
    pub fn with_policy(mut self, policy: ContentPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> ContentPolicy {
        self.policy
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn get(&self, msg: MessageRef) -> Option<&Message> {
        self.messages.get(msg.0)
    }

    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// True while an assistant message is being streamed
    pub fn is_loading(&self) -> bool {
        self.messages.iter().any(|m| m.loading)
    }

    /// Reference to the in-progress assistant message, if any
    pub fn active(&self) -> Option<MessageRef> {
        self.active.map(MessageRef)
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = Some(title.into());
    }

    pub fn dialog_id(&self) -> Option<i64> {
        self.dialog_id
    }

    pub fn set_dialog_id(&mut self, id: i64) {
        self.dialog_id = Some(id);
    }

    /// Append a user message stamped with the current time
    pub fn append_user_message(&mut self, text: impl Into<String>) -> MessageRef {
        self.messages.push(Message::user(text));
        MessageRef(self.messages.len() - 1)
    }

    /// Append a system message
    pub fn append_system_message(&mut self, text: impl Into<String>) -> MessageRef {
        self.messages.push(Message::system(text));
        MessageRef(self.messages.len() - 1)
    }

    /// Append an empty loading assistant message for a new stream.
    ///
    /// Fails if another assistant message is still loading.
    pub fn begin_assistant_message(&mut self) -> Result<MessageRef, StateError> {
        if let Some(index) = self.active {
            return Err(StateError::StreamInProgress { index });
        }
        self.messages.push(Message::assistant_placeholder());
        let index = self.messages.len() - 1;
        self.active = Some(index);
        debug!(index, "Began assistant message");
        Ok(MessageRef(index))
    }

    /// Append `prompt` as a user message and begin its assistant reply.
    ///
    /// Either both messages are appended or neither is.
    pub fn begin_exchange(&mut self, prompt: impl Into<String>) -> Result<MessageRef, StateError> {
        if let Some(index) = self.active {
            return Err(StateError::StreamInProgress { index });
        }
        self.append_user_message(prompt);
        self.begin_assistant_message()
    }

    /// Write one content chunk into the in-progress message.
    ///
    /// `done` finalises the message; any later call with the same reference
    /// fails.
    pub fn apply_chunk(
        &mut self,
        msg: MessageRef,
        content: &str,
        done: bool,
    ) -> Result<(), StateError> {
        let policy = self.policy;
        let message = self.active_message(msg)?;
        match policy {
            ContentPolicy::Append => message.content.push_str(content),
            ContentPolicy::Replace => {
                message.content.clear();
                message.content.push_str(content);
            }
        }
        if done {
            message.loading = false;
            self.active = None;
        }
        Ok(())
    }

    /// Mark the in-progress message as failed with a user-visible error
    pub fn mark_error(&mut self, msg: MessageRef, error: impl Into<String>) -> Result<(), StateError> {
        let error = error.into();
        let message = self.active_message(msg)?;
        message.loading = false;
        message.error = true;
        message.error_message = Some(error);
        self.active = None;
        warn!(index = msg.0, "Assistant message marked as failed");
        Ok(())
    }

    /// Finalise the in-progress message without a terminal chunk
    pub fn finish(&mut self, msg: MessageRef) -> Result<(), StateError> {
        let message = self.active_message(msg)?;
        message.loading = false;
        self.active = None;
        Ok(())
    }

    /// The last `count` completed messages as request history.
    ///
    /// System messages and assistant messages that are loading or failed are
    /// never sent back to the backend.
    pub fn history(&self, count: usize) -> Vec<HistoryEntry> {
        let eligible: Vec<&Message> = self
            .messages
            .iter()
            .filter(|m| m.role != MessageRole::System && !m.loading && !m.error)
            .collect();
        let skip = eligible.len().saturating_sub(count);
        eligible
            .into_iter()
            .skip(skip)
            .map(Message::to_history_entry)
            .collect()
    }

    /// Replace the messages with stored dialog content
    pub fn load_messages(&mut self, messages: Vec<Message>) -> Result<(), StateError> {
        if let Some(index) = self.active {
            return Err(StateError::StreamInProgress { index });
        }
        self.messages = messages;
        Ok(())
    }

    /// Drop all messages but keep the dialog metadata
    pub fn clear_messages(&mut self) {
        self.messages.clear();
        self.active = None;
    }

    /// Drop messages and dialog metadata
    pub fn clear_session(&mut self) {
        self.clear_messages();
        self.title = None;
        self.dialog_id = None;
    }

    fn active_message(&mut self, msg: MessageRef) -> Result<&mut Message, StateError> {
        if msg.0 >= self.messages.len() {
            return Err(StateError::UnknownMessage { index: msg.0 });
        }
        if self.active != Some(msg.0) {
            return Err(StateError::NotInProgress { index: msg.0 });
        }
        Ok(&mut self.messages[msg.0])
    }
}
