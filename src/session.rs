//! One chat session: a conversation plus the controller that feeds it.

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::controller::{ChatStreamController, ChunkSink, StreamOutcome};
use crate::error::{ChatResult, StateError};
use crate::models::{ChatRequest, Credentials, DialogMode, Message};
use crate::state::{Conversation, MessageRef};
use crate::traits::HttpClient;

/// Sends user prompts and streams the replies into a [`Conversation`].
///
/// Every reply gets its own assistant message. Whatever happens to the
/// stream, that message ends with `loading == false`; failures also set
/// its error flag and text.
pub struct ChatSession<C: HttpClient> {
    controller: ChatStreamController<C>,
    conversation: Conversation,
    model: String,
    mode: DialogMode,
}

impl<C: HttpClient> ChatSession<C> {
    pub fn new(controller: ChatStreamController<C>, model: impl Into<String>) -> Self {
        let conversation = Conversation::new().with_policy(controller.config().content_policy);
        Self {
            controller,
            conversation,
            model: model.into(),
            mode: DialogMode::Single,
        }
    }

    /// Set the dialog mode (builder pattern)
    pub fn with_mode(mut self, mode: DialogMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn set_model(&mut self, model: impl Into<String>) {
        self.model = model.into();
    }

    pub fn mode(&self) -> DialogMode {
        self.mode
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn conversation_mut(&mut self) -> &mut Conversation {
        &mut self.conversation
    }

    pub fn controller(&self) -> &ChatStreamController<C> {
        &self.controller
    }

    /// Build the request for `prompt` from the current conversation.
    ///
    /// Must be called before the prompt is appended, so the history window
    /// holds only earlier turns.
    pub fn build_request(&self, prompt: &str) -> ChatRequest {
        let request = match self.mode {
            DialogMode::Single => ChatRequest::new(self.model.clone(), prompt),
            DialogMode::Multi => ChatRequest::multi(
                self.model.clone(),
                prompt,
                self.conversation
                    .history(self.controller.config().context_count),
            ),
        };
        match self.conversation.title() {
            Some(title) => request.with_title(title),
            None => request,
        }
    }

    /// Send `prompt` and stream the reply into the conversation.
    pub async fn send(
        &mut self,
        prompt: &str,
        credentials: &Credentials,
        cancel: &CancellationToken,
    ) -> ChatResult<(MessageRef, StreamOutcome)> {
        let mut ignore = |_: &str, _: bool| {};
        self.send_with(prompt, credentials, cancel, &mut ignore).await
    }

    /// Like [`send`](Self::send), also forwarding every chunk to `observer`
    /// after it has been applied to the conversation.
    pub async fn send_with<S>(
        &mut self,
        prompt: &str,
        credentials: &Credentials,
        cancel: &CancellationToken,
        observer: &mut S,
    ) -> ChatResult<(MessageRef, StreamOutcome)>
    where
        S: ChunkSink + ?Sized,
    {
        let request = self.build_request(prompt);
        let msg = self.conversation.begin_exchange(prompt)?;
        let reply = PendingReply {
            conversation: &mut self.conversation,
            msg,
        };

        let conversation = &mut *reply.conversation;
        let mut state_error: Option<StateError> = None;
        let mut sink = |content: &str, done: bool| {
            if state_error.is_some() {
                return;
            }
            match conversation.apply_chunk(msg, content, done) {
                Ok(()) => observer.on_chunk(content, done),
                Err(e) => state_error = Some(e),
            }
        };

        let result = self
            .controller
            .stream(&request, credentials, &mut sink, cancel)
            .await;

        if let Some(err) = state_error {
            warn!(error = %err, "Conversation rejected a chunk");
            let _ = reply.conversation.mark_error(msg, err.user_message());
            return Err(err.into());
        }

        match result {
            Ok(StreamOutcome::Completed) => Ok((msg, StreamOutcome::Completed)),
            Ok(outcome) => {
                debug!(?outcome, "Finalising reply without a terminal chunk");
                reply.conversation.finish(msg)?;
                Ok((msg, outcome))
            }
            Err(err) => {
                reply.conversation.mark_error(msg, err.user_message())?;
                Err(err)
            }
        }
    }

    /// Send `prompt` without streaming and store the whole reply.
    pub async fn send_once(
        &mut self,
        prompt: &str,
        credentials: &Credentials,
    ) -> ChatResult<MessageRef> {
        let request = self.build_request(prompt);
        let msg = self.conversation.begin_exchange(prompt)?;
        let reply = PendingReply {
            conversation: &mut self.conversation,
            msg,
        };

        match self.controller.send_chat(&request, credentials).await {
            Ok(answer) => {
                reply.conversation.apply_chunk(msg, &answer.content, true)?;
                Ok(msg)
            }
            Err(err) => {
                reply.conversation.mark_error(msg, err.user_message())?;
                Err(err)
            }
        }
    }

    /// Replace the conversation with a stored dialog.
    pub async fn load_dialog(&mut self, dialog_id: i64, credentials: &Credentials) -> ChatResult<()> {
        let entries = self
            .controller
            .dialog_content(dialog_id, credentials)
            .await?;
        let count = entries.len();
        self.conversation
            .load_messages(entries.into_iter().map(Message::from).collect())?;
        self.conversation.set_dialog_id(dialog_id);
        debug!(dialog_id, count, "Loaded dialog");
        Ok(())
    }
}

/// Finalises a reply whose send future is dropped before it settles.
///
/// A reply that already ended is left alone.
struct PendingReply<'a> {
    conversation: &'a mut Conversation,
    msg: MessageRef,
}

impl Drop for PendingReply<'_> {
    fn drop(&mut self) {
        if self.conversation.active() == Some(self.msg) {
            debug!(index = self.msg.index(), "Send abandoned, finalising reply");
            let _ = self.conversation.finish(self.msg);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mock::{MockHttpClient, MockResponse};
    use crate::error::ChatError;
    use crate::models::{HistoryEntry, MessageRole};
    use crate::startup::ClientConfig;
    use crate::traits::{HttpError, Response};
    use bytes::Bytes;
    use std::time::Duration;

    const CHAT_URL: &str = "http://localhost:39997/never_guess_my_usage/split";

    fn session(client: &MockHttpClient) -> ChatSession<MockHttpClient> {
        ChatSession::new(
            ChatStreamController::new(client.clone(), ClientConfig::default()),
            "m",
        )
    }

    fn stream_of(parts: &[&str]) -> MockResponse {
        MockResponse::Stream(parts.iter().map(|p| Bytes::from(p.to_string())).collect())
    }

    #[tokio::test]
    async fn test_send_fills_assistant_message() {
        let client = MockHttpClient::new();
        client.set_response(
            CHAT_URL,
            stream_of(&[
                "data: {\"content\":\"Hel",
                "lo\",\"done\":false}\n",
                "data: {\"content\":\" world\",\"done\":true}\n",
            ]),
        );
        let mut session = session(&client);

        let (msg, outcome) = session
            .send("hi", &Credentials::new("u", "p"), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(outcome, StreamOutcome::Completed);
        let conv = session.conversation();
        assert_eq!(conv.len(), 2);
        assert_eq!(conv.messages()[0].content, "hi");
        let reply = conv.get(msg).unwrap();
        assert_eq!(reply.content, "Hello world");
        assert!(!reply.loading);
        assert!(!reply.error);
    }

    #[tokio::test]
    async fn test_error_event_marks_message() {
        let client = MockHttpClient::new();
        client.set_response(
            CHAT_URL,
            stream_of(&["data: {\"error\":{\"msg\":\"rate limited\"}}\n"]),
        );
        let mut session = session(&client);

        let err = session
            .send("hi", &Credentials::new("u", "p"), &CancellationToken::new())
            .await
            .unwrap_err();
        assert_eq!(err.user_message(), "rate limited");

        let reply = session.conversation().last_message().unwrap();
        assert!(reply.error);
        assert!(!reply.loading);
        assert_eq!(reply.error_message.as_deref(), Some("rate limited"));
        assert!(!session.conversation().is_loading());
    }

    #[tokio::test]
    async fn test_transport_error_marks_message() {
        let client = MockHttpClient::new();
        client.set_response(
            CHAT_URL,
            MockResponse::Success(Response::new(500, Bytes::from("oops"))),
        );
        let mut session = session(&client);

        let err = session
            .send("hi", &Credentials::new("u", "p"), &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ChatError::Transport(HttpError::ServerError { .. })));

        let reply = session.conversation().last_message().unwrap();
        assert!(reply.error);
        assert!(!reply.loading);
        assert!(reply.content.is_empty());
    }

    #[tokio::test]
    async fn test_closed_stream_finalises_message() {
        let client = MockHttpClient::new();
        client.set_response(CHAT_URL, stream_of(&["data: {\"content\":\"half\",\"done\":false}\n"]));
        let mut session = session(&client);

        let (msg, outcome) = session
            .send("hi", &Credentials::new("u", "p"), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(outcome, StreamOutcome::Closed);
        let reply = session.conversation().get(msg).unwrap();
        assert_eq!(reply.content, "half");
        assert!(!reply.loading);
        assert!(!reply.error);
    }

    #[tokio::test]
    async fn test_dropped_send_finalises_reply() {
        let client = MockHttpClient::new();
        client.set_response(
            CHAT_URL,
            MockResponse::PendingStream(vec![Bytes::from("data: {\"content\":\"one\",\"done\":false}\n")]),
        );
        let mut session = session(&client);
        let creds = Credentials::new("u", "p");

        let abandoned = tokio::time::timeout(
            Duration::from_millis(50),
            session.send("hi", &creds, &CancellationToken::new()),
        )
        .await;
        assert!(abandoned.is_err());
        assert_eq!(client.released_streams(), 1);

        let conv = session.conversation();
        assert!(!conv.is_loading());
        assert_eq!(conv.active(), None);
        let reply = conv.last_message().unwrap();
        assert_eq!(reply.content, "one");
        assert!(!reply.error);

        client.set_response(CHAT_URL, stream_of(&["data: {\"content\":\"two\",\"done\":true}\n"]));
        let (msg, outcome) = session
            .send("again", &creds, &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(outcome, StreamOutcome::Completed);
        assert_eq!(session.conversation().len(), 4);
        assert_eq!(session.conversation().get(msg).unwrap().content, "two");
    }

    #[tokio::test]
    async fn test_rejected_send_leaves_conversation_unchanged() {
        let client = MockHttpClient::new();
        client.set_response(CHAT_URL, stream_of(&["data: {\"content\":\"x\",\"done\":true}\n"]));
        let mut session = session(&client);
        session.conversation_mut().append_user_message("first");
        session.conversation_mut().begin_assistant_message().unwrap();
        let creds = Credentials::new("u", "p");

        let err = session
            .send("again", &creds, &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ChatError::State(StateError::StreamInProgress { index: 1 })));
        let err = session.send_once("again", &creds).await.unwrap_err();
        assert!(matches!(err, ChatError::State(_)));

        assert_eq!(session.conversation().len(), 2);
        assert!(client.get_requests().is_empty());
    }

    #[tokio::test]
    async fn test_multi_mode_sends_history() {
        let client = MockHttpClient::new();
        client.set_response(CHAT_URL, stream_of(&["data: {\"content\":\"a1\",\"done\":true}\n"]));
        let mut session = session(&client).with_mode(DialogMode::Multi);
        let creds = Credentials::new("u", "p");

        session.send("q1", &creds, &CancellationToken::new()).await.unwrap();
        session.send("q2", &creds, &CancellationToken::new()).await.unwrap();

        let requests = client.get_requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[1].query_value("dialog_mode"), Some("multi"));
        let dialog: Vec<HistoryEntry> =
            serde_json::from_str(requests[1].query_value("dialog").unwrap()).unwrap();
        assert_eq!(
            dialog,
            vec![
                HistoryEntry::new(MessageRole::User, "q1"),
                HistoryEntry::new(MessageRole::Assistant, "a1"),
                HistoryEntry::new(MessageRole::User, "q2"),
            ]
        );
    }

    #[tokio::test]
    async fn test_observer_sees_chunks() {
        let client = MockHttpClient::new();
        client.set_response(
            CHAT_URL,
            stream_of(&[
                "data: {\"content\":\"a\",\"done\":false}\n",
                "data: {\"content\":\"b\",\"done\":true}\n",
            ]),
        );
        let mut session = session(&client);

        let mut seen = String::new();
        let mut observer = |content: &str, _: bool| seen.push_str(content);
        session
            .send_with(
                "hi",
                &Credentials::new("u", "p"),
                &CancellationToken::new(),
                &mut observer,
            )
            .await
            .unwrap();
        assert_eq!(seen, "ab");
    }

    #[tokio::test]
    async fn test_send_once() {
        let client = MockHttpClient::new();
        client.set_response(
            CHAT_URL,
            MockResponse::Success(Response::new(
                200,
                Bytes::from(r#"{"role":"assistant","content":"done"}"#),
            )),
        );
        let mut session = session(&client);

        let msg = session
            .send_once("hi", &Credentials::new("u", "p"))
            .await
            .unwrap();
        let reply = session.conversation().get(msg).unwrap();
        assert_eq!(reply.content, "done");
        assert!(!reply.loading);
    }

    #[tokio::test]
    async fn test_load_dialog() {
        let client = MockHttpClient::new();
        client.set_response(
            "http://localhost:39997/never_guess_my_usage/split_his_content",
            MockResponse::Success(Response::new(
                200,
                Bytes::from(r#"[{"role":"user","content":"old"},{"role":"assistant","content":"reply"}]"#),
            )),
        );
        let mut session = session(&client);
        session.conversation_mut().append_user_message("discard me");

        session
            .load_dialog(5, &Credentials::new("u", "p"))
            .await
            .unwrap();
        let conv = session.conversation();
        assert_eq!(conv.dialog_id(), Some(5));
        assert_eq!(conv.len(), 2);
        assert_eq!(conv.messages()[0].content, "old");
    }
}
