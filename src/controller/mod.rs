//! Chat stream controller.
//!
//! Opens one streaming request, pulls raw chunks through the line decoder
//! and event parser, and hands each content chunk to a sink in arrival
//! order. Also hosts the plain request/response calls against the same
//! backend: non-streaming chat and the dialog history endpoints.

pub mod guard;
pub mod stream;

use serde::Deserialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::error::{ChatError, ChatResult, ErrorContext, ResultExt, StreamError};
use crate::models::{ChatRequest, Credentials, DialogSummary, HistoryEntry};
use crate::startup::ClientConfig;
use crate::traits::{Headers, HttpClient, HttpError, Params, Response};

pub use guard::ReadHandle;
pub use stream::ChunkStream;

/// Receives content chunks as they arrive.
pub trait ChunkSink {
    fn on_chunk(&mut self, content: &str, done: bool);
}

impl<F> ChunkSink for F
where
    F: FnMut(&str, bool),
{
    fn on_chunk(&mut self, content: &str, done: bool) {
        self(content, done)
    }
}

/// How a stream that did not fail came to an end
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamOutcome {
    /// The terminal chunk was delivered
    Completed,
    /// The transport ended before a terminal chunk
    Closed,
    /// The caller cancelled
    Cancelled,
}

enum Step {
    Cancelled,
    Next(Option<Result<crate::sse::ContentChunk, StreamError>>),
}

#[derive(Deserialize)]
struct ErrorBody {
    msg: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Listing<T> {
    Bare(Vec<T>),
    Wrapped { data: Vec<T> },
}

impl<T> Listing<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            Listing::Bare(items) | Listing::Wrapped { data: items } => items,
        }
    }
}

/// Drives chat requests against the backend through an [`HttpClient`].
#[derive(Debug, Clone)]
pub struct ChatStreamController<C: HttpClient> {
    client: C,
    config: ClientConfig,
}

impl<C: HttpClient> ChatStreamController<C> {
    pub fn new(client: C, config: ClientConfig) -> Self {
        Self { client, config }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Open a streaming request.
    ///
    /// A non-2xx status fails here, before any chunk is read.
    pub async fn open(
        &self,
        request: &ChatRequest,
        credentials: &Credentials,
    ) -> ChatResult<ChunkStream> {
        let url = self.config.chat_url();
        let query = request.to_query(credentials)?;

        info!(
            model = %request.model,
            mode = request.mode.as_str(),
            url = %url,
            "Opening chat stream"
        );

        let stream = self
            .client
            .get_stream(&url, &query, &Headers::new())
            .await
            .map_err(|e| {
                error!(error = %e, code = e.error_code(), "Failed to open chat stream");
                ChatError::Transport(e)
            })?;

        Ok(ChunkStream::new(ReadHandle::new(stream, url)))
    }

    /// Run one stream to its end, feeding every content chunk to `sink`.
    ///
    /// Returns once the terminal chunk was delivered, the transport closed,
    /// or `cancel` fired. Error events, malformed frames and transport
    /// failures are returned as errors. The read handle is released on every
    /// path, and `sink` is never called after cancellation is observed.
    pub async fn stream<S>(
        &self,
        request: &ChatRequest,
        credentials: &Credentials,
        sink: &mut S,
        cancel: &CancellationToken,
    ) -> ChatResult<StreamOutcome>
    where
        S: ChunkSink + ?Sized,
    {
        let opened = tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            opened = self.open(request, credentials) => Some(opened),
        };
        let mut chunks = match opened {
            Some(chunks) => chunks?,
            None => {
                info!("Chat stream cancelled before it opened");
                return Ok(StreamOutcome::Cancelled);
            }
        };

        let mut delivered = 0usize;
        loop {
            let step = tokio::select! {
                biased;
                _ = cancel.cancelled() => Step::Cancelled,
                next = chunks.next_chunk() => Step::Next(next),
            };

            match step {
                Step::Cancelled => {
                    chunks.release();
                    info!(delivered, "Chat stream cancelled");
                    return Ok(StreamOutcome::Cancelled);
                }
                Step::Next(Some(Ok(chunk))) => {
                    sink.on_chunk(&chunk.content, chunk.done);
                    delivered += 1;
                    if chunk.done {
                        info!(delivered, "Chat stream completed");
                        return Ok(StreamOutcome::Completed);
                    }
                }
                Step::Next(Some(Err(err))) => {
                    error!(error = %err, code = err.error_code(), delivered, "Chat stream failed");
                    return Err(err.into());
                }
                Step::Next(None) => {
                    info!(delivered, "Chat stream closed without a terminal chunk");
                    return Ok(StreamOutcome::Closed);
                }
            }
        }
    }

    /// Send a request and wait for the whole reply.
    pub async fn send_chat(
        &self,
        request: &ChatRequest,
        credentials: &Credentials,
    ) -> ChatResult<HistoryEntry> {
        let url = self.config.chat_url();
        let form = request.to_params()?;
        debug!(model = %request.model, mode = request.mode.as_str(), "Sending chat request");

        let response = self.post(&url, credentials, &form).await?;
        Ok(response.json::<HistoryEntry>()?)
    }

    /// Stored dialogs for `model`.
    pub async fn list_dialogs(
        &self,
        model: &str,
        credentials: &Credentials,
    ) -> ChatResult<Vec<DialogSummary>> {
        let url = self.config.history_url();
        let form: Params = vec![("model".to_string(), model.to_string())];

        let response = self
            .post(&url, credentials, &form)
            .await
            .with_context(|| ErrorContext::new("list_dialogs").with_model(model))?;
        let listing: Listing<DialogSummary> = response
            .json()
            .with_context(|| ErrorContext::new("list_dialogs").with_model(model))?;
        let dialogs = listing.into_vec();
        debug!(model, count = dialogs.len(), "Fetched dialog list");
        Ok(dialogs)
    }

    /// Stored messages of one dialog, oldest first.
    pub async fn dialog_content(
        &self,
        dialog_id: i64,
        credentials: &Credentials,
    ) -> ChatResult<Vec<HistoryEntry>> {
        let url = self.config.history_content_url();
        let form: Params = vec![("dialogId".to_string(), dialog_id.to_string())];

        let response = self
            .post(&url, credentials, &form)
            .await
            .with_context(|| ErrorContext::new("dialog_content").with_dialog_id(dialog_id))?;
        let listing: Listing<HistoryEntry> = response
            .json()
            .with_context(|| ErrorContext::new("dialog_content").with_dialog_id(dialog_id))?;
        Ok(listing.into_vec())
    }

    async fn post(
        &self,
        url: &str,
        credentials: &Credentials,
        form: &Params,
    ) -> ChatResult<Response> {
        let response = self
            .client
            .post_form(url, &credentials.to_params(), form, &Headers::new())
            .await
            .map_err(|e| {
                error!(error = %e, url, "Request failed");
                ChatError::Transport(e)
            })?;

        if response.is_success() {
            Ok(response)
        } else {
            Err(error_from_response(&response))
        }
    }
}

/// A backend `{"msg": ...}` body becomes a protocol error carrying the
/// message. Anything else is a plain status failure.
fn error_from_response(response: &Response) -> ChatError {
    if let Ok(body) = response.json::<ErrorBody>() {
        error!(status = response.status, msg = %body.msg, "Backend rejected request");
        return StreamError::Protocol { message: body.msg }.into();
    }
    let message = response.text().unwrap_or_default();
    error!(status = response.status, "Backend returned an error status");
    HttpError::ServerError {
        status: response.status,
        message,
    }
    .into()
}
