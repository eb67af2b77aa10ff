//! Lazy sequence of content chunks read from one response.

use std::collections::VecDeque;

use futures::stream::{self, Stream};
use tracing::{debug, trace, warn};

use super::guard::ReadHandle;
use crate::error::StreamError;
use crate::sse::{parse_line, ContentChunk, LineDecoder, ParsedEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Reading,
    /// Transport reached end of data; draining decoded lines
    Draining,
    /// Terminal chunk seen
    Done,
    /// Ended without a terminal chunk
    Closed,
    Failed,
}

/// Decoded, parsed chunks of one chat stream, pulled one at a time.
///
/// Owns the read handle. The handle is released as soon as the stream ends
/// for any reason, and again (as a no-op) when the value is dropped.
#[derive(Debug)]
pub struct ChunkStream {
    handle: ReadHandle,
    decoder: LineDecoder,
    lines: VecDeque<String>,
    phase: Phase,
}

impl ChunkStream {
    pub fn new(handle: ReadHandle) -> Self {
        Self {
            handle,
            decoder: LineDecoder::new(),
            lines: VecDeque::new(),
            phase: Phase::Reading,
        }
    }

    /// Next content chunk, in arrival order.
    ///
    /// Returns `None` once the terminal chunk has been returned, after an
    /// error has been returned, or when the transport ends. Lines that carry
    /// no event are skipped.
    pub async fn next_chunk(&mut self) -> Option<Result<ContentChunk, StreamError>> {
        loop {
            match self.phase {
                Phase::Done | Phase::Closed | Phase::Failed => return None,
                Phase::Reading | Phase::Draining => {}
            }

            if let Some(line) = self.lines.pop_front() {
                match parse_line(&line) {
                    ParsedEvent::Content(chunk) => {
                        trace!(len = chunk.content.len(), done = chunk.done, "Content chunk");
                        if chunk.done {
                            debug!("Terminal chunk received");
                            self.end(Phase::Done);
                        }
                        return Some(Ok(chunk));
                    }
                    ParsedEvent::Error(err) => {
                        warn!(error = %err, "Stream aborted by event");
                        self.end(Phase::Failed);
                        return Some(Err(err.into()));
                    }
                    ParsedEvent::Ignorable => continue,
                }
            }

            if self.phase == Phase::Draining {
                debug!("Stream closed without a terminal chunk");
                self.end(Phase::Closed);
                return None;
            }

            match self.handle.next_chunk().await {
                Some(Ok(bytes)) => {
                    trace!(bytes = bytes.len(), "Raw chunk");
                    self.lines.extend(self.decoder.push(&bytes));
                }
                Some(Err(err)) => {
                    warn!(error = %err, "Transport failed mid-stream");
                    self.end(Phase::Failed);
                    return Some(Err(StreamError::ConnectionLost {
                        message: err.to_string(),
                    }));
                }
                None => {
                    self.lines.extend(self.decoder.finish(true));
                    self.phase = Phase::Draining;
                }
            }
        }
    }

    /// True once the terminal chunk has been returned
    pub fn is_complete(&self) -> bool {
        self.phase == Phase::Done
    }

    /// True once no further chunks will be returned
    pub fn is_finished(&self) -> bool {
        matches!(self.phase, Phase::Done | Phase::Closed | Phase::Failed)
    }

    /// Stop reading and release the transport handle
    pub fn release(&mut self) {
        self.lines.clear();
        self.decoder.reset();
        self.handle.release();
    }

    /// Adapt into a [`Stream`] of chunks.
    pub fn into_stream(self) -> impl Stream<Item = Result<ContentChunk, StreamError>> + Send {
        stream::unfold(self, |mut chunks| async move {
            let next = chunks.next_chunk().await?;
            Some((next, chunks))
        })
    }

    fn end(&mut self, phase: Phase) {
        self.phase = phase;
        self.release();
    }
}
