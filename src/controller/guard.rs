//! Scoped ownership of a transport read handle.

use bytes::Bytes;
use futures::StreamExt;
use tracing::debug;

use crate::traits::{ByteStream, HttpError};

/// Owns the byte stream of one response and releases it exactly once.
///
/// Release happens on [`release`](ReadHandle::release) or on drop, whichever
/// comes first, so every exit path of a stream frees the connection.
pub struct ReadHandle {
    stream: Option<ByteStream>,
    url: String,
}

impl ReadHandle {
    pub fn new(stream: ByteStream, url: impl Into<String>) -> Self {
        Self {
            stream: Some(stream),
            url: url.into(),
        }
    }

    /// Await the next raw chunk. A released handle behaves as end of stream.
    pub async fn next_chunk(&mut self) -> Option<Result<Bytes, HttpError>> {
        match self.stream.as_mut() {
            Some(stream) => stream.next().await,
            None => None,
        }
    }

    /// Drop the underlying stream now.
    pub fn release(&mut self) {
        if let Some(stream) = self.stream.take() {
            drop(stream);
            debug!(url = %self.url, "Released read handle");
        }
    }

    pub fn is_released(&self) -> bool {
        self.stream.is_none()
    }
}

impl Drop for ReadHandle {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for ReadHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReadHandle")
            .field("url", &self.url)
            .field("released", &self.is_released())
            .finish()
    }
}
