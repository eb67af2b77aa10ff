//! Incremental line framing for SSE byte streams.
//!
//! The transport hands us bytes in whatever sizes it likes. Chunk boundaries
//! can fall in the middle of a line or in the middle of a multi-byte UTF-8
//! character, so the decoder keeps raw bytes until it sees a `\n` and only
//! then decodes the completed line. `\n` is a single ASCII byte and never
//! appears inside a multi-byte sequence, which makes splitting on raw bytes
//! safe.

/// Splits a stream of raw byte chunks into complete text lines.
///
/// Holds at most one trailing partial line between calls to [`push`].
///
/// [`push`]: LineDecoder::push
#[derive(Debug, Default, Clone)]
pub struct LineDecoder {
    /// Bytes received after the last `\n`
    pending: Vec<u8>,
}

impl LineDecoder {
    /// Create an empty decoder
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one raw chunk and return every line it completes, in order.
    ///
    /// Line terminators are not included. A single `\r` before the `\n` is
    /// stripped so `\r\n` framed streams decode the same way.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        if chunk.is_empty() {
            return Vec::new();
        }

        let mut lines = Vec::new();
        let mut rest = chunk;

        while let Some(pos) = rest.iter().position(|&b| b == b'\n') {
            self.pending.extend_from_slice(&rest[..pos]);
            lines.push(decode_line(&self.pending));
            self.pending.clear();
            rest = &rest[pos + 1..];
        }

        self.pending.extend_from_slice(rest);
        lines
    }

    /// Handle end of stream.
    ///
    /// With `flush` set, a trailing fragment that never got its terminator is
    /// returned as a final line. Without it the fragment is dropped. Either
    /// way the buffer is cleared, so a fragment is never emitted twice.
    pub fn finish(&mut self, flush: bool) -> Option<String> {
        if self.pending.is_empty() {
            return None;
        }
        let fragment = std::mem::take(&mut self.pending);
        if flush {
            Some(decode_line(&fragment))
        } else {
            None
        }
    }

    /// Number of buffered bytes that do not yet form a complete line
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Drop any buffered partial line
    pub fn reset(&mut self) {
        self.pending.clear();
    }
}

fn decode_line(bytes: &[u8]) -> String {
    let bytes = bytes.strip_suffix(b"\r").unwrap_or(bytes);
    String::from_utf8_lossy(bytes).into_owned()
}
