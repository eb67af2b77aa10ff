//! Writes streamed reply chunks to the terminal.

use std::io::{self, Write};

use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::controller::ChunkSink;

/// Chunk sink that writes each chunk to `out` and flushes it.
///
/// The first write failure (a closed pipe, say) cancels `cancel` so the
/// stream stops being read. Later chunks are dropped.
pub struct StreamPrinter<W: Write> {
    out: W,
    cancel: CancellationToken,
    error: Option<io::Error>,
}

impl<W: Write> StreamPrinter<W> {
    pub fn new(out: W, cancel: CancellationToken) -> Self {
        Self {
            out,
            cancel,
            error: None,
        }
    }

    /// The write error that stopped the printer, if any
    pub fn error(&self) -> Option<&io::Error> {
        self.error.as_ref()
    }

    pub fn take_error(&mut self) -> Option<io::Error> {
        self.error.take()
    }

    fn write_chunk(&mut self, content: &str) -> io::Result<()> {
        self.out.write_all(content.as_bytes())?;
        self.out.flush()
    }
}

impl<W: Write> ChunkSink for StreamPrinter<W> {
    fn on_chunk(&mut self, content: &str, _done: bool) {
        if self.error.is_some() {
            return;
        }
        if let Err(err) = self.write_chunk(content) {
            warn!(error = %err, "Could not write reply, cancelling stream");
            self.error = Some(err);
            self.cancel.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct BrokenPipe {
        attempts: usize,
    }

    impl Write for BrokenPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            self.attempts += 1;
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_writes_chunks_in_order() {
        let cancel = CancellationToken::new();
        let mut printer = StreamPrinter::new(Vec::new(), cancel.clone());
        printer.on_chunk("Hello", false);
        printer.on_chunk(" world", true);

        assert_eq!(printer.out, b"Hello world");
        assert!(printer.error().is_none());
        assert!(!cancel.is_cancelled());
    }

    #[test]
    fn test_write_error_cancels_stream() {
        let cancel = CancellationToken::new();
        let mut printer = StreamPrinter::new(BrokenPipe { attempts: 0 }, cancel.clone());
        printer.on_chunk("one", false);
        printer.on_chunk("two", false);

        assert!(cancel.is_cancelled());
        assert_eq!(printer.out.attempts, 1);
        assert_eq!(
            printer.take_error().map(|e| e.kind()),
            Some(io::ErrorKind::BrokenPipe)
        );
    }
}
