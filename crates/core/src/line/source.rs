//! Line sources.

use std::collections::VecDeque;

use async_trait::async_trait;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::debug;

use super::framer::LineFramer;

/// Errors raised while reading input lines.
#[derive(Debug, Error)]
pub enum LineSourceError {
    #[error("Failed to read input: {0}")]
    Io(#[from] std::io::Error),
}

/// Something that yields complete command lines.
#[async_trait]
pub trait LineSource: Send {
    /// Wait for the next line. `Ok(None)` means the input is exhausted.
    async fn next_line(&mut self) -> Result<Option<String>, LineSourceError>;
}

/// Frames lines from any async byte reader (stdin, a serial port, a socket).
pub struct ReaderLineSource<R> {
    reader: R,
    framer: LineFramer,
    ready: VecDeque<String>,
    eof: bool,
}

impl<R> ReaderLineSource<R>
where
    R: AsyncRead + Unpin + Send,
{
    pub fn new(reader: R, max_line_len: usize) -> Self {
        Self {
            reader,
            framer: LineFramer::new(max_line_len),
            ready: VecDeque::new(),
            eof: false,
        }
    }
}

#[async_trait]
impl<R> LineSource for ReaderLineSource<R>
where
    R: AsyncRead + Unpin + Send,
{
    async fn next_line(&mut self) -> Result<Option<String>, LineSourceError> {
        let mut chunk = [0u8; 64];

        loop {
            if let Some(line) = self.ready.pop_front() {
                debug!("Received line: {}", line);
                return Ok(Some(line));
            }
            if self.eof {
                return Ok(None);
            }

            let read = self.reader.read(&mut chunk).await?;
            if read == 0 {
                self.eof = true;
                self.ready.extend(self.framer.flush());
            } else {
                self.ready.extend(self.framer.extend(&chunk[..read]));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use tokio_test::io::Builder;

    #[tokio::test]
    async fn test_reassembles_lines_across_reads() {
        let reader = Builder::new()
            .read(b"R,10,G,")
            .read(b"20\nD,1\r\n")
            .read(b"Y,5")
            .build();
        let mut source = ReaderLineSource::new(reader, 256);

        assert_eq!(source.next_line().await.unwrap().as_deref(), Some("R,10,G,20"));
        assert_eq!(source.next_line().await.unwrap().as_deref(), Some("D,1"));
        // Unterminated tail is flushed at end of input.
        assert_eq!(source.next_line().await.unwrap().as_deref(), Some("Y,5"));
        assert_eq!(source.next_line().await.unwrap(), None);
        assert_eq!(source.next_line().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_respects_length_bound() {
        let reader = Builder::new().read(b"R,100,G,100\n").build();
        let mut source = ReaderLineSource::new(reader, 6);

        assert_eq!(source.next_line().await.unwrap().as_deref(), Some("R,100,"));
        assert_eq!(source.next_line().await.unwrap().as_deref(), Some("G,100"));
    }

    #[tokio::test]
    async fn test_read_error_is_reported() {
        let reader = Builder::new()
            .read_error(io::Error::new(io::ErrorKind::BrokenPipe, "gone"))
            .build();
        let mut source = ReaderLineSource::new(reader, 256);

        let err = source.next_line().await.unwrap_err();
        assert!(matches!(err, LineSourceError::Io(_)));
    }
}
