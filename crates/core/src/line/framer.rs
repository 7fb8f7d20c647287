//! Byte stream framing.

/// Default bound on a single line, in bytes.
pub const DEFAULT_MAX_LINE_LEN: usize = 256;

/// Splits a byte stream into lines.
///
/// A line ends at `\n` or `\r`, or as soon as `max_line_len` bytes are
/// buffered. Empty lines (for example the `\n` of a `\r\n` pair) are dropped.
#[derive(Debug, Clone)]
pub struct LineFramer {
    buffer: Vec<u8>,
    max_line_len: usize,
}

impl LineFramer {
    pub fn new(max_line_len: usize) -> Self {
        let max_line_len = max_line_len.max(1);
        Self {
            buffer: Vec::with_capacity(max_line_len),
            max_line_len,
        }
    }

    /// Feed one byte; returns a line when this byte completes one.
    pub fn push(&mut self, byte: u8) -> Option<String> {
        if byte == b'\n' || byte == b'\r' {
            return self.take();
        }

        self.buffer.push(byte);
        if self.buffer.len() >= self.max_line_len {
            return self.take();
        }
        None
    }

    /// Feed a chunk of bytes, collecting every completed line.
    pub fn extend(&mut self, bytes: &[u8]) -> Vec<String> {
        bytes.iter().filter_map(|byte| self.push(*byte)).collect()
    }

    /// Take whatever is buffered as a final line.
    pub fn flush(&mut self) -> Option<String> {
        self.take()
    }

    /// Bytes buffered towards the next line.
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    fn take(&mut self) -> Option<String> {
        if self.buffer.is_empty() {
            return None;
        }
        let line = String::from_utf8_lossy(&self.buffer).into_owned();
        self.buffer.clear();
        Some(line)
    }
}

impl Default for LineFramer {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_LINE_LEN)
    }
}
