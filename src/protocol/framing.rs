//! Incremental line framing for the inbound channel.
//!
//! The channel is non-blocking and delivers arbitrary chunks; the framer
//! buffers bytes across reads and hands back one logical line at a time.
//! Lines consisting of only the terminator are keep-alives and are dropped
//! here, before they can trigger an update cycle.

/// Turns a chunked byte stream into newline-delimited logical lines.
///
/// Re-entrant by construction: partial content stays buffered until the
/// terminator arrives on a later feed.
#[derive(Debug, Default)]
pub struct LineFramer {
    buffer: Vec<u8>,
}

impl LineFramer {
    pub fn new() -> Self {
        LineFramer {
            buffer: Vec::with_capacity(1024),
        }
    }

    /// Append freshly-read bytes to the internal buffer.
    pub fn feed(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
    }

    /// Next complete line, without its terminator, or `None` when no full
    /// line is buffered. Keep-alive (empty) lines are skipped silently.
    pub fn next_line(&mut self) -> Option<String> {
        loop {
            let newline = self.buffer.iter().position(|&b| b == b'\n')?;
            let mut line: Vec<u8> = self.buffer.drain(..=newline).collect();
            line.pop();
            if line.last() == Some(&b'\r') {
                line.pop();
            }
            if line.is_empty() {
                continue;
            }
            return Some(String::from_utf8_lossy(&line).into_owned());
        }
    }

    /// Bytes buffered past the last terminator.
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }
}
