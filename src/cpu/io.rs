//! Byte-oriented I/O channel.
//!
//! Decouples the CPU from any real input/output device: input arrives as a
//! FIFO queue of bytes, output accumulates in an append-only buffer. The
//! memory subsystem redirects the two reserved port addresses here.

use serde::{Serialize, Deserialize};
use std::collections::VecDeque;

/// An I/O channel: queued input bytes and emitted output bytes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IoChannel {
    input: VecDeque<u8>,
    output: Vec<u8>,
}

impl IoChannel {
    /// Create a channel with empty input queue and output buffer.
    pub fn new() -> Self {
        Self {
            input: VecDeque::new(),
            output: Vec::new(),
        }
    }

    /// Queue each character of `text` as a byte, in order.
    ///
    /// Characters above U+00FF are clamped to 0xFF.
    pub fn feed(&mut self, text: &str) {
        for c in text.chars() {
            let code = c as u32;
            self.input.push_back(code.min(0xFF) as u8);
        }
    }

    /// Dequeue the oldest pending input byte, or `None` if the queue is empty.
    pub fn pop_input(&mut self) -> Option<u8> {
        self.input.pop_front()
    }

    /// Whether any input is queued.
    pub fn has_input(&self) -> bool {
        !self.input.is_empty()
    }

    /// Number of queued input bytes.
    pub fn pending_input(&self) -> usize {
        self.input.len()
    }

    /// Append a byte to the output buffer.
    pub fn emit(&mut self, value: u8) {
        self.output.push(value);
    }

    /// The full emitted history. Never cleared internally; a fresh channel
    /// is the only reset.
    pub fn output(&self) -> &[u8] {
        &self.output
    }
}

impl Default for IoChannel {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feed_preserves_order() {
        let mut io = IoChannel::new();
        io.feed("AB");

        assert_eq!(io.pop_input(), Some(65));
        assert_eq!(io.pop_input(), Some(66));
        assert_eq!(io.pop_input(), None);
    }

    #[test]
    fn test_empty_queue_signals_none() {
        let mut io = IoChannel::new();
        assert!(!io.has_input());
        assert_eq!(io.pop_input(), None);
    }

    #[test]
    fn test_feed_clamps_wide_chars() {
        let mut io = IoChannel::new();
        io.feed("€"); // U+20AC

        assert_eq!(io.pop_input(), Some(0xFF));
    }

    #[test]
    fn test_output_accumulates() {
        let mut io = IoChannel::new();
        io.emit(200);
        io.emit(0);
        io.emit(65);

        assert_eq!(io.output(), &[200, 0, 65]);
    }
}
