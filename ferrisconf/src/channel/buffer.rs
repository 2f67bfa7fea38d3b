//! Pattern buffer with tail-search optimization.
//!
//! Only the last `search_depth` bytes of unread output are searched for
//! patterns. Devices stop and wait after a prompt or a pagination marker, so
//! whatever we are waiting for is always at the tail; searching the whole of
//! a long `show running-config` on every chunk would be quadratic.

use std::sync::LazyLock;

use bytes::BytesMut;
use regex::bytes::Regex;

use crate::transport::ReadMatch;

/// Backspace-space-backspace run a device prints to erase a `--More--` marker.
static ERASE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\x08+ *\x08*").expect("erase pattern is valid"));

/// An erase run reaching the end of a chunk; the rest may still be in flight.
static TRAILING_ERASE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\x08+ *\x08*$").expect("erase pattern is valid"));

/// Location of a pattern match inside the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchSpan {
    /// Index of the pattern that matched.
    pub index: usize,
    /// Byte offset where the match starts.
    pub start: usize,
    /// Byte offset where the match ends.
    pub end: usize,
}

/// Buffer of unread device output.
#[derive(Debug)]
pub struct PatternBuffer {
    /// Output received but not yet consumed by a match.
    buffer: BytesMut,

    /// How many bytes from the end to search for patterns.
    search_depth: usize,

    /// Erase run cut off at the end of the last chunk.
    held: Vec<u8>,
}

impl PatternBuffer {
    /// Create a new pattern buffer with the specified search depth.
    pub fn new(search_depth: usize) -> Self {
        Self {
            buffer: BytesMut::with_capacity(4096),
            search_depth,
            held: Vec::new(),
        }
    }

    /// Extend the buffer with new data.
    ///
    /// ANSI escape sequences, marker erasures and carriage returns are
    /// dropped so prompt patterns only ever see `\n` line endings. An erase
    /// run at the very end of `data` is held back until the next chunk, since
    /// the device may have split it across writes.
    pub fn extend(&mut self, data: &[u8]) {
        let mut data = if self.held.is_empty() {
            data.to_vec()
        } else {
            let mut joined = std::mem::take(&mut self.held);
            joined.extend_from_slice(data);
            joined
        };

        if memchr::memchr(0x08, &data).is_some() {
            if let Some(run) = TRAILING_ERASE.find(&data) {
                self.held = data.split_off(run.start());
            }
            data = ERASE.replace_all(&data, &b""[..]).into_owned();
        }

        let mut cleaned = strip_ansi_escapes::strip(&data);
        cleaned.retain(|&b| b != b'\r');
        self.buffer.extend_from_slice(&cleaned);
    }

    /// Start of the searched region.
    ///
    /// The cut is moved forward to the next line boundary so `^`-anchored
    /// prompt patterns never see a line's tail as if it were a whole line.
    fn search_start(&self) -> usize {
        let start = self.buffer.len().saturating_sub(self.search_depth);
        if start == 0 {
            return 0;
        }
        match memchr::memchr(b'\n', &self.buffer[start..]) {
            Some(pos) => start + pos + 1,
            None => start,
        }
    }

    /// Find the earliest match of any pattern in the tail.
    ///
    /// Ties at the same offset go to the lower pattern index.
    pub fn find_first(&self, patterns: &[Regex]) -> Option<MatchSpan> {
        let offset = self.search_start();
        let tail = &self.buffer[offset..];

        let mut best: Option<MatchSpan> = None;
        for (index, pattern) in patterns.iter().enumerate() {
            if let Some(m) = pattern.find(tail) {
                let span = MatchSpan {
                    index,
                    start: offset + m.start(),
                    end: offset + m.end(),
                };
                if best.is_none_or(|b| span.start < b.start) {
                    best = Some(span);
                }
            }
        }
        best
    }

    /// Consume everything up to the end of `span`.
    ///
    /// Output after the match stays buffered for the next read.
    pub fn split_match(&mut self, span: MatchSpan) -> ReadMatch {
        let before = self.buffer.split_to(span.start);
        let matched = self.buffer.split_to(span.end - span.start);
        ReadMatch {
            index: span.index,
            before: String::from_utf8_lossy(&before).into_owned(),
            matched: String::from_utf8_lossy(&matched).into_owned(),
        }
    }

    /// Take ownership of the buffer contents and reset.
    pub fn take(&mut self) -> Vec<u8> {
        self.buffer.split().to_vec()
    }

    /// Get a reference to the buffer contents.
    pub fn as_slice(&self) -> &[u8] {
        &self.buffer
    }

    /// Get the current buffer length.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Check if the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Clear the buffer.
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.held.clear();
    }

    /// Get the search depth setting.
    pub fn search_depth(&self) -> usize {
        self.search_depth
    }
}

impl Default for PatternBuffer {
    fn default() -> Self {
        Self::new(1000)
    }
}
