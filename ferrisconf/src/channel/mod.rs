//! Channel layer for pattern matching over raw device output.
//!
//! This module turns a byte stream into expect-style waits, including
//! ANSI stripping and tail-limited multi-pattern search.

mod buffer;
mod expect;

pub use buffer::{MatchSpan, PatternBuffer};
pub use expect::{ChannelConfig, ExpectChannel};
