//! Expect-style channel over a raw byte stream.

use std::time::Duration;

use log::trace;
use regex::bytes::Regex;
use tokio::time::Instant;

use super::buffer::PatternBuffer;
use crate::error::{ChannelError, Result};
use crate::transport::{RawIo, ReadMatch, Transport};

/// Configuration for channel behavior.
#[derive(Debug, Clone)]
pub struct ChannelConfig {
    /// Search depth for pattern matching.
    pub search_depth: usize,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self { search_depth: 1000 }
    }
}

/// Buffered channel that turns a [`RawIo`] into a [`Transport`].
///
/// Output is accumulated in a [`PatternBuffer`] and consumed one match at a
/// time, so a prompt that arrives in the same chunk as a `--More--` marker is
/// still there for the next wait.
pub struct ExpectChannel<R> {
    /// Underlying byte stream.
    io: R,

    /// Unread output.
    buffer: PatternBuffer,

    /// Whether the peer has closed the stream.
    eof: bool,

    /// Whether `close` has been called.
    closed: bool,
}

impl<R: RawIo> ExpectChannel<R> {
    /// Create a new channel with the given configuration.
    pub fn new(io: R, config: ChannelConfig) -> Self {
        Self {
            io,
            buffer: PatternBuffer::new(config.search_depth),
            eof: false,
            closed: false,
        }
    }

    /// Create a channel with default configuration.
    pub fn with_defaults(io: R) -> Self {
        Self::new(io, ChannelConfig::default())
    }

    /// Get a reference to the buffer.
    pub fn buffer(&self) -> &PatternBuffer {
        &self.buffer
    }

    /// Check if the channel is still open.
    pub fn is_open(&self) -> bool {
        !self.eof && !self.closed
    }

    /// Get a reference to the underlying stream.
    pub fn get_ref(&self) -> &R {
        &self.io
    }
}

impl<R: RawIo> Transport for ExpectChannel<R> {
    async fn write(&mut self, data: &[u8]) -> Result<()> {
        if self.closed || self.eof {
            return Err(ChannelError::Closed.into());
        }
        // Writes may carry credentials; only their size is logged.
        trace!("channel: send {} bytes", data.len());
        self.io.send(data).await
    }

    async fn read_until(&mut self, patterns: &[Regex], timeout: Duration) -> Result<ReadMatch> {
        if patterns.is_empty() {
            return Err(ChannelError::NoPatterns.into());
        }
        let deadline = Instant::now() + timeout;

        loop {
            if let Some(span) = self.buffer.find_first(patterns) {
                let found = self.buffer.split_match(span);
                trace!(
                    "channel: pattern {} matched {:?}",
                    found.index, found.matched
                );
                return Ok(found);
            }

            if self.eof || self.closed {
                return Err(ChannelError::Closed.into());
            }

            match tokio::time::timeout_at(deadline, self.io.recv()).await {
                Ok(Ok(Some(chunk))) => {
                    trace!("channel: received {} bytes", chunk.len());
                    self.buffer.extend(&chunk);
                }
                Ok(Ok(None)) => {
                    trace!("channel: end of stream");
                    self.eof = true;
                }
                Ok(Err(e)) => return Err(e),
                Err(_) => return Err(ChannelError::PatternTimeout(timeout).into()),
            }
        }
    }

    async fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        if self.eof {
            return Ok(());
        }
        self.io.shutdown().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::transport::StreamIo;

    fn patterns(list: &[&str]) -> Vec<Regex> {
        list.iter().map(|p| Regex::new(p).unwrap()).collect()
    }

    #[tokio::test]
    async fn test_read_across_chunks() {
        let mock = tokio_test::io::Builder::new()
            .read(b"Interface   IP-Address\n")
            .read(b"Lo0         10.0.0.1\nR1")
            .read(b"#")
            .build();
        let mut channel = ExpectChannel::with_defaults(StreamIo::new(mock));

        let m = channel
            .read_until(&patterns(&[r"(?m)^R1#$"]), Duration::from_secs(1))
            .await
            .unwrap();
        assert_eq!(m.index, 0);
        assert_eq!(m.before, "Interface   IP-Address\nLo0         10.0.0.1\n");
        assert_eq!(m.matched, "R1#");
    }

    #[tokio::test]
    async fn test_leftover_output_is_kept() {
        let mock = tokio_test::io::Builder::new()
            .read(b"page one\n --More-- page two\nR1#")
            .build();
        let mut channel = ExpectChannel::with_defaults(StreamIo::new(mock));
        let list = patterns(&[r"(?m)^R1#$", r" ?--More-- ?"]);

        let first = channel.read_until(&list, Duration::from_secs(1)).await.unwrap();
        assert_eq!(first.index, 1);
        assert_eq!(first.before, "page one\n");

        let second = channel.read_until(&list, Duration::from_secs(1)).await.unwrap();
        assert_eq!(second.index, 0);
        assert_eq!(second.before, "page two\n");
    }

    #[tokio::test]
    async fn test_end_of_stream_is_closed() {
        let mock = tokio_test::io::Builder::new().read(b"bye\n").build();
        let mut channel = ExpectChannel::with_defaults(StreamIo::new(mock));

        let err = channel
            .read_until(&patterns(&[r"R1#"]), Duration::from_secs(1))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Channel(ChannelError::Closed)));
        assert!(!channel.is_open());

        let err = channel.write(b"show clock\n").await.unwrap_err();
        assert!(matches!(err, Error::Channel(ChannelError::Closed)));
    }

    #[tokio::test]
    async fn test_silence_times_out() {
        let (client, _server) = tokio::io::duplex(64);
        let mut channel = ExpectChannel::with_defaults(StreamIo::new(client));

        let err = channel
            .read_until(&patterns(&[r"R1#"]), Duration::from_millis(20))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Channel(ChannelError::PatternTimeout(_))));
    }

    #[tokio::test]
    async fn test_empty_pattern_list() {
        let (client, _server) = tokio::io::duplex(64);
        let mut channel = ExpectChannel::with_defaults(StreamIo::new(client));

        let err = channel
            .read_until(&[], Duration::from_millis(20))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Channel(ChannelError::NoPatterns)));
    }
}
