//! Transport layer: the duplex text stream the session automaton drives.
//!
//! The automaton only sees [`Transport`]. The usual implementation is
//! [`ExpectChannel`](crate::channel::ExpectChannel), which adds buffering and
//! pattern waits on top of a [`RawIo`] byte stream: an SSH shell channel
//! ([`SshIo`]), a telnet connection ([`TelnetIo`]), or any tokio
//! stream ([`StreamIo`]).

pub mod config;
#[cfg(test)]
pub(crate) mod mock;
mod ssh;
mod stream;
mod telnet;

use std::future::Future;
use std::time::Duration;

use bytes::Bytes;
use regex::bytes::Regex;

pub use config::{AuthMethod, HostKeyVerification, SshConfig, TelnetConfig};
pub use ssh::{SshIo, SshTransport};
pub use stream::StreamIo;
pub use telnet::TelnetIo;

use crate::error::Result;

/// A successful pattern wait.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadMatch {
    /// Index of the pattern that matched.
    pub index: usize,

    /// Text received before the match.
    pub before: String,

    /// The matched text itself.
    pub matched: String,
}

/// A duplex text stream with expect-style reads.
///
/// `read_until` returns as soon as one of `patterns` matches the unread
/// output. When several match, the one starting earliest in the stream wins
/// and ties go to the lower index, so callers list patterns in priority
/// order. Text after the match stays unread for the next call.
///
/// Expiry of `timeout` fails with
/// [`ChannelError::PatternTimeout`](crate::error::ChannelError::PatternTimeout)
/// and end of input with [`ChannelError::Closed`](crate::error::ChannelError::Closed).
pub trait Transport: Send {
    /// Write raw bytes to the device.
    fn write(&mut self, data: &[u8]) -> impl Future<Output = Result<()>> + Send;

    /// Read until one of the patterns matches.
    fn read_until(
        &mut self,
        patterns: &[Regex],
        timeout: Duration,
    ) -> impl Future<Output = Result<ReadMatch>> + Send;

    /// Close the stream.
    fn close(&mut self) -> impl Future<Output = Result<()>> + Send;
}

/// A raw byte stream to a device, without any pattern logic.
pub trait RawIo: Send {
    /// Send bytes to the device.
    fn send(&mut self, data: &[u8]) -> impl Future<Output = Result<()>> + Send;

    /// Receive the next chunk of output, or `None` at end of stream.
    fn recv(&mut self) -> impl Future<Output = Result<Option<Bytes>>> + Send;

    /// Shut the stream down.
    fn shutdown(&mut self) -> impl Future<Output = Result<()>> + Send;
}
