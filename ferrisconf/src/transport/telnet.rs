//! Telnet raw I/O.
//!
//! Routers speak plain NVT text once negotiation is out of the way. We refuse
//! every option the server offers or requests, strip the negotiation bytes
//! from the data stream, and translate line endings to CR LF on the way out.

use bytes::{BufMut, Bytes, BytesMut};
use log::{debug, trace};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;

use super::config::TelnetConfig;
use super::stream::StreamIo;
use super::RawIo;
use crate::error::{Result, TransportError};

const IAC: u8 = 255;
const DONT: u8 = 254;
const DO: u8 = 253;
const WONT: u8 = 252;
const WILL: u8 = 251;
const SB: u8 = 250;
const SE: u8 = 240;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Data,
    Iac,
    Negotiate(u8),
    Sub,
    SubIac,
}

/// Incremental IAC filter; negotiation may be split across reads.
#[derive(Debug)]
struct Negotiator {
    state: State,
}

impl Negotiator {
    fn new() -> Self {
        Self { state: State::Data }
    }

    /// Split `input` into plain data and the refusals to send back.
    fn feed(&mut self, input: &[u8], data: &mut BytesMut, replies: &mut Vec<u8>) {
        for &b in input {
            self.state = match (self.state, b) {
                (State::Data, IAC) => State::Iac,
                (State::Data, _) => {
                    data.put_u8(b);
                    State::Data
                }
                (State::Iac, IAC) => {
                    data.put_u8(IAC);
                    State::Data
                }
                (State::Iac, DO | DONT | WILL | WONT) => State::Negotiate(b),
                (State::Iac, SB) => State::Sub,
                (State::Iac, _) => State::Data,
                (State::Negotiate(cmd), option) => {
                    match cmd {
                        DO => replies.extend_from_slice(&[IAC, WONT, option]),
                        WILL => replies.extend_from_slice(&[IAC, DONT, option]),
                        // Already off; answering would loop.
                        _ => {}
                    }
                    State::Data
                }
                (State::Sub, IAC) => State::SubIac,
                (State::Sub, _) => State::Sub,
                (State::SubIac, SE) => State::Data,
                (State::SubIac, _) => State::Sub,
            };
        }
    }
}

/// Escape IAC bytes and turn `\n` into CR LF.
fn encode(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len() + 2);
    for &b in data {
        match b {
            IAC => out.extend_from_slice(&[IAC, IAC]),
            b'\n' => out.extend_from_slice(b"\r\n"),
            _ => out.push(b),
        }
    }
    out
}

/// [`RawIo`] over a telnet connection.
#[derive(Debug)]
pub struct TelnetIo<T = TcpStream> {
    inner: StreamIo<T>,
    negotiator: Negotiator,
}

impl TelnetIo<TcpStream> {
    /// Open a telnet connection.
    pub async fn connect(config: &TelnetConfig) -> Result<Self> {
        debug!("telnet: connecting to {}:{}", config.host, config.port);
        let stream = tokio::time::timeout(
            config.timeout,
            TcpStream::connect((config.host.as_str(), config.port)),
        )
        .await
        .map_err(|_| TransportError::Timeout(config.timeout))?
        .map_err(|source| TransportError::ConnectionFailed {
            host: config.host.clone(),
            port: config.port,
            source,
        })?;
        Ok(Self::new(stream))
    }
}

impl<T> TelnetIo<T> {
    /// Wrap an already connected stream.
    pub fn new(stream: T) -> Self {
        Self {
            inner: StreamIo::new(stream),
            negotiator: Negotiator::new(),
        }
    }
}

impl<T> RawIo for TelnetIo<T>
where
    T: AsyncRead + AsyncWrite + Unpin + Send,
{
    async fn send(&mut self, data: &[u8]) -> Result<()> {
        self.inner.send(&encode(data)).await
    }

    async fn recv(&mut self) -> Result<Option<Bytes>> {
        loop {
            let Some(chunk) = self.inner.recv().await? else {
                return Ok(None);
            };

            let mut data = BytesMut::with_capacity(chunk.len());
            let mut replies = Vec::new();
            self.negotiator.feed(&chunk, &mut data, &mut replies);

            if !replies.is_empty() {
                trace!("telnet: refusing {} option bytes", replies.len());
                self.inner.send(&replies).await?;
            }
            if !data.is_empty() {
                return Ok(Some(data.freeze()));
            }
        }
    }

    async fn shutdown(&mut self) -> Result<()> {
        self.inner.shutdown().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negotiation_is_stripped_and_refused() {
        let mut n = Negotiator::new();
        let mut data = BytesMut::new();
        let mut replies = Vec::new();

        // WILL ECHO, WILL SUPPRESS-GO-AHEAD, DO TERMINAL-TYPE, then text.
        n.feed(
            &[IAC, WILL, 1, IAC, WILL, 3, IAC, DO, 24, b'U', b's', b'e', b'r'],
            &mut data,
            &mut replies,
        );

        assert_eq!(&data[..], b"User");
        assert_eq!(replies, vec![IAC, DONT, 1, IAC, DONT, 3, IAC, WONT, 24]);
    }

    #[test]
    fn test_negotiation_split_across_reads() {
        let mut n = Negotiator::new();
        let mut data = BytesMut::new();
        let mut replies = Vec::new();

        n.feed(&[b'a', IAC], &mut data, &mut replies);
        n.feed(&[DO], &mut data, &mut replies);
        n.feed(&[31, b'b'], &mut data, &mut replies);

        assert_eq!(&data[..], b"ab");
        assert_eq!(replies, vec![IAC, WONT, 31]);
    }

    #[test]
    fn test_subnegotiation_and_escaped_iac() {
        let mut n = Negotiator::new();
        let mut data = BytesMut::new();
        let mut replies = Vec::new();

        n.feed(
            &[IAC, SB, 24, 1, IAC, SE, b'x', IAC, IAC, b'y'],
            &mut data,
            &mut replies,
        );

        assert_eq!(&data[..], &[b'x', IAC, b'y']);
        assert!(replies.is_empty());
    }

    #[test]
    fn test_encode() {
        assert_eq!(encode(b"enable\n"), b"enable\r\n".to_vec());
        assert_eq!(encode(&[b'a', IAC]), vec![b'a', IAC, IAC]);
    }

    #[tokio::test]
    async fn test_recv_answers_negotiation() {
        let mock = tokio_test::io::Builder::new()
            .read(&[IAC, DO, 24])
            .write(&[IAC, WONT, 24])
            .read(b"Username: ")
            .build();
        let mut io = TelnetIo::new(mock);

        let chunk = io.recv().await.unwrap().unwrap();
        assert_eq!(&chunk[..], b"Username: ");
    }
}
