//! Raw I/O over any tokio byte stream.

use bytes::{Bytes, BytesMut};
use log::trace;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use super::RawIo;
use crate::error::{ChannelError, Result};

const READ_CHUNK: usize = 4096;

/// [`RawIo`] over an `AsyncRead + AsyncWrite` stream.
///
/// Works for a `TcpStream` to a console server, a child process's pipes
/// joined with `tokio::io::join`, or an in-memory duplex in tests.
#[derive(Debug)]
pub struct StreamIo<T> {
    stream: T,
}

impl<T> StreamIo<T> {
    /// Wrap a stream.
    pub fn new(stream: T) -> Self {
        Self { stream }
    }

    /// Get a reference to the inner stream.
    pub fn get_ref(&self) -> &T {
        &self.stream
    }

    /// Unwrap the inner stream.
    pub fn into_inner(self) -> T {
        self.stream
    }
}

impl<T> RawIo for StreamIo<T>
where
    T: AsyncRead + AsyncWrite + Unpin + Send,
{
    async fn send(&mut self, data: &[u8]) -> Result<()> {
        self.stream.write_all(data).await.map_err(ChannelError::Io)?;
        self.stream.flush().await.map_err(ChannelError::Io)?;
        Ok(())
    }

    async fn recv(&mut self) -> Result<Option<Bytes>> {
        let mut buf = BytesMut::with_capacity(READ_CHUNK);
        let n = self
            .stream
            .read_buf(&mut buf)
            .await
            .map_err(ChannelError::Io)?;
        if n == 0 {
            trace!("stream: end of input");
            return Ok(None);
        }
        Ok(Some(buf.freeze()))
    }

    async fn shutdown(&mut self) -> Result<()> {
        self.stream.shutdown().await.map_err(ChannelError::Io)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_send_and_recv() {
        let mock = tokio_test::io::Builder::new()
            .write(b"show version\n")
            .read(b"Cisco IOS Software\nR1#")
            .build();
        let mut io = StreamIo::new(mock);

        io.send(b"show version\n").await.unwrap();
        let chunk = io.recv().await.unwrap().unwrap();
        assert_eq!(&chunk[..], b"Cisco IOS Software\nR1#");
        assert!(io.recv().await.unwrap().is_none());
    }
}
