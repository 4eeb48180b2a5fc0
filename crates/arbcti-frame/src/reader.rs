use std::io::{ErrorKind, Read};
use std::net::TcpStream;

use bytes::{Bytes, BytesMut};
use tracing::trace;

use crate::codec::{split_message, FrameConfig};
use crate::error::{FrameError, Result};

/// Reads complete messages from any `Read` stream.
///
/// Partial reads are accumulated internally and kept across calls, so a
/// caller that retries after a timeout resumes the same message.
pub struct MessageReader<T> {
    inner: T,
    buf: BytesMut,
    chunk: Vec<u8>,
    config: FrameConfig,
}

impl<T: Read> MessageReader<T> {
    /// Create a new message reader with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, FrameConfig::default())
    }

    /// Create a new message reader with explicit configuration.
    pub fn with_config(inner: T, config: FrameConfig) -> Self {
        let chunk_size = config.buffer_size.max(1);
        Self {
            inner,
            buf: BytesMut::with_capacity(chunk_size),
            chunk: vec![0u8; chunk_size],
            config,
        }
    }

    /// Read the next complete message (blocking).
    ///
    /// Returns exactly the declared number of bytes. Returns
    /// `Err(FrameError::ConnectionClosed)` when EOF is reached.
    pub fn read_message(&mut self) -> Result<Bytes> {
        loop {
            if let Some(msg) = split_message(&mut self.buf, self.config.max_message_size)? {
                trace!(len = msg.len(), surplus = self.buf.len(), "read message");
                return Ok(msg);
            }

            let read = match self.inner.read(&mut self.chunk) {
                Ok(n) => n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            };

            if read == 0 {
                return Err(FrameError::ConnectionClosed);
            }

            self.buf.extend_from_slice(&self.chunk[..read]);
        }
    }

    /// Bytes received but not yet returned as part of a message.
    pub fn buffered(&self) -> usize {
        self.buf.len()
    }

    /// Drop any partially received message.
    pub fn clear(&mut self) {
        self.buf.clear();
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the reader and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Current reader configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}

impl MessageReader<TcpStream> {
    /// Create a message reader for a `TcpStream` and apply the read timeout
    /// from config.
    pub fn with_config_tcp(inner: TcpStream, config: FrameConfig) -> Result<Self> {
        inner.set_read_timeout(config.read_timeout)?;
        Ok(Self::with_config(inner, config))
    }
}

/// Read one complete message from `stream` using reads of `buffer_size`.
///
/// Bytes received past the end of the message are discarded; use a
/// [`MessageReader`] to keep them for the next call.
pub fn read_message<R: Read>(stream: &mut R, buffer_size: usize) -> Result<Bytes> {
    let config = FrameConfig {
        buffer_size,
        ..FrameConfig::default()
    };
    let mut reader = MessageReader::with_config(stream, config);
    let msg = reader.read_message()?;
    if reader.buffered() > 0 {
        trace!(discarded = reader.buffered(), "dropping bytes past message end");
    }
    Ok(msg)
}
