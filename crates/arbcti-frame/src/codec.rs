use std::time::Duration;

use arbcti_codec::{declared_length, HEADER_MAGIC, MIN_MESSAGE_LEN};
use bytes::{Bytes, BytesMut};

use crate::error::{FrameError, Result};

/// Bytes needed before the declared length can be read: magic (8) + length (4).
pub const PREFIX_SIZE: usize = 12;

/// Default size of a single socket read.
pub const DEFAULT_BUFFER_SIZE: usize = 4096;

/// Default maximum accepted message length: 1 MiB.
pub const DEFAULT_MAX_MESSAGE: usize = 1024 * 1024;

/// Framing configuration.
#[derive(Debug, Clone)]
pub struct FrameConfig {
    /// Size of each read from the stream. Default: 4096.
    pub buffer_size: usize,
    /// Largest declared length accepted. Default: 1 MiB.
    pub max_message_size: usize,
    /// Read timeout for blocking operations.
    pub read_timeout: Option<Duration>,
    /// Write timeout for blocking operations.
    pub write_timeout: Option<Duration>,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            buffer_size: DEFAULT_BUFFER_SIZE,
            max_message_size: DEFAULT_MAX_MESSAGE,
            read_timeout: None,
            write_timeout: None,
        }
    }
}

impl FrameConfig {
    /// Same read and write timeout.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            read_timeout: Some(timeout),
            write_timeout: Some(timeout),
            ..Self::default()
        }
    }
}

/// Split one complete message off the front of `src`.
///
/// Returns `Ok(None)` until the buffer holds the declared number of bytes.
/// Bytes past the message stay in `src`.
pub fn split_message(src: &mut BytesMut, max_message: usize) -> Result<Option<Bytes>> {
    if src.len() < PREFIX_SIZE {
        return Ok(None);
    }

    if src[..8] != HEADER_MAGIC.to_le_bytes() {
        return Err(FrameError::InvalidMagic);
    }

    let Some(declared) = declared_length(src) else {
        return Ok(None);
    };
    if declared < MIN_MESSAGE_LEN {
        return Err(FrameError::LengthTooSmall {
            declared,
            min: MIN_MESSAGE_LEN,
        });
    }
    if declared > max_message {
        return Err(FrameError::MessageTooLarge {
            size: declared,
            max: max_message,
        });
    }

    if src.len() < declared {
        return Ok(None);
    }

    Ok(Some(src.split_to(declared).freeze()))
}
