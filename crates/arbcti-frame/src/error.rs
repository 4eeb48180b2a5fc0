use std::io::ErrorKind;

/// Errors that can occur while framing messages on a stream.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The stream does not start with the message magic.
    #[error("invalid message magic (expected 0x11DDDDDDDDDDDDDD)")]
    InvalidMagic,

    /// The declared length cannot hold a header and checksum.
    #[error("declared message length {declared} is below the {min}-byte minimum")]
    LengthTooSmall { declared: usize, min: usize },

    /// The declared length exceeds the configured maximum.
    #[error("message too large ({size} bytes, max {max})")]
    MessageTooLarge { size: usize, max: usize },

    /// An I/O error occurred while reading or writing, timeouts included.
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The peer closed the connection before a complete message arrived.
    #[error("connection closed (incomplete message)")]
    ConnectionClosed,
}

impl FrameError {
    /// Whether this is a socket timeout.
    ///
    /// Platforms report an expired `SO_RCVTIMEO` as either `WouldBlock` or
    /// `TimedOut`.
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            FrameError::Io(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut)
        )
    }
}

pub type Result<T> = std::result::Result<T, FrameError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_kinds() {
        assert!(FrameError::Io(std::io::Error::from(ErrorKind::WouldBlock)).is_timeout());
        assert!(FrameError::Io(std::io::Error::from(ErrorKind::TimedOut)).is_timeout());
        assert!(!FrameError::Io(std::io::Error::from(ErrorKind::BrokenPipe)).is_timeout());
        assert!(!FrameError::ConnectionClosed.is_timeout());
    }
}
