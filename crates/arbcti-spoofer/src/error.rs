use arbcti_codec::PackError;

/// Errors that can occur while running the reference server.
#[derive(Debug, thiserror::Error)]
pub enum SpooferError {
    /// Socket-level error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Frame-level error.
    #[error("frame error: {0}")]
    Frame(#[from] arbcti_frame::FrameError),

    /// Configuration value rejected before binding.
    #[error("invalid config: {0}")]
    Config(String),

    /// `start` was called on a server that already ran.
    #[error("server was already started")]
    AlreadyStarted,
}

/// Reasons a channel record update is refused. Nothing is applied.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("channel {channel} out of range (cycler has {num_channels})")]
    ChannelOutOfRange { channel: usize, num_channels: usize },

    #[error("channel {channel}: unknown status field {field:?}")]
    UnknownField { channel: usize, field: String },

    /// The merged record would not pack into a status response.
    #[error("channel {channel}: {source}")]
    Rejected {
        channel: usize,
        #[source]
        source: PackError,
    },
}

pub type Result<T> = std::result::Result<T, SpooferError>;
