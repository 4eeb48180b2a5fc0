use crate::config::ConfigError;

/// Errors that can occur while talking to a cycler.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Configuration rejected before connecting.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// TCP connection could not be established.
    #[error("failed to connect to {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// Send or receive failed, including timeouts.
    #[error("transport error: {0}")]
    Frame(#[from] arbcti_frame::FrameError),

    /// Message could not be packed or decoded.
    #[error("codec error: {0}")]
    Codec(#[from] arbcti_codec::CodecError),

    /// Decoded message did not fit its typed view.
    #[error("message error: {0}")]
    Msg(#[from] arbcti_msg::MsgError),

    /// The cycler answered the login with something other than success.
    #[error("login rejected: {result}")]
    LoginRejected { result: String },

    /// The cycler decoded the command but refused it.
    #[error("{kind} rejected: {result}")]
    Rejected {
        kind: arbcti_msg::MessageKind,
        result: String,
    },

    /// A previous exchange failed part-way; the stream may be out of step.
    #[error("connection is no longer usable after an earlier failure")]
    ConnectionLost,

    /// Channel number outside `1..=num_channels`.
    #[error("invalid channel {channel} (cycler has {num_channels})")]
    InvalidChannel { channel: u32, num_channels: u32 },
}

impl From<arbcti_codec::PackError> for ClientError {
    fn from(err: arbcti_codec::PackError) -> Self {
        Self::Codec(err.into())
    }
}

impl From<arbcti_codec::UnpackError> for ClientError {
    fn from(err: arbcti_codec::UnpackError) -> Self {
        Self::Codec(err.into())
    }
}

impl ClientError {
    /// Whether the failure was a send or receive timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Frame(err) if err.is_timeout())
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
