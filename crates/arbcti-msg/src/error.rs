use arbcti_codec::{CodecError, PackError, UnpackError};

#[derive(Debug, thiserror::Error)]
pub enum MsgError {
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// Decoded fields do not fit a typed view.
    #[error("cannot read {view} from decoded fields: {source}")]
    View {
        view: &'static str,
        #[source]
        source: serde::de::value::Error,
    },

    #[error("unexpected command code {0:#010x}")]
    UnexpectedCommand(u32),
}

impl From<PackError> for MsgError {
    fn from(e: PackError) -> Self {
        MsgError::Codec(e.into())
    }
}

impl From<UnpackError> for MsgError {
    fn from(e: UnpackError) -> Self {
        MsgError::Codec(e.into())
    }
}

pub type Result<T> = std::result::Result<T, MsgError>;
