/// Errors raised while packing a message from a template.
///
/// Any of these aborts the whole pack call; no partial message is produced.
#[derive(Debug, thiserror::Error)]
pub enum PackError {
    /// The value kind does not match the field's wire format.
    #[error("field {field}: expected {expected} value, got {found}")]
    TypeMismatch {
        field: String,
        expected: &'static str,
        found: &'static str,
    },

    /// The value does not fit the field's wire format.
    #[error("field {field}: value {value} out of range for {format}")]
    OutOfRange {
        field: String,
        value: String,
        format: &'static str,
    },

    /// The text cannot be represented in the field's text encoding.
    #[error("field {field}: text is not encodable as {encoding}")]
    Unencodable {
        field: String,
        encoding: &'static str,
    },

    /// The field lies outside the declared message length.
    #[error("field {field} (offset {offset}, width {width}) exceeds message body of {body_len} bytes")]
    FieldOutOfBounds {
        field: String,
        offset: usize,
        width: usize,
        body_len: usize,
    },

    /// A message-specific rule rejected the supplied values.
    #[error("field {field}: {reason}")]
    Invalid { field: String, reason: String },
}

/// Errors raised while unpacking a message.
///
/// Header constant mismatches are not errors; they are logged and decoding
/// continues.
#[derive(Debug, thiserror::Error)]
pub enum UnpackError {
    /// The buffer ends before the field does.
    #[error("message truncated: field {field} needs {needed} bytes, buffer has {len}")]
    Truncated {
        field: String,
        needed: usize,
        len: usize,
    },

    /// The field bytes are not valid text in the declared encoding.
    #[error("field {field}: invalid {encoding} text")]
    InvalidText {
        field: String,
        encoding: &'static str,
    },
}

/// Either side of the codec.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("pack failed: {0}")]
    Pack(#[from] PackError),

    #[error("unpack failed: {0}")]
    Unpack(#[from] UnpackError),
}

pub type Result<T> = std::result::Result<T, CodecError>;
