//! Template-driven binary codec for CTI cycler messages.
//!
//! Every message is a fixed-layout little-endian record: a 20-byte common
//! header, message-specific fields at fixed offsets, and a 2-byte checksum.
//! Message layouts are declared as static [`MessageSpec`] tables and packed
//! or unpacked generically.

pub mod codec;
pub mod error;
pub mod field;
pub mod text;
pub mod value;

pub use codec::{
    check_header, checksum, command_code, declared_length, pack, pack_with_tail, unpack,
    unpack_fields, verify_checksum, MIN_MESSAGE_LEN,
};
pub use error::{CodecError, PackError, Result, UnpackError};
pub use field::{
    DefaultValue, FieldDescriptor, MessageSpec, TextEncoding, WireFormat, BASE_HEADER,
    CHECKSUM_SIZE, COMMAND_CODE_OFFSET, HEADER_MAGIC, HEADER_SIZE, LENGTH_OFFSET,
};
pub use value::{Fields, Value};
