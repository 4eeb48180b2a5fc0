//! Length-delimited message framing over TCP.
//!
//! Every CTI message declares its own total length in the 4-byte word at
//! offset 8. The reader accumulates bytes until the declared length is
//! available and returns exactly that many; anything received past the
//! end is kept for the next message.

pub mod codec;
pub mod error;
pub mod reader;
pub mod writer;

pub use codec::{
    split_message, FrameConfig, DEFAULT_BUFFER_SIZE, DEFAULT_MAX_MESSAGE, PREFIX_SIZE,
};
pub use error::{FrameError, Result};
pub use reader::{read_message, MessageReader};
pub use writer::MessageWriter;
