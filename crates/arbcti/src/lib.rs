//! Control protocol for CTI battery cyclers.
//!
//! # Crate Structure
//!
//! - [`codec`]: Template-driven binary message codec
//! - [`msg`]: Message catalog, result tables and typed views
//! - [`frame`]: Length-delimited message framing over TCP
//! - [`client`]: Cycler and channel clients (behind `client` feature)
//! - [`spoofer`]: Reference server for testing (behind `spoofer` feature)

/// Re-export codec types.
pub mod codec {
    pub use arbcti_codec::*;
}

/// Re-export message catalog types.
pub mod msg {
    pub use arbcti_msg::*;
}

/// Re-export framing types.
pub mod frame {
    pub use arbcti_frame::*;
}

/// Re-export client types (requires `client` feature).
#[cfg(feature = "client")]
pub mod client {
    pub use arbcti_client::*;
}

/// Re-export reference server types (requires `spoofer` feature).
#[cfg(feature = "spoofer")]
pub mod spoofer {
    pub use arbcti_spoofer::*;
}
