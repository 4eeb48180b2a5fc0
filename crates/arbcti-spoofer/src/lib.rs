//! Reference CTI cycler server.
//!
//! Accepts TCP clients, answers login, channel status and command requests
//! with well-formed responses, and keeps a per-channel status store that
//! can be edited while the server runs. Intended for testing clients
//! without a cycler.

pub mod config;
pub mod dispatch;
pub mod error;
pub mod server;
pub mod store;
mod worker;

pub use config::{SpooferConfig, DEFAULT_NUM_CHANNELS, DEFAULT_PORT};
pub use dispatch::respond;
pub use error::{Result, SpooferError, StoreError};
pub use server::SpooferServer;
pub use store::ChannelStore;
