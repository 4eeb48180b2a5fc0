//! Blocking clients for CTI cyclers.
//!
//! [`CyclerInterface`] owns one logged-in TCP session and reads channel
//! status. [`ChannelInterface`] wraps a session bound to one channel and
//! runs schedule and meta-variable commands on it. Channel numbers are
//! 1-based here and converted to the 0-based wire index internally.

pub mod channel;
pub mod config;
pub mod cycler;
pub mod error;

pub use channel::ChannelInterface;
pub use config::{
    ChannelConfig, ConfigError, Credentials, CyclerConfig, DEFAULT_MSG_BUFFER_SIZE,
    DEFAULT_TIMEOUT_S, PASSWORD_ENV, USERNAME_ENV,
};
pub use cycler::CyclerInterface;
pub use error::{ClientError, Result};
