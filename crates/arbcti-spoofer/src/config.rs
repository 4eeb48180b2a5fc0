use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SpooferError};

/// Port the cycler's CTI service listens on.
pub const DEFAULT_PORT: u16 = 9031;

pub const DEFAULT_NUM_CHANNELS: usize = 16;

/// Reference server configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpooferConfig {
    pub ip: IpAddr,
    pub port: u16,
    pub num_channels: usize,
    /// How long the accept loop waits for a stop signal between polls.
    pub accept_timeout_s: f64,
    /// Receive timeout of each connection worker.
    pub receive_timeout_s: f64,
    /// Size of each socket read.
    pub buffer_size: usize,
}

impl Default for SpooferConfig {
    fn default() -> Self {
        Self {
            ip: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: DEFAULT_PORT,
            num_channels: DEFAULT_NUM_CHANNELS,
            accept_timeout_s: 0.5,
            receive_timeout_s: 0.5,
            buffer_size: arbcti_frame::DEFAULT_BUFFER_SIZE,
        }
    }
}

impl SpooferConfig {
    /// Loopback config on an OS-assigned port.
    pub fn ephemeral(num_channels: usize) -> Self {
        Self {
            port: 0,
            num_channels,
            ..Self::default()
        }
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.ip, self.port)
    }

    pub fn accept_timeout(&self) -> Result<Duration> {
        positive_secs("accept_timeout_s", self.accept_timeout_s)
    }

    pub fn receive_timeout(&self) -> Result<Duration> {
        positive_secs("receive_timeout_s", self.receive_timeout_s)
    }

    /// Check every value that `bind` relies on.
    pub fn validate(&self) -> Result<()> {
        self.accept_timeout()?;
        self.receive_timeout()?;
        if self.buffer_size == 0 {
            return Err(SpooferError::Config("buffer_size must be non-zero".into()));
        }
        Ok(())
    }
}

fn positive_secs(name: &str, secs: f64) -> Result<Duration> {
    match Duration::try_from_secs_f64(secs) {
        Ok(d) if !d.is_zero() => Ok(d),
        _ => Err(SpooferError::Config(format!(
            "{name} must be a positive number of seconds, got {secs}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = SpooferConfig::default();
        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:9031");
        assert_eq!(config.accept_timeout().unwrap(), Duration::from_millis(500));
        assert_eq!(config.receive_timeout().unwrap(), Duration::from_millis(500));
        config.validate().unwrap();
    }

    #[test]
    fn rejects_non_positive_timeouts() {
        for bad in [0.0, -1.0, f64::NAN] {
            let config = SpooferConfig {
                receive_timeout_s: bad,
                ..SpooferConfig::default()
            };
            assert!(matches!(config.validate(), Err(SpooferError::Config(_))));
        }
    }

    #[test]
    fn partial_json_uses_defaults() {
        let config: SpooferConfig =
            serde_json::from_str(r#"{"port": 0, "num_channels": 4}"#).unwrap();
        assert_eq!(config, SpooferConfig::ephemeral(4));
    }
}
