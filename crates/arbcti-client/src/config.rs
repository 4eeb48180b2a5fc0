use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Environment variable holding the CTI user name.
pub const USERNAME_ENV: &str = "ARBIN_CTI_USERNAME";
/// Environment variable holding the CTI password.
pub const PASSWORD_ENV: &str = "ARBIN_CTI_PASSWORD";

pub const DEFAULT_TIMEOUT_S: f64 = 3.0;
pub const DEFAULT_MSG_BUFFER_SIZE: usize = 4096;

/// Errors detected before any connection attempt.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("required configuration key {0} is missing")]
    MissingKey(&'static str),

    #[error("invalid {key}: {reason}")]
    Invalid { key: &'static str, reason: String },

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Connection settings for a cycler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CyclerConfig {
    /// Address of the cycler host.
    pub ip_address: String,
    pub port: u16,
    /// Timeout of connect, send and each receive.
    #[serde(default = "default_timeout_s")]
    pub timeout_s: f64,
    /// Size of each socket read. At least 1024 is recommended.
    #[serde(default = "default_msg_buffer_size")]
    pub msg_buffer_size: usize,
}

fn default_timeout_s() -> f64 {
    DEFAULT_TIMEOUT_S
}

fn default_msg_buffer_size() -> usize {
    DEFAULT_MSG_BUFFER_SIZE
}

impl CyclerConfig {
    pub fn new(ip_address: impl Into<String>, port: u16) -> Self {
        Self {
            ip_address: ip_address.into(),
            port,
            timeout_s: DEFAULT_TIMEOUT_S,
            msg_buffer_size: DEFAULT_MSG_BUFFER_SIZE,
        }
    }

    pub fn timeout(&self) -> Result<Duration, ConfigError> {
        match Duration::try_from_secs_f64(self.timeout_s) {
            Ok(d) if !d.is_zero() => Ok(d),
            _ => Err(ConfigError::Invalid {
                key: "timeout_s",
                reason: format!("expected a positive number of seconds, got {}", self.timeout_s),
            }),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ip_address.trim().is_empty() {
            return Err(ConfigError::MissingKey("ip_address"));
        }
        self.timeout()?;
        if self.msg_buffer_size == 0 {
            return Err(ConfigError::Invalid {
                key: "msg_buffer_size",
                reason: "must be non-zero".to_string(),
            });
        }
        Ok(())
    }

    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_toml_str(&read(path.as_ref())?)
    }
}

/// Settings for controlling one channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelConfig {
    /// 1-based channel number.
    pub channel: u32,
    /// Test name used by `start_test`.
    #[serde(default)]
    pub test_name: Option<String>,
    /// Schedule file used by `assign_schedule` and `start_test`.
    #[serde(default)]
    pub schedule_name: Option<String>,
    #[serde(flatten)]
    pub cycler: CyclerConfig,
}

impl ChannelConfig {
    pub fn new(channel: u32, cycler: CyclerConfig) -> Self {
        Self {
            channel,
            test_name: None,
            schedule_name: None,
            cycler,
        }
    }

    pub fn with_test_name(mut self, name: impl Into<String>) -> Self {
        self.test_name = Some(name.into());
        self
    }

    pub fn with_schedule_name(mut self, name: impl Into<String>) -> Self {
        self.schedule_name = Some(name.into());
        self
    }

    /// Channel index as sent on the wire.
    pub fn wire_channel(&self) -> u32 {
        self.channel.saturating_sub(1)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.channel < 1 {
            return Err(ConfigError::Invalid {
                key: "channel",
                reason: "channel numbers start at 1".to_string(),
            });
        }
        self.cycler.validate()
    }

    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_toml_str(&read(path.as_ref())?)
    }
}

fn read(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// CTI login credentials.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Read [`USERNAME_ENV`] and [`PASSWORD_ENV`] from the process
    /// environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read credentials through `lookup`. Missing and empty values are both
    /// reported as missing.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &'static str| {
            lookup(key)
                .filter(|v| !v.is_empty())
                .ok_or(ConfigError::MissingKey(key))
        };
        Ok(Self {
            username: get(USERNAME_ENV)?,
            password: get(PASSWORD_ENV)?,
        })
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}
