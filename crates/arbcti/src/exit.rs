use std::fmt;
use std::io;

use arbcti_client::{ClientError, ConfigError};
use arbcti_frame::FrameError;
use arbcti_spoofer::SpooferError;

pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const TRANSPORT_ERROR: i32 = 3;
pub const PERMISSION_DENIED: i32 = 50;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const CONFIG_ERROR: i32 = 78;
pub const TIMEOUT: i32 = 124;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    let code = match err.kind() {
        io::ErrorKind::PermissionDenied => PERMISSION_DENIED,
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => TIMEOUT,
        io::ErrorKind::ConnectionRefused | io::ErrorKind::AddrInUse => FAILURE,
        _ => TRANSPORT_ERROR,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn frame_error(context: &str, err: FrameError) -> CliError {
    match err {
        FrameError::Io(source) => io_error(context, source),
        FrameError::InvalidMagic
        | FrameError::LengthTooSmall { .. }
        | FrameError::MessageTooLarge { .. } => {
            CliError::new(DATA_INVALID, format!("{context}: {err}"))
        }
        FrameError::ConnectionClosed => CliError::new(FAILURE, format!("{context}: {err}")),
    }
}

pub fn config_error(context: &str, err: ConfigError) -> CliError {
    CliError::new(CONFIG_ERROR, format!("{context}: {err}"))
}

pub fn client_error(context: &str, err: ClientError) -> CliError {
    match err {
        ClientError::Config(err) => config_error(context, err),
        ClientError::Connect { source, .. } => io_error(context, source),
        ClientError::Frame(err) => frame_error(context, err),
        ClientError::Codec(_) | ClientError::Msg(_) => {
            CliError::new(DATA_INVALID, format!("{context}: {err}"))
        }
        ClientError::LoginRejected { .. } => {
            CliError::new(PERMISSION_DENIED, format!("{context}: {err}"))
        }
        ClientError::InvalidChannel { .. } => CliError::new(USAGE, format!("{context}: {err}")),
        ClientError::ConnectionLost => {
            CliError::new(TRANSPORT_ERROR, format!("{context}: {err}"))
        }
        ClientError::Rejected { .. } => CliError::new(FAILURE, format!("{context}: {err}")),
    }
}

pub fn spoofer_error(context: &str, err: SpooferError) -> CliError {
    match err {
        SpooferError::Io(source) => io_error(context, source),
        SpooferError::Frame(err) => frame_error(context, err),
        SpooferError::Config(_) => CliError::new(CONFIG_ERROR, format!("{context}: {err}")),
        SpooferError::AlreadyStarted => CliError::new(INTERNAL, format!("{context}: {err}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeouts_map_to_timeout_code() {
        let err = client_error(
            "status failed",
            ClientError::Frame(FrameError::Io(io::Error::from(io::ErrorKind::WouldBlock))),
        );
        assert_eq!(err.code, TIMEOUT);
        assert!(err.message.starts_with("status failed: "));
    }

    #[test]
    fn missing_credentials_map_to_config_code() {
        let err = client_error(
            "connect failed",
            ClientError::Config(ConfigError::MissingKey("ARBIN_CTI_USERNAME")),
        );
        assert_eq!(err.code, CONFIG_ERROR);
        assert!(err.message.contains("ARBIN_CTI_USERNAME"));
    }

    #[test]
    fn refused_connection_is_failure() {
        let err = client_error(
            "connect failed",
            ClientError::Connect {
                addr: "127.0.0.1:1".to_string(),
                source: io::Error::from(io::ErrorKind::ConnectionRefused),
            },
        );
        assert_eq!(err.code, FAILURE);
    }

    #[test]
    fn login_rejection_is_permission_denied() {
        let err = client_error(
            "connect failed",
            ClientError::LoginRejected {
                result: "fail".to_string(),
            },
        );
        assert_eq!(err.code, PERMISSION_DENIED);
    }
}
