use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use arbcti_codec::Fields;
use arbcti_frame::{FrameConfig, MessageReader, MessageWriter};
use arbcti_msg::{ChannelStatus, Direction, LoginFeedback, MessageKind};
use bytes::Bytes;
use tracing::{debug, error, info, warn};

use crate::config::{CyclerConfig, Credentials};
use crate::error::{ClientError, Result};

/// Cycler-level connection: one logged-in TCP session.
///
/// Requests are strictly sequential. After any transport failure the
/// session refuses further requests with [`ClientError::ConnectionLost`];
/// reconnect to continue.
pub struct CyclerInterface {
    session: Session,
    login: LoginFeedback,
}

struct Session {
    reader: MessageReader<TcpStream>,
    writer: MessageWriter<TcpStream>,
    lost: bool,
}

impl std::fmt::Debug for CyclerInterface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CyclerInterface")
            .field("peer", &self.session.writer.get_ref().peer_addr().ok())
            .field("login", &self.login)
            .field("lost", &self.session.lost)
            .finish()
    }
}

impl CyclerInterface {
    /// Connect and log in.
    ///
    /// `already logged in` is accepted with a warning; any other non-success
    /// result is [`ClientError::LoginRejected`].
    pub fn connect(config: &CyclerConfig, credentials: &Credentials) -> Result<Self> {
        config.validate()?;
        let timeout = config.timeout()?;
        let stream = connect_stream(config, timeout)?;

        let frame_config = FrameConfig {
            buffer_size: config.msg_buffer_size,
            ..FrameConfig::with_timeout(timeout)
        };
        let reader = MessageReader::with_config_tcp(
            stream
                .try_clone()
                .map_err(|source| connect_error(config, source))?,
            frame_config.clone(),
        )?;
        let writer = MessageWriter::with_config_tcp(stream, frame_config)?;
        info!(ip = %config.ip_address, port = config.port, "connected to cycler");

        let mut session = Session {
            reader,
            writer,
            lost: false,
        };
        let login = log_in(&mut session, credentials)?;
        Ok(Self { session, login })
    }

    pub fn num_channels(&self) -> u32 {
        self.login.num_channels
    }

    /// Login response received when the session was opened.
    pub fn login_feedback(&self) -> &LoginFeedback {
        &self.login
    }

    /// Status of `channel` (1-based). `None` on an invalid channel or any
    /// failure; the cause is logged.
    pub fn read_channel_status(&mut self, channel: u32) -> Option<ChannelStatus> {
        match self.try_read_channel_status(channel) {
            Ok(status) => Some(status),
            Err(err) => {
                error!(channel, error = %err, "failed to read channel status");
                None
            }
        }
    }

    /// Fallible form of [`read_channel_status`](Self::read_channel_status).
    pub fn try_read_channel_status(&mut self, channel: u32) -> Result<ChannelStatus> {
        let wire = self.wire_channel(channel)?;
        let fields = self.transact(MessageKind::ChannelInfo, &Fields::new().with("channel", wire))?;
        Ok(ChannelStatus::from_fields(&fields)?)
    }

    /// Map a 1-based channel number to its wire index.
    pub fn wire_channel(&self, channel: u32) -> Result<i32> {
        let num_channels = self.num_channels();
        let invalid = || ClientError::InvalidChannel {
            channel,
            num_channels,
        };
        if channel < 1 || channel > num_channels {
            return Err(invalid());
        }
        i32::try_from(channel - 1).map_err(|_| invalid())
    }

    /// Send one request and decode its response.
    pub fn transact(&mut self, kind: MessageKind, overrides: &Fields) -> Result<Fields> {
        self.session.transact(kind, overrides)
    }

    /// Whether the session is still usable.
    pub fn is_connected(&self) -> bool {
        !self.session.lost
    }
}

impl Session {
    fn transact(&mut self, kind: MessageKind, overrides: &Fields) -> Result<Fields> {
        let request = kind.pack(Direction::Client, overrides)?;
        let response = self.exchange(&request)?;
        debug!(%kind, len = response.len(), "response");
        Ok(kind.unpack(Direction::Server, &response)?)
    }

    fn exchange(&mut self, request: &[u8]) -> Result<Bytes> {
        if self.lost {
            return Err(ClientError::ConnectionLost);
        }
        let result = self
            .writer
            .send(request)
            .and_then(|()| self.reader.read_message());
        if result.is_err() {
            self.lost = true;
            self.reader.clear();
        }
        Ok(result?)
    }
}

fn log_in(session: &mut Session, credentials: &Credentials) -> Result<LoginFeedback> {
    let overrides = Fields::new()
        .with("username", credentials.username.as_str())
        .with("password", credentials.password.as_str());
    let fields = session.transact(MessageKind::Login, &overrides)?;
    let login = LoginFeedback::from_fields(&fields)?;

    if login.is_success() {
        info!(cycler_sn = %login.cycler_sn, num_channels = login.num_channels, "logged in");
    } else if login.is_already_logged_in() {
        warn!(cycler_sn = %login.cycler_sn, "already logged in to cycler");
    } else {
        error!(result = %login.result, "login rejected");
        return Err(ClientError::LoginRejected {
            result: login.result,
        });
    }
    Ok(login)
}

fn connect_stream(config: &CyclerConfig, timeout: Duration) -> Result<TcpStream> {
    let addrs = (config.ip_address.as_str(), config.port)
        .to_socket_addrs()
        .map_err(|source| connect_error(config, source))?;

    let mut last_err = None;
    for addr in addrs {
        match TcpStream::connect_timeout(&addr, timeout) {
            Ok(stream) => return Ok(stream),
            Err(err) => {
                debug!(%addr, error = %err, "connect attempt failed");
                last_err = Some(err);
            }
        }
    }
    let source = last_err.unwrap_or_else(|| {
        std::io::Error::new(std::io::ErrorKind::NotFound, "address resolved to nothing")
    });
    error!(ip = %config.ip_address, port = config.port, error = %source, "failed to connect to cycler");
    Err(connect_error(config, source))
}

fn connect_error(config: &CyclerConfig, source: std::io::Error) -> ClientError {
    ClientError::Connect {
        addr: format!("{}:{}", config.ip_address, config.port),
        source,
    }
}
