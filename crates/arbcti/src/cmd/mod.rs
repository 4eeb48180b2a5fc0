use std::path::PathBuf;
use std::time::Duration;

use arbcti_client::{ChannelConfig, CyclerConfig, DEFAULT_MSG_BUFFER_SIZE};
use clap::{Args, Subcommand};

use crate::exit::{config_error, CliError, CliResult, USAGE};
use crate::output::OutputFormat;

pub mod control;
pub mod spoof;
pub mod status;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the reference cycler server until Ctrl-C.
    Spoof(SpoofArgs),
    /// Read the status of one or more channels.
    Status(StatusArgs),
    /// Assign a schedule to a channel.
    Assign(AssignArgs),
    /// Assign a schedule and start a test on a channel.
    Start(StartArgs),
    /// Stop the test running on a channel.
    Stop(StopArgs),
    /// Set a user meta variable on a running channel.
    SetMv(SetMvArgs),
    /// Jump a running channel to another step.
    Jump(JumpArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Spoof(args) => spoof::run(args, format),
        Command::Status(args) => status::run(args, format),
        Command::Assign(args) => control::assign(args, format),
        Command::Start(args) => control::start(args, format),
        Command::Stop(args) => control::stop(args, format),
        Command::SetMv(args) => control::set_mv(args, format),
        Command::Jump(args) => control::jump(args, format),
        Command::Version(args) => version::run(args),
    }
}

/// Where and how to reach the cycler.
#[derive(Args, Debug, Clone)]
pub struct ConnectArgs {
    /// Cycler host address.
    #[arg(long, env = "ARBIN_CTI_HOST", default_value = "127.0.0.1")]
    pub host: String,
    /// Cycler CTI port.
    #[arg(long, env = "ARBIN_CTI_PORT", default_value_t = arbcti_spoofer::DEFAULT_PORT)]
    pub port: u16,
    /// TCP timeout (e.g. 3s, 500ms).
    #[arg(long, default_value = "3s")]
    pub timeout: String,
    /// Read connection settings from a TOML file instead of the flags above.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

impl ConnectArgs {
    pub fn cycler_config(&self) -> CliResult<CyclerConfig> {
        if let Some(path) = &self.config {
            return CyclerConfig::load(path).map_err(|err| config_error("config", err));
        }
        Ok(CyclerConfig {
            ip_address: self.host.clone(),
            port: self.port,
            timeout_s: parse_duration(&self.timeout)?.as_secs_f64(),
            msg_buffer_size: DEFAULT_MSG_BUFFER_SIZE,
        })
    }

    pub fn channel_config(&self, channel: u32) -> CliResult<ChannelConfig> {
        Ok(ChannelConfig::new(channel, self.cycler_config()?))
    }
}

#[derive(Args, Debug)]
pub struct SpoofArgs {
    /// Address to listen on.
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,
    /// Port to listen on. 0 picks a free port.
    #[arg(long, default_value_t = arbcti_spoofer::DEFAULT_PORT)]
    pub port: u16,
    /// Number of channels the fake cycler reports.
    #[arg(long, default_value_t = arbcti_spoofer::DEFAULT_NUM_CHANNELS)]
    pub channels: usize,
    /// Per-connection receive timeout (e.g. 500ms).
    #[arg(long, default_value = "500ms")]
    pub receive_timeout: String,
}

#[derive(Args, Debug)]
pub struct StatusArgs {
    #[command(flatten)]
    pub connect: ConnectArgs,
    /// Channel numbers (1-based). Default: every channel.
    #[arg(value_delimiter = ',')]
    pub channels: Vec<u32>,
}

#[derive(Args, Debug)]
pub struct AssignArgs {
    #[command(flatten)]
    pub connect: ConnectArgs,
    /// Channel number (1-based).
    pub channel: u32,
    /// Schedule file name.
    #[arg(long)]
    pub schedule: String,
}

#[derive(Args, Debug)]
pub struct StartArgs {
    #[command(flatten)]
    pub connect: ConnectArgs,
    /// Channel number (1-based).
    pub channel: u32,
    /// Schedule file name, assigned before starting.
    #[arg(long)]
    pub schedule: String,
    /// Test name.
    #[arg(long)]
    pub test_name: String,
}

#[derive(Args, Debug)]
pub struct StopArgs {
    #[command(flatten)]
    pub connect: ConnectArgs,
    /// Channel number (1-based).
    pub channel: u32,
}

#[derive(Args, Debug)]
pub struct SetMvArgs {
    #[command(flatten)]
    pub connect: ConnectArgs,
    /// Channel number (1-based).
    pub channel: u32,
    /// Meta variable number.
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=16))]
    pub mv: u8,
    /// Value to set.
    #[arg(long, allow_negative_numbers = true)]
    pub value: f32,
}

#[derive(Args, Debug)]
pub struct JumpArgs {
    #[command(flatten)]
    pub connect: ConnectArgs,
    /// Channel number (1-based).
    pub channel: u32,
    /// Step number to jump to.
    #[arg(long)]
    pub step: u32,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show build details.
    #[arg(long)]
    pub extended: bool,
}

/// Parse `5s`, `500ms` or a bare number of seconds.
pub fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, millis) = if let Some(num) = input.strip_suffix("ms") {
        (num, true)
    } else if let Some(num) = input.strip_suffix('s') {
        (num, false)
    } else {
        (input, false)
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration: {input}")))?;
    if value == 0 {
        return Err(CliError::new(USAGE, "duration must be greater than zero"));
    }

    Ok(if millis {
        Duration::from_millis(value)
    } else {
        Duration::from_secs(value)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_duration_seconds() {
        assert_eq!(parse_duration("5s").unwrap(), Duration::from_secs(5));
        assert_eq!(parse_duration("2").unwrap(), Duration::from_secs(2));
    }

    #[test]
    fn parse_duration_millis() {
        assert_eq!(parse_duration("150ms").unwrap(), Duration::from_millis(150));
    }

    #[test]
    fn parse_duration_invalid() {
        assert!(parse_duration("0s").is_err());
        assert!(parse_duration("bad").is_err());
        assert!(parse_duration("").is_err());
    }

    #[test]
    fn connect_args_build_cycler_config() {
        let args = ConnectArgs {
            host: "10.1.2.3".to_string(),
            port: 9100,
            timeout: "1500ms".to_string(),
            config: None,
        };
        let config = args.channel_config(2).unwrap();
        assert_eq!(config.channel, 2);
        assert_eq!(config.cycler.ip_address, "10.1.2.3");
        assert_eq!(config.cycler.port, 9100);
        assert_eq!(config.cycler.timeout_s, 1.5);
    }
}
