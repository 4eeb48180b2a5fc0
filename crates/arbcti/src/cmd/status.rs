use arbcti_client::{Credentials, CyclerInterface};
use tracing::debug;

use crate::cmd::StatusArgs;
use crate::exit::{client_error, config_error, CliResult, SUCCESS};
use crate::output::{print_statuses, OutputFormat};

pub fn run(args: StatusArgs, format: OutputFormat) -> CliResult<i32> {
    let config = args.connect.cycler_config()?;
    let credentials = Credentials::from_env().map_err(|err| config_error("credentials", err))?;
    let mut cycler = CyclerInterface::connect(&config, &credentials)
        .map_err(|err| client_error("connect failed", err))?;

    let channels = if args.channels.is_empty() {
        (1..=cycler.num_channels()).collect()
    } else {
        args.channels
    };
    debug!(count = channels.len(), "reading channel status");

    let mut statuses = Vec::with_capacity(channels.len());
    for channel in channels {
        let status = cycler
            .try_read_channel_status(channel)
            .map_err(|err| client_error(&format!("channel {channel}"), err))?;
        statuses.push(status);
    }

    print_statuses(&statuses, format);
    Ok(SUCCESS)
}
