use std::net::IpAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use arbcti_spoofer::{SpooferConfig, SpooferServer};

use crate::cmd::{parse_duration, SpoofArgs};
use crate::exit::{spoofer_error, CliError, CliResult, INTERNAL, SUCCESS, USAGE};
use crate::output::{print_spoofer_started, OutputFormat};

pub fn run(args: SpoofArgs, format: OutputFormat) -> CliResult<i32> {
    let ip: IpAddr = args
        .host
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid listen address: {}", args.host)))?;
    let config = SpooferConfig {
        ip,
        port: args.port,
        num_channels: args.channels,
        receive_timeout_s: parse_duration(&args.receive_timeout)?.as_secs_f64(),
        ..SpooferConfig::default()
    };

    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(Arc::clone(&running))?;

    let mut server = SpooferServer::bind(&config).map_err(|err| spoofer_error("bind failed", err))?;
    server
        .start()
        .map_err(|err| spoofer_error("start failed", err))?;
    print_spoofer_started(server.local_addr(), server.num_channels(), format);

    while running.load(Ordering::SeqCst) && server.is_running() {
        std::thread::sleep(Duration::from_millis(100));
    }

    server.stop();
    Ok(SUCCESS)
}

fn install_ctrlc_handler(running: Arc<AtomicBool>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .map_err(|err| CliError::new(INTERNAL, format!("signal handler setup failed: {err}")))
}
