use arbcti_client::{ChannelConfig, ChannelInterface, Credentials, Result as ClientResult};
use arbcti_msg::CommandFeedback;

use crate::cmd::{AssignArgs, JumpArgs, SetMvArgs, StartArgs, StopArgs};
use crate::exit::{client_error, config_error, CliResult, SUCCESS};
use crate::output::{print_feedback, OutputFormat};

pub fn assign(args: AssignArgs, format: OutputFormat) -> CliResult<i32> {
    let config = args
        .connect
        .channel_config(args.channel)?
        .with_schedule_name(args.schedule);
    run_command("assign", &config, format, ChannelInterface::try_assign_schedule)
}

pub fn start(args: StartArgs, format: OutputFormat) -> CliResult<i32> {
    let config = args
        .connect
        .channel_config(args.channel)?
        .with_schedule_name(args.schedule)
        .with_test_name(args.test_name);
    run_command("start", &config, format, ChannelInterface::try_start_test)
}

pub fn stop(args: StopArgs, format: OutputFormat) -> CliResult<i32> {
    let config = args.connect.channel_config(args.channel)?;
    run_command("stop", &config, format, ChannelInterface::try_stop_test)
}

pub fn set_mv(args: SetMvArgs, format: OutputFormat) -> CliResult<i32> {
    let config = args.connect.channel_config(args.channel)?;
    run_command("set-mv", &config, format, |channel| {
        channel.try_set_meta_variable(args.mv, args.value)
    })
}

pub fn jump(args: JumpArgs, format: OutputFormat) -> CliResult<i32> {
    let config = args.connect.channel_config(args.channel)?;
    run_command("jump", &config, format, |channel| channel.try_jump_to_step(args.step))
}

fn run_command<F>(
    operation: &str,
    config: &ChannelConfig,
    format: OutputFormat,
    command: F,
) -> CliResult<i32>
where
    F: FnOnce(&mut ChannelInterface) -> ClientResult<CommandFeedback>,
{
    let credentials = Credentials::from_env().map_err(|err| config_error("credentials", err))?;
    let mut channel = ChannelInterface::connect(config, &credentials)
        .map_err(|err| client_error("connect failed", err))?;
    let feedback =
        command(&mut channel).map_err(|err| client_error(&format!("{operation} failed"), err))?;
    print_feedback(operation, &feedback, format);
    Ok(SUCCESS)
}
