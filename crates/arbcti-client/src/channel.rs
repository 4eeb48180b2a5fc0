use arbcti_codec::Fields;
use arbcti_msg::{meta_code, ChannelStatus, CommandFeedback, MessageKind, META_VARIABLE_COUNT};
use tracing::{debug, error, info};

use crate::config::{ChannelConfig, ConfigError, Credentials};
use crate::cycler::CyclerInterface;
use crate::error::{ClientError, Result};

/// Channel-level control over one cycler channel.
///
/// Every operation returns `bool` (or `Option`) and logs the reason for a
/// failure. Use the `try_` forms to get the error instead.
#[derive(Debug)]
pub struct ChannelInterface {
    cycler: CyclerInterface,
    config: ChannelConfig,
    wire_channel: i32,
}

impl ChannelInterface {
    /// Connect, log in and check the configured channel exists.
    pub fn connect(config: &ChannelConfig, credentials: &Credentials) -> Result<Self> {
        config.validate()?;
        let cycler = CyclerInterface::connect(&config.cycler, credentials)?;
        let wire_channel = cycler.wire_channel(config.channel)?;
        Ok(Self {
            cycler,
            config: config.clone(),
            wire_channel,
        })
    }

    /// 1-based channel number.
    pub fn channel(&self) -> u32 {
        self.config.channel
    }

    pub fn config(&self) -> &ChannelConfig {
        &self.config
    }

    pub fn cycler(&self) -> &CyclerInterface {
        &self.cycler
    }

    pub fn cycler_mut(&mut self) -> &mut CyclerInterface {
        &mut self.cycler
    }

    pub fn read_channel_status(&mut self) -> Option<ChannelStatus> {
        self.cycler.read_channel_status(self.config.channel)
    }

    /// Assign the configured schedule to the channel.
    pub fn assign_schedule(&mut self) -> bool {
        report("assign schedule", self.channel(), self.try_assign_schedule())
    }

    pub fn try_assign_schedule(&mut self) -> Result<CommandFeedback> {
        let schedule = required(self.config.schedule_name.as_deref(), "schedule_name")?.to_string();
        let overrides = self.request().with("schedule", schedule.as_str());
        let feedback = self.command(MessageKind::AssignSchedule, overrides)?;
        info!(channel = self.channel(), %schedule, "schedule assigned");
        Ok(feedback)
    }

    /// Assign the configured schedule, then start the configured test.
    pub fn start_test(&mut self) -> bool {
        report("start test", self.channel(), self.try_start_test())
    }

    pub fn try_start_test(&mut self) -> Result<CommandFeedback> {
        let test_name = required(self.config.test_name.as_deref(), "test_name")?.to_string();
        self.try_assign_schedule()?;
        let overrides = self.request().with("test_name", test_name.as_str());
        let feedback = self.command(MessageKind::StartSchedule, overrides)?;
        info!(channel = self.channel(), %test_name, "test started");
        Ok(feedback)
    }

    /// Stop the test on the channel.
    pub fn stop_test(&mut self) -> bool {
        report("stop test", self.channel(), self.try_stop_test())
    }

    pub fn try_stop_test(&mut self) -> Result<CommandFeedback> {
        let feedback = self.command(MessageKind::StopSchedule, self.request())?;
        info!(channel = self.channel(), "test stopped");
        Ok(feedback)
    }

    /// Set user meta variable `mv_num` (1..=16) to `value`. The test must be
    /// running.
    pub fn set_meta_variable(&mut self, mv_num: u8, value: f32) -> bool {
        report(
            "set meta variable",
            self.channel(),
            self.try_set_meta_variable(mv_num, value),
        )
    }

    pub fn try_set_meta_variable(&mut self, mv_num: u8, value: f32) -> Result<CommandFeedback> {
        let code = meta_code(mv_num).ok_or_else(|| {
            ClientError::Config(ConfigError::Invalid {
                key: "mv_num",
                reason: format!("expected 1..={META_VARIABLE_COUNT}, got {mv_num}"),
            })
        })?;
        let overrides = self
            .request()
            .with("mv_meta_code", code)
            .with("mv_data", value);
        let feedback = self.command(MessageKind::SetMetaVariable, overrides)?;
        info!(channel = self.channel(), mv_num, value, "meta variable set");
        Ok(feedback)
    }

    /// Jump the running test to `step` (1-based step number).
    pub fn jump_to_step(&mut self, step: u32) -> bool {
        report("jump to step", self.channel(), self.try_jump_to_step(step))
    }

    pub fn try_jump_to_step(&mut self, step: u32) -> Result<CommandFeedback> {
        let overrides = self.request().with("step_num", step);
        let feedback = self.command(MessageKind::JumpChannel, overrides)?;
        info!(channel = self.channel(), step, "jumped to step");
        Ok(feedback)
    }

    fn request(&self) -> Fields {
        Fields::new().with("channel", self.wire_channel)
    }

    /// Send a command and require a `success` result.
    fn command(&mut self, kind: MessageKind, overrides: Fields) -> Result<CommandFeedback> {
        let fields = self.cycler.transact(kind, &overrides)?;
        let feedback = CommandFeedback::from_fields(&fields)?;
        debug!(%kind, ?feedback, "feedback");
        if feedback.is_success() {
            Ok(feedback)
        } else {
            Err(ClientError::Rejected {
                kind,
                result: feedback.result,
            })
        }
    }
}

fn required<'a>(value: Option<&'a str>, key: &'static str) -> Result<&'a str> {
    value
        .filter(|v| !v.is_empty())
        .ok_or(ClientError::Config(ConfigError::MissingKey(key)))
}

fn report(operation: &str, channel: u32, outcome: Result<CommandFeedback>) -> bool {
    match outcome {
        Ok(_) => true,
        Err(err) => {
            error!(operation, channel, error = %err, "channel command failed");
            false
        }
    }
}
