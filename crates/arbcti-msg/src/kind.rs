use std::fmt;

use arbcti_codec::{command_code, pack, unpack, Fields, MessageSpec, PackError, UnpackError};
use bytes::BytesMut;
use serde::Serialize;

use crate::channel_info::{self, CHANNEL_INFO_CLIENT, CHANNEL_INFO_SERVER};
use crate::login::{LOGIN_CLIENT, LOGIN_SERVER};
use crate::meta_variable::{SET_META_VARIABLE_CLIENT, SET_META_VARIABLE_SERVER};
use crate::result::{
    ResultTable, ASSIGN_SCHEDULE_RESULTS, CHANNEL_STATUS, JUMP_CHANNEL_RESULTS, LOGIN_RESULTS,
    SET_META_VARIABLE_RESULTS, START_SCHEDULE_RESULTS, STOP_SCHEDULE_RESULTS,
};
use crate::schedule::{
    ASSIGN_SCHEDULE_CLIENT, ASSIGN_SCHEDULE_SERVER, JUMP_CHANNEL_CLIENT, JUMP_CHANNEL_SERVER,
    START_SCHEDULE_CLIENT, START_SCHEDULE_SERVER, STOP_SCHEDULE_CLIENT, STOP_SCHEDULE_SERVER,
};

/// Which side sends a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Request, sent by the controlling client.
    Client,
    /// Response, sent by the cycler.
    Server,
}

/// The closed set of message pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum MessageKind {
    Login,
    ChannelInfo,
    AssignSchedule,
    StartSchedule,
    StopSchedule,
    SetMetaVariable,
    JumpChannel,
}

impl MessageKind {
    pub const ALL: [MessageKind; 7] = [
        MessageKind::Login,
        MessageKind::ChannelInfo,
        MessageKind::AssignSchedule,
        MessageKind::StartSchedule,
        MessageKind::StopSchedule,
        MessageKind::SetMetaVariable,
        MessageKind::JumpChannel,
    ];

    pub fn name(self) -> &'static str {
        match self {
            MessageKind::Login => "Login",
            MessageKind::ChannelInfo => "ChannelInfo",
            MessageKind::AssignSchedule => "AssignSchedule",
            MessageKind::StartSchedule => "StartSchedule",
            MessageKind::StopSchedule => "StopSchedule",
            MessageKind::SetMetaVariable => "SetMetaVariable",
            MessageKind::JumpChannel => "JumpChannel",
        }
    }

    pub fn spec(self, direction: Direction) -> &'static MessageSpec {
        match (self, direction) {
            (MessageKind::Login, Direction::Client) => &LOGIN_CLIENT,
            (MessageKind::Login, Direction::Server) => &LOGIN_SERVER,
            (MessageKind::ChannelInfo, Direction::Client) => &CHANNEL_INFO_CLIENT,
            (MessageKind::ChannelInfo, Direction::Server) => &CHANNEL_INFO_SERVER,
            (MessageKind::AssignSchedule, Direction::Client) => &ASSIGN_SCHEDULE_CLIENT,
            (MessageKind::AssignSchedule, Direction::Server) => &ASSIGN_SCHEDULE_SERVER,
            (MessageKind::StartSchedule, Direction::Client) => &START_SCHEDULE_CLIENT,
            (MessageKind::StartSchedule, Direction::Server) => &START_SCHEDULE_SERVER,
            (MessageKind::StopSchedule, Direction::Client) => &STOP_SCHEDULE_CLIENT,
            (MessageKind::StopSchedule, Direction::Server) => &STOP_SCHEDULE_SERVER,
            (MessageKind::SetMetaVariable, Direction::Client) => &SET_META_VARIABLE_CLIENT,
            (MessageKind::SetMetaVariable, Direction::Server) => &SET_META_VARIABLE_SERVER,
            (MessageKind::JumpChannel, Direction::Client) => &JUMP_CHANNEL_CLIENT,
            (MessageKind::JumpChannel, Direction::Server) => &JUMP_CHANNEL_SERVER,
        }
    }

    pub fn request(self) -> &'static MessageSpec {
        self.spec(Direction::Client)
    }

    pub fn response(self) -> &'static MessageSpec {
        self.spec(Direction::Server)
    }

    /// Table used to turn the response's result (or status) code into text.
    pub fn result_table(self) -> &'static ResultTable {
        match self {
            MessageKind::Login => &LOGIN_RESULTS,
            MessageKind::ChannelInfo => &CHANNEL_STATUS,
            MessageKind::AssignSchedule => &ASSIGN_SCHEDULE_RESULTS,
            MessageKind::StartSchedule => &START_SCHEDULE_RESULTS,
            MessageKind::StopSchedule => &STOP_SCHEDULE_RESULTS,
            MessageKind::SetMetaVariable => &SET_META_VARIABLE_RESULTS,
            MessageKind::JumpChannel => &JUMP_CHANNEL_RESULTS,
        }
    }

    pub fn from_command_code(code: u32) -> Option<(MessageKind, Direction)> {
        Self::ALL.into_iter().find_map(|kind| {
            [Direction::Client, Direction::Server]
                .into_iter()
                .find(|dir| kind.spec(*dir).command_code == code)
                .map(|dir| (kind, dir))
        })
    }

    /// Pack with any message-specific handling.
    pub fn pack(self, direction: Direction, overrides: &Fields) -> Result<BytesMut, PackError> {
        match (self, direction) {
            (MessageKind::ChannelInfo, Direction::Server) => channel_info::pack_server(overrides),
            _ => pack(self.spec(direction), overrides),
        }
    }

    /// Unpack and apply response refinements (result text, status name,
    /// aux series).
    pub fn unpack(self, direction: Direction, bytes: &[u8]) -> Result<Fields, UnpackError> {
        let spec = self.spec(direction);
        match (self, direction) {
            (_, Direction::Client) => unpack(spec, bytes),
            (MessageKind::ChannelInfo, Direction::Server) => channel_info::unpack_server(bytes),
            (_, Direction::Server) => {
                let mut fields = unpack(spec, bytes)?;
                self.result_table().remap(&mut fields, "result", spec.name);
                Ok(fields)
            }
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Identify a message from its command code.
pub fn identify(bytes: &[u8]) -> Option<(MessageKind, Direction)> {
    command_code(bytes).and_then(MessageKind::from_command_code)
}
