//! Message catalog for the CTI cycler protocol.
//!
//! Each [`MessageKind`] is a request/response pair of static templates.
//! Responses decode their result or status code into text through the
//! tables in [`result`]; the channel status response also carries aux
//! reading series.

pub mod channel_info;
pub mod error;
pub mod kind;
pub mod login;
pub mod meta_variable;
pub mod result;
pub mod schedule;
pub mod view;

pub use channel_info::{
    is_aux_series, is_record_field, pack_server as pack_channel_info, parse_aux,
    unpack_server as unpack_channel_info, AuxCategory, AUX_CATEGORIES, AUX_SAMPLE_SIZE, AUX_START,
    CHANNEL_INFO_CLIENT, CHANNEL_INFO_SERVER,
};
pub use error::{MsgError, Result};
pub use kind::{identify, Direction, MessageKind};
pub use login::{LOGIN_CLIENT, LOGIN_SERVER};
pub use meta_variable::{
    meta_code, META_VARIABLE_COUNT, SET_META_VARIABLE_CLIENT, SET_META_VARIABLE_SERVER,
};
pub use result::{ResultTable, UNKNOWN_RESULT};
pub use schedule::{
    ASSIGN_SCHEDULE_CLIENT, ASSIGN_SCHEDULE_SERVER, JUMP_CHANNEL_CLIENT, JUMP_CHANNEL_SERVER,
    START_SCHEDULE_CLIENT, START_SCHEDULE_SERVER, STOP_SCHEDULE_CLIENT, STOP_SCHEDULE_SERVER,
};
pub use view::{ChannelStatus, CommandFeedback, LoginFeedback};
