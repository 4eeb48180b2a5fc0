//! Meta-variable writes.

use arbcti_codec::{FieldDescriptor, MessageSpec, TextEncoding, WireFormat};

use crate::schedule::{FEEDBACK_FIELDS, FEEDBACK_LENGTH};

static CLIENT_FIELDS: [FieldDescriptor; 7] = [
    FieldDescriptor::int("channel", 20, WireFormat::U32, 0),
    // CTI only allows type 1.
    FieldDescriptor::int("mv_type", 24, WireFormat::I32, 1),
    FieldDescriptor::int("mv_meta_code", 28, WireFormat::I32, 52),
    FieldDescriptor::text("reserved_1", 32, 16, TextEncoding::Utf8, ""),
    // 1 = float
    FieldDescriptor::int("mv_value_type", 48, WireFormat::I32, 1),
    FieldDescriptor::f32("mv_data", 52, 1.0),
    FieldDescriptor::text("reserved_2", 56, 16, TextEncoding::Utf8, ""),
];

pub static SET_META_VARIABLE_CLIENT: MessageSpec = MessageSpec {
    name: "SetMetaVariable.Client",
    msg_length: 74,
    command_code: 0xBB15_0001,
    fields: &CLIENT_FIELDS,
};

pub static SET_META_VARIABLE_SERVER: MessageSpec = MessageSpec {
    name: "SetMetaVariable.Server",
    msg_length: FEEDBACK_LENGTH,
    command_code: 0xBB51_0001,
    fields: &FEEDBACK_FIELDS,
};

/// Number of user meta variables (MV_UD1..MV_UD16).
pub const META_VARIABLE_COUNT: u8 = 16;

/// Meta code for user meta variable `mv_num` (1-based).
pub fn meta_code(mv_num: u8) -> Option<i32> {
    match mv_num {
        1..=4 => Some(51 + i32::from(mv_num)),
        5..=16 => Some(100 + i32::from(mv_num)),
        _ => None,
    }
}
