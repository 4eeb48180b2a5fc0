//! Schedule control: assign, start, stop and jump-to-step.
//!
//! All responses share one 128-byte feedback layout: channel, a one-byte
//! result code and reserved padding.

use arbcti_codec::{FieldDescriptor, MessageSpec, TextEncoding, WireFormat};

use TextEncoding::{Utf16Le, Utf8};
use WireFormat::{I32, U16, U32, U8};

/// Feedback layout with an unsigned channel.
pub(crate) static FEEDBACK_FIELDS: [FieldDescriptor; 3] = [
    FieldDescriptor::int("channel", 20, U32, 0),
    FieldDescriptor::int("result", 24, U8, 0),
    FieldDescriptor::text("reserved", 25, 101, Utf8, ""),
];

static ASSIGN_FEEDBACK_FIELDS: [FieldDescriptor; 3] = [
    FieldDescriptor::int("channel", 20, I32, 0),
    FieldDescriptor::int("result", 24, U8, 0),
    FieldDescriptor::text("reserved", 25, 101, Utf8, ""),
];

pub(crate) const FEEDBACK_LENGTH: usize = 128;

static ASSIGN_FIELDS: [FieldDescriptor; 22] = [
    FieldDescriptor::int("channel", 20, I32, 0),
    FieldDescriptor::text("assign_all_channels", 24, 1, Utf8, ""),
    FieldDescriptor::text("schedule", 25, 400, Utf16Le, "fake_schedule"),
    FieldDescriptor::f32("test_capacity_ah", 425, 1.0),
    FieldDescriptor::text("barcode", 429, 144, Utf16Le, ""),
    FieldDescriptor::f32("user_variable_1", 573, 1.0),
    FieldDescriptor::f32("user_variable_2", 577, 1.0),
    FieldDescriptor::f32("user_variable_3", 581, 1.0),
    FieldDescriptor::f32("user_variable_4", 585, 1.0),
    FieldDescriptor::f32("user_variable_5", 589, 1.0),
    FieldDescriptor::f32("user_variable_6", 593, 1.0),
    FieldDescriptor::f32("user_variable_7", 597, 1.0),
    FieldDescriptor::f32("user_variable_8", 601, 1.0),
    FieldDescriptor::f32("user_variable_9", 605, 1.0),
    FieldDescriptor::f32("user_variable_10", 609, 1.0),
    FieldDescriptor::f32("user_variable_11", 613, 1.0),
    FieldDescriptor::f32("user_variable_12", 617, 1.0),
    FieldDescriptor::f32("user_variable_13", 621, 1.0),
    FieldDescriptor::f32("user_variable_14", 625, 1.0),
    FieldDescriptor::f32("user_variable_15", 629, 1.0),
    FieldDescriptor::f32("user_variable_16", 633, 1.0),
    FieldDescriptor::text("reserved", 637, 32, Utf8, ""),
];

pub static ASSIGN_SCHEDULE_CLIENT: MessageSpec = MessageSpec {
    name: "AssignSchedule.Client",
    msg_length: 671,
    command_code: 0xBB21_0001,
    fields: &ASSIGN_FIELDS,
};

pub static ASSIGN_SCHEDULE_SERVER: MessageSpec = MessageSpec {
    name: "AssignSchedule.Server",
    msg_length: FEEDBACK_LENGTH,
    command_code: 0xBB12_0001,
    fields: &ASSIGN_FEEDBACK_FIELDS,
};

static START_FIELDS: [FieldDescriptor; 3] = [
    FieldDescriptor::text("test_name", 20, 144, Utf16Le, "arbcti test"),
    FieldDescriptor::int("num_channels_to_start", 164, U32, 1),
    FieldDescriptor::int("channel", 168, U16, 0),
];

pub static START_SCHEDULE_CLIENT: MessageSpec = MessageSpec {
    name: "StartSchedule.Client",
    msg_length: 172,
    command_code: 0xBB32_0004,
    fields: &START_FIELDS,
};

pub static START_SCHEDULE_SERVER: MessageSpec = MessageSpec {
    name: "StartSchedule.Server",
    msg_length: FEEDBACK_LENGTH,
    command_code: 0xBB23_0004,
    fields: &FEEDBACK_FIELDS,
};

static STOP_FIELDS: [FieldDescriptor; 3] = [
    FieldDescriptor::int("channel", 20, U32, 0),
    // Non-empty stops every channel.
    FieldDescriptor::text("stop_all_channels", 24, 1, Utf8, ""),
    FieldDescriptor::text("reserved", 25, 101, Utf8, ""),
];

pub static STOP_SCHEDULE_CLIENT: MessageSpec = MessageSpec {
    name: "StopSchedule.Client",
    msg_length: 128,
    command_code: 0xBB31_0001,
    fields: &STOP_FIELDS,
};

pub static STOP_SCHEDULE_SERVER: MessageSpec = MessageSpec {
    name: "StopSchedule.Server",
    msg_length: FEEDBACK_LENGTH,
    command_code: 0xBB13_0001,
    fields: &FEEDBACK_FIELDS,
};

// Only the request code is confirmed for jump-to-step; the layouts and the
// response code mirror StartSchedule.
static JUMP_FIELDS: [FieldDescriptor; 3] = [
    FieldDescriptor::int("step_num", 20, U32, 1),
    FieldDescriptor::int("channel", 24, U32, 0),
    FieldDescriptor::text("reserved", 28, 98, Utf8, ""),
];

pub static JUMP_CHANNEL_CLIENT: MessageSpec = MessageSpec {
    name: "JumpChannel.Client",
    msg_length: 128,
    command_code: 0xBB32_0005,
    fields: &JUMP_FIELDS,
};

pub static JUMP_CHANNEL_SERVER: MessageSpec = MessageSpec {
    name: "JumpChannel.Server",
    msg_length: FEEDBACK_LENGTH,
    command_code: 0xBB23_0005,
    fields: &FEEDBACK_FIELDS,
};

#[cfg(test)]
mod tests {
    use super::*;
    use arbcti_codec::{pack, unpack, Fields};

    #[test]
    fn assign_carries_schedule_and_user_variables() {
        let overrides = Fields::new()
            .with("channel", 3)
            .with("schedule", "cc_cv_4v2.sdx")
            .with("user_variable_16", 0.25f32);
        let msg = pack(&ASSIGN_SCHEDULE_CLIENT, &overrides).unwrap();
        assert_eq!(msg.len(), 671);

        let fields = unpack(&ASSIGN_SCHEDULE_CLIENT, &msg).unwrap();
        assert_eq!(fields.int("channel"), Some(3));
        assert_eq!(fields.text("schedule"), Some("cc_cv_4v2.sdx"));
        assert_eq!(fields.float("user_variable_1"), Some(1.0));
        assert_eq!(fields.float("user_variable_16"), Some(0.25));
        assert_eq!(fields.text("assign_all_channels"), Some(""));
    }

    #[test]
    fn assign_feedback_accepts_negative_channel() {
        let msg = pack(&ASSIGN_SCHEDULE_SERVER, &Fields::new().with("channel", -1)).unwrap();
        let fields = unpack(&ASSIGN_SCHEDULE_SERVER, &msg).unwrap();
        assert_eq!(fields.int("channel"), Some(-1));
    }

    #[test]
    fn start_layout() {
        let overrides = Fields::new()
            .with("test_name", "cycle-life-07")
            .with("channel", 11u16);
        let msg = pack(&START_SCHEDULE_CLIENT, &overrides).unwrap();
        assert_eq!(msg.len(), 172);
        assert_eq!(&msg[168..170], &11u16.to_le_bytes());
        assert_eq!(&msg[164..168], &1u32.to_le_bytes());
    }

    #[test]
    fn every_template_fits_its_length() {
        for spec in [
            &ASSIGN_SCHEDULE_CLIENT,
            &ASSIGN_SCHEDULE_SERVER,
            &START_SCHEDULE_CLIENT,
            &START_SCHEDULE_SERVER,
            &STOP_SCHEDULE_CLIENT,
            &STOP_SCHEDULE_SERVER,
            &JUMP_CHANNEL_CLIENT,
            &JUMP_CHANNEL_SERVER,
        ] {
            let msg = pack(spec, &Fields::new()).unwrap();
            assert_eq!(msg.len(), spec.msg_length, "{}", spec.name);
        }
    }
}
