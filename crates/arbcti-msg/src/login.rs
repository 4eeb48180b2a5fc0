//! Login request/response.

use arbcti_codec::{FieldDescriptor, MessageSpec, TextEncoding, WireFormat};

use TextEncoding::{Ascii, Utf16Le, Utf8};

static CLIENT_FIELDS: [FieldDescriptor; 2] = [
    FieldDescriptor::text("username", 20, 32, Utf8, "not a username"),
    FieldDescriptor::text("password", 52, 32, Utf8, "not a password"),
];

pub static LOGIN_CLIENT: MessageSpec = MessageSpec {
    name: "Login.Client",
    msg_length: 86,
    command_code: 0xEEAB_0001,
    fields: &CLIENT_FIELDS,
};

static SERVER_FIELDS: [FieldDescriptor; 16] = [
    FieldDescriptor::int("result", 20, WireFormat::U32, 1),
    FieldDescriptor::text("ip_address", 24, 4, Utf8, "0000"),
    FieldDescriptor::text("cycler_sn", 28, 16, Ascii, "00000000"),
    FieldDescriptor::text("note", 44, 256, Ascii, "00000000"),
    FieldDescriptor::text("nick_name", 300, 2048, Utf16Le, "our nickname"),
    FieldDescriptor::text("location", 2348, 2048, Utf16Le, "our location"),
    FieldDescriptor::text("emergency_contact", 4396, 2048, Utf16Le, "our location"),
    FieldDescriptor::text("other_comments", 6444, 2048, Utf16Le, "our location"),
    FieldDescriptor::text("email", 8492, 128, Utf16Le, "our location"),
    FieldDescriptor::text("call", 8620, 32, Utf16Le, "our location"),
    FieldDescriptor::int("itac", 8652, WireFormat::U32, 0),
    FieldDescriptor::int("version", 8656, WireFormat::U32, 0),
    FieldDescriptor::int("allow_control", 8660, WireFormat::U32, 0),
    FieldDescriptor::int("num_channels", 8664, WireFormat::U32, 0),
    FieldDescriptor::int("user_type", 8668, WireFormat::U32, 1),
    FieldDescriptor::int("picture_length", 8672, WireFormat::U32, 0),
];

pub static LOGIN_SERVER: MessageSpec = MessageSpec {
    name: "Login.Server",
    msg_length: 8678,
    command_code: 0xEEBA_0001,
    fields: &SERVER_FIELDS,
};
