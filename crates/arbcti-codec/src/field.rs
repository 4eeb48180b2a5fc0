//! Static message templates.
//!
//! A [`MessageSpec`] is an immutable table of [`FieldDescriptor`]s that sits
//! after the common [`BASE_HEADER`]. Templates are never mutated; packing
//! composes the header, the table defaults and the caller's overrides per call.

use crate::value::{Fields, Value};

/// Fixed 8-byte marker that starts every message.
pub const HEADER_MAGIC: u64 = 0x11DD_DDDD_DDDD_DDDD;

/// Offset of the little-endian `msg_length` word.
pub const LENGTH_OFFSET: usize = 8;

/// Offset of the little-endian `command_code` word.
pub const COMMAND_CODE_OFFSET: usize = 12;

/// Size of the common header; message-specific fields start here.
pub const HEADER_SIZE: usize = 20;

/// Size of the trailing checksum.
pub const CHECKSUM_SIZE: usize = 2;

/// Text encoding of a fixed-width byte-array field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    Ascii,
    Utf8,
    Utf16Le,
}

impl TextEncoding {
    pub fn name(self) -> &'static str {
        match self {
            TextEncoding::Ascii => "ascii",
            TextEncoding::Utf8 => "utf-8",
            TextEncoding::Utf16Le => "utf-16le",
        }
    }
}

/// Primitive layout of a field. All multi-byte values are little-endian.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireFormat {
    U8,
    I16,
    U16,
    I32,
    U32,
    U64,
    F32,
    F64,
    /// Fixed-width byte array holding encoded text, zero-padded.
    Text { width: usize, encoding: TextEncoding },
}

impl WireFormat {
    /// Number of bytes the field occupies.
    pub const fn width(self) -> usize {
        match self {
            WireFormat::U8 => 1,
            WireFormat::I16 | WireFormat::U16 => 2,
            WireFormat::I32 | WireFormat::U32 | WireFormat::F32 => 4,
            WireFormat::U64 | WireFormat::F64 => 8,
            WireFormat::Text { width, .. } => width,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            WireFormat::U8 => "u8",
            WireFormat::I16 => "i16",
            WireFormat::U16 => "u16",
            WireFormat::I32 => "i32",
            WireFormat::U32 => "u32",
            WireFormat::U64 => "u64",
            WireFormat::F32 => "f32",
            WireFormat::F64 => "f64",
            WireFormat::Text { .. } => "text",
        }
    }

    pub fn is_integer(self) -> bool {
        !matches!(
            self,
            WireFormat::F32 | WireFormat::F64 | WireFormat::Text { .. }
        )
    }
}

/// Default carried by a template field when the caller gives no override.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DefaultValue {
    Int(i64),
    Float(f64),
    Text(&'static str),
}

impl From<DefaultValue> for Value {
    fn from(d: DefaultValue) -> Self {
        match d {
            DefaultValue::Int(v) => Value::Int(v),
            DefaultValue::Float(v) => Value::Float(v),
            DefaultValue::Text(s) => Value::Text(s.to_string()),
        }
    }
}

/// One named field of a message template.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldDescriptor {
    pub name: &'static str,
    pub offset: usize,
    pub format: WireFormat,
    pub default: DefaultValue,
}

impl FieldDescriptor {
    pub const fn new(
        name: &'static str,
        offset: usize,
        format: WireFormat,
        default: DefaultValue,
    ) -> Self {
        Self {
            name,
            offset,
            format,
            default,
        }
    }

    pub const fn int(name: &'static str, offset: usize, format: WireFormat, default: i64) -> Self {
        Self::new(name, offset, format, DefaultValue::Int(default))
    }

    pub const fn f32(name: &'static str, offset: usize, default: f64) -> Self {
        Self::new(name, offset, WireFormat::F32, DefaultValue::Float(default))
    }

    pub const fn f64(name: &'static str, offset: usize, default: f64) -> Self {
        Self::new(name, offset, WireFormat::F64, DefaultValue::Float(default))
    }

    pub const fn text(
        name: &'static str,
        offset: usize,
        width: usize,
        encoding: TextEncoding,
        default: &'static str,
    ) -> Self {
        Self::new(
            name,
            offset,
            WireFormat::Text { width, encoding },
            DefaultValue::Text(default),
        )
    }

    /// Offset one past the last byte of the field.
    pub const fn end(&self) -> usize {
        self.offset + self.format.width()
    }

    /// Whether `value` has a kind this field can be packed from.
    ///
    /// Range and encodability are checked at pack time.
    pub fn accepts(&self, value: &Value) -> bool {
        match self.format {
            WireFormat::Text { .. } => matches!(value, Value::Text(_)),
            WireFormat::F32 | WireFormat::F64 => {
                matches!(value, Value::Float(_) | Value::Int(_) | Value::UInt(_))
            }
            _ => matches!(value, Value::Int(_) | Value::UInt(_)),
        }
    }
}

/// Common header shared by every message.
pub static BASE_HEADER: [FieldDescriptor; 4] = [
    FieldDescriptor::int("header", 0, WireFormat::U64, HEADER_MAGIC as i64),
    FieldDescriptor::int("msg_length", LENGTH_OFFSET, WireFormat::U32, 0),
    FieldDescriptor::int("command_code", COMMAND_CODE_OFFSET, WireFormat::U32, 0),
    FieldDescriptor::int("extended_command_code", 16, WireFormat::U32, 0),
];

/// Template for one message type.
#[derive(Debug)]
pub struct MessageSpec {
    pub name: &'static str,
    /// Total length of the fixed portion, checksum included.
    pub msg_length: usize,
    pub command_code: u32,
    /// Message-specific fields, excluding the base header.
    pub fields: &'static [FieldDescriptor],
}

impl MessageSpec {
    /// Header and message-specific descriptors in layout order.
    pub fn descriptors(&self) -> impl Iterator<Item = &'static FieldDescriptor> + '_ {
        BASE_HEADER.iter().chain(self.fields.iter())
    }

    /// Look up a descriptor by name, header fields included.
    pub fn field(&self, name: &str) -> Option<&'static FieldDescriptor> {
        self.descriptors().find(|d| d.name == name)
    }

    /// Bytes available to fields, i.e. everything before the checksum.
    pub fn body_len(&self) -> usize {
        self.msg_length.saturating_sub(CHECKSUM_SIZE)
    }

    /// Defaults of the message-specific fields.
    pub fn defaults(&self) -> Fields {
        self.fields
            .iter()
            .map(|d| (d.name, Value::from(d.default)))
            .collect()
    }
}
