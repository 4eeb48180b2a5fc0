//! Generic pack/unpack over [`MessageSpec`] templates.
//!
//! Wire layout:
//! ```text
//! [magic:8][msg_length:4 LE][command_code:4 LE][extended:4 LE][fields...][checksum:2 LE]
//! ```
//! The checksum is the byte sum of everything before it, modulo 65536.

use bytes::{BufMut, BytesMut};
use tracing::{debug, warn};

use crate::error::{PackError, UnpackError};
use crate::field::{
    FieldDescriptor, MessageSpec, WireFormat, CHECKSUM_SIZE, HEADER_MAGIC, HEADER_SIZE,
};
use crate::text;
use crate::value::{Fields, Value};

/// Sum of all bytes, wrapping at 16 bits.
pub fn checksum(bytes: &[u8]) -> u16 {
    bytes
        .iter()
        .fold(0u16, |acc, b| acc.wrapping_add(u16::from(*b)))
}

/// Check the trailing checksum of a complete message.
pub fn verify_checksum(message: &[u8]) -> bool {
    if message.len() < CHECKSUM_SIZE {
        return false;
    }
    let (body, tail) = message.split_at(message.len() - CHECKSUM_SIZE);
    u16::from_le_bytes([tail[0], tail[1]]) == checksum(body)
}

/// Pack a message from its template and caller overrides.
///
/// Unspecified fields take the template default; `msg_length` and
/// `command_code` come from the template unless overridden. Override keys
/// the template does not know are logged and ignored.
pub fn pack(spec: &MessageSpec, overrides: &Fields) -> Result<BytesMut, PackError> {
    pack_with_tail(spec, overrides, &[])
}

/// Like [`pack`], with `tail` placed between the fixed fields and the
/// checksum. The emitted `msg_length` covers the tail.
pub fn pack_with_tail(
    spec: &MessageSpec,
    overrides: &Fields,
    tail: &[u8],
) -> Result<BytesMut, PackError> {
    for key in overrides.keys() {
        if spec.field(key).is_none() {
            warn!(msg = spec.name, field = key, "unknown field in overrides, ignoring");
        }
    }

    let body_len = spec.body_len();
    let msg_length = spec.msg_length + tail.len();
    let mut buf = BytesMut::zeroed(body_len);

    for desc in spec.descriptors() {
        if desc.end() > body_len {
            return Err(PackError::FieldOutOfBounds {
                field: desc.name.to_string(),
                offset: desc.offset,
                width: desc.format.width(),
                body_len,
            });
        }

        let implied;
        let value = match overrides.get(desc.name) {
            Some(v) => v,
            None => {
                implied = implied_value(spec, desc, msg_length);
                &implied
            }
        };
        encode_field(desc, value, &mut buf[desc.offset..desc.end()])?;
    }

    buf.reserve(tail.len() + CHECKSUM_SIZE);
    buf.extend_from_slice(tail);
    let sum = checksum(&buf);
    buf.put_u16_le(sum);

    debug!(msg = spec.name, len = buf.len(), "packed message");
    Ok(buf)
}

fn implied_value(spec: &MessageSpec, desc: &FieldDescriptor, msg_length: usize) -> Value {
    match desc.name {
        "msg_length" => Value::UInt(msg_length as u64),
        "command_code" => Value::UInt(u64::from(spec.command_code)),
        _ => desc.default.into(),
    }
}

fn encode_field(desc: &FieldDescriptor, value: &Value, dst: &mut [u8]) -> Result<(), PackError> {
    match desc.format {
        WireFormat::U8 => dst.copy_from_slice(&integer::<u8>(desc, value)?.to_le_bytes()),
        WireFormat::I16 => dst.copy_from_slice(&integer::<i16>(desc, value)?.to_le_bytes()),
        WireFormat::U16 => dst.copy_from_slice(&integer::<u16>(desc, value)?.to_le_bytes()),
        WireFormat::I32 => dst.copy_from_slice(&integer::<i32>(desc, value)?.to_le_bytes()),
        WireFormat::U32 => dst.copy_from_slice(&integer::<u32>(desc, value)?.to_le_bytes()),
        WireFormat::U64 => dst.copy_from_slice(&integer::<u64>(desc, value)?.to_le_bytes()),
        WireFormat::F32 => {
            let v = float(desc, value)?;
            if v.is_finite() && v.abs() > f64::from(f32::MAX) {
                return Err(PackError::OutOfRange {
                    field: desc.name.to_string(),
                    value: v.to_string(),
                    format: desc.format.name(),
                });
            }
            dst.copy_from_slice(&(v as f32).to_le_bytes());
        }
        WireFormat::F64 => dst.copy_from_slice(&float(desc, value)?.to_le_bytes()),
        WireFormat::Text { width, encoding } => {
            let s = value.as_str().ok_or_else(|| mismatch(desc, value, "text"))?;
            let encoded = text::encode(s, encoding).ok_or_else(|| PackError::Unencodable {
                field: desc.name.to_string(),
                encoding: encoding.name(),
            })?;
            let n = encoded.len().min(width);
            dst[..n].copy_from_slice(&encoded[..n]);
        }
    }
    Ok(())
}

fn integer<T: TryFrom<i128>>(desc: &FieldDescriptor, value: &Value) -> Result<T, PackError> {
    let n = value
        .as_i128()
        .ok_or_else(|| mismatch(desc, value, "integer"))?;
    T::try_from(n).map_err(|_| PackError::OutOfRange {
        field: desc.name.to_string(),
        value: n.to_string(),
        format: desc.format.name(),
    })
}

fn float(desc: &FieldDescriptor, value: &Value) -> Result<f64, PackError> {
    value.as_f64().ok_or_else(|| mismatch(desc, value, "float"))
}

fn mismatch(desc: &FieldDescriptor, value: &Value, expected: &'static str) -> PackError {
    PackError::TypeMismatch {
        field: desc.name.to_string(),
        expected,
        found: value.kind_name(),
    }
}

/// Decode every template field without checking header constants.
pub fn unpack_fields(spec: &MessageSpec, bytes: &[u8]) -> Result<Fields, UnpackError> {
    let mut fields = Fields::new();
    for desc in spec.descriptors() {
        let raw = bytes
            .get(desc.offset..desc.end())
            .ok_or_else(|| UnpackError::Truncated {
                field: desc.name.to_string(),
                needed: desc.end(),
                len: bytes.len(),
            })?;
        fields.insert(desc.name, decode_field(desc, raw)?);
    }
    Ok(fields)
}

/// Decode a message and log any header constant that disagrees with the
/// template. Mismatches never fail the call.
pub fn unpack(spec: &MessageSpec, bytes: &[u8]) -> Result<Fields, UnpackError> {
    let fields = unpack_fields(spec, bytes)?;
    check_header(spec, &fields, spec.msg_length);
    Ok(fields)
}

/// Log mismatches of the magic, command code and length against `spec`.
pub fn check_header(spec: &MessageSpec, fields: &Fields, expected_length: usize) {
    let magic = fields.uint("header");
    if magic != Some(HEADER_MAGIC) {
        warn!(msg = spec.name, ?magic, "decoded header magic does not match");
    }
    let code = fields.uint("command_code");
    if code != Some(u64::from(spec.command_code)) {
        warn!(
            msg = spec.name,
            expected = spec.command_code,
            ?code,
            "decoded command code does not match"
        );
    }
    let len = fields.uint("msg_length");
    if len != Some(expected_length as u64) {
        warn!(
            msg = spec.name,
            expected = expected_length,
            ?len,
            "decoded message length does not match"
        );
    }
}

fn decode_field(desc: &FieldDescriptor, raw: &[u8]) -> Result<Value, UnpackError> {
    let value = match desc.format {
        WireFormat::U8 => Value::UInt(u64::from(raw[0])),
        WireFormat::I16 => Value::Int(i64::from(i16::from_le_bytes(le(raw)))),
        WireFormat::U16 => Value::UInt(u64::from(u16::from_le_bytes(le(raw)))),
        WireFormat::I32 => Value::Int(i64::from(i32::from_le_bytes(le(raw)))),
        WireFormat::U32 => Value::UInt(u64::from(u32::from_le_bytes(le(raw)))),
        WireFormat::U64 => Value::UInt(u64::from_le_bytes(le(raw))),
        WireFormat::F32 => Value::Float(f64::from(f32::from_le_bytes(le(raw)))),
        WireFormat::F64 => Value::Float(f64::from_le_bytes(le(raw))),
        WireFormat::Text { encoding, .. } => {
            Value::Text(
                text::decode(raw, encoding).ok_or_else(|| UnpackError::InvalidText {
                    field: desc.name.to_string(),
                    encoding: encoding.name(),
                })?,
            )
        }
    };
    Ok(value)
}

fn le<const N: usize>(raw: &[u8]) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(&raw[..N]);
    out
}

/// Read the declared `msg_length` from a message prefix.
pub fn declared_length(bytes: &[u8]) -> Option<usize> {
    let word = bytes.get(crate::field::LENGTH_OFFSET..crate::field::LENGTH_OFFSET + 4)?;
    Some(u32::from_le_bytes([word[0], word[1], word[2], word[3]]) as usize)
}

/// Read the `command_code` from a message prefix.
pub fn command_code(bytes: &[u8]) -> Option<u32> {
    let word = bytes
        .get(crate::field::COMMAND_CODE_OFFSET..crate::field::COMMAND_CODE_OFFSET + 4)?;
    Some(u32::from_le_bytes([word[0], word[1], word[2], word[3]]))
}

/// Smallest well-formed message: header plus checksum.
pub const MIN_MESSAGE_LEN: usize = HEADER_SIZE + CHECKSUM_SIZE;
