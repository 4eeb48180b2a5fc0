//! Channel status request/response, including auxiliary reading series.
//!
//! The response has a 1779-byte fixed part. Aux readings follow it as
//! `(value: f32, dt: f32)` pairs grouped by category in [`AUX_CATEGORIES`]
//! order; each category contributes `count` pairs and empty categories
//! contribute nothing.

use arbcti_codec::{
    check_header, pack_with_tail, unpack_fields, FieldDescriptor, Fields, MessageSpec, PackError,
    TextEncoding, UnpackError, Value, WireFormat,
};
use bytes::BytesMut;

use crate::result::CHANNEL_STATUS;

use TextEncoding::{Utf16Le, Utf8};
use WireFormat::{I16, U16, U32, U8};

static CLIENT_FIELDS: [FieldDescriptor; 4] = [
    FieldDescriptor::int("channel", 20, I16, 0),
    FieldDescriptor::int("channel_selection", 22, I16, 1),
    FieldDescriptor::int("aux_options", 24, U32, 0),
    FieldDescriptor::text("reserved", 28, 32, Utf8, ""),
];

pub static CHANNEL_INFO_CLIENT: MessageSpec = MessageSpec {
    name: "ChannelInfo.Client",
    msg_length: 62,
    command_code: 0xEEAB_0003,
    fields: &CLIENT_FIELDS,
};

static SERVER_FIELDS: [FieldDescriptor; 40] = [
    FieldDescriptor::int("number_of_channels", 20, U32, 1),
    FieldDescriptor::int("channel", 24, U32, 0),
    FieldDescriptor::int("status", 28, I16, 0),
    FieldDescriptor::int("comm_failure", 30, U8, 0),
    FieldDescriptor::text("schedule", 31, 400, Utf16Le, "fake_schedule"),
    FieldDescriptor::text("testname", 431, 144, Utf16Le, "fake_testname"),
    FieldDescriptor::text("exit_condition", 575, 100, Utf8, "none"),
    FieldDescriptor::text("step_and_cycle_format", 675, 64, Utf8, "none"),
    FieldDescriptor::text("barcode", 739, 144, Utf16Le, "none"),
    FieldDescriptor::text("can_config_name", 883, 400, Utf16Le, "none"),
    FieldDescriptor::text("smb_config_name", 1283, 400, Utf16Le, "none"),
    FieldDescriptor::int("master_channel", 1683, U16, 0),
    FieldDescriptor::f64("test_time_s", 1685, 0.0),
    FieldDescriptor::f64("step_time_s", 1693, 0.0),
    FieldDescriptor::f32("voltage_v", 1701, 0.0),
    FieldDescriptor::f32("current_a", 1705, 0.0),
    FieldDescriptor::f32("power_w", 1709, 0.0),
    FieldDescriptor::f32("charge_capacity_ah", 1713, 0.0),
    FieldDescriptor::f32("discharge_capacity_ah", 1717, 0.0),
    FieldDescriptor::f32("charge_energy_wh", 1721, 0.0),
    FieldDescriptor::f32("discharge_energy_wh", 1725, 0.0),
    FieldDescriptor::f32("internal_resistance_ohm", 1729, 0.0),
    FieldDescriptor::f32("dvdt_vbys", 1733, 0.0),
    FieldDescriptor::f32("acr_ohm", 1737, 0.0),
    FieldDescriptor::f32("aci_ohm", 1741, 0.0),
    FieldDescriptor::f32("aci_phase_degrees", 1745, 0.0),
    FieldDescriptor::int("aux_voltage_count", 1749, U16, 0),
    FieldDescriptor::int("aux_temperature_count", 1751, U16, 0),
    FieldDescriptor::int("aux_pressure_count", 1753, U16, 0),
    FieldDescriptor::int("aux_external_count", 1755, U16, 0),
    FieldDescriptor::int("aux_flow_count", 1757, U16, 0),
    FieldDescriptor::int("aux_ao_count", 1759, U16, 0),
    FieldDescriptor::int("aux_di_count", 1761, U16, 0),
    FieldDescriptor::int("aux_do_count", 1763, U16, 0),
    FieldDescriptor::int("aux_humidity_count", 1765, U16, 0),
    FieldDescriptor::int("aux_safety_count", 1767, U16, 0),
    FieldDescriptor::int("aux_ph_count", 1769, U16, 0),
    FieldDescriptor::int("aux_density_count", 1771, U16, 0),
    FieldDescriptor::int("bms_count", 1773, U16, 0),
    FieldDescriptor::int("smb_count", 1775, U16, 0),
];

pub static CHANNEL_INFO_SERVER: MessageSpec = MessageSpec {
    name: "ChannelInfo.Server",
    msg_length: 1779,
    command_code: 0xEEBA_0003,
    fields: &SERVER_FIELDS,
};

/// Offset of the first aux sample in a single-channel response.
pub const AUX_START: usize = 1777;

/// Bytes per aux sample: value then dt, both f32.
pub const AUX_SAMPLE_SIZE: usize = 8;

/// Field names for one aux category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuxCategory {
    pub count: &'static str,
    pub values: &'static str,
    pub dt: &'static str,
}

impl AuxCategory {
    const fn new(count: &'static str, values: &'static str, dt: &'static str) -> Self {
        Self { count, values, dt }
    }
}

/// Aux categories in wire order.
pub static AUX_CATEGORIES: [AuxCategory; 12] = [
    AuxCategory::new("aux_voltage_count", "aux_voltage", "aux_voltage_dt"),
    AuxCategory::new("aux_temperature_count", "aux_temperature", "aux_temperature_dt"),
    AuxCategory::new("aux_pressure_count", "aux_pressure", "aux_pressure_dt"),
    AuxCategory::new("aux_external_count", "aux_external", "aux_external_dt"),
    AuxCategory::new("aux_flow_count", "aux_flow", "aux_flow_dt"),
    AuxCategory::new("aux_ao_count", "aux_ao", "aux_ao_dt"),
    AuxCategory::new("aux_di_count", "aux_di", "aux_di_dt"),
    AuxCategory::new("aux_do_count", "aux_do", "aux_do_dt"),
    AuxCategory::new("aux_humidity_count", "aux_humidity", "aux_humidity_dt"),
    AuxCategory::new("aux_safety_count", "aux_safety", "aux_safety_dt"),
    AuxCategory::new("aux_ph_count", "aux_ph", "aux_ph_dt"),
    AuxCategory::new("aux_density_count", "aux_density", "aux_density_dt"),
];

/// Whether `name` is an aux value or dt series.
pub fn is_aux_series(name: &str) -> bool {
    AUX_CATEGORIES
        .iter()
        .any(|c| c.values == name || c.dt == name)
}

/// Whether `name` may appear in a channel status record. Header fields
/// are excluded.
pub fn is_record_field(name: &str) -> bool {
    CHANNEL_INFO_SERVER.fields.iter().any(|d| d.name == name) || is_aux_series(name)
}

/// Read aux series out of `bytes` using the counts already in `fields`.
///
/// Every category gets a value and dt series, empty when its count is zero.
/// The cursor starts at `start` and only advances over populated categories.
pub fn parse_aux(fields: &mut Fields, bytes: &[u8], start: usize) -> Result<(), UnpackError> {
    let mut cursor = start;
    for cat in &AUX_CATEGORIES {
        let count = fields.uint(cat.count).unwrap_or(0) as usize;
        let mut values = Vec::with_capacity(count);
        let mut dts = Vec::with_capacity(count);
        for _ in 0..count {
            let end = cursor + AUX_SAMPLE_SIZE;
            let raw = bytes
                .get(cursor..end)
                .ok_or_else(|| UnpackError::Truncated {
                    field: cat.values.to_string(),
                    needed: end,
                    len: bytes.len(),
                })?;
            values.push(f32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]));
            dts.push(f32::from_le_bytes([raw[4], raw[5], raw[6], raw[7]]));
            cursor = end;
        }
        fields.insert(cat.values, values);
        fields.insert(cat.dt, dts);
    }
    Ok(())
}

/// Pack a channel status response.
///
/// Accepts every template field plus the aux series fields; each supplied
/// series sets its count field and is appended after the fixed part. A
/// missing dt series is sent as zeros. `status` may be given as a status
/// name instead of a code.
pub fn pack_server(overrides: &Fields) -> Result<BytesMut, PackError> {
    let mut fixed: Fields = overrides
        .iter()
        .filter(|(name, _)| !is_aux_series(name))
        .map(|(name, value)| (name, value.clone()))
        .collect();

    let status_code = match fixed.get("status") {
        Some(Value::Text(name)) => Some(CHANNEL_STATUS.code_of(name).ok_or_else(|| {
            PackError::Invalid {
                field: "status".to_string(),
                reason: format!("unknown channel status {name:?}"),
            }
        })?),
        _ => None,
    };
    if let Some(code) = status_code {
        fixed.insert("status", code);
    }

    let mut tail = Vec::new();
    for cat in &AUX_CATEGORIES {
        let values = series(overrides, cat.values)?;
        let dts = series(overrides, cat.dt)?;

        let values = match (values, dts) {
            (None, None) => {
                let count = fixed.get(cat.count).and_then(Value::as_i128).unwrap_or(0);
                if count != 0 {
                    return Err(PackError::Invalid {
                        field: cat.count.to_string(),
                        reason: format!("count {count} given without {} readings", cat.values),
                    });
                }
                continue;
            }
            (None, Some(_)) => {
                return Err(PackError::Invalid {
                    field: cat.dt.to_string(),
                    reason: format!("dt series given without {}", cat.values),
                });
            }
            (Some(values), dts) => {
                if let Some(dts) = dts {
                    if dts.len() != values.len() {
                        return Err(PackError::Invalid {
                            field: cat.dt.to_string(),
                            reason: format!(
                                "{} samples but {} has {}",
                                dts.len(),
                                cat.values,
                                values.len()
                            ),
                        });
                    }
                }
                for (i, v) in values.iter().enumerate() {
                    let dt = dts.map_or(0.0, |d| d[i]);
                    tail.extend_from_slice(&v.to_le_bytes());
                    tail.extend_from_slice(&dt.to_le_bytes());
                }
                values
            }
        };

        let count = u16::try_from(values.len()).map_err(|_| PackError::OutOfRange {
            field: cat.count.to_string(),
            value: values.len().to_string(),
            format: WireFormat::U16.name(),
        })?;
        fixed.insert(cat.count, count);
    }

    pack_with_tail(&CHANNEL_INFO_SERVER, &fixed, &tail)
}

fn series<'a>(fields: &'a Fields, name: &str) -> Result<Option<&'a [f32]>, PackError> {
    match fields.get(name) {
        None => Ok(None),
        Some(Value::Series(s)) => Ok(Some(s)),
        Some(other) => Err(PackError::TypeMismatch {
            field: name.to_string(),
            expected: "series",
            found: other.kind_name(),
        }),
    }
}

/// Unpack a channel status response: fixed fields, aux series and the
/// status name.
pub fn unpack_server(bytes: &[u8]) -> Result<Fields, UnpackError> {
    let mut fields = unpack_fields(&CHANNEL_INFO_SERVER, bytes)?;

    let samples: u64 = AUX_CATEGORIES
        .iter()
        .map(|c| fields.uint(c.count).unwrap_or(0))
        .sum();
    let expected = CHANNEL_INFO_SERVER.msg_length + samples as usize * AUX_SAMPLE_SIZE;
    check_header(&CHANNEL_INFO_SERVER, &fields, expected);

    parse_aux(&mut fields, bytes, AUX_START)?;
    CHANNEL_STATUS.remap(&mut fields, "status", CHANNEL_INFO_SERVER.name);
    Ok(fields)
}
