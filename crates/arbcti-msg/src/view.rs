//! Typed views over decoded response fields.

use arbcti_codec::{Fields, Value};
use serde::de::value::{Error as DeError, MapDeserializer, SeqDeserializer};
use serde::de::{DeserializeOwned, Deserializer, IntoDeserializer, Visitor};
use serde::{forward_to_deserialize_any, Deserialize, Serialize};

use crate::error::{MsgError, Result};

/// Deserializes views straight from decoded values, so non-finite floats
/// survive.
struct ValueDeserializer<'a>(&'a Value);

impl<'de> Deserializer<'de> for ValueDeserializer<'_> {
    type Error = DeError;

    fn deserialize_any<V>(self, visitor: V) -> std::result::Result<V::Value, DeError>
    where
        V: Visitor<'de>,
    {
        match self.0 {
            Value::Int(v) => visitor.visit_i64(*v),
            Value::UInt(v) => visitor.visit_u64(*v),
            Value::Float(v) => visitor.visit_f64(*v),
            Value::Text(s) => visitor.visit_str(s),
            Value::Series(s) => {
                SeqDeserializer::<_, DeError>::new(s.iter().copied()).deserialize_any(visitor)
            }
        }
    }

    forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf option unit unit_struct newtype_struct seq tuple
        tuple_struct map struct enum identifier ignored_any
    }
}

impl<'de> IntoDeserializer<'de, DeError> for ValueDeserializer<'_> {
    type Deserializer = Self;

    fn into_deserializer(self) -> Self {
        self
    }
}

fn decode_view<T: DeserializeOwned>(fields: &Fields, view: &'static str) -> Result<T> {
    let entries = fields
        .iter()
        .map(|(name, value)| (name, ValueDeserializer(value)));
    T::deserialize(MapDeserializer::<_, DeError>::new(entries))
        .map_err(|source| MsgError::View { view, source })
}

/// Decoded login response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginFeedback {
    pub result: String,
    pub ip_address: String,
    pub cycler_sn: String,
    pub version: u32,
    pub allow_control: u32,
    pub num_channels: u32,
    pub user_type: u32,
}

impl LoginFeedback {
    pub fn from_fields(fields: &Fields) -> Result<Self> {
        decode_view(fields, "LoginFeedback")
    }

    pub fn is_success(&self) -> bool {
        self.result == "success"
    }

    pub fn is_already_logged_in(&self) -> bool {
        self.result == "already logged in"
    }
}

/// Decoded channel status response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelStatus {
    pub channel: u32,
    pub status: String,
    pub comm_failure: u8,
    pub schedule: String,
    pub testname: String,
    pub exit_condition: String,
    pub step_and_cycle_format: String,
    pub barcode: String,
    pub master_channel: u16,
    pub test_time_s: f64,
    pub step_time_s: f64,
    pub voltage_v: f64,
    pub current_a: f64,
    pub power_w: f64,
    pub charge_capacity_ah: f64,
    pub discharge_capacity_ah: f64,
    pub charge_energy_wh: f64,
    pub discharge_energy_wh: f64,
    pub internal_resistance_ohm: f64,
    pub dvdt_vbys: f64,
    pub acr_ohm: f64,
    pub aci_ohm: f64,
    pub aci_phase_degrees: f64,
    #[serde(default)]
    pub aux_voltage: Vec<f32>,
    #[serde(default)]
    pub aux_temperature: Vec<f32>,
}

impl ChannelStatus {
    pub fn from_fields(fields: &Fields) -> Result<Self> {
        decode_view(fields, "ChannelStatus")
    }
}

/// Decoded feedback of a schedule or meta-variable command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandFeedback {
    pub channel: i64,
    pub result: String,
}

impl CommandFeedback {
    pub fn from_fields(fields: &Fields) -> Result<Self> {
        decode_view(fields, "CommandFeedback")
    }

    pub fn is_success(&self) -> bool {
        self.result == "success"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel_info::{pack_server, unpack_server};
    use crate::kind::{Direction, MessageKind};

    #[test]
    fn login_view() {
        let kind = MessageKind::Login;
        let msg = kind
            .pack(
                Direction::Server,
                &Fields::new().with("result", 3u32).with("num_channels", 8u32),
            )
            .unwrap();
        let view = LoginFeedback::from_fields(&kind.unpack(Direction::Server, &msg).unwrap()).unwrap();
        assert!(view.is_already_logged_in());
        assert!(!view.is_success());
        assert_eq!(view.num_channels, 8);
    }

    #[test]
    fn channel_status_view() {
        let msg = pack_server(
            &Fields::new()
                .with("channel", 2u32)
                .with("status", "Rest")
                .with("voltage_v", 3.7f32)
                .with("aux_temperature", vec![24.5f32]),
        )
        .unwrap();
        let view = ChannelStatus::from_fields(&unpack_server(&msg).unwrap()).unwrap();
        assert_eq!(view.channel, 2);
        assert_eq!(view.status, "Rest");
        assert!((view.voltage_v - 3.7).abs() < 1e-6);
        assert_eq!(view.aux_temperature, vec![24.5]);
        assert!(view.aux_voltage.is_empty());
    }

    #[test]
    fn channel_status_keeps_non_finite_readings() {
        let msg = pack_server(
            &Fields::new()
                .with("voltage_v", f64::NAN)
                .with("current_a", f64::INFINITY)
                .with("test_time_s", f64::NEG_INFINITY)
                .with("aux_voltage", vec![f32::NAN, 1.5]),
        )
        .unwrap();
        let view = ChannelStatus::from_fields(&unpack_server(&msg).unwrap()).unwrap();
        assert!(view.voltage_v.is_nan());
        assert_eq!(view.current_a, f64::INFINITY);
        assert_eq!(view.test_time_s, f64::NEG_INFINITY);
        assert!(view.aux_voltage[0].is_nan());
        assert_eq!(view.aux_voltage[1], 1.5);
    }

    #[test]
    fn view_ignores_fields_it_does_not_name() {
        let fields = Fields::new()
            .with("channel", 4u32)
            .with("result", "success")
            .with("reserved", "")
            .with("extra_series", vec![1.0f32]);
        let view = CommandFeedback::from_fields(&fields).unwrap();
        assert_eq!(view.channel, 4);
        assert!(view.is_success());
    }

    #[test]
    fn command_feedback_view() {
        let kind = MessageKind::SetMetaVariable;
        let msg = kind
            .pack(Direction::Server, &Fields::new().with("result", 17u8))
            .unwrap();
        let view =
            CommandFeedback::from_fields(&kind.unpack(Direction::Server, &msg).unwrap()).unwrap();
        assert!(!view.is_success());
        assert_eq!(view.result, "Channel is not running");
    }

    #[test]
    fn view_error_names_the_view() {
        let err = CommandFeedback::from_fields(&Fields::new().with("channel", 1)).unwrap_err();
        assert!(matches!(err, MsgError::View { view: "CommandFeedback", .. }));
    }
}
