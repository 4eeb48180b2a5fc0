use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A decoded or to-be-encoded field value.
///
/// Integer variants compare numerically, so `Int(5) == UInt(5)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Int(i64),
    UInt(u64),
    Float(f64),
    Text(String),
    /// A run of 32-bit floats (aux reading series).
    Series(Vec<f32>),
}

impl Value {
    /// Short name of the value kind, used in diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Int(_) | Value::UInt(_) => "integer",
            Value::Float(_) => "float",
            Value::Text(_) => "text",
            Value::Series(_) => "series",
        }
    }

    /// Integer view wide enough for every wire integer format.
    pub fn as_i128(&self) -> Option<i128> {
        match self {
            Value::Int(v) => Some(i128::from(*v)),
            Value::UInt(v) => Some(i128::from(*v)),
            _ => None,
        }
    }

    /// Numeric view; integers are widened to `f64`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(v) => Some(*v as f64),
            Value::UInt(v) => Some(*v as f64),
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_series(&self) -> Option<&[f32]> {
        match self {
            Value::Series(s) => Some(s),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::UInt(a), Value::UInt(b)) => a == b,
            (Value::Int(a), Value::UInt(b)) | (Value::UInt(b), Value::Int(a)) => {
                u64::try_from(*a).is_ok_and(|a| a == *b)
            }
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Text(a), Value::Text(b)) => a == b,
            (Value::Series(a), Value::Series(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{v}"),
            Value::UInt(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Text(s) => f.write_str(s),
            Value::Series(s) => {
                f.write_str("[")?;
                for (i, v) in s.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{v}")?;
                }
                f.write_str("]")
            }
        }
    }
}

macro_rules! value_from {
    ($variant:ident, $target:ty, $($t:ty),+) => {
        $(impl From<$t> for Value {
            fn from(v: $t) -> Self {
                Value::$variant(<$target>::from(v))
            }
        })+
    };
}

value_from!(Int, i64, i8, i16, i32, i64);
value_from!(UInt, u64, u8, u16, u32, u64);
value_from!(Float, f64, f32, f64);

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<Vec<f32>> for Value {
    fn from(v: Vec<f32>) -> Self {
        Value::Series(v)
    }
}

/// Field name → value mapping in template declaration order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fields(IndexMap<String, Value>);

impl Fields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value, returning the previous one for that name.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(name.into(), value.into())
    }

    /// Builder-style insert.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.0.shift_remove(name)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Overwrite entries with those of `other`, keeping the existing order
    /// for names already present.
    pub fn merge(&mut self, other: Fields) {
        self.0.extend(other.0);
    }

    pub fn int(&self, name: &str) -> Option<i64> {
        match self.get(name)? {
            Value::Int(v) => Some(*v),
            Value::UInt(v) => i64::try_from(*v).ok(),
            _ => None,
        }
    }

    pub fn uint(&self, name: &str) -> Option<u64> {
        match self.get(name)? {
            Value::UInt(v) => Some(*v),
            Value::Int(v) => u64::try_from(*v).ok(),
            _ => None,
        }
    }

    pub fn float(&self, name: &str) -> Option<f64> {
        self.get(name)?.as_f64()
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.get(name)?.as_str()
    }

    pub fn series(&self, name: &str) -> Option<&[f32]> {
        self.get(name)?.as_series()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Fields {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl IntoIterator for Fields {
    type Item = (String, Value);
    type IntoIter = indexmap::map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integers_compare_across_signedness() {
        assert_eq!(Value::Int(5), Value::UInt(5));
        assert_ne!(Value::Int(-1), Value::UInt(u64::MAX));
        assert_ne!(Value::Int(1), Value::Float(1.0));
    }

    #[test]
    fn typed_getters() {
        let fields = Fields::new()
            .with("channel", 4u32)
            .with("voltage_v", 2.5f32)
            .with("schedule", "cc-cv")
            .with("aux_voltage", vec![1.0f32, 2.0]);

        assert_eq!(fields.uint("channel"), Some(4));
        assert_eq!(fields.int("channel"), Some(4));
        assert_eq!(fields.float("voltage_v"), Some(2.5));
        assert_eq!(fields.text("schedule"), Some("cc-cv"));
        assert_eq!(fields.series("aux_voltage"), Some(&[1.0f32, 2.0][..]));
        assert_eq!(fields.text("channel"), None);
        assert_eq!(fields.uint("missing"), None);
    }

    #[test]
    fn merge_overwrites_and_appends() {
        let mut base = Fields::new().with("a", 1).with("b", 2);
        base.merge(Fields::new().with("b", 20).with("c", 30));

        let keys: Vec<&str> = base.keys().collect();
        assert_eq!(keys, ["a", "b", "c"]);
        assert_eq!(base.int("b"), Some(20));
    }

    #[test]
    fn map_equality_ignores_order() {
        let a = Fields::new().with("x", 1).with("y", "two");
        let b = Fields::new().with("y", "two").with("x", 1u8);
        assert_eq!(a, b);
    }

    #[test]
    fn json_roundtrip_keeps_kinds() {
        let fields = Fields::new()
            .with("n", -3)
            .with("f", 1.5)
            .with("s", "text")
            .with("l", vec![0.5f32]);

        let json = serde_json::to_string(&fields).unwrap();
        assert_eq!(json, r#"{"n":-3,"f":1.5,"s":"text","l":[0.5]}"#);

        let back: Fields = serde_json::from_str(&json).unwrap();
        assert_eq!(back, fields);
    }

    #[test]
    fn display_series() {
        assert_eq!(Value::Series(vec![1.0, 2.5]).to_string(), "[1, 2.5]");
        assert_eq!(Value::Text("abc".into()).to_string(), "abc");
    }
}
