//! Structured key-value fields attached to log records.

use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;
use std::time::Duration;

use crate::encoder::encode_duration;

/// Placeholder value for a key passed without one.
pub const MISSING_VALUE: &str = "MISSING";

/// A typed structured value.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Str(String),
    Int(i64),
    UInt(u64),
    Float(f64),
    Bool(bool),
    /// Rendered as fractional milliseconds.
    Duration(Duration),
    Json(Value),
    Null,
}

impl FieldValue {
    pub fn to_json(&self) -> Value {
        match self {
            FieldValue::Str(s) => Value::String(s.clone()),
            FieldValue::Int(i) => Value::from(*i),
            FieldValue::UInt(u) => Value::from(*u),
            FieldValue::Float(f) => Value::from(*f),
            FieldValue::Bool(b) => Value::Bool(*b),
            FieldValue::Duration(d) => Value::from(encode_duration(*d)),
            FieldValue::Json(v) => v.clone(),
            FieldValue::Null => Value::Null,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Str(s) => f.write_str(s),
            FieldValue::Int(i) => write!(f, "{}", i),
            FieldValue::UInt(u) => write!(f, "{}", u),
            FieldValue::Float(fl) => write!(f, "{}", fl),
            FieldValue::Bool(b) => write!(f, "{}", b),
            FieldValue::Duration(d) => write!(f, "{:?}", d),
            FieldValue::Json(v) => write!(f, "{}", v),
            FieldValue::Null => f.write_str("null"),
        }
    }
}

macro_rules! impl_from {
    ($($ty:ty => $variant:ident($conv:expr)),* $(,)?) => {
        $(
            impl From<$ty> for FieldValue {
                fn from(v: $ty) -> Self {
                    FieldValue::$variant($conv(v))
                }
            }
        )*
    };
}

impl_from! {
    String => Str(|v| v),
    &str => Str(|v: &str| v.to_string()),
    &String => Str(|v: &String| v.clone()),
    i8 => Int(i64::from),
    i16 => Int(i64::from),
    i32 => Int(i64::from),
    i64 => Int(|v| v),
    u8 => UInt(u64::from),
    u16 => UInt(u64::from),
    u32 => UInt(u64::from),
    u64 => UInt(|v| v),
    usize => UInt(|v| v as u64),
    f32 => Float(f64::from),
    f64 => Float(|v| v),
    bool => Bool(|v| v),
    Duration => Duration(|v| v),
    Value => Json(|v| v),
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(FieldValue::Null)
    }
}

/// A named structured value.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub key: String,
    pub value: FieldValue,
}

impl Field {
    pub fn new(key: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn string(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(key, FieldValue::Str(value.into()))
    }

    pub fn int(key: impl Into<String>, value: i64) -> Self {
        Self::new(key, value)
    }

    pub fn float(key: impl Into<String>, value: f64) -> Self {
        Self::new(key, value)
    }

    pub fn bool(key: impl Into<String>, value: bool) -> Self {
        Self::new(key, value)
    }

    pub fn duration(key: impl Into<String>, value: Duration) -> Self {
        Self::new(key, value)
    }

    /// Any serializable value; serialization failures record `null`.
    pub fn any<T: Serialize + ?Sized>(key: impl Into<String>, value: &T) -> Self {
        let value = serde_json::to_value(value).unwrap_or(Value::Null);
        Self::new(key, FieldValue::Json(value))
    }

    /// An error rendered with its `Display`, under the `error` key.
    pub fn error(err: &dyn std::error::Error) -> Self {
        Self::string("error", err.to_string())
    }
}

/// Pair up an alternating key/value list, padding a dangling key with `MISSING`.
pub fn pair_values(keys_and_values: &[FieldValue]) -> Vec<Field> {
    keys_and_values
        .chunks(2)
        .map(|pair| {
            let value = pair
                .get(1)
                .cloned()
                .unwrap_or_else(|| FieldValue::from(MISSING_VALUE));
            Field::new(pair[0].to_string(), value)
        })
        .collect()
}

/// Merge fields into a JSON object; later keys overwrite earlier ones in place.
pub(crate) fn fields_to_map<'a>(fields: impl IntoIterator<Item = &'a Field>) -> Map<String, Value> {
    let mut map = Map::new();
    for field in fields {
        map.insert(field.key.clone(), field.value.to_json());
    }
    map
}

/// Build an alternating key/value list.
///
/// ```rust
/// let kvs = logkit::kv!["user", "alice", "attempt", 3];
/// assert_eq!(kvs.len(), 4);
/// ```
#[macro_export]
macro_rules! kv {
    ($($value:expr),* $(,)?) => {
        vec![$($crate::FieldValue::from($value)),*]
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_pair_values_even() {
        let fields = pair_values(&crate::kv!["a", 1, "b", true]);
        assert_eq!(fields, vec![Field::new("a", 1), Field::new("b", true)]);
    }

    #[test]
    fn test_pair_values_pads_missing() {
        let fields = pair_values(&crate::kv!["key"]);
        assert_eq!(fields, vec![Field::new("key", "MISSING")]);

        let fields = pair_values(&crate::kv!["a", 1, "b"]);
        assert_eq!(fields[1], Field::new("b", MISSING_VALUE));
    }

    #[test]
    fn test_pair_values_stringifies_keys() {
        let fields = pair_values(&crate::kv![42, "answer", true, "yes"]);
        assert_eq!(fields[0].key, "42");
        assert_eq!(fields[1].key, "true");
    }

    #[test]
    fn test_to_json() {
        assert_eq!(FieldValue::from("x").to_json(), json!("x"));
        assert_eq!(FieldValue::from(-3).to_json(), json!(-3));
        assert_eq!(FieldValue::from(7u32).to_json(), json!(7));
        assert_eq!(FieldValue::from(1.5).to_json(), json!(1.5));
        assert_eq!(
            FieldValue::from(Duration::from_micros(1500)).to_json(),
            json!(1.5)
        );
        assert_eq!(FieldValue::from(None::<i32>).to_json(), Value::Null);
    }

    #[test]
    fn test_field_any() {
        #[derive(Serialize)]
        struct User {
            id: u32,
            name: &'static str,
        }

        let field = Field::any("user", &User { id: 1, name: "bob" });
        assert_eq!(field.value.to_json(), json!({"id": 1, "name": "bob"}));
    }

    #[test]
    fn test_fields_to_map_overwrites_in_place() {
        let fields = [Field::new("a", 1), Field::new("b", 2), Field::new("a", 3)];
        let map = fields_to_map(&fields);
        let keys: Vec<_> = map.keys().cloned().collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(map["a"], json!(3));
    }

    #[test]
    fn test_field_error() {
        let err = std::io::Error::other("disk full");
        assert_eq!(Field::error(&err), Field::string("error", "disk full"));
    }
}
