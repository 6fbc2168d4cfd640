// src/types.rs

//! Runtime value types shared by the engine, providers and config.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Number;

/// Ordered `name -> value` mapping.
///
/// Used both for raw updates pushed by providers and for the batch of values
/// handed to the emitter (in declared signal order).
pub type SignalBatch = IndexMap<String, Value>;

/// A single signal reading.
///
/// The tag decides how change detection compares two readings:
/// - `Int` / `Float`: absolute difference against the signal threshold.
/// - `Location`: per-axis difference, either axis may qualify.
/// - everything else: plain inequality.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
    Location { latitude: f64, longitude: f64 },
    Bool(bool),
    Text(String),
    /// Arrays, null and objects that are not locations.
    Other(serde_json::Value),
}

impl Value {
    /// Convert a JSON value into a tagged `Value`.
    ///
    /// Integer numbers become `Int`, other numbers `Float`. An object with
    /// exactly two numeric keys `latitude` and `longitude` is a `Location`.
    pub fn from_json(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => n
                    .as_f64()
                    .map(Value::Float)
                    .unwrap_or(Value::Other(serde_json::Value::Number(n))),
            },
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::String(s) => Value::Text(s),
            serde_json::Value::Object(ref map) if map.len() == 2 => {
                let lat = map.get("latitude").and_then(|v| v.as_f64());
                let lon = map.get("longitude").and_then(|v| v.as_f64());
                match (lat, lon) {
                    (Some(latitude), Some(longitude)) => Value::Location {
                        latitude,
                        longitude,
                    },
                    _ => Value::Other(json),
                }
            }
            other => Value::Other(other),
        }
    }

    /// Convert back into JSON (used for output and serialization).
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Int(i) => serde_json::Value::from(*i),
            Value::Float(f) => Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::Location {
                latitude,
                longitude,
            } => serde_json::json!({
                "latitude": latitude,
                "longitude": longitude,
            }),
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Text(s) => serde_json::Value::String(s.clone()),
            Value::Other(v) => v.clone(),
        }
    }

    /// Short tag name, handy for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Location { .. } => "location",
            Value::Bool(_) => "bool",
            Value::Text(_) => "text",
            Value::Other(_) => "other",
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(i64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

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

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Location {
                latitude,
                longitude,
            } => write!(f, "({latitude}, {longitude})"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Text(s) => write!(f, "{s}"),
            Value::Other(v) => write!(f, "{v}"),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde_json::Value::deserialize(deserializer).map(Value::from_json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_numbers_split_into_int_and_float() {
        assert_eq!(Value::from_json(json!(3)), Value::Int(3));
        assert_eq!(Value::from_json(json!(3.5)), Value::Float(3.5));
    }

    #[test]
    fn latitude_longitude_object_is_location() {
        let v = Value::from_json(json!({"latitude": 50.1, "longitude": 14.4}));
        assert_eq!(
            v,
            Value::Location {
                latitude: 50.1,
                longitude: 14.4
            }
        );

        let not_loc = Value::from_json(json!({"latitude": 50.1, "alt": 3}));
        assert_eq!(not_loc.kind(), "other");
    }

    #[test]
    fn toml_value_deserializes_through_json_mapping() {
        #[derive(Deserialize)]
        struct Holder {
            v: Value,
        }
        let h: Holder = toml::from_str("v = \"on\"").unwrap();
        assert_eq!(h.v, Value::Text("on".into()));
    }
}
