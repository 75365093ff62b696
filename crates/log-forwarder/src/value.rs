// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Dynamic values carried by host records.
//!
//! Host records are loosely typed: map keys are not necessarily strings and
//! payloads are frequently raw bytes. [`Value::into_json`] rewrites such a
//! value into a JSON document where every key is a string and every byte
//! sequence is text. Bytes are never base64 encoded here, a log line sent as
//! bytes must stay readable once serialized.

use serde_json::{Map, Number};

use crate::error::NormalizationError;

/// Ordered key/value pairs of a record or nested map.
pub type Fields = Vec<(Value, Value)>;

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Nil,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Text(String),
    Bytes(Vec<u8>),
    Array(Vec<Value>),
    Map(Fields),
}

impl Value {
    /// Converts the value into its JSON-safe form.
    pub fn into_json(self) -> Result<serde_json::Value, NormalizationError> {
        let json = match self {
            Value::Nil => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(b),
            Value::Int(i) => serde_json::Value::Number(i.into()),
            Value::UInt(u) => serde_json::Value::Number(u.into()),
            Value::Float(f) => Number::from_f64(f)
                .map(serde_json::Value::Number)
                .ok_or(NormalizationError::NonFiniteNumber(f))?,
            Value::Text(s) => serde_json::Value::String(s),
            Value::Bytes(bytes) => {
                serde_json::Value::String(String::from_utf8_lossy(&bytes).into_owned())
            }
            Value::Array(values) => serde_json::Value::Array(
                values
                    .into_iter()
                    .map(Value::into_json)
                    .collect::<Result<_, _>>()?,
            ),
            Value::Map(fields) => serde_json::Value::Object(fields_to_json(fields)?),
        };
        Ok(json)
    }

    /// Renders the value as a JSON object key.
    fn into_key(self) -> Result<String, NormalizationError> {
        match self {
            Value::Text(s) => Ok(s),
            Value::Bytes(bytes) => Ok(String::from_utf8_lossy(&bytes).into_owned()),
            Value::Nil => Ok("null".to_string()),
            Value::Bool(b) => Ok(b.to_string()),
            Value::Int(i) => Ok(i.to_string()),
            Value::UInt(u) => Ok(u.to_string()),
            Value::Float(f) => Ok(f.to_string()),
            composite @ (Value::Array(_) | Value::Map(_)) => {
                Err(NormalizationError::UnsupportedKey(format!("{composite:?}")))
            }
        }
    }
}

/// Converts the top-level fields of a record into a string-keyed JSON map.
///
/// When two keys render to the same string, the later one wins.
pub fn fields_to_json(fields: Fields) -> Result<Map<String, serde_json::Value>, NormalizationError> {
    let mut map = Map::with_capacity(fields.len());
    for (key, value) in fields {
        map.insert(key.into_key()?, value.into_json()?);
    }
    Ok(map)
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<&[u8]> for Value {
    fn from(bytes: &[u8]) -> Self {
        Value::Bytes(bytes.to_vec())
    }
}

impl From<Vec<u8>> for Value {
    fn from(bytes: Vec<u8>) -> Self {
        Value::Bytes(bytes)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<u64> for Value {
    fn from(u: u64) -> Self {
        Value::UInt(u)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<Vec<Value>> for Value {
    fn from(values: Vec<Value>) -> Self {
        Value::Array(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_bytes_become_text() {
        let value = Value::from(b"hello world".as_slice());
        assert_eq!(value.into_json().unwrap(), json!("hello world"));
    }

    #[test]
    fn test_invalid_utf8_bytes_are_replaced() {
        let value = Value::Bytes(vec![b'o', b'k', 0xff]);
        assert_eq!(value.into_json().unwrap(), json!("ok\u{fffd}"));
    }

    #[test]
    fn test_nested_maps_get_string_keys() {
        let value = Value::Map(vec![
            (Value::Int(1), Value::from("one")),
            (Value::Bool(true), Value::from(vec![Value::from(b"x".as_slice())])),
            (
                Value::from(b"inner".as_slice()),
                Value::Map(vec![(Value::UInt(7), Value::Nil)]),
            ),
        ]);

        assert_eq!(
            value.into_json().unwrap(),
            json!({
                "1": "one",
                "true": ["x"],
                "inner": { "7": null },
            })
        );
    }

    #[test]
    fn test_composite_key_is_rejected() {
        let value = Value::Map(vec![(Value::Array(vec![]), Value::from("v"))]);
        assert!(matches!(
            value.into_json(),
            Err(NormalizationError::UnsupportedKey(_))
        ));
    }

    #[test]
    fn test_non_finite_float_is_rejected() {
        let value = Value::Array(vec![Value::Float(f64::NAN)]);
        assert!(matches!(
            value.into_json(),
            Err(NormalizationError::NonFiniteNumber(_))
        ));
    }

    #[test]
    fn test_fields_to_json_later_duplicate_wins() {
        let fields = vec![
            (Value::from("key"), Value::from("first")),
            (Value::from(b"key".as_slice()), Value::from("second")),
        ];
        let map = fields_to_json(fields).unwrap();
        assert_eq!(map.len(), 1);
        assert_eq!(map["key"], json!("second"));
    }
}
