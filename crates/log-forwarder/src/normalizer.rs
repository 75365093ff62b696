// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Maps host records onto the canonical [`LogEvent`].
//!
//! # Steps
//!
//! 1. The record fields are rewritten into a string-keyed JSON map.
//! 2. If the map already is a complete, valid `LogEvent` it is used as is.
//! 3. Otherwise known keys are lifted out of the map into the event fields,
//!    falling back to defaults, and whatever remains becomes the message.
//!
//! ```text
//!   fields ──> JSON map ──┬──> native LogEvent? ──> done
//!                         │
//!                         └──> lift known keys ──> remainder ──> base64 message
//! ```

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Map, Value as JsonValue};
use tracing::debug;
use uuid::Uuid;

use crate::error::NormalizationError;
use crate::event::{LogData, LogEvent};
use crate::value::{self, Fields};

const TIMESTAMP_KEY: &str = "@timestamp";
const TAG_KEY: &str = "@tag";

const DEFAULT_NAME: &str = "fluent-bit";
const DEFAULT_VERSION: &str = "1.0";
const DEFAULT_SEVERITY: &str = "Informational";
const DEFAULT_CATEGORY: &str = "TraceLog";
const DEFAULT_EVENT_ID: &str = "1";

/// Escaped and raw forms of U+2028, which line oriented consumers do not
/// treat as a line break.
const LINE_SEPARATOR_ESCAPE: &str = "\\u2028";
const LINE_SEPARATOR: char = '\u{2028}';

#[derive(Debug, Clone, Copy, Default)]
pub struct Normalizer {
    /// Keep the remainder of each record as the event's `custom` payload.
    custom_field: bool,
}

impl Normalizer {
    #[must_use]
    pub fn new(custom_field: bool) -> Self {
        Self { custom_field }
    }

    /// Builds the canonical event for one record.
    pub fn normalize(
        &self,
        timestamp: DateTime<Utc>,
        tag: &str,
        fields: Fields,
    ) -> Result<LogEvent, NormalizationError> {
        let mut map = value::fields_to_json(fields)?;

        if let Some(event) = native_event(&map) {
            debug!("Record is already a valid LogEvent, passing it through");
            return Ok(event);
        }

        map.insert(
            TIMESTAMP_KEY.to_string(),
            JsonValue::String(timestamp.to_rfc3339_opts(SecondsFormat::Nanos, true)),
        );
        map.insert(TAG_KEY.to_string(), JsonValue::String(tag.to_string()));

        let transaction_id = take_string(&mut map, "transaction_id")
            .and_then(|raw| Uuid::parse_str(&raw).ok())
            .unwrap_or_else(Uuid::new_v4);

        let server_name = take_or(&mut map, "server_name", DEFAULT_NAME);
        let application_instance = take_or(&mut map, "app_instance", tag);
        let application_name = take_or(&mut map, "app_name", DEFAULT_NAME);
        let application_version = take_or(&mut map, "app_version", DEFAULT_VERSION);
        let component = take_or(&mut map, "component", DEFAULT_NAME);
        let severity = take_or(&mut map, "severity", DEFAULT_SEVERITY);
        let category = take_or(&mut map, "category", DEFAULT_CATEGORY);
        let service_name = take_or(&mut map, "service_name", tag);
        let originating_user = take_or(&mut map, "originating_user", DEFAULT_NAME);
        let event_id = take_or(&mut map, "event_id", DEFAULT_EVENT_ID);
        let message = take_or(&mut map, "logdata_message", "");
        let trace_id = take_or(&mut map, "trace_id", "");
        let span_id = take_or(&mut map, "span_id", "");

        let remainder = serde_json::to_string(&map)?;
        let message = if message.is_empty() {
            remainder
        } else {
            message
        };

        let custom = self.custom_field.then(|| JsonValue::Object(map));

        Ok(LogEvent {
            id: Uuid::new_v4(),
            severity,
            application_instance,
            application_name,
            application_version,
            originating_user,
            category,
            component,
            server_name,
            service_name,
            event_id,
            transaction_id,
            trace_id,
            span_id,
            log_time: timestamp,
            log_data: LogData {
                message: encode_message(&message),
            },
            custom,
        })
    }
}

/// Returns the record as an event when it already carries every canonical
/// field.
fn native_event(map: &Map<String, JsonValue>) -> Option<LogEvent> {
    let candidate = JsonValue::Object(map.clone());
    serde_json::from_value::<LogEvent>(candidate)
        .ok()
        .filter(LogEvent::is_valid)
}

/// Removes `key` from the map if it holds a non-empty string.
fn take_string(map: &mut Map<String, JsonValue>, key: &str) -> Option<String> {
    match map.get(key) {
        Some(JsonValue::String(s)) if !s.is_empty() => match map.remove(key) {
            Some(JsonValue::String(s)) => Some(s),
            _ => None,
        },
        _ => None,
    }
}

fn take_or(map: &mut Map<String, JsonValue>, key: &str, default: &str) -> String {
    take_string(map, key).unwrap_or_else(|| default.to_string())
}

fn encode_message(message: &str) -> String {
    let message = message
        .replace(LINE_SEPARATOR_ESCAPE, "\n")
        .replace(LINE_SEPARATOR, "\n");
    STANDARD.encode(message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;
    use chrono::TimeZone;
    use serde_json::json;

    fn timestamp() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap()
    }

    fn decode(event: &LogEvent) -> String {
        event.decoded_message().unwrap()
    }

    fn text(key: &str, value: &str) -> (Value, Value) {
        (Value::from(key), Value::from(value))
    }

    #[test]
    fn test_empty_record_uses_defaults() {
        let event = Normalizer::default()
            .normalize(timestamp(), "app.log", vec![])
            .unwrap();

        assert_eq!(event.severity, "Informational");
        assert_eq!(event.category, "TraceLog");
        assert_eq!(event.application_name, "fluent-bit");
        assert_eq!(event.application_instance, "app.log");
        assert_eq!(event.application_version, "1.0");
        assert_eq!(event.service_name, "app.log");
        assert_eq!(event.server_name, "fluent-bit");
        assert_eq!(event.component, "fluent-bit");
        assert_eq!(event.originating_user, "fluent-bit");
        assert_eq!(event.event_id, "1");
        assert!(event.trace_id.is_empty());
        assert!(event.span_id.is_empty());
        assert_eq!(event.log_time, timestamp());
        assert!(event.custom.is_none());
        assert_eq!(
            decode(&event),
            r#"{"@tag":"app.log","@timestamp":"2024-05-01T12:30:00.000000000Z"}"#
        );
    }

    #[test]
    fn test_explicit_message_is_encoded() {
        let fields = vec![(
            Value::from("logdata_message"),
            Value::from(b"hello".as_slice()),
        )];
        let event = Normalizer::default()
            .normalize(timestamp(), "app.log", fields)
            .unwrap();

        assert_eq!(event.message(), STANDARD.encode("hello"));
    }

    #[test]
    fn test_bytes_payload_lands_in_remainder_as_text() {
        let fields = vec![(Value::from("log"), Value::from(b"hello".as_slice()))];
        let event = Normalizer::default()
            .normalize(timestamp(), "app.log", fields)
            .unwrap();

        let body: JsonValue = serde_json::from_str(&decode(&event)).unwrap();
        assert_eq!(body["log"], json!("hello"));
        assert_eq!(body["@tag"], json!("app.log"));
    }

    #[test]
    fn test_known_fields_are_lifted_out_of_the_remainder() {
        let fields = vec![
            text("app_name", "checkout"),
            text("server_name", "host-1"),
            text("severity", "Error"),
            text("trace_id", "4bf92f3577b34da6a3ce929d0e0e4736"),
            text("span_id", "00f067aa0ba902b7"),
            text("log", "payment failed"),
        ];
        let event = Normalizer::default()
            .normalize(timestamp(), "app.log", fields)
            .unwrap();

        assert_eq!(event.application_name, "checkout");
        assert_eq!(event.server_name, "host-1");
        assert_eq!(event.severity, "Error");
        assert_eq!(event.trace_id, "4bf92f3577b34da6a3ce929d0e0e4736");
        assert_eq!(event.span_id, "00f067aa0ba902b7");

        let body: JsonValue = serde_json::from_str(&decode(&event)).unwrap();
        let body = body.as_object().unwrap();
        assert!(!body.contains_key("app_name"));
        assert!(!body.contains_key("severity"));
        assert!(!body.contains_key("trace_id"));
        assert_eq!(body["log"], json!("payment failed"));
    }

    #[test]
    fn test_empty_or_non_string_fields_stay_in_remainder() {
        let fields = vec![
            text("component", ""),
            (Value::from("event_id"), Value::Int(42)),
        ];
        let event = Normalizer::default()
            .normalize(timestamp(), "app.log", fields)
            .unwrap();

        assert_eq!(event.component, "fluent-bit");
        assert_eq!(event.event_id, "1");

        let body: JsonValue = serde_json::from_str(&decode(&event)).unwrap();
        assert_eq!(body["component"], json!(""));
        assert_eq!(body["event_id"], json!(42));
    }

    #[test]
    fn test_valid_transaction_id_is_canonicalized() {
        let fields = vec![text("transaction_id", "6BA7B810-9DAD-11D1-80B4-00C04FD430C8")];
        let event = Normalizer::default()
            .normalize(timestamp(), "app.log", fields)
            .unwrap();

        assert_eq!(
            event.transaction_id.to_string(),
            "6ba7b810-9dad-11d1-80b4-00c04fd430c8"
        );
        assert!(!decode(&event).contains("transaction_id"));
    }

    #[test]
    fn test_invalid_transaction_id_is_replaced() {
        let normalizer = Normalizer::default();
        let first = normalizer
            .normalize(timestamp(), "app.log", vec![text("transaction_id", "nope")])
            .unwrap();
        let second = normalizer
            .normalize(timestamp(), "app.log", vec![text("transaction_id", "nope")])
            .unwrap();

        assert_ne!(first.transaction_id, second.transaction_id);
        assert_eq!(first.transaction_id.get_version_num(), 4);
        assert_ne!(first.id, second.id);
    }

    #[test]
    fn test_line_separator_becomes_newline() {
        let fields = vec![text("logdata_message", "first\u{2028}second\\u2028third")];
        let event = Normalizer::default()
            .normalize(timestamp(), "app.log", fields)
            .unwrap();

        assert_eq!(decode(&event), "first\nsecond\nthird");
    }

    #[test]
    fn test_custom_field_keeps_remainder() {
        let fields = vec![text("app_name", "checkout"), text("user", "jane")];
        let event = Normalizer::new(true)
            .normalize(timestamp(), "app.log", fields)
            .unwrap();

        let custom = event.custom.clone().unwrap();
        assert_eq!(custom["user"], json!("jane"));
        assert_eq!(custom["@tag"], json!("app.log"));
        assert!(custom.get("app_name").is_none());

        let body: JsonValue = serde_json::from_str(&decode(&event)).unwrap();
        assert_eq!(body, custom);
    }

    #[test]
    fn test_native_event_passes_through_unchanged() {
        let original = crate::event::tests::test_event("already canonical");
        let json = serde_json::to_value(&original).unwrap();
        let fields = json
            .as_object()
            .unwrap()
            .iter()
            .map(|(k, v)| (Value::from(k.as_str()), json_to_value(v)))
            .collect();

        let event = Normalizer::new(true)
            .normalize(timestamp(), "ignored.tag", fields)
            .unwrap();
        assert_eq!(event, original);
    }

    #[test]
    fn test_incomplete_native_event_is_synthesized() {
        let mut original = crate::event::tests::test_event("already canonical");
        original.server_name = String::new();
        let json = serde_json::to_value(&original).unwrap();
        let fields = json
            .as_object()
            .unwrap()
            .iter()
            .map(|(k, v)| (Value::from(k.as_str()), json_to_value(v)))
            .collect();

        let event = Normalizer::default()
            .normalize(timestamp(), "app.log", fields)
            .unwrap();
        assert_ne!(event.id, original.id);
        assert_eq!(event.server_name, "fluent-bit");
    }

    #[test]
    fn test_malformed_record_is_an_error() {
        let fields = vec![(Value::from("ratio"), Value::Float(f64::INFINITY))];
        let result = Normalizer::default().normalize(timestamp(), "app.log", fields);
        assert!(matches!(result, Err(NormalizationError::NonFiniteNumber(_))));
    }

    fn json_to_value(json: &JsonValue) -> Value {
        match json {
            JsonValue::Null => Value::Nil,
            JsonValue::Bool(b) => Value::Bool(*b),
            JsonValue::Number(n) => n
                .as_i64()
                .map(Value::Int)
                .unwrap_or_else(|| Value::Float(n.as_f64().unwrap())),
            JsonValue::String(s) => Value::from(s.as_str()),
            JsonValue::Array(values) => Value::Array(values.iter().map(json_to_value).collect()),
            JsonValue::Object(map) => Value::Map(
                map.iter()
                    .map(|(k, v)| (Value::from(k.as_str()), json_to_value(v)))
                    .collect(),
            ),
        }
    }
}
