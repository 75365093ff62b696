// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Canonical log event and the raw records it is built from.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::value::Fields;

/// A record as handed over by the host for one flush invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    pub tag: String,
    pub timestamp: DateTime<Utc>,
    pub fields: Fields,
}

impl RawRecord {
    #[must_use]
    pub fn new(tag: impl Into<String>, timestamp: DateTime<Utc>, fields: Fields) -> Self {
        Self {
            tag: tag.into(),
            timestamp,
            fields,
        }
    }
}

/// Payload of a [`LogEvent`]. The message is base64 encoded text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogData {
    pub message: String,
}

/// Canonical log event accepted by every sink.
///
/// Events are built once by the normalizer and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEvent {
    pub id: Uuid,
    pub severity: String,
    pub application_instance: String,
    pub application_name: String,
    pub application_version: String,
    pub originating_user: String,
    pub category: String,
    pub component: String,
    pub server_name: String,
    pub service_name: String,
    pub event_id: String,
    pub transaction_id: Uuid,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub trace_id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub span_id: String,
    #[serde(with = "log_time")]
    pub log_time: DateTime<Utc>,
    pub log_data: LogData,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom: Option<serde_json::Value>,
}

impl LogEvent {
    /// Base64 encoded message body.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.log_data.message
    }

    /// Decodes the message body back to text.
    pub fn decoded_message(&self) -> Result<String, base64::DecodeError> {
        let bytes = STANDARD.decode(&self.log_data.message)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// True when every identifying field is populated and the message is
    /// valid base64.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        let identifying = [
            &self.severity,
            &self.application_instance,
            &self.application_name,
            &self.application_version,
            &self.originating_user,
            &self.category,
            &self.component,
            &self.server_name,
            &self.service_name,
            &self.event_id,
        ];
        identifying.iter().all(|field| !field.is_empty())
            && !self.log_data.message.is_empty()
            && STANDARD.decode(&self.log_data.message).is_ok()
    }
}

/// `logTime` is written with millisecond precision and read as any RFC 3339
/// timestamp.
mod log_time {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub(super) fn serialize<S>(time: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&time.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub(super) fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|time| time.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}
