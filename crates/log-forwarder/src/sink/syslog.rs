// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! RFC 5424 message model.
//!
//! ```text
//! <PRI>VERSION TIMESTAMP HOSTNAME APP-NAME PROCID MSGID STRUCTURED-DATA [MSG]
//! ```
//!
//! Empty header fields and missing structured data are written as the nil
//! value `-`. Header values that are too long or not printable US-ASCII are
//! written as `-` as well, the message itself is still rendered.

use std::fmt::Write as _;

use thiserror::Error;
use tracing::debug;

const NIL: &str = "-";
const MAX_PRIORITY: u8 = 191;
const MAX_HOSTNAME_LEN: usize = 255;
const MAX_APP_NAME_LEN: usize = 48;
const MAX_PROC_ID_LEN: usize = 128;
const MAX_MSG_ID_LEN: usize = 32;
const MAX_SD_NAME_LEN: usize = 32;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SyslogError {
    #[error("priority {0} is out of range")]
    Priority(u8),

    #[error("version must be greater than zero")]
    Version,

    #[error("invalid structured data name '{0}'")]
    SdName(String),
}

/// One `[SD-ID name="value" ...]` element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructuredElement {
    pub id: String,
    pub params: Vec<(String, String)>,
}

impl StructuredElement {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            params: Vec::new(),
        }
    }

    #[must_use]
    pub fn param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((name.into(), value.into()));
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyslogMessage {
    pub priority: u8,
    pub version: u8,
    pub timestamp: String,
    pub hostname: String,
    pub app_name: String,
    pub proc_id: String,
    pub msg_id: String,
    pub structured_data: Vec<StructuredElement>,
    pub message: String,
}

impl SyslogMessage {
    /// Renders the message. Only the priority, the version and structured
    /// data names are rejected, invalid header values fall back to nil.
    pub fn to_rfc5424(&self) -> Result<String, SyslogError> {
        if self.priority > MAX_PRIORITY {
            return Err(SyslogError::Priority(self.priority));
        }
        if self.version == 0 {
            return Err(SyslogError::Version);
        }

        let mut out = format!(
            "<{}>{} {} {} {} {} {} ",
            self.priority,
            self.version,
            header("timestamp", &self.timestamp, usize::MAX),
            header("hostname", &self.hostname, MAX_HOSTNAME_LEN),
            header("app-name", &self.app_name, MAX_APP_NAME_LEN),
            header("procid", &self.proc_id, MAX_PROC_ID_LEN),
            header("msgid", &self.msg_id, MAX_MSG_ID_LEN),
        );

        if self.structured_data.is_empty() {
            out.push_str(NIL);
        } else {
            for element in &self.structured_data {
                write_element(&mut out, element)?;
            }
        }

        if !self.message.is_empty() {
            out.push(' ');
            out.push_str(&self.message);
        }
        Ok(out)
    }
}

fn header<'a>(field: &'static str, value: &'a str, max: usize) -> &'a str {
    if value.is_empty() {
        return NIL;
    }
    if value.len() > max {
        debug!("SYSLOG | {field} exceeds {max} characters, writing nil value");
        return NIL;
    }
    if !value.bytes().all(is_print_ascii) {
        debug!("SYSLOG | {field} '{value}' is not printable US-ASCII, writing nil value");
        return NIL;
    }
    value
}

fn write_element(out: &mut String, element: &StructuredElement) -> Result<(), SyslogError> {
    validate_sd_name(&element.id)?;
    out.push('[');
    out.push_str(&element.id);
    for (name, value) in &element.params {
        validate_sd_name(name)?;
        // Writing into a String cannot fail.
        let _ = write!(out, " {name}=\"{}\"", escape_param_value(value));
    }
    out.push(']');
    Ok(())
}

fn validate_sd_name(name: &str) -> Result<(), SyslogError> {
    let valid = !name.is_empty()
        && name.len() <= MAX_SD_NAME_LEN
        && name
            .bytes()
            .all(|b| is_print_ascii(b) && !matches!(b, b'=' | b']' | b'"'));
    if valid {
        Ok(())
    } else {
        Err(SyslogError::SdName(name.to_string()))
    }
}

fn escape_param_value(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '"' | '\\' | ']') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn is_print_ascii(b: u8) -> bool {
    (33..=126).contains(&b)
}
