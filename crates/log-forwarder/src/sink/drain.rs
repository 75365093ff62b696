// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Syslog-over-HTTP drain.
//!
//! Every event becomes one RFC 5424 line, POSTed on its own as `text/plain`.
//! Entries are independent: a failed entry is logged and the next one is
//! sent. The drain never reports rejected positions, the batch as a whole is
//! always reported as delivered.

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use reqwest::header::CONTENT_TYPE;
use reqwest::{StatusCode, Url};
use thiserror::Error;
use tracing::{debug, error};

use crate::config::DrainConfig;
use crate::constants::{
    CUSTOM_LOG_EVENT_MARKER, SYSLOG_PRIORITY, SYSLOG_PROC_ID, SYSLOG_SD_ID, SYSLOG_VERSION,
};
use crate::error::SinkError;
use crate::event::LogEvent;
use crate::sink::syslog::{StructuredElement, SyslogError, SyslogMessage};
use crate::sink::{DeliveryOutcome, Sink};

#[derive(Debug, Error)]
pub enum DrainError {
    #[error("failed to decode message: {0}")]
    Decode(#[from] base64::DecodeError),

    #[error("failed to render syslog message: {0}")]
    Syslog(#[from] SyslogError),

    #[error("failed to send log: {0}")]
    Request(#[from] reqwest::Error),

    #[error("drain responded with {0}")]
    Status(StatusCode),
}

#[derive(Debug, Clone)]
pub struct DrainSink {
    client: reqwest::Client,
    url: Url,
    /// Replaces the event's application name when set.
    application_name: Option<String>,
    /// Replaces the event's server name when set.
    server_name: Option<String>,
    debug: bool,
}

impl DrainSink {
    #[must_use]
    pub fn new(config: &DrainConfig, client: reqwest::Client, debug: bool) -> Self {
        DrainSink {
            client,
            url: config.url.clone(),
            application_name: config.application_name.clone(),
            server_name: config.server_name.clone(),
            debug,
        }
    }

    /// Renders the RFC 5424 line for one event.
    pub fn render(&self, event: &LogEvent) -> Result<String, DrainError> {
        let decoded = event.decoded_message()?;

        let app_name = self
            .application_name
            .as_deref()
            .unwrap_or(&event.application_name);
        let hostname = self.server_name.as_deref().unwrap_or(&event.server_name);

        // Trace context has no place in the syslog header, carry it in the body.
        let message = if event.trace_id.is_empty() && event.span_id.is_empty() {
            decoded
        } else {
            format!(
                "{}|{}|{}|{}|{}|{}|{}",
                event.severity,
                CUSTOM_LOG_EVENT_MARKER,
                event.transaction_id,
                event.trace_id,
                event.span_id,
                event.component,
                decoded
            )
        };

        let syslog = SyslogMessage {
            priority: SYSLOG_PRIORITY,
            version: SYSLOG_VERSION,
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            hostname: hostname.to_string(),
            app_name: app_name.to_string(),
            proc_id: SYSLOG_PROC_ID.to_string(),
            msg_id: String::new(),
            structured_data: vec![StructuredElement::new(SYSLOG_SD_ID)
                .param("taskId", event.application_instance.as_str())
                .param("applicationName", app_name)
                .param("serverName", hostname)],
            message,
        };
        Ok(syslog.to_rfc5424()?)
    }

    async fn send(&self, line: String) -> Result<(), DrainError> {
        let resp = self
            .client
            .post(self.url.clone())
            .header(CONTENT_TYPE, "text/plain")
            .body(line)
            .send()
            .await?;

        let status = resp.status();
        // Drain the body so the connection can be reused
        let _ = resp.bytes().await;

        if status.is_success() {
            Ok(())
        } else {
            Err(DrainError::Status(status))
        }
    }
}

#[async_trait]
impl Sink for DrainSink {
    async fn deliver(&self, batch: &[LogEvent]) -> Result<DeliveryOutcome, SinkError> {
        for (position, event) in batch.iter().enumerate() {
            let line = match self.render(event) {
                Ok(line) => line,
                Err(e) => {
                    error!("DRAIN | Skipping entry {position}: {e}");
                    continue;
                }
            };
            if self.debug {
                debug!("DRAIN | RFC5424: {line}");
            }
            if let Err(e) = self.send(line).await {
                error!("DRAIN | Entry {position} of event {}: {e}", event.id);
            }
        }
        Ok(DeliveryOutcome::success(batch.len()))
    }
}
