// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Defaults for the delivery engine and constants of the drain wire format.

use std::time::Duration;

/// Number of events collected before a batch is flushed.
pub const DEFAULT_BATCH_SIZE: usize = 25;

/// Maximum time an incomplete batch waits before being flushed.
pub const DEFAULT_FLUSH_INTERVAL: Duration = Duration::from_secs(1);

/// Capacity of the queue between the host and the delivery worker.
///
/// Submitting blocks once this many events are waiting.
pub const DEFAULT_QUEUE_CAPACITY: usize = 1000;

/// Timeout applied to every outgoing HTTP request.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Prefix of environment variables that override host configuration keys.
pub const ENV_PREFIX: &str = "HSDP_";

/// Facility `user` (1) and severity `informational` (6).
pub const SYSLOG_PRIORITY: u8 = 14;

pub const SYSLOG_VERSION: u8 = 1;

pub const SYSLOG_PROC_ID: &str = "[APP/PROC/LOG-FORWARDER/0]";

/// SD-ID of the structured data element used for downstream correlation.
pub const SYSLOG_SD_ID: &str = "log-forwarder";

/// Marker placed in the drain body when trace context has to be carried along.
pub const CUSTOM_LOG_EVENT_MARKER: &str = "CustomLogEvent";
