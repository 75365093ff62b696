// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! # Log Forwarder
//!
//! Receives structured log records from a host ingestion framework, normalizes
//! them into the canonical `LogEvent` schema and delivers them in batches to
//! either an authenticated structured-logging API or a syslog-over-HTTP drain.
//!
//! ## Pipeline
//!
//! ```text
//!   host records ──> Normalizer ──> Delivery Engine ──> Sink
//!                    (LogEvent)     (batch, flush,      (logging API or
//!                                    compaction)         syslog drain)
//! ```
//!
//! - [`normalizer`]: maps arbitrary records onto [`event::LogEvent`]
//! - [`delivery`]: batching worker, synchronous delivery and retry/compaction
//! - [`sink`]: the delivery capability and the syslog drain implementation
//! - [`forwarder`]: host-facing entry point tying everything together
//! - [`config`]: immutable configuration loaded from the host and environment

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

/// Configuration loading and validation
pub mod config;

/// Default values and wire constants
pub mod constants;

/// Batching, flushing and retry of canonical events
pub mod delivery;

/// Error types shared across the pipeline
pub mod error;

/// Canonical log event and raw host records
pub mod event;

/// Host-facing forwarder
pub mod forwarder;

/// HTTP client construction
pub mod http;

/// Tracing formatter and subscriber setup
pub mod logger;

/// Record normalization
pub mod normalizer;

/// Delivery backends
pub mod sink;

/// Dynamic record values
pub mod value;

pub use config::ForwarderConfig;
pub use delivery::FlushReport;
pub use event::{LogEvent, RawRecord};
pub use forwarder::{FlushResult, Forwarder};
pub use sink::{DeliveryOutcome, Sink};
