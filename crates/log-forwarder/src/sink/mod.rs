// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Delivery backends.
//!
//! A [`Sink`] takes an ordered batch of events and reports what happened to
//! it. Two shapes of failure exist:
//!
//! - a structured partial failure, returned as `Ok` with the rejected batch
//!   positions in [`DeliveryOutcome::failed`];
//! - a total failure (unreachable backend, unexpected response), returned as
//!   [`SinkError`].
//!
//! The authenticated logging API client is provided by the host and plugs in
//! through this trait. The syslog drain lives in [`drain`].

use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::error::SinkError;
use crate::event::LogEvent;

pub mod drain;
pub mod syslog;

/// Result of handing one batch to a sink.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeliveryOutcome {
    /// Number of entries the sink accepted.
    pub succeeded: usize,
    /// Rejected entries, keyed by their position in the delivered batch.
    pub failed: BTreeMap<usize, String>,
}

impl DeliveryOutcome {
    #[must_use]
    pub fn success(succeeded: usize) -> Self {
        Self {
            succeeded,
            failed: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn partial(succeeded: usize, failed: BTreeMap<usize, String>) -> Self {
        Self { succeeded, failed }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

#[async_trait]
pub trait Sink: Send + Sync {
    /// Delivers `batch` in order. Implementations must not reorder entries,
    /// positions in [`DeliveryOutcome::failed`] refer to `batch`.
    async fn deliver(&self, batch: &[LogEvent]) -> Result<DeliveryOutcome, SinkError>;
}
