// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Partial-failure handling for a single flush.
//!
//! A flush sends the whole batch. When the sink rejects individual entries,
//! those entries are logged and removed, and the rest is sent again. A sink
//! that fails as a whole ends the flush and the remaining entries are
//! abandoned. The number of attempts never exceeds the size of the original
//! batch, so a sink rejecting at least one entry per attempt always
//! terminates.

use tracing::{debug, error, warn};

use super::batch::Batch;
use crate::sink::Sink;

/// Accounting of one flush.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlushReport {
    /// Entries the sink accepted.
    pub delivered: usize,
    /// Entries the sink explicitly rejected.
    pub rejected: usize,
    /// Entries never delivered because of drop mode, a total sink failure or
    /// the attempt bound.
    pub abandoned: usize,
    /// Number of `deliver` calls made.
    pub attempts: usize,
}

impl FlushReport {
    /// Every entry of `count` was abandoned without reaching the sink.
    #[must_use]
    pub fn dropped(count: usize) -> Self {
        Self {
            abandoned: count,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.rejected == 0 && self.abandoned == 0
    }

    /// Adds the figures of another flush to this one.
    pub fn merge(&mut self, other: FlushReport) {
        self.delivered += other.delivered;
        self.rejected += other.rejected;
        self.abandoned += other.abandoned;
        self.attempts += other.attempts;
    }
}

pub async fn flush_batch(sink: &dyn Sink, mut batch: Batch, drop_mode: bool) -> FlushReport {
    let original_count = batch.len();
    if original_count == 0 {
        return FlushReport::default();
    }
    if drop_mode {
        debug!("DELIVERY | Drop mode enabled, dropping {original_count} events");
        return FlushReport::dropped(original_count);
    }

    let mut report = FlushReport::default();
    while !batch.is_empty() && report.attempts < original_count {
        report.attempts += 1;
        match sink.deliver(batch.as_slice()).await {
            Ok(outcome) if outcome.is_success() => {
                report.delivered += batch.len();
                debug!(
                    "DELIVERY | Delivered {} events in {} attempts",
                    batch.len(),
                    report.attempts
                );
                return report;
            }
            Ok(outcome) => {
                for (position, reason) in &outcome.failed {
                    match batch.as_slice().get(*position) {
                        Some(event) => warn!(
                            "DELIVERY | Dropping entry {position} (event {}): {reason}",
                            event.id
                        ),
                        None => warn!("DELIVERY | Rejected unknown entry {position}: {reason}"),
                    }
                }
                let before = batch.len();
                batch.compact(&outcome.failed);
                report.rejected += before - batch.len();
                debug!(
                    "DELIVERY | {} entries rejected, retrying {} remaining",
                    before - batch.len(),
                    batch.len()
                );
            }
            Err(e) => {
                error!(
                    "DELIVERY | Failed to deliver batch of {} events: {e}",
                    batch.len()
                );
                report.abandoned += batch.len();
                return report;
            }
        }
    }

    if !batch.is_empty() {
        warn!(
            "DELIVERY | Giving up on {} events after {} attempts",
            batch.len(),
            report.attempts
        );
        report.abandoned += batch.len();
    }
    report
}
