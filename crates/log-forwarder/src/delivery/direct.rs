// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;

use super::batch::Batch;
use super::retry::{flush_batch, FlushReport};
use crate::event::LogEvent;
use crate::sink::Sink;

/// Synchronous delivery: every event is sent as a batch of one on the
/// caller's task.
#[derive(Clone)]
pub struct DirectDelivery {
    sink: Arc<dyn Sink>,
    drop_mode: bool,
}

impl DirectDelivery {
    #[must_use]
    pub fn new(sink: Arc<dyn Sink>, drop_mode: bool) -> Self {
        Self { sink, drop_mode }
    }

    pub async fn deliver_now(&self, event: LogEvent) -> FlushReport {
        flush_batch(self.sink.as_ref(), Batch::from(vec![event]), self.drop_mode).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delivery::retry::tests::RecordingSink;
    use crate::error::SinkError;
    use crate::event::tests::test_event;

    #[tokio::test]
    async fn test_deliver_now_sends_single_event() {
        let sink = Arc::new(RecordingSink::default());
        let direct = DirectDelivery::new(sink.clone(), false);

        let report = direct.deliver_now(test_event("hello")).await;

        assert!(report.is_success());
        assert_eq!(report.delivered, 1);
        assert_eq!(sink.batch_sizes(), vec![1]);
    }

    #[tokio::test]
    async fn test_deliver_now_reports_failure() {
        let sink = Arc::new(RecordingSink::scripted([Err(SinkError::Status {
            status: 500,
            body: "internal error".to_string(),
        })]));
        let direct = DirectDelivery::new(sink, false);

        let report = direct.deliver_now(test_event("hello")).await;

        assert!(!report.is_success());
        assert_eq!(report.abandoned, 1);
    }

    #[tokio::test]
    async fn test_deliver_now_in_drop_mode() {
        let sink = Arc::new(RecordingSink::default());
        let direct = DirectDelivery::new(sink.clone(), true);

        let report = direct.deliver_now(test_event("hello")).await;

        assert_eq!(report.attempts, 0);
        assert!(sink.calls.lock().unwrap().is_empty());
    }
}
