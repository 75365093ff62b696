// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::collections::BTreeMap;

use crate::event::LogEvent;

/// Events waiting to be delivered, in arrival order.
#[derive(Debug, Clone, Default)]
pub struct Batch {
    events: Vec<LogEvent>,
    capacity: usize,
}

impl Batch {
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            events: Vec::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, event: LogEvent) {
        self.events.push(event);
    }

    /// True once the batch holds `capacity` events and must be flushed.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.events.len() >= self.capacity
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[LogEvent] {
        &self.events
    }

    /// Hands out the current events and leaves an empty batch of the same
    /// capacity behind.
    pub fn take(&mut self) -> Batch {
        std::mem::replace(self, Batch::with_capacity(self.capacity))
    }

    /// Removes the entries at the `failed` positions, keeping the relative
    /// order of the remaining ones.
    pub fn compact<V>(&mut self, failed: &BTreeMap<usize, V>) {
        let mut position = 0;
        self.events.retain(|_| {
            let keep = !failed.contains_key(&position);
            position += 1;
            keep
        });
    }
}

impl From<Vec<LogEvent>> for Batch {
    fn from(events: Vec<LogEvent>) -> Self {
        let capacity = events.len();
        Self { events, capacity }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::tests::test_event;

    fn messages(batch: &Batch) -> Vec<String> {
        batch
            .as_slice()
            .iter()
            .map(|event| event.decoded_message().unwrap())
            .collect()
    }

    #[test]
    fn test_is_full_at_capacity() {
        let mut batch = Batch::with_capacity(2);
        batch.push(test_event("a"));
        assert!(!batch.is_full());
        batch.push(test_event("b"));
        assert!(batch.is_full());
    }

    #[test]
    fn test_compact_keeps_order() {
        let mut batch = Batch::from(
            ["0", "1", "2", "3", "4"]
                .into_iter()
                .map(test_event)
                .collect::<Vec<_>>(),
        );
        let failed = BTreeMap::from([(1, "bad"), (3, "bad")]);

        batch.compact(&failed);

        assert_eq!(batch.len(), 3);
        assert_eq!(messages(&batch), vec!["0", "2", "4"]);
    }

    #[test]
    fn test_compact_ignores_unknown_positions() {
        let mut batch = Batch::from(vec![test_event("0"), test_event("1")]);
        batch.compact(&BTreeMap::from([(7, ())]));
        assert_eq!(batch.len(), 2);
    }

    #[test]
    fn test_take_leaves_empty_batch() {
        let mut batch = Batch::with_capacity(3);
        batch.push(test_event("a"));

        let taken = batch.take();

        assert_eq!(taken.len(), 1);
        assert!(batch.is_empty());
        batch.push(test_event("b"));
        batch.push(test_event("c"));
        batch.push(test_event("d"));
        assert!(batch.is_full());
    }
}
