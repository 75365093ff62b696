// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Asynchronous delivery worker.
//!
//! [`DeliveryService`] owns the pending batch and is the only place it is
//! mutated. Producers talk to it through cloneable [`DeliveryHandle`]s over a
//! bounded channel, so submitting only waits when the queue is full.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::time::{sleep_until, Instant};
use tracing::{debug, error};

use super::batch::Batch;
use super::retry::{flush_batch, FlushReport};
use crate::config::DeliveryConfig;
use crate::error::DeliveryError;
use crate::event::LogEvent;
use crate::sink::Sink;

#[derive(Debug)]
pub enum DeliveryCommand {
    Submit(LogEvent),
    /// Flush everything still pending and stop. The reply carries the totals
    /// of every flush the worker performed.
    Shutdown(oneshot::Sender<FlushReport>),
}

#[derive(Clone, Debug)]
pub struct DeliveryHandle {
    tx: mpsc::Sender<DeliveryCommand>,
}

impl DeliveryHandle {
    pub async fn submit(&self, event: LogEvent) -> Result<(), DeliveryError> {
        self.tx
            .send(DeliveryCommand::Submit(event))
            .await
            .map_err(|_| DeliveryError::Closed)
    }

    pub async fn shutdown(&self) -> Result<FlushReport, DeliveryError> {
        let (response_tx, response_rx) = oneshot::channel();
        self.tx
            .send(DeliveryCommand::Shutdown(response_tx))
            .await
            .map_err(|_| DeliveryError::Closed)?;

        response_rx.await.map_err(|_| DeliveryError::NoReport)
    }

    /// True while the worker is still accepting commands.
    #[must_use]
    pub fn is_running(&self) -> bool {
        !self.tx.is_closed()
    }
}

pub struct DeliveryService {
    rx: mpsc::Receiver<DeliveryCommand>,
    sink: Arc<dyn Sink>,
    batch: Batch,
    flush_interval: Duration,
    drop_mode: bool,
    report: FlushReport,
}

impl DeliveryService {
    #[must_use]
    pub fn new(config: &DeliveryConfig, sink: Arc<dyn Sink>) -> (Self, DeliveryHandle) {
        let (tx, rx) = mpsc::channel(config.queue_capacity);

        let service = Self {
            rx,
            sink,
            batch: Batch::with_capacity(config.batch_size),
            flush_interval: config.flush_interval,
            drop_mode: config.drop_mode,
            report: FlushReport::default(),
        };

        let handle = DeliveryHandle { tx };

        (service, handle)
    }

    pub async fn run(mut self) {
        debug!("DELIVERY | Delivery service started");

        let mut deadline = Instant::now() + self.flush_interval;
        loop {
            tokio::select! {
                biased;

                command = self.rx.recv() => match command {
                    Some(DeliveryCommand::Submit(event)) => {
                        self.batch.push(event);
                        if self.batch.is_full() {
                            self.flush().await;
                            deadline = Instant::now() + self.flush_interval;
                        }
                    }
                    Some(DeliveryCommand::Shutdown(response_tx)) => {
                        debug!("DELIVERY | Delivery service shutting down");
                        self.drain(vec![response_tx]).await;
                        break;
                    }
                    None => {
                        debug!("DELIVERY | All handles dropped, draining");
                        self.drain(Vec::new()).await;
                        break;
                    }
                },

                () = sleep_until(deadline) => {
                    if !self.batch.is_empty() {
                        self.flush().await;
                    }
                    deadline = Instant::now() + self.flush_interval;
                }
            }
        }

        debug!("DELIVERY | Delivery service stopped");
    }

    async fn flush(&mut self) {
        let batch = self.batch.take();
        debug!("DELIVERY | Flushing {} events", batch.len());
        let report = flush_batch(self.sink.as_ref(), batch, self.drop_mode).await;
        self.report.merge(report);
    }

    /// Stops accepting commands, delivers whatever is still queued or batched
    /// and answers every pending shutdown request.
    async fn drain(&mut self, mut responders: Vec<oneshot::Sender<FlushReport>>) {
        self.rx.close();
        while let Some(command) = self.rx.recv().await {
            match command {
                DeliveryCommand::Submit(event) => {
                    self.batch.push(event);
                    if self.batch.is_full() {
                        self.flush().await;
                    }
                }
                DeliveryCommand::Shutdown(response_tx) => responders.push(response_tx),
            }
        }
        if !self.batch.is_empty() {
            self.flush().await;
        }

        for response_tx in responders {
            if response_tx.send(self.report).is_err() {
                error!("DELIVERY | Failed to send shutdown report - receiver dropped");
            }
        }
    }
}
