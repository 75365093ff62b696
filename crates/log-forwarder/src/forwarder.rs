// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Entry point for the host.
//!
//! The host starts one [`Forwarder`], calls [`Forwarder::flush`] with the
//! records of every flush invocation and finally [`Forwarder::shutdown`].

use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::config::{DeliveryMode, ForwarderConfig};
use crate::delivery::{DeliveryHandle, DeliveryService, DirectDelivery, FlushReport};
use crate::error::{ConfigError, ForwarderError};
use crate::event::RawRecord;
use crate::http::build_client;
use crate::normalizer::Normalizer;
use crate::sink::drain::DrainSink;
use crate::sink::Sink;

/// Answer to one host flush invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushResult {
    Processed,
    Error,
    /// The host should hand the same records over again later.
    RetryLater,
}

enum Delivery {
    Queued {
        handle: DeliveryHandle,
        worker: JoinHandle<()>,
    },
    Direct(DirectDelivery),
}

pub struct Forwarder {
    normalizer: Normalizer,
    delivery: Delivery,
    retries_upstream: bool,
}

impl Forwarder {
    /// Builds the pipeline. The syslog drain is used when a drain URL is
    /// configured, the host's API sink otherwise. In asynchronous mode the
    /// delivery worker is spawned on the current tokio runtime.
    ///
    /// No tracing subscriber is installed here. Hosts that want the
    /// forwarder's logs call [`crate::logger::init`] with `config.debug`
    /// before starting it.
    pub fn start(
        config: &ForwarderConfig,
        api_sink: Option<Arc<dyn Sink>>,
    ) -> Result<Self, ForwarderError> {
        config.validate()?;

        let sink: Arc<dyn Sink> = match (&config.drain, api_sink) {
            (Some(drain), _) => {
                info!("Forwarding logs to drain at {}", drain.url);
                let client = build_client(config)?;
                Arc::new(DrainSink::new(drain, client, config.debug))
            }
            (None, Some(sink)) => {
                info!("Forwarding logs to the logging API");
                sink
            }
            (None, None) => return Err(ConfigError::MissingSink.into()),
        };

        let delivery = match config.delivery.mode {
            DeliveryMode::Asynchronous => {
                let runtime =
                    Handle::try_current().map_err(|e| ForwarderError::Runtime(e.to_string()))?;
                let (service, handle) = DeliveryService::new(&config.delivery, sink);
                let worker = runtime.spawn(service.run());
                Delivery::Queued { handle, worker }
            }
            DeliveryMode::Synchronous => {
                debug!("Synchronous delivery enabled");
                Delivery::Direct(DirectDelivery::new(sink, config.delivery.drop_mode))
            }
        };

        Ok(Self {
            normalizer: Normalizer::new(config.custom_field),
            delivery,
            retries_upstream: config.delivery.retries_upstream(),
        })
    }

    /// Normalizes and delivers the records of one flush invocation. Records
    /// that cannot be normalized are logged and skipped.
    pub async fn flush<I>(&self, records: I) -> FlushResult
    where
        I: IntoIterator<Item = RawRecord>,
    {
        let mut attempted = 0usize;
        let mut succeeded = 0usize;

        for record in records {
            let event =
                match self
                    .normalizer
                    .normalize(record.timestamp, &record.tag, record.fields)
                {
                    Ok(event) => event,
                    Err(e) => {
                        warn!("Skipping record with tag {}: {e}", record.tag);
                        continue;
                    }
                };

            match &self.delivery {
                Delivery::Queued { handle, .. } => {
                    if let Err(e) = handle.submit(event).await {
                        error!("Failed to queue event: {e}");
                        return FlushResult::Error;
                    }
                }
                Delivery::Direct(direct) => {
                    attempted += 1;
                    if direct.deliver_now(event).await.is_success() {
                        succeeded += 1;
                    }
                }
            }
        }

        if attempted > 0 && succeeded == 0 {
            if self.retries_upstream {
                FlushResult::RetryLater
            } else {
                FlushResult::Error
            }
        } else {
            FlushResult::Processed
        }
    }

    /// Delivers everything still pending and stops the worker.
    pub async fn shutdown(self) -> Result<FlushReport, ForwarderError> {
        match self.delivery {
            Delivery::Queued { handle, worker } => {
                let report = handle.shutdown().await?;
                if let Err(e) = worker.await {
                    error!("Delivery worker failed: {e}");
                }
                info!(
                    "Forwarder stopped: {} delivered, {} rejected, {} abandoned",
                    report.delivered, report.rejected, report.abandoned
                );
                Ok(report)
            }
            Delivery::Direct(_) => Ok(FlushReport::default()),
        }
    }
}
