// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Delivery engine.
//!
//! ```text
//!   submit ──> [bounded queue] ──> DeliveryService ──> flush_batch ──> Sink
//!                                  (size or interval)  (compaction)
//!
//!   deliver_now ─────────────────────────────────────> flush_batch ──> Sink
//! ```
//!
//! Asynchronous mode goes through [`service::DeliveryService`], synchronous
//! mode through [`direct::DirectDelivery`]. Both end in
//! [`retry::flush_batch`].

pub mod batch;
pub mod direct;
pub mod retry;
pub mod service;

pub use batch::Batch;
pub use direct::DirectDelivery;
pub use retry::{flush_batch, FlushReport};
pub use service::{DeliveryCommand, DeliveryHandle, DeliveryService};
