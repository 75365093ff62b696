// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

/// Errors raised while building the forwarder. All of them are fatal.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("No valid credentials found: configure a shared key pair, a service identity or a logdrain URL")]
    MissingCredentials,

    #[error("No sink available: configure a logdrain URL or provide a logging API sink")]
    MissingSink,

    #[error("Invalid value '{value}' for {key}: {reason}")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(String),
}

/// Errors raised for a single record. The record is skipped, the rest of the
/// flush carries on.
#[derive(Debug, thiserror::Error)]
pub enum NormalizationError {
    #[error("Map key cannot be converted to a string: {0}")]
    UnsupportedKey(String),

    #[error("Number {0} cannot be represented in JSON")]
    NonFiniteNumber(f64),

    #[error("Error creating message for logging: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// A sink failed as a whole, without telling which entries were at fault.
///
/// The drain never fails a batch. These variants are what a host-supplied
/// API sink returns, and every one of them abandons the batch.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    /// The request never got an answer.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The endpoint answered with a non-success status that carries no
    /// per-entry detail.
    #[error("Request rejected with status {status}: {body}")]
    Status { status: u16, body: String },

    /// Anything else, such as signing or encoding the request.
    #[error("Sink error: {0}")]
    Other(String),
}

#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("Delivery worker is not running")]
    Closed,

    #[error("Delivery worker stopped without reporting")]
    NoReport,
}

#[derive(Debug, thiserror::Error)]
pub enum ForwarderError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Delivery(#[from] DeliveryError),

    #[error("Failed to initialize logging: {0}")]
    Logger(String),

    #[error("Delivery worker needs a tokio runtime: {0}")]
    Runtime(String),
}
