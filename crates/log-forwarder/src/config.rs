// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Forwarder configuration.
//!
//! Every key is looked up twice: first as the environment variable
//! `HSDP_<UPPER_SNAKE_KEY>`, then as the host configuration key itself. The
//! environment wins. `IngestorHost` is read from `HSDP_INGESTOR_HOST` before
//! the host's `IngestorHost` entry.

use std::env;
use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

use reqwest::Url;

use crate::constants::{
    DEFAULT_BATCH_SIZE, DEFAULT_FLUSH_INTERVAL, DEFAULT_QUEUE_CAPACITY, DEFAULT_REQUEST_TIMEOUT,
    ENV_PREFIX,
};
use crate::error::ConfigError;

/// Credentials for the structured logging API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credentials {
    /// Shared key and secret signing.
    SharedKey {
        shared_key: String,
        secret_key: String,
    },
    /// Service identity, preferred when both are configured.
    Service {
        service_id: String,
        private_key: String,
    },
}

/// Settings the host's API sink needs to reach the logging service.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApiConfig {
    pub region: Option<String>,
    pub environment: Option<String>,
    pub ingestor_host: Option<Url>,
    pub product_key: Option<String>,
    pub idm_url: Option<Url>,
    pub iam_url: Option<Url>,
    pub credentials: Option<Credentials>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrainConfig {
    pub url: Url,
    pub application_name: Option<String>,
    pub server_name: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DeliveryMode {
    /// Events are queued and flushed by a background worker.
    #[default]
    Asynchronous,
    /// Events are delivered one by one while the host waits.
    Synchronous,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryConfig {
    pub batch_size: usize,
    pub flush_interval: Duration,
    pub queue_capacity: usize,
    pub mode: DeliveryMode,
    /// Ask the host to retry a failed flush. Only honoured in synchronous
    /// mode.
    pub retry_on_error: bool,
    /// Fail every flush without contacting the sink.
    pub drop_mode: bool,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            flush_interval: DEFAULT_FLUSH_INTERVAL,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            mode: DeliveryMode::Asynchronous,
            retry_on_error: false,
            drop_mode: false,
        }
    }
}

impl DeliveryConfig {
    /// Whether a failed synchronous flush should be reported as retryable.
    #[must_use]
    pub fn retries_upstream(&self) -> bool {
        self.mode == DeliveryMode::Synchronous && self.retry_on_error
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForwarderConfig {
    pub api: ApiConfig,
    /// When set, events go to the syslog drain instead of the logging API.
    pub drain: Option<DrainConfig>,
    pub delivery: DeliveryConfig,
    pub debug: bool,
    /// Keep the unmapped record fields on the event as `custom`.
    pub custom_field: bool,
    pub insecure_skip_verify: bool,
    pub proxy_url: Option<Url>,
    pub request_timeout: Duration,
}

impl Default for ForwarderConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            drain: None,
            delivery: DeliveryConfig::default(),
            debug: false,
            custom_field: false,
            insecure_skip_verify: false,
            proxy_url: None,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl ForwarderConfig {
    /// Loads the configuration from the process environment and the host's
    /// configuration keys.
    pub fn from_host<H>(host: H) -> Result<Self, ConfigError>
    where
        H: Fn(&str) -> Option<String>,
    {
        Self::from_sources(|name| env::var(name).ok(), host)
    }

    pub fn from_sources<E, H>(env: E, host: H) -> Result<Self, ConfigError>
    where
        E: Fn(&str) -> Option<String>,
        H: Fn(&str) -> Option<String>,
    {
        let lookup = Lookup { env, host };

        let credentials = match (
            lookup.get("ServiceId"),
            lookup.get("ServicePrivateKey"),
            lookup.get("SharedKey"),
            lookup.get("SecretKey"),
        ) {
            (Some(service_id), Some(private_key), _, _) => Some(Credentials::Service {
                service_id,
                private_key,
            }),
            (_, _, Some(shared_key), Some(secret_key)) => Some(Credentials::SharedKey {
                shared_key,
                secret_key,
            }),
            _ => None,
        };

        let api = ApiConfig {
            region: lookup.get("Region"),
            environment: lookup.get("Environment"),
            ingestor_host: lookup.url("IngestorHost")?,
            product_key: lookup.get("ProductKey"),
            idm_url: lookup.url("IdmUrl")?,
            iam_url: lookup.url("IamUrl")?,
            credentials,
        };

        let drain = lookup.url("LogdrainUrl")?.map(|url| DrainConfig {
            url,
            application_name: lookup.get("LogdrainApplicationName"),
            server_name: lookup.get("LogdrainServerName"),
        });

        let mode = if lookup.flag("Sync") {
            DeliveryMode::Synchronous
        } else {
            DeliveryMode::Asynchronous
        };
        let delivery = DeliveryConfig {
            batch_size: lookup.number("BatchSize", DEFAULT_BATCH_SIZE)?,
            flush_interval: Duration::from_millis(lookup.number(
                "FlushInterval",
                u64::try_from(DEFAULT_FLUSH_INTERVAL.as_millis()).unwrap_or(1000),
            )?),
            queue_capacity: lookup.number("QueueCapacity", DEFAULT_QUEUE_CAPACITY)?,
            mode,
            retry_on_error: mode == DeliveryMode::Synchronous && lookup.flag("RetryOnError"),
            drop_mode: lookup.flag("Drop"),
        };

        let config = Self {
            api,
            drain,
            delivery,
            debug: lookup.flag("Debug"),
            custom_field: lookup.flag("CustomField"),
            insecure_skip_verify: lookup.flag("InsecureSkipVerify"),
            proxy_url: lookup.url("ProxyUrl")?,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api.credentials.is_none() && self.drain.is_none() {
            return Err(ConfigError::MissingCredentials);
        }

        let delivery = &self.delivery;
        if delivery.batch_size == 0 {
            return Err(non_zero("BatchSize", delivery.batch_size));
        }
        if delivery.flush_interval.is_zero() {
            return Err(non_zero(
                "FlushInterval",
                delivery.flush_interval.as_millis(),
            ));
        }
        if delivery.queue_capacity == 0 {
            return Err(non_zero("QueueCapacity", delivery.queue_capacity));
        }

        Ok(())
    }
}

fn non_zero(key: &'static str, value: impl Display) -> ConfigError {
    ConfigError::InvalidValue {
        key,
        value: value.to_string(),
        reason: "must be greater than 0".to_string(),
    }
}

struct Lookup<E, H> {
    env: E,
    host: H,
}

impl<E, H> Lookup<E, H>
where
    E: Fn(&str) -> Option<String>,
    H: Fn(&str) -> Option<String>,
{
    /// Environment first, host second. Blank values count as unset.
    fn get(&self, key: &str) -> Option<String> {
        let present = |value: String| {
            let value = value.trim();
            (!value.is_empty()).then(|| value.to_string())
        };
        (self.env)(&env_var_name(key))
            .and_then(present)
            .or_else(|| (self.host)(key).and_then(present))
    }

    fn flag(&self, key: &str) -> bool {
        self.get(key).is_some_and(|value| parse_bool(&value))
    }

    fn url(&self, key: &'static str) -> Result<Option<Url>, ConfigError> {
        self.get(key)
            .map(|value| {
                Url::parse(&value).map_err(|e| ConfigError::InvalidValue {
                    key,
                    reason: e.to_string(),
                    value,
                })
            })
            .transpose()
    }

    fn number<T>(&self, key: &'static str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: Display,
    {
        match self.get(key) {
            Some(value) => value.parse().map_err(|e: T::Err| ConfigError::InvalidValue {
                key,
                reason: e.to_string(),
                value,
            }),
            None => Ok(default),
        }
    }
}

/// `true`, `yes` and `1` in any case.
#[must_use]
pub fn parse_bool(value: &str) -> bool {
    matches!(value.to_lowercase().as_str(), "true" | "yes" | "1")
}

/// Name of the environment variable overriding a host configuration key.
#[must_use]
pub fn env_var_name(key: &str) -> String {
    format!("{ENV_PREFIX}{}", camel_to_snake(key).to_uppercase())
}

/// `IngestorHost` becomes `ingestor_host`. Every character that is not
/// lowercase, a digit or `_` starts a new segment.
#[must_use]
pub fn camel_to_snake(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    for c in key.chars() {
        let starts_segment = !c.is_lowercase() && c != '_' && !c.is_numeric();
        if starts_segment && !out.is_empty() {
            out.push('_');
        }
        out.extend(c.to_lowercase());
    }
    out
}
