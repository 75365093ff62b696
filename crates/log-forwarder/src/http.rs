// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Shared HTTP client.
//!
//! One client is built at start-up and cloned into every sink so connections
//! are pooled across flushes. An explicit `ProxyUrl` replaces reqwest's
//! detection of `HTTP_PROXY`/`HTTPS_PROXY`.

use core::time::Duration;

use tracing::warn;

use crate::config::ForwarderConfig;
use crate::error::ConfigError;

pub fn build_client(config: &ForwarderConfig) -> Result<reqwest::Client, ConfigError> {
    let mut client = reqwest::Client::builder()
        .timeout(config.request_timeout)
        .pool_idle_timeout(Some(Duration::from_secs(270)))
        .tcp_keepalive(Some(Duration::from_secs(120)));

    if let Some(proxy_url) = &config.proxy_url {
        let proxy = reqwest::Proxy::all(proxy_url.clone())
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;
        client = client.proxy(proxy);
    }

    if config.insecure_skip_verify {
        warn!("TLS certificate verification is disabled");
        client = client.danger_accept_invalid_certs(true);
    }

    client
        .build()
        .map_err(|e| ConfigError::HttpClient(e.to_string()))
}
