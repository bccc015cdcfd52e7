// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! HTTP client construction for the remote sink.

use core::time::Duration;
use std::error::Error;
use tracing::{error, warn};

/// Transport settings for the collector connection.
#[derive(Debug, Clone, Default)]
pub struct TransportOptions {
    /// Accept self-signed or otherwise invalid collector certificates.
    ///
    /// Off by default. Turning it on removes server authentication from the
    /// TLS connection.
    pub accept_invalid_certs: bool,
    /// Per-request timeout. `None` keeps the transport default.
    pub timeout: Option<Duration>,
}

/// Builds the client used for every ship attempt.
///
/// Falls back to a default client when the configured builder fails.
#[must_use]
pub fn get_client(options: &TransportOptions) -> reqwest::Client {
    match build_client(options) {
        Ok(client) => client,
        Err(e) => {
            error!("POUR | Unable to build HTTP client: {e}, using reqwest defaults");
            reqwest::Client::new()
        }
    }
}

fn build_client(options: &TransportOptions) -> Result<reqwest::Client, Box<dyn Error>> {
    let mut builder = reqwest::Client::builder().use_rustls_tls();

    if options.accept_invalid_certs {
        warn!("POUR | Certificate validation is disabled for the log collector");
        builder = builder.danger_accept_invalid_certs(true);
    }
    if let Some(timeout) = options.timeout {
        builder = builder.timeout(timeout);
    }

    Ok(builder.build()?)
}
