// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Transmission of buffered events to the remote collector.
//!
//! One attempt is a single `POST {scheme}://{host}:{port}/logs` carrying a JSON
//! array of events. Only `202 Accepted` counts as delivered. There is no retry
//! here: a failed batch stays in the buffer and goes out again on the next
//! flush tick.

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::StatusCode;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::debug;

use crate::config::RemoteConfig;
use crate::error::ShipError;
use crate::event::LogEvent;
use crate::http::{get_client, TransportOptions};

const CLIENT_HEADER: &str = "X-CLIENT";
const KEY_HEADER: &str = "X-KEY";

#[derive(Debug)]
pub struct RemoteShipper {
    client: reqwest::Client,
    config: RemoteConfig,
    use_tls: AtomicBool,
}

impl RemoteShipper {
    #[must_use]
    pub fn new(config: RemoteConfig, transport: &TransportOptions) -> Self {
        RemoteShipper {
            client: get_client(transport),
            config,
            use_tls: AtomicBool::new(true),
        }
    }

    /// Selects `https` (the default) or plain `http` for later attempts.
    pub fn set_use_tls(&self, use_tls: bool) {
        self.use_tls.store(use_tls, Ordering::Relaxed);
    }

    #[must_use]
    pub fn use_tls(&self) -> bool {
        self.use_tls.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn config(&self) -> &RemoteConfig {
        &self.config
    }

    #[must_use]
    pub fn endpoint_url(&self) -> String {
        let scheme = if self.use_tls() { "https" } else { "http" };
        format!("{scheme}://{}:{}/logs", self.config.host, self.config.port)
    }

    pub async fn ship(&self, events: &[LogEvent]) -> Result<(), ShipError> {
        let body = serde_json::to_vec(events)?;
        debug!("POUR | Shipping {} events to {}", events.len(), self.endpoint_url());

        let resp = self
            .client
            .post(self.endpoint_url())
            .header(CONTENT_TYPE, "application/json")
            .header(CLIENT_HEADER, &self.config.client)
            .header(AUTHORIZATION, &self.config.client_key)
            .header(KEY_HEADER, &self.config.project_key)
            .body(body)
            .send()
            .await?;

        let status = resp.status();
        if status == StatusCode::ACCEPTED {
            debug!("POUR | Collector accepted {} events", events.len());
            return Ok(());
        }

        let body = match resp.text().await {
            Ok(text) => text,
            Err(_) => status.as_u16().to_string(),
        };
        Err(ShipError::Status { status, body })
    }
}
