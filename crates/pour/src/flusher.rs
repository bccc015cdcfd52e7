// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Periodic remote flush loop.
//!
//! The loop sleeps for a fixed interval, then ships the whole remote buffer if
//! remote shipping is enabled and the buffer holds anything. There is no
//! backoff and no stop signal; the loop ends with the process.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error};

use crate::console::Color;
use crate::pour::Pour;
use crate::shipper::RemoteShipper;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushState {
    Idle,
    Flushing,
}

/// Result of a single tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushOutcome {
    /// Remote shipping is off; the buffer was not touched.
    Disabled,
    Empty,
    /// The collector accepted this many events and they were cleared.
    Shipped(usize),
    /// Delivery failed; the buffer keeps its events for the next tick.
    Failed,
}

pub struct FlushScheduler {
    pour: Pour,
    shipper: Arc<RemoteShipper>,
    remote_enabled: bool,
    interval: Duration,
    flushing: AtomicBool,
}

impl FlushScheduler {
    #[must_use]
    pub fn new(
        pour: Pour,
        shipper: Arc<RemoteShipper>,
        remote_enabled: bool,
        interval: Duration,
    ) -> Self {
        FlushScheduler {
            pour,
            shipper,
            remote_enabled,
            interval,
            flushing: AtomicBool::new(false),
        }
    }

    #[must_use]
    pub fn state(&self) -> FlushState {
        if self.flushing.load(Ordering::Acquire) {
            FlushState::Flushing
        } else {
            FlushState::Idle
        }
    }

    pub async fn run(self) {
        loop {
            tokio::time::sleep(self.interval).await;
            self.tick().await;
        }
    }

    /// One Idle -> Flushing -> Idle transition, or nothing when there is no
    /// work.
    pub async fn tick(&self) -> FlushOutcome {
        if !self.remote_enabled {
            return FlushOutcome::Disabled;
        }
        if self.pour.buffer().is_empty().await {
            return FlushOutcome::Empty;
        }

        self.flushing.store(true, Ordering::Release);
        let shipper = &self.shipper;
        let pour = &self.pour;
        let mut shipped = 0;
        let shipped_count = &mut shipped;
        let delivered = self
            .pour
            .buffer()
            .drain_on_success(|events| async move {
                *shipped_count = events.len();
                match shipper.ship(&events).await {
                    Ok(()) => true,
                    Err(e) => {
                        error!("POUR | Failed to ship {} events: {e}", events.len());
                        pour.emit_colored(false, Color::Red, &[&e]);
                        false
                    }
                }
            })
            .await;
        self.flushing.store(false, Ordering::Release);

        if delivered {
            debug!("POUR | Flushed {shipped} events");
            FlushOutcome::Shipped(shipped)
        } else {
            FlushOutcome::Failed
        }
    }
}
