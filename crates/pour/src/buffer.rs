// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Remote event buffer shared between producers and the flush loop.
//!
//! A single async lock guards both appends and the
//! read-transmit-conditionally-clear sequence used while shipping. The lock is
//! held across the transmit future, so appends issued during a ship attempt
//! wait for it to finish and are never part of the snapshot being sent.
//!
//! The buffer is unbounded unless built with
//! [`EventBuffer::with_capacity_limit`]. In that mode the oldest events are
//! evicted first once the limit is reached.

use std::collections::VecDeque;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::warn;

use crate::event::LogEvent;

#[derive(Debug, Clone, Default)]
pub struct EventBuffer {
    inner: Arc<Mutex<VecDeque<LogEvent>>>,
    max_events: Option<usize>,
}

impl EventBuffer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Buffer that drops its oldest event when `max_events` is reached.
    #[must_use]
    pub fn with_capacity_limit(max_events: usize) -> Self {
        EventBuffer {
            inner: Arc::new(Mutex::new(VecDeque::new())),
            max_events: Some(max_events),
        }
    }

    pub async fn append(&self, event: LogEvent) {
        let mut events = self.inner.lock().await;
        if let Some(max) = self.max_events {
            while events.len() >= max.max(1) {
                events.pop_front();
                warn!("POUR | Event buffer full ({max} items), dropping oldest event");
            }
        }
        events.push_back(event);
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.is_empty()
    }

    /// Copy of the buffered events in append order.
    pub async fn snapshot(&self) -> Vec<LogEvent> {
        self.inner.lock().await.iter().cloned().collect()
    }

    /// Hands the current contents to `transmit` and empties the buffer only
    /// when it reports success. Returns what `transmit` returned.
    ///
    /// The lock is held until `transmit` resolves.
    pub async fn drain_on_success<F, Fut>(&self, transmit: F) -> bool
    where
        F: FnOnce(Vec<LogEvent>) -> Fut,
        Fut: Future<Output = bool>,
    {
        let mut events = self.inner.lock().await;
        let snapshot: Vec<LogEvent> = events.iter().cloned().collect();
        let delivered = transmit(snapshot).await;
        if delivered {
            events.clear();
        }
        delivered
    }
}
