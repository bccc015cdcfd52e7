// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Ingress API and startup.
//!
//! Every non-fatal entry point builds its event on the caller's thread, prints
//! it, and hands the remote append and the local write to background units the
//! caller never waits for. The fatal entry point does both writes before
//! terminating the process.
//!
//! ```rust,ignore
//! let pour = Pour::setup(PourOptions::default()).await;
//! pour::emit!(pour, "request handled in", elapsed_ms, "ms");
//! pour::emit_tagged!(pour, false, Color::Cyan, ["http"], "GET", path);
//! ```

use std::convert::Infallible;
use std::fmt::Display;
use std::fs;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::Mutex;
use tokio_util::task::TaskTracker;
use tracing::{debug, error, warn};

use crate::buffer::EventBuffer;
use crate::config::{load_or_bootstrap, PourOptions, RemoteConfig};
use crate::console::{print_line, Color};
use crate::error::{ConfigError, PourError};
use crate::event::{format_message, LogEvent, FATAL_PREFIX};
use crate::flusher::FlushScheduler;
use crate::http::TransportOptions;
use crate::persister::{LocalPersister, RunIdentity};
use crate::shipper::RemoteShipper;

/// Longest the fatal path waits for the remote buffer. A ship attempt holds the
/// buffer lock for its whole round-trip, and a collector that never answers
/// would otherwise keep the process alive.
pub const FATAL_APPEND_GRACE: Duration = Duration::from_secs(2);

/// Handle to one logger instance. Clones share the same buffers.
#[derive(Clone, Debug)]
pub struct Pour {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    buffer: EventBuffer,
    persister: Arc<LocalPersister>,
    runtime: Handle,
    tracker: TaskTracker,
    settling: Mutex<()>,
    options: PourOptions,
    use_tls: AtomicBool,
    shipper: OnceLock<Arc<RemoteShipper>>,
}

impl Pour {
    /// Creates a logger with no active run. Must be called inside a Tokio
    /// runtime; background units are spawned onto it.
    pub fn new(options: PourOptions) -> Result<Self, PourError> {
        let runtime = Handle::try_current().map_err(|_| PourError::NoRuntime)?;
        let buffer = match options.max_buffered_events {
            Some(max) => EventBuffer::with_capacity_limit(max),
            None => EventBuffer::new(),
        };
        let persister = Arc::new(LocalPersister::new(
            options.resolved_log_path(),
            options.persist_failure_policy,
        ));

        Ok(Pour {
            inner: Arc::new(Inner {
                buffer,
                persister,
                runtime,
                tracker: TaskTracker::new(),
                settling: Mutex::new(()),
                use_tls: AtomicBool::new(options.use_tls),
                options,
                shipper: OnceLock::new(),
            }),
        })
    }

    /// Runs the startup contract: loads (or creates) the collector config,
    /// assigns the run identity and spawns the flush loop.
    ///
    /// Exits the process when the config file had to be created or cannot be
    /// read.
    pub async fn setup(options: PourOptions) -> Result<Self, PourError> {
        let pour = Pour::new(options)?;
        let log_path = pour.inner.options.resolved_log_path();

        if pour.inner.options.is_docker && !log_path.exists() {
            if let Err(e) = fs::create_dir_all(&log_path) {
                pour.emit_colored(false, Color::Red, &[&"Error creating data directory:", &e]);
            }
        }

        let config = match load_or_bootstrap(&log_path) {
            Ok(config) => config,
            Err(e @ ConfigError::Bootstrapped(_)) => {
                let message = e.to_string();
                match pour.emit_fatal(-1, &[&message]).await {}
            }
            Err(e @ ConfigError::Create(_)) => {
                pour.emit_colored(false, Color::Red, &[&e]);
                RemoteConfig::default()
            }
            Err(e) => {
                error!("POUR | {e}");
                match pour.emit_fatal(-1, &[&"Couldn't read pour config"]).await {}
            }
        };

        pour.start(config);
        Ok(pour)
    }

    /// Starts the run with an already loaded config. A second call is ignored.
    pub fn start(&self, config: RemoteConfig) {
        if self.inner.shipper.get().is_some() {
            warn!("POUR | Logger already started, ignoring");
            return;
        }

        let remote_enabled = config.remote_enabled();
        if !config.is_valid_for_remote() {
            self.emit_colored(
                false,
                Color::Purple,
                &[&"LogServer values invalid, falling back to local"],
            );
        }
        let address = format!("{}:{}", config.host, config.port);
        self.emit_colored(false, Color::Purple, &[&"Log-Server configured at", &address]);

        self.inner.persister.start_run(RunIdentity::now());

        let transport = TransportOptions {
            accept_invalid_certs: self.inner.options.accept_invalid_certs,
            timeout: self.inner.options.request_timeout,
        };
        let shipper = Arc::new(RemoteShipper::new(config, &transport));
        shipper.set_use_tls(self.inner.use_tls.load(Ordering::Relaxed));
        if self.inner.shipper.set(Arc::clone(&shipper)).is_err() {
            warn!("POUR | Logger already started, ignoring");
            return;
        }

        self.emit_colored(false, Color::Green, &[&"Pour up and running.."]);

        let scheduler = FlushScheduler::new(
            self.clone(),
            shipper,
            remote_enabled,
            self.inner.options.flush_interval,
        );
        self.inner.runtime.spawn(scheduler.run());
        debug!("POUR | Flush loop started, remote shipping enabled: {remote_enabled}");
    }

    /// Prints in white and buffers to both sinks.
    pub fn emit(&self, args: &[&dyn Display]) {
        self.dispatch(false, Color::White, format_message(args), None);
    }

    pub fn emit_colored(&self, silent: bool, color: Color, args: &[&dyn Display]) {
        self.dispatch(silent, color, format_message(args), None);
    }

    pub fn emit_tagged<I, S>(&self, silent: bool, color: Color, tags: I, args: &[&dyn Display])
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tags = tags.into_iter().map(Into::into).collect();
        self.dispatch(silent, color, format_message(args), Some(tags));
    }

    /// Prints in red, writes a `PANIC: ` event to both sinks and exits with
    /// `exit_code`. The local write always completes before the process ends;
    /// the remote append is abandoned after [`FATAL_APPEND_GRACE`].
    pub async fn emit_fatal(&self, exit_code: i32, args: &[&(dyn Display + Sync)]) -> Infallible {
        self.record_fatal(args).await;
        std::process::exit(exit_code)
    }

    pub(crate) async fn record_fatal(&self, args: &[&(dyn Display + Sync)]) -> LogEvent {
        let message = format_message(args);
        print_line(Color::Red, &message);

        let event = LogEvent::new(format!("{FATAL_PREFIX}{message}"), None);
        self.inner.persister.persist(&event);
        let append = self.inner.buffer.append(event.clone());
        if tokio::time::timeout(FATAL_APPEND_GRACE, append).await.is_err() {
            warn!(
                "POUR | Remote buffer busy for {}s, fatal event kept locally only",
                FATAL_APPEND_GRACE.as_secs()
            );
        }
        event
    }

    /// Waits until every background unit spawned so far has finished.
    ///
    /// Concurrent callers take turns, so no caller reopens the tracker while
    /// another is still waiting on it.
    pub async fn settle(&self) {
        let _turn = self.inner.settling.lock().await;
        let tracker = &self.inner.tracker;
        tracker.close();
        tracker.wait().await;
        tracker.reopen();
    }

    #[must_use]
    pub fn buffer(&self) -> &EventBuffer {
        &self.inner.buffer
    }

    pub async fn buffered_len(&self) -> usize {
        self.inner.buffer.len().await
    }

    #[must_use]
    pub fn persister(&self) -> &LocalPersister {
        &self.inner.persister
    }

    /// The shipper, once [`Pour::start`] has run.
    #[must_use]
    pub fn shipper(&self) -> Option<&Arc<RemoteShipper>> {
        self.inner.shipper.get()
    }

    /// Switches between `https` and `http` for the collector.
    pub fn set_use_tls(&self, use_tls: bool) {
        self.inner.use_tls.store(use_tls, Ordering::Relaxed);
        if let Some(shipper) = self.inner.shipper.get() {
            shipper.set_use_tls(use_tls);
        }
    }

    fn dispatch(&self, silent: bool, color: Color, message: String, tags: Option<Vec<String>>) {
        if !silent {
            print_line(color, &message);
        }

        let event = LogEvent::new(message, tags);
        let buffer = self.inner.buffer.clone();
        let persister = Arc::clone(&self.inner.persister);
        let tracker = self.inner.tracker.clone();
        self.inner.tracker.spawn_on(
            async move {
                let local = event.clone();
                tracker.spawn_blocking(move || persister.persist(&local));
                buffer.append(event).await;
            },
            &self.inner.runtime,
        );
    }
}
