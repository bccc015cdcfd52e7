// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Append-only local log file, one per run.
//!
//! Until a [`RunIdentity`] is assigned there is no file to write to, so every
//! recorded event goes to a holding buffer. The first record after the run
//! starts writes the held events (in order) followed by its own event, then
//! empties the holding buffer.
//!
//! Lines have the form `<time>:<log>\n` and land in
//! `<log_path>/logs/<run_id>.log`.

use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, error};

use crate::error::PersistError;
use crate::event::{timestamp_now, LogEvent};

/// Token naming the local log file for the lifetime of the process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunIdentity(String);

impl RunIdentity {
    /// Identity derived from the current UTC time.
    #[must_use]
    pub fn now() -> Self {
        Self::from_timestamp(&timestamp_now())
    }

    /// Makes a timestamp filesystem safe by replacing `:` with `_`.
    #[must_use]
    pub fn from_timestamp(timestamp: &str) -> Self {
        RunIdentity(timestamp.replace(':', "_"))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RunIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What to do when the log file cannot be written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PersistFailurePolicy {
    /// Terminate the process with exit code 1.
    #[default]
    Abort,
    /// Keep the events in the holding buffer and retry on the next record.
    Degrade,
}

#[derive(Debug, Default)]
struct LocalState {
    run: Option<RunIdentity>,
    holding: Vec<LogEvent>,
}

#[derive(Debug)]
pub struct LocalPersister {
    log_path: PathBuf,
    policy: PersistFailurePolicy,
    state: Mutex<LocalState>,
}

impl LocalPersister {
    #[must_use]
    pub fn new(log_path: impl Into<PathBuf>, policy: PersistFailurePolicy) -> Self {
        LocalPersister {
            log_path: log_path.into(),
            policy,
            state: Mutex::new(LocalState::default()),
        }
    }

    /// Assigns the run identity. Held events are written by the next record.
    pub fn start_run(&self, run: RunIdentity) {
        debug!("POUR | Local log file is {}", self.file_for(&run).display());
        self.lock_state().run = Some(run);
    }

    #[must_use]
    pub fn run(&self) -> Option<RunIdentity> {
        self.lock_state().run.clone()
    }

    /// Path of the active run's log file, if a run has started.
    #[must_use]
    pub fn log_file(&self) -> Option<PathBuf> {
        self.lock_state().run.as_ref().map(|run| self.file_for(run))
    }

    #[must_use]
    pub fn holding_len(&self) -> usize {
        self.lock_state().holding.len()
    }

    #[must_use]
    pub fn policy(&self) -> PersistFailurePolicy {
        self.policy
    }

    /// Writes `event` (after any held events) or holds it when no run is active.
    ///
    /// On error the held events are kept and `event` joins them.
    pub fn record(&self, event: &LogEvent) -> Result<(), PersistError> {
        let mut state = self.lock_state();
        let Some(run) = state.run.clone() else {
            state.holding.push(event.clone());
            return Ok(());
        };

        match self.write_events(&run, &state.holding, event) {
            Ok(()) => {
                state.holding.clear();
                Ok(())
            }
            Err(e) => {
                state.holding.push(event.clone());
                Err(e)
            }
        }
    }

    /// Records `event` and applies the failure policy to any error.
    pub fn persist(&self, event: &LogEvent) {
        if let Err(e) = self.record(event) {
            match self.policy {
                PersistFailurePolicy::Abort => {
                    error!("POUR | Local persistence failed, terminating: {e}");
                    std::process::exit(1);
                }
                PersistFailurePolicy::Degrade => {
                    error!(
                        "POUR | Local persistence failed, holding {} events: {e}",
                        self.holding_len()
                    );
                }
            }
        }
    }

    fn write_events(
        &self,
        run: &RunIdentity,
        held: &[LogEvent],
        event: &LogEvent,
    ) -> Result<(), PersistError> {
        let dir = self.log_dir();
        if !dir.exists() {
            fs::create_dir_all(&dir).map_err(|source| PersistError::CreateDir {
                path: dir.clone(),
                source,
            })?;
        }

        let path = self.file_for(run);
        let mut file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(&path)
            .map_err(|source| PersistError::Open {
                path: path.clone(),
                source,
            })?;

        let mut content = String::new();
        for held_event in held.iter().chain(std::iter::once(event)) {
            content.push_str(&held_event.to_local_line());
            content.push('\n');
        }

        file.write_all(content.as_bytes())
            .and_then(|()| file.flush())
            .map_err(|source| PersistError::Write {
                path: path.clone(),
                source,
            })?;
        // Dropping a File discards its close error; syncing surfaces it here.
        file.sync_all()
            .map_err(|source| PersistError::Close { path, source })
    }

    fn log_dir(&self) -> PathBuf {
        self.log_path.join("logs")
    }

    fn file_for(&self, run: &RunIdentity) -> PathBuf {
        self.log_dir().join(format!("{run}.log"))
    }

    fn lock_state(&self) -> MutexGuard<'_, LocalState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[must_use]
    pub fn log_path(&self) -> &Path {
        &self.log_path
    }
}
