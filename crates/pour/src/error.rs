// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::path::PathBuf;

/// Errors raised while loading the collector configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Pour-Config ({}) was created, please fill out and restart the server", .0.display())]
    Bootstrapped(PathBuf),

    #[error("Error auto-creating pour config: {0}")]
    Create(#[source] std::io::Error),

    #[error("Couldn't read pour config: {0}")]
    Read(#[source] std::io::Error),

    #[error("Couldn't read pour config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Errors raised by the local log file sink.
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("Failed to create log directory {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to open log file {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write log file {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to close log file {}: {source}", path.display())]
    Close {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors raised by a single ship attempt.
#[derive(Debug, thiserror::Error)]
pub enum ShipError {
    #[error("Error marshalling logs {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Error transmitting logs {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Error logging {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
}

/// Errors raised while building a [`crate::Pour`] handle.
#[derive(Debug, thiserror::Error)]
pub enum PourError {
    #[error("Pour must be created inside a Tokio runtime")]
    NoRuntime,
}
