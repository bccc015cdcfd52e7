// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! In-process log agent with a local file sink and a remote collector sink.
//!
//! ```text
//!   emit / emit_colored / emit_tagged / emit_fatal
//!        │                      │
//!        v                      v
//!   ┌─────────────┐      ┌────────────────┐
//!   │ EventBuffer │      │ LocalPersister │ (holding buffer until the run starts)
//!   └──────┬──────┘      └───────┬────────┘
//!          │ every 5s            │
//!          v                     v
//!   ┌──────────────┐      <log_path>/logs/<run>.log
//!   │ RemoteShipper│ ──> POST {scheme}://{host}:{port}/logs
//!   └──────────────┘
//! ```
//!
//! A [`Pour`] handle owns all shared state, so independent loggers can live in
//! the same process.

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

pub mod buffer;
pub mod config;
pub mod console;
pub mod error;
pub mod event;
pub mod flusher;
pub mod http;
pub mod persister;
pub mod pour;
pub mod shipper;

pub use buffer::EventBuffer;
pub use config::{PourOptions, RemoteConfig};
pub use console::Color;
pub use error::{ConfigError, PersistError, PourError, ShipError};
pub use event::LogEvent;
pub use flusher::{FlushOutcome, FlushScheduler, FlushState};
pub use persister::{LocalPersister, PersistFailurePolicy, RunIdentity};
pub use pour::{Pour, FATAL_APPEND_GRACE};
pub use shipper::RemoteShipper;

/// `emit!(pour, "a", 1, true)` logs `"a 1 true "`.
#[macro_export]
macro_rules! emit {
    ($pour:expr $(, $arg:expr)* $(,)?) => {
        $pour.emit(&[$(&$arg as &dyn ::std::fmt::Display),*])
    };
}

#[macro_export]
macro_rules! emit_colored {
    ($pour:expr, $silent:expr, $color:expr $(, $arg:expr)* $(,)?) => {
        $pour.emit_colored($silent, $color, &[$(&$arg as &dyn ::std::fmt::Display),*])
    };
}

#[macro_export]
macro_rules! emit_tagged {
    ($pour:expr, $silent:expr, $color:expr, $tags:expr $(, $arg:expr)* $(,)?) => {
        $pour.emit_tagged(
            $silent,
            $color,
            $tags,
            &[$(&$arg as &dyn ::std::fmt::Display),*],
        )
    };
}

/// Expands to the fatal future; `.await` it to log and exit.
#[macro_export]
macro_rules! emit_fatal {
    ($pour:expr, $code:expr $(, $arg:expr)* $(,)?) => {
        $pour.emit_fatal(
            $code,
            &[$(&$arg as &(dyn ::std::fmt::Display + ::std::marker::Sync)),*],
        )
    };
}
