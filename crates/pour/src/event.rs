// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! The log event shared by both sinks.
//!
//! An event is built once, inside an ingress call, and is never mutated
//! afterwards. The remote sink serializes it as:
//!
//! ```json
//! {"log": "request handled ", "time": "2024-05-01T10:11:12Z", "tags": ["http"]}
//! ```
//!
//! The local sink writes it as `<time>:<log>` on its own line.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Write};
use time::macros::format_description;
use time::OffsetDateTime;

/// Prefix stamped on the message of every fatal event.
pub const FATAL_PREFIX: &str = "PANIC: ";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEvent {
    /// Space-joined caller arguments, trailing space included.
    pub log: String,
    /// UTC creation time, `YYYY-MM-DDTHH:MM:SSZ`.
    pub time: String,
    pub tags: Option<Vec<String>>,
}

impl LogEvent {
    /// Creates an event stamped with the current UTC time.
    #[must_use]
    pub fn new(log: String, tags: Option<Vec<String>>) -> Self {
        LogEvent {
            log,
            time: timestamp_now(),
            tags,
        }
    }

    /// The line written to the per-run log file, without the newline.
    #[must_use]
    pub fn to_local_line(&self) -> String {
        format!("{}:{}", self.time, self.log)
    }
}

/// Converts every argument to text and appends one space after each of them.
///
/// `format_message::<dyn Display>(&[&"a", &1, &true])` yields `"a 1 true "`.
#[must_use]
pub fn format_message<D: Display + ?Sized>(args: &[&D]) -> String {
    let mut message = String::new();
    for arg in args {
        // Writing into a String cannot fail.
        let _ = write!(message, "{arg} ");
    }
    message
}

/// Current UTC time with second precision and a `Z` offset.
#[must_use]
pub fn timestamp_now() -> String {
    format_timestamp(OffsetDateTime::now_utc())
}

pub(crate) fn format_timestamp(at: OffsetDateTime) -> String {
    let format = format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]Z");
    at.to_offset(time::UtcOffset::UTC)
        .format(&format)
        .unwrap_or_else(|_| at.unix_timestamp().to_string())
}
