// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Terminal output for non-silent events.

use colored::Colorize;
use time::macros::format_description;
use time::OffsetDateTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Color {
    Reset,
    Red,
    Green,
    Yellow,
    Blue,
    Purple,
    Cyan,
    #[default]
    White,
}

impl Color {
    fn as_colored(self) -> Option<colored::Color> {
        match self {
            Color::Reset => None,
            Color::Red => Some(colored::Color::Red),
            Color::Green => Some(colored::Color::Green),
            Color::Yellow => Some(colored::Color::Yellow),
            Color::Blue => Some(colored::Color::Blue),
            Color::Purple => Some(colored::Color::Magenta),
            Color::Cyan => Some(colored::Color::Cyan),
            Color::White => Some(colored::Color::White),
        }
    }
}

/// Builds `[SERVER] <time> <message>` with the message colored.
#[must_use]
pub fn render_line(color: Color, message: &str) -> String {
    let text = match color.as_colored() {
        Some(c) => message.color(c).to_string(),
        None => message.normal().to_string(),
    };
    format!("[SERVER] {} {}", console_time(OffsetDateTime::now_utc()), text)
}

pub fn print_line(color: Color, message: &str) {
    println!("{}", render_line(color, message));
}

// RFC 822 profile, e.g. `02 Jan 06 15:04 UTC`.
fn console_time(at: OffsetDateTime) -> String {
    let format =
        format_description!("[day] [month repr:short] [year repr:last_two] [hour]:[minute] UTC");
    at.format(&format).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn test_console_time_rfc822() {
        let at = datetime!(2006-01-02 15:04:05 UTC);
        assert_eq!(console_time(at), "02 Jan 06 15:04 UTC");
    }

    #[test]
    fn test_render_line_contains_message() {
        let line = render_line(Color::Green, "up and running ");
        assert!(line.starts_with("[SERVER] "));
        assert!(line.contains("up and running"));
    }

    #[test]
    fn test_purple_maps_to_magenta() {
        assert_eq!(Color::Purple.as_colored(), Some(colored::Color::Magenta));
        assert_eq!(Color::Reset.as_colored(), None);
    }
}
