//! Render engine: event + settings -> one text line.
//!
//! ```text
//! detail 0/1:  INFO: log message
//! detail 2:    INFO: root:test_log1::test_log_detail: log message
//! time:        2025-08-26 09:39:44,262:INFO: log message
//! color:       \x1b[38;2;110;110;110mINFO: log message\x1b[0m
//! ```
//!
//! Time and color compose with every detail level. The timestamp stays
//! outside the color span so the colored portion is always exactly the
//! uncolored `<SEVERITY>: ...` text.

use std::fmt::Write as _;

use crate::event::LogEvent;

/// Neutral gray foreground applied to the severity+message portion.
pub const COLOR_START: &str = "\x1b[38;2;110;110;110m";
/// Attribute reset closing the color span.
pub const COLOR_RESET: &str = "\x1b[0m";
/// `chrono` format of the optional timestamp prefix.
pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S,%3f";

/// How much call-site context a line carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum Detail {
    /// `<SEVERITY>: <message>`
    #[default]
    Minimal,
    /// Reserved tier; currently renders like [`Detail::Minimal`].
    Intermediate,
    /// `<SEVERITY>: <path>:<module>::<function>: <message>`
    Full,
}

impl Detail {
    /// Map a numeric detail level; anything above 2 is treated as 2.
    #[must_use]
    pub fn from_level(level: u8) -> Self {
        match level {
            0 => Detail::Minimal,
            1 => Detail::Intermediate,
            _ => Detail::Full,
        }
    }

    #[must_use]
    pub fn level(self) -> u8 {
        match self {
            Detail::Minimal => 0,
            Detail::Intermediate => 1,
            Detail::Full => 2,
        }
    }
}

impl From<u8> for Detail {
    fn from(level: u8) -> Self {
        Self::from_level(level)
    }
}

/// Render settings snapshot taken from the facility per emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderOptions {
    pub detail: Detail,
    pub time: bool,
    pub color: bool,
}

/// Render an event as one `\n`-terminated line.
#[must_use]
pub fn render(event: &LogEvent<'_>, detail: Detail, time_enabled: bool, color: bool) -> String {
    let mut line = String::with_capacity(event.message.len() + 64);

    if time_enabled {
        let _ = write!(line, "{}:", event.timestamp.format(TIME_FORMAT));
    }
    if color {
        line.push_str(COLOR_START);
    }

    line.push_str(&event.level.name());
    line.push_str(": ");
    if detail == Detail::Full {
        let _ = write!(
            line,
            "{}:{}::{}: ",
            event.path, event.module, event.function
        );
    }
    line.push_str(event.message);

    if color {
        line.push_str(COLOR_RESET);
    }
    line.push('\n');
    line
}

/// [`render`] with a settings snapshot.
#[must_use]
pub fn render_with(event: &LogEvent<'_>, options: RenderOptions) -> String {
    render(event, options.detail, options.time, options.color)
}
