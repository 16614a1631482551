//! Color detection for the default configuration.
//!
//! Explicit settings win over the terminal check:
//!
//! 1. `MKLOG_COLOR` = `1`/`true`/`always` or `0`/`false`/`never`
//! 2. `NO_COLOR` set (any value) disables color
//! 3. otherwise color iff stderr is a color-capable terminal

use std::env;

/// Parse a boolean-ish environment value.
pub(crate) fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" | "always" => Some(true),
        "0" | "false" | "no" | "off" | "never" => Some(false),
        _ => None,
    }
}

/// Whether the default configuration should colorize output.
#[must_use]
pub fn color_enabled() -> bool {
    if let Some(forced) = env::var("MKLOG_COLOR").ok().as_deref().and_then(parse_flag) {
        return forced;
    }
    if env::var_os("NO_COLOR").is_some() {
        return false;
    }
    console::colors_enabled_stderr()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_flag_values() {
        assert_eq!(parse_flag("1"), Some(true));
        assert_eq!(parse_flag(" Always "), Some(true));
        assert_eq!(parse_flag("never"), Some(false));
        assert_eq!(parse_flag("0"), Some(false));
        assert_eq!(parse_flag("maybe"), None);
    }
}
