//! Testing utilities for code that logs through mklog.
//!
//! Provides [`CaptureSink`] for collecting rendered lines and [`TestLog`], a
//! facility wired to a capture sink with assertion helpers.

mod capture;

pub use capture::{CaptureSink, TestLog};
