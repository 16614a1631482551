//! Log events and call-site capture.

use std::ffi::OsStr;
use std::panic::Location;
use std::path::Path;

use chrono::{DateTime, Local};

use crate::level::Level;

/// Function name recorded when the call site cannot name its function.
pub const UNKNOWN_FUNCTION: &str = "?";

/// Where an emit call originated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallSite {
    file: &'static str,
    function: &'static str,
    line: u32,
}

impl CallSite {
    #[must_use]
    pub const fn new(file: &'static str, function: &'static str, line: u32) -> Self {
        Self {
            file,
            function,
            line,
        }
    }

    /// Call site of the caller of a `#[track_caller]` function.
    ///
    /// The function name is not available this way and is recorded as
    /// [`UNKNOWN_FUNCTION`].
    #[track_caller]
    #[must_use]
    pub fn caller() -> Self {
        let location = Location::caller();
        Self::new(location.file(), UNKNOWN_FUNCTION, location.line())
    }

    #[must_use]
    pub fn file(&self) -> &'static str {
        self.file
    }

    /// Module name: the stem of the originating source file.
    #[must_use]
    pub fn module(&self) -> &'static str {
        module_of(self.file)
    }

    #[must_use]
    pub fn function(&self) -> &'static str {
        self.function
    }

    #[must_use]
    pub fn line(&self) -> u32 {
        self.line
    }
}

/// Stem of a source path, e.g. `tests/facility.rs` -> `facility`.
pub(crate) fn module_of(file: &str) -> &str {
    Path::new(file)
        .file_stem()
        .and_then(OsStr::to_str)
        .unwrap_or(file)
}

/// A single event, built at emit time and consumed by the renderer.
#[derive(Debug, Clone)]
pub struct LogEvent<'a> {
    pub timestamp: DateTime<Local>,
    pub level: Level,
    /// Hierarchical logger name, `root` by default.
    pub path: &'a str,
    pub module: &'a str,
    pub function: &'a str,
    pub line: u32,
    pub message: &'a str,
}

impl<'a> LogEvent<'a> {
    /// Event stamped with the current local time.
    #[must_use]
    pub fn now(level: Level, path: &'a str, site: &CallSite, message: &'a str) -> Self {
        Self {
            timestamp: Local::now(),
            level,
            path,
            module: site.module(),
            function: site.function(),
            line: site.line(),
            message,
        }
    }

    #[must_use]
    pub fn with_timestamp(mut self, timestamp: DateTime<Local>) -> Self {
        self.timestamp = timestamp;
        self
    }
}

/// Reduce a `type_name` of a nested marker fn to the enclosing function name.
#[doc(hidden)]
#[must_use]
pub fn enclosing_function(marker_path: &'static str) -> &'static str {
    let mut path = marker_path.strip_suffix("::__marker").unwrap_or(marker_path);
    while let Some(outer) = path.strip_suffix("::{{closure}}") {
        path = outer;
    }
    path.rsplit("::").next().unwrap_or(path)
}

/// Name of the enclosing function, e.g. `handle_request`.
#[macro_export]
macro_rules! function_name {
    () => {{
        fn __marker() {}
        $crate::event::enclosing_function(::std::any::type_name_of_val(&__marker))
    }};
}

/// Full call site (file, enclosing function, line) of the macro invocation.
#[macro_export]
macro_rules! call_site {
    () => {
        $crate::CallSite::new(::std::file!(), $crate::function_name!(), ::std::line!())
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn module_is_file_stem() {
        let site = CallSite::new("tests/log/test_log1.rs", "f", 3);
        assert_eq!(site.module(), "test_log1");
        assert_eq!(module_of("lib.rs"), "lib");
    }

    #[test]
    fn caller_records_line_and_file() {
        let site = CallSite::caller();
        assert_eq!(site.line(), line!() - 1);
        assert_eq!(site.module(), "event");
        assert_eq!(site.function(), UNKNOWN_FUNCTION);
    }

    #[test]
    fn function_name_names_enclosing_fn() {
        assert_eq!(crate::function_name!(), "function_name_names_enclosing_fn");
    }

    #[test]
    fn function_name_skips_closures() {
        let name = (|| crate::function_name!())();
        assert_eq!(name, "function_name_skips_closures");
    }

    #[test]
    fn enclosing_function_trims_paths() {
        assert_eq!(enclosing_function("a::b::run::__marker"), "run");
        assert_eq!(enclosing_function("a::run::{{closure}}::__marker"), "run");
        assert_eq!(enclosing_function("plain"), "plain");
    }
}
