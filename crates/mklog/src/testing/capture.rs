//! Capturing sink and test facility.

use std::io;
use std::sync::{Arc, Mutex, PoisonError};

use strip_ansi_escapes::strip;

use crate::config::FacilityConfig;
use crate::facility::Facility;
use crate::sink::Sink;

/// A sink that keeps every rendered line in memory.
///
/// Clones share the same buffer, so keep one clone for assertions and hand
/// another to the facility.
#[derive(Debug, Clone, Default)]
pub struct CaptureSink {
    lines: Arc<Mutex<Vec<String>>>,
}

impl CaptureSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Lines exactly as rendered, including `\n` and color escapes.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Lines with ANSI escapes removed.
    #[must_use]
    pub fn plain_lines(&self) -> Vec<String> {
        self.lines()
            .iter()
            .map(|line| String::from_utf8_lossy(&strip(line)).into_owned())
            .collect()
    }

    pub fn clear(&self) {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl Sink for CaptureSink {
    fn write_line(&mut self, line: &str) -> io::Result<()> {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(line.to_owned());
        Ok(())
    }

    fn describe(&self) -> String {
        "capture".to_string()
    }
}

/// A facility whose only sink is a [`CaptureSink`].
///
/// ```
/// use mklog::testing::TestLog;
///
/// let log = TestLog::new("d");
/// log.facility().info("ready");
/// log.assert_line_count(1);
/// log.assert_contains("INFO: ready");
/// ```
#[derive(Debug)]
pub struct TestLog {
    facility: Facility,
    capture: CaptureSink,
}

impl TestLog {
    /// Plain (uncolored) facility at the given initial level.
    ///
    /// # Panics
    ///
    /// Panics if `min_level` is not a recognized level.
    #[must_use]
    pub fn new(min_level: &str) -> Self {
        Self::with_config(&FacilityConfig::new(min_level).stream(false).color(false))
    }

    /// Facility initialized from `config` with the capture sink appended.
    ///
    /// # Panics
    ///
    /// Panics if the config is rejected by `init`.
    #[must_use]
    pub fn with_config(config: &FacilityConfig) -> Self {
        let capture = CaptureSink::new();
        let facility = Facility::new();
        if let Err(err) = facility.init_with(config, vec![Box::new(capture.clone())]) {
            panic!("TestLog config rejected: {err}");
        }
        Self { facility, capture }
    }

    #[must_use]
    pub fn facility(&self) -> &Facility {
        &self.facility
    }

    #[must_use]
    pub fn capture(&self) -> &CaptureSink {
        &self.capture
    }

    /// Captured lines, raw.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        self.capture.lines()
    }

    /// Captured output with ANSI escapes stripped, as one string.
    #[must_use]
    pub fn output_string(&self) -> String {
        self.capture.plain_lines().concat()
    }

    #[must_use]
    pub fn contains(&self, needle: &str) -> bool {
        self.output_string().contains(needle)
    }

    /// Whether any captured line matches `pattern`.
    #[must_use]
    pub fn matches(&self, pattern: &str) -> bool {
        match regex::Regex::new(pattern) {
            Ok(re) => self.capture.plain_lines().iter().any(|l| re.is_match(l)),
            Err(_) => false,
        }
    }

    /// # Panics
    ///
    /// Panics if the output does not contain `needle`.
    pub fn assert_contains(&self, needle: &str) {
        assert!(
            self.contains(needle),
            "Output did not contain '{}'. Actual output:\n{}",
            needle,
            self.output_string()
        );
    }

    /// # Panics
    ///
    /// Panics if the output contains `needle`.
    pub fn assert_not_contains(&self, needle: &str) {
        assert!(
            !self.contains(needle),
            "Output unexpectedly contained '{}'. Actual output:\n{}",
            needle,
            self.output_string()
        );
    }

    /// # Panics
    ///
    /// Panics if the number of captured lines differs.
    pub fn assert_line_count(&self, expected: usize) {
        let actual = self.lines().len();
        assert_eq!(
            actual,
            expected,
            "Expected {} lines but got {}. Actual output:\n{}",
            expected,
            actual,
            self.output_string()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_buffer() {
        let capture = CaptureSink::new();
        let mut writer = capture.clone();
        writer.write_line("INFO: x\n").unwrap();
        assert_eq!(capture.lines(), vec!["INFO: x\n"]);
        capture.clear();
        assert!(writer.lines().is_empty());
    }

    #[test]
    fn plain_lines_strip_color() {
        let log = TestLog::with_config(&FacilityConfig::new("d").stream(false).color(true));
        log.facility().warning("careful");
        assert!(log.lines()[0].starts_with("\x1b["));
        assert_eq!(log.capture().plain_lines(), vec!["WARNING: careful\n"]);
    }

    #[test]
    fn assertions() {
        let log = TestLog::new("i");
        log.facility().debug("hidden");
        log.facility().error("shown");
        log.assert_line_count(1);
        log.assert_contains("ERROR: shown");
        log.assert_not_contains("hidden");
        assert!(log.matches(r"^ERROR: \w+\n$"));
        assert!(!log.matches("("));
    }
}
