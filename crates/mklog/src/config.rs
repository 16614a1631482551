//! Facility configuration.
//!
//! [`FacilityConfig`] carries everything `Facility::init` needs, plus the
//! detail/time settings applied afterwards by `Facility::from_config`. It can
//! be built in code, read from the environment, or parsed from TOML.

use std::env;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::detection::{color_enabled, parse_flag};
use crate::error::Result;
use crate::sink::FileMode;

/// Configuration for one `init` of a facility.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FacilityConfig {
    /// Initial threshold: mnemonic (`d`/`i`/`w`/`e`) or name.
    pub min_level: String,
    /// Attach a stderr sink.
    pub stream: bool,
    /// Attach a file sink at this path.
    pub log_file_path: Option<PathBuf>,
    /// How the file sink opens its path.
    pub log_file_mode: FileMode,
    /// Wrap lines in the gray color span. Off unless set explicitly or by
    /// `from_env` for a stderr stream.
    pub color: bool,
    /// Detail level applied after init (0, 1 or 2).
    pub detail: u8,
    /// Timestamp prefix applied after init.
    pub time: bool,
}

impl Default for FacilityConfig {
    fn default() -> Self {
        Self {
            min_level: "w".to_string(),
            stream: true,
            log_file_path: None,
            log_file_mode: FileMode::Truncate,
            color: false,
            detail: 0,
            time: false,
        }
    }
}

impl FacilityConfig {
    /// Defaults with the given initial threshold.
    pub fn new(min_level: impl Into<String>) -> Self {
        Self {
            min_level: min_level.into(),
            ..Self::default()
        }
    }

    /// Configuration from environment variables.
    ///
    /// | Variable | Values | Description |
    /// |----------|--------|-------------|
    /// | `MKLOG_LEVEL` | d/i/w/e or a severity name | Initial threshold |
    /// | `MKLOG_FILE` | path | Attach a file sink |
    /// | `MKLOG_FILE_MODE` | w/a | Truncate or append |
    /// | `MKLOG_STREAM` | 0/1 | Attach the stderr sink |
    /// | `MKLOG_DETAIL` | 0/1/2 | Detail level |
    /// | `MKLOG_TIME` | 0/1 | Timestamp prefix |
    /// | `MKLOG_COLOR` | 0/1 | Force color on/off |
    /// | `NO_COLOR` | (set) | Disable color |
    ///
    /// Color is enabled only when the stderr stream is attached and
    /// [`color_enabled`] allows it, so file-only output stays plain.
    ///
    /// Unparseable values fall back to the defaults; an unknown level is
    /// reported when the config is used by `init`.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(level) = env::var("MKLOG_LEVEL") {
            config.min_level = level;
        }
        if let Some(path) = env::var_os("MKLOG_FILE") {
            config.log_file_path = Some(PathBuf::from(path));
        }
        if let Ok(mode) = env::var("MKLOG_FILE_MODE") {
            if let Ok(mode) = mode.parse() {
                config.log_file_mode = mode;
            }
        }
        if let Some(stream) = env::var("MKLOG_STREAM").ok().as_deref().and_then(parse_flag) {
            config.stream = stream;
        }
        if let Some(detail) = env::var("MKLOG_DETAIL").ok().and_then(|v| v.trim().parse().ok()) {
            config.detail = detail;
        }
        if let Some(time) = env::var("MKLOG_TIME").ok().as_deref().and_then(parse_flag) {
            config.time = time;
        }
        config.color = config.stream && color_enabled();

        config
    }

    /// Parse the `[log]` table of a TOML document onto the defaults.
    ///
    /// ```toml
    /// [log]
    /// level = "i"
    /// file = "app.log"
    /// file_mode = "a"
    /// stream = false
    /// color = false
    /// detail = 2
    /// time = true
    /// ```
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let file: ConfigFile = toml::from_str(text)?;
        Ok(file.log.apply(Self::default()))
    }

    // ─────────────────────────────────────────────────
    // Builder Methods
    // ─────────────────────────────────────────────────

    #[must_use]
    pub fn min_level(mut self, level: impl Into<String>) -> Self {
        self.min_level = level.into();
        self
    }

    #[must_use]
    pub fn stream(mut self, stream: bool) -> Self {
        self.stream = stream;
        self
    }

    #[must_use]
    pub fn log_file(mut self, path: impl AsRef<Path>, mode: FileMode) -> Self {
        self.log_file_path = Some(path.as_ref().to_path_buf());
        self.log_file_mode = mode;
        self
    }

    #[must_use]
    pub fn without_log_file(mut self) -> Self {
        self.log_file_path = None;
        self
    }

    #[must_use]
    pub fn color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    #[must_use]
    pub fn detail(mut self, detail: u8, time: bool) -> Self {
        self.detail = detail;
        self.time = time;
        self
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    #[serde(default)]
    log: LogTable,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct LogTable {
    level: Option<String>,
    stream: Option<bool>,
    file: Option<PathBuf>,
    file_mode: Option<FileMode>,
    color: Option<bool>,
    detail: Option<u8>,
    time: Option<bool>,
}

impl LogTable {
    fn apply(self, mut config: FacilityConfig) -> FacilityConfig {
        if let Some(level) = self.level {
            config.min_level = level;
        }
        if let Some(stream) = self.stream {
            config.stream = stream;
        }
        if self.file.is_some() {
            config.log_file_path = self.file;
        }
        if let Some(mode) = self.file_mode {
            config.log_file_mode = mode;
        }
        if let Some(color) = self.color {
            config.color = color;
        }
        if let Some(detail) = self.detail {
            config.detail = detail;
        }
        if let Some(time) = self.time {
            config.time = time;
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn test_default_config() {
        let config = FacilityConfig::default();
        assert_eq!(config.min_level, "w");
        assert!(config.stream);
        assert_eq!(config.log_file_path, None);
        assert_eq!(config.log_file_mode, FileMode::Truncate);
        assert_eq!(config.detail, 0);
        assert!(!config.time);
        assert!(!config.color);
    }

    #[test]
    fn test_builder_pattern() {
        let config = FacilityConfig::new("d")
            .stream(false)
            .log_file("/tmp/x.log", FileMode::Append)
            .color(true)
            .detail(2, true);

        assert_eq!(config.min_level, "d");
        assert!(!config.stream);
        assert_eq!(config.log_file_path, Some(PathBuf::from("/tmp/x.log")));
        assert_eq!(config.log_file_mode, FileMode::Append);
        assert!(config.color);
        assert_eq!(config.detail, 2);
        assert!(config.time);
        assert_eq!(config.without_log_file().log_file_path, None);
    }

    #[test]
    fn test_from_toml() {
        let config = FacilityConfig::from_toml_str(
            r#"
            [log]
            level = "i"
            file = "app.log"
            file_mode = "a"
            stream = false
            color = false
            detail = 2
            time = true
            "#,
        )
        .unwrap();

        assert_eq!(config.min_level, "i");
        assert_eq!(config.log_file_path, Some(PathBuf::from("app.log")));
        assert_eq!(config.log_file_mode, FileMode::Append);
        assert!(!config.stream);
        assert!(!config.color);
        assert_eq!(config.detail, 2);
        assert!(config.time);
    }

    #[test]
    fn test_from_toml_empty_uses_defaults() {
        let config = FacilityConfig::from_toml_str("").unwrap();
        assert_eq!(config.min_level, "w");
        assert!(config.stream);
    }

    #[test]
    fn test_from_toml_rejects_bad_values() {
        assert!(matches!(
            FacilityConfig::from_toml_str("[log]\nfile_mode = \"x\"\n"),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            FacilityConfig::from_toml_str("[log]\nlevle = \"d\"\n"),
            Err(Error::Config(_))
        ));
    }
}
