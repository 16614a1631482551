//! Output destinations.
//!
//! A sink receives fully rendered lines. Each line is delivered with a single
//! `write_all` and nothing is buffered across emits, so a line is on disk (or
//! on the terminal) once the emit call returns.

use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Deserialize;

use crate::error::{Error, Result};

/// A destination for rendered log lines.
pub trait Sink: Send {
    /// Write one rendered line (already `\n`-terminated).
    fn write_line(&mut self, line: &str) -> io::Result<()>;

    /// Flush any OS-level buffering.
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }

    /// Short description used in diagnostics, e.g. `stderr` or `file:/tmp/a.log`.
    fn describe(&self) -> String;
}

/// How a file sink opens its path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum FileMode {
    /// `"w"`: truncate existing content.
    #[default]
    #[serde(rename = "w")]
    Truncate,
    /// `"a"`: keep existing content and append.
    #[serde(rename = "a")]
    Append,
}

impl FileMode {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            FileMode::Truncate => "w",
            FileMode::Append => "a",
        }
    }
}

impl fmt::Display for FileMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FileMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "w" => Ok(FileMode::Truncate),
            "a" => Ok(FileMode::Append),
            other => Err(Error::Config(format!(
                "unknown file mode {other:?}, expected \"w\" or \"a\""
            ))),
        }
    }
}

/// Console stream sink; stderr unless constructed with another writer.
pub struct StreamSink {
    writer: Box<dyn Write + Send>,
    name: String,
}

impl StreamSink {
    /// Sink writing to the process's standard error.
    #[must_use]
    pub fn stderr() -> Self {
        Self::new(io::stderr(), "stderr")
    }

    /// Sink writing to an arbitrary stream.
    pub fn new<W: Write + Send + 'static>(writer: W, name: impl Into<String>) -> Self {
        Self {
            writer: Box::new(writer),
            name: name.into(),
        }
    }
}

impl fmt::Debug for StreamSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamSink").field("name", &self.name).finish()
    }
}

impl Sink for StreamSink {
    fn write_line(&mut self, line: &str) -> io::Result<()> {
        self.writer.write_all(line.as_bytes())?;
        self.writer.flush()
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }

    fn describe(&self) -> String {
        self.name.clone()
    }
}

/// File sink, open for the lifetime of one facility configuration.
#[derive(Debug)]
pub struct FileSink {
    file: File,
    path: PathBuf,
}

impl FileSink {
    /// Open `path` in the given mode, creating it if missing.
    pub fn open(path: impl AsRef<Path>, mode: FileMode) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let mut options = OpenOptions::new();
        options.create(true);
        match mode {
            FileMode::Truncate => options.write(true).truncate(true),
            FileMode::Append => options.append(true),
        };

        let file = options
            .open(&path)
            .map_err(|e| Error::sink_io(format!("file:{}", path.display()), e))?;
        log::debug!(target: "mklog::sink", "opened {} in mode {}", path.display(), mode);

        Ok(Self { file, path })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Sink for FileSink {
    fn write_line(&mut self, line: &str) -> io::Result<()> {
        self.file.write_all(line.as_bytes())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }

    fn describe(&self) -> String {
        format!("file:{}", self.path.display())
    }
}
