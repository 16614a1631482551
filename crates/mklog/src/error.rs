//! Error types for the logging facility.

use std::fmt;
use std::io;

use crate::args::BindingError;

/// Errors raised by configuration calls and decorated calls.
///
/// Emit operations never return this type: a filtered event is a no-op and a
/// failing sink is recorded, not raised.
#[derive(Debug)]
pub enum Error {
    /// A severity name, mnemonic, or rank outside the recognized set.
    UnknownSeverity(String),
    /// A decorated call did not match the wrapped callable's parameters.
    ArgumentBinding(BindingError),
    /// A sink could not be opened.
    SinkIo {
        /// Human-readable sink description (`stderr`, `file:/tmp/x.log`).
        sink: String,
        /// Underlying I/O failure.
        source: io::Error,
    },
    /// A configuration value could not be parsed.
    Config(String),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn unknown_severity(value: impl fmt::Display) -> Self {
        Error::UnknownSeverity(value.to_string())
    }

    pub(crate) fn sink_io(sink: impl Into<String>, source: io::Error) -> Self {
        Error::SinkIo {
            sink: sink.into(),
            source,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::UnknownSeverity(value) => write!(f, "unknown severity: {value:?}"),
            Error::ArgumentBinding(err) => write!(f, "argument binding failed: {err}"),
            Error::SinkIo { sink, source } => write!(f, "sink {sink} failed: {source}"),
            Error::Config(msg) => write!(f, "invalid configuration: {msg}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::ArgumentBinding(err) => Some(err),
            Error::SinkIo { source, .. } => Some(source),
            Error::UnknownSeverity(_) | Error::Config(_) => None,
        }
    }
}

impl From<BindingError> for Error {
    fn from(err: BindingError) -> Self {
        Error::ArgumentBinding(err)
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn unknown_severity_display() {
        let err = Error::unknown_severity("VERBOSE");
        assert_eq!(err.to_string(), "unknown severity: \"VERBOSE\"");
        assert!(err.source().is_none());
    }

    #[test]
    fn sink_io_exposes_source() {
        let err = Error::sink_io(
            "file:/nope/x.log",
            io::Error::new(io::ErrorKind::NotFound, "missing"),
        );
        assert!(err.to_string().contains("file:/nope/x.log"));
        assert!(err.source().is_some());
    }

    #[test]
    fn binding_error_converts() {
        let err: Error = BindingError::UnexpectedKeyword {
            callable: "f".into(),
            name: "z".into(),
        }
        .into();
        assert!(matches!(err, Error::ArgumentBinding(_)));
        assert!(err.source().is_some());
    }
}
