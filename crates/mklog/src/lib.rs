//! Severity-filtered logging facility.
//!
//! - [`Facility`] holds the threshold, render settings, and sinks
//! - [`render`](render::render) turns an event into one text line
//! - [`log_args`] / `#[log_args]` log a call's bound arguments
//! - [`LogBridge`] routes `log` crate records through a facility
//!
//! # Example
//!
//! ```no_run
//! use mklog::{Facility, FacilityConfig, FileMode, Level};
//!
//! let log = Facility::new();
//! log.init(
//!     &FacilityConfig::new("i")
//!         .stream(false)
//!         .log_file("app.log", FileMode::Append)
//!         .color(false),
//! )?;
//! log.set_detail(2, true);
//!
//! // The macros record the enclosing function for detail 2; the
//! // `log.info(..)` methods record it as `?`.
//! mklog::info!(log, "started");
//!
//! #[mklog::log_args(DEBUG, facility = log)]
//! fn connect(log: &Facility, host: &str, port: u16) {
//!     let _ = (host, port);
//! }
//!
//! log.set_level(Level::DEBUG)?;
//! connect(&log, "db", 5432); // DEBUG: ... connect(host='db', port=5432)
//! # Ok::<(), mklog::Error>(())
//! ```

#![forbid(unsafe_code)]

extern crate self as mklog;

pub mod args;
mod bridge;
pub mod config;
pub mod detection;
mod error;
pub mod event;
pub mod facility;
pub mod level;
mod macros;
pub mod render;
pub mod sink;
pub mod testing;

pub use args::{
    ArgLogger, ArgValue, BindingError, BoundCall, CallArgs, LoggedFn, Param, Signature,
    ToArgValue, log_args,
};
pub use bridge::LogBridge;
pub use config::FacilityConfig;
pub use error::{Error, Result};
pub use event::{CallSite, LogEvent};
pub use facility::{Facility, Logger, SinkFailure, global};
pub use level::{IntoLevel, Level, Severity};
pub use render::{Detail, RenderOptions};
pub use sink::{FileMode, FileSink, Sink, StreamSink};

/// Attribute form of [`log_args()`](args::log_args) for ordinary functions.
///
/// ```ignore
/// #[log_args]                                   // DEBUG, all parameters, global facility
/// #[log_args(INFO)]                             // named level
/// #[log_args(level = 15, args(user))]           // rank, selected parameters
/// #[log_args(WARNING, facility = self.log)]     // explicit facility expression
/// ```
pub use mklog_macros::log_args;
