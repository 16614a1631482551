//! The log facility: threshold, render settings, and the active sinks.
//!
//! A [`Facility`] is an ordinary value. Construct one at start-up and hand
//! references to the code that logs; tests build their own instance. For call
//! sites that cannot take an injected reference, [`global`] provides a
//! process-wide instance configured from the environment.
//!
//! The emit methods (`info`, `debug`, ...) know the caller's file and line
//! but not its function, so at detail 2 they render `root:<module>::?: msg`.
//! Use the [`info!`](macro@crate::info) family of macros where the function
//! name matters.
//!
//! # Example
//!
//! ```no_run
//! use mklog::{Facility, FacilityConfig, FileMode};
//!
//! let log = Facility::new();
//! log.init(
//!     &FacilityConfig::new("i")
//!         .stream(false)
//!         .log_file("/tmp/app.log", FileMode::Truncate),
//! )?;
//!
//! log.info("hello");
//! log.debug("hidden");
//! log.set_level(mklog::Level::DEBUG)?;
//! mklog::debug!(log, "now visible: {}", 42);
//! # Ok::<(), mklog::Error>(())
//! ```

use std::fmt;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, OnceLock, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Local;

use crate::config::FacilityConfig;
use crate::error::Result;
use crate::event::{CallSite, LogEvent};
use crate::level::{IntoLevel, Level};
use crate::render::{Detail, RenderOptions, render_with};
use crate::sink::{FileSink, Sink, StreamSink};

/// Logger path used when emitting directly through a [`Facility`].
pub const ROOT_PATH: &str = "root";

/// A sink write that failed; the sink stays disabled until the next `init`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkFailure {
    pub sink: String,
    pub kind: io::ErrorKind,
    pub message: String,
}

struct SinkSlot {
    sink: Mutex<Box<dyn Sink>>,
    failed: AtomicBool,
}

impl SinkSlot {
    fn new(sink: Box<dyn Sink>) -> Self {
        Self {
            sink: Mutex::new(sink),
            failed: AtomicBool::new(false),
        }
    }

    fn close(self) {
        let mut sink = self.sink.into_inner().unwrap_or_else(PoisonError::into_inner);
        if let Err(err) = sink.flush() {
            log::debug!(target: "mklog::sink", "flush of {} on close failed: {}", sink.describe(), err);
        }
    }
}

struct FacilityState {
    threshold: Level,
    options: RenderOptions,
    sinks: Vec<SinkSlot>,
}

impl Default for FacilityState {
    fn default() -> Self {
        Self {
            threshold: Level::WARNING,
            options: RenderOptions::default(),
            sinks: Vec::new(),
        }
    }
}

/// Severity-filtered, multi-sink log facility.
pub struct Facility {
    state: RwLock<FacilityState>,
    failures: Mutex<Vec<SinkFailure>>,
}

impl Default for Facility {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Facility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.read();
        f.debug_struct("Facility")
            .field("threshold", &state.threshold)
            .field("options", &state.options)
            .field(
                "sinks",
                &state
                    .sinks
                    .iter()
                    .map(|slot| slot.sink.lock().map(|s| s.describe()).unwrap_or_default())
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl Facility {
    /// Facility with threshold `WARNING`, detail 0, no color, and no sinks.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: RwLock::new(FacilityState::default()),
            failures: Mutex::new(Vec::new()),
        }
    }

    /// Create and [`init`](Self::init), then apply the config's detail/time.
    pub fn from_config(config: &FacilityConfig) -> Result<Self> {
        let facility = Self::new();
        facility.init(config)?;
        facility.set_detail(config.detail, config.time);
        Ok(facility)
    }

    /// Replace the whole configuration.
    ///
    /// Resolves the threshold from `config.min_level` (mnemonic or name),
    /// attaches a stderr sink iff `config.stream`, and a file sink iff a path
    /// is given. Detail resets to 0 and time to off. Previously active sinks
    /// are flushed and closed. If the level is unknown or a sink cannot be
    /// opened, the previous configuration is left untouched.
    pub fn init(&self, config: &FacilityConfig) -> Result<()> {
        self.init_with(config, Vec::new())
    }

    /// Like [`init`](Self::init), registering `extra` sinks after the
    /// stream and file sinks.
    pub fn init_with(&self, config: &FacilityConfig, extra: Vec<Box<dyn Sink>>) -> Result<()> {
        let threshold = Level::parse_initial(&config.min_level)?;

        let mut sinks: Vec<Box<dyn Sink>> = Vec::new();
        if config.stream {
            sinks.push(Box::new(StreamSink::stderr()));
        }
        if let Some(path) = &config.log_file_path {
            sinks.push(Box::new(FileSink::open(path, config.log_file_mode)?));
        }
        sinks.extend(extra);

        let next = FacilityState {
            threshold,
            options: RenderOptions {
                detail: Detail::Minimal,
                time: false,
                color: config.color,
            },
            sinks: sinks.into_iter().map(SinkSlot::new).collect(),
        };
        let sink_count = next.sinks.len();

        let previous = std::mem::replace(&mut *self.write(), next);
        self.failures
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        previous.sinks.into_iter().for_each(SinkSlot::close);

        log::debug!(
            target: "mklog::facility",
            "initialized: threshold={} sinks={} color={}",
            threshold,
            sink_count,
            config.color
        );
        Ok(())
    }

    /// Change only the threshold.
    pub fn set_level(&self, level: impl IntoLevel) -> Result<()> {
        let level = level.into_level()?;
        self.write().threshold = level;
        Ok(())
    }

    /// Change only the detail level and timestamp flag.
    pub fn set_detail(&self, detail: u8, time: bool) {
        let mut state = self.write();
        state.options.detail = Detail::from_level(detail);
        state.options.time = time;
    }

    /// Current threshold.
    #[must_use]
    pub fn level(&self) -> Level {
        self.read().threshold
    }

    /// Current render settings.
    #[must_use]
    pub fn render_options(&self) -> RenderOptions {
        self.read().options
    }

    /// Number of sinks in the current configuration.
    #[must_use]
    pub fn sink_count(&self) -> usize {
        self.read().sinks.len()
    }

    /// Whether an event at `level` would be written.
    #[must_use]
    pub fn enabled(&self, level: impl Into<Level>) -> bool {
        level.into().passes(self.read().threshold)
    }

    /// Sink write failures since the last `init`.
    #[must_use]
    pub fn sink_failures(&self) -> Vec<SinkFailure> {
        self.failures
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// A handle that emits under a different logger path.
    #[must_use]
    pub fn logger(&self, path: impl Into<String>) -> Logger<'_> {
        Logger {
            facility: self,
            path: path.into(),
        }
    }

    /// Flush and close every sink. The threshold and render settings stay.
    pub fn shutdown(&self) {
        let sinks = std::mem::take(&mut self.write().sinks);
        sinks.into_iter().for_each(SinkSlot::close);
    }

    /// Emit with an explicit call site under the root logger path.
    pub fn emit(&self, level: Level, site: &CallSite, message: &str) {
        self.dispatch(ROOT_PATH, level, site, message);
    }

    /// Emit at any level under the root path.
    ///
    /// Records the caller's file and line; the function is recorded as `?`.
    /// The `emit!` macro records the enclosing function as well.
    #[track_caller]
    pub fn log(&self, level: impl Into<Level>, message: impl AsRef<str>) {
        self.dispatch(ROOT_PATH, level.into(), &CallSite::caller(), message.as_ref());
    }

    /// Emit at `DEBUG`; the function is recorded as `?` (see [`debug!`](macro@crate::debug)).
    #[track_caller]
    pub fn debug(&self, message: impl AsRef<str>) {
        self.dispatch(ROOT_PATH, Level::DEBUG, &CallSite::caller(), message.as_ref());
    }

    /// Emit at `INFO`; the function is recorded as `?` (see [`info!`](macro@crate::info)).
    #[track_caller]
    pub fn info(&self, message: impl AsRef<str>) {
        self.dispatch(ROOT_PATH, Level::INFO, &CallSite::caller(), message.as_ref());
    }

    /// Emit at `WARNING`; the function is recorded as `?` (see [`warning!`](macro@crate::warning)).
    #[track_caller]
    pub fn warning(&self, message: impl AsRef<str>) {
        self.dispatch(ROOT_PATH, Level::WARNING, &CallSite::caller(), message.as_ref());
    }

    /// Emit at `ERROR`; the function is recorded as `?` (see [`error!`](macro@crate::error)).
    #[track_caller]
    pub fn error(&self, message: impl AsRef<str>) {
        self.dispatch(ROOT_PATH, Level::ERROR, &CallSite::caller(), message.as_ref());
    }

    pub(crate) fn dispatch(&self, path: &str, level: Level, site: &CallSite, message: &str) {
        self.dispatch_record(
            path,
            level,
            site.module(),
            site.function(),
            site.line(),
            message,
        );
    }

    /// Filter, render once, and fan out to every live sink in order.
    pub(crate) fn dispatch_record(
        &self,
        path: &str,
        level: Level,
        module: &str,
        function: &str,
        line: u32,
        message: &str,
    ) {
        let state = self.read();
        if !level.passes(state.threshold) || state.sinks.is_empty() {
            return;
        }

        let event = LogEvent {
            timestamp: Local::now(),
            level,
            path,
            module,
            function,
            line,
            message,
        };
        let line = render_with(&event, state.options);

        for slot in &state.sinks {
            if slot.failed.load(Ordering::Acquire) {
                continue;
            }
            let mut sink = slot.sink.lock().unwrap_or_else(PoisonError::into_inner);
            if let Err(err) = sink.write_line(&line) {
                slot.failed.store(true, Ordering::Release);
                let failure = SinkFailure {
                    sink: sink.describe(),
                    kind: err.kind(),
                    message: err.to_string(),
                };
                log::warn!(target: "mklog::sink", "disabling sink {}: {}", failure.sink, err);
                self.failures
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .push(failure);
            }
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, FacilityState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, FacilityState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for Facility {
    fn drop(&mut self) {
        let state = self.state.get_mut().unwrap_or_else(PoisonError::into_inner);
        std::mem::take(&mut state.sinks)
            .into_iter()
            .for_each(SinkSlot::close);
    }
}

/// Emits through a [`Facility`] under a hierarchical logger path.
///
/// Like the facility's methods, these record the function as `?`; pass a
/// `Logger` to the [`info!`](macro@crate::info) family to record it.
#[derive(Debug, Clone)]
pub struct Logger<'a> {
    facility: &'a Facility,
    path: String,
}

impl<'a> Logger<'a> {
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[must_use]
    pub fn facility(&self) -> &'a Facility {
        self.facility
    }

    /// Child logger, e.g. `root.db` -> `root.db.pool`.
    #[must_use]
    pub fn child(&self, name: &str) -> Logger<'a> {
        Logger {
            facility: self.facility,
            path: format!("{}.{}", self.path, name),
        }
    }

    #[must_use]
    pub fn enabled(&self, level: impl Into<Level>) -> bool {
        self.facility.enabled(level)
    }

    pub fn emit(&self, level: Level, site: &CallSite, message: &str) {
        self.facility.dispatch(&self.path, level, site, message);
    }

    #[track_caller]
    pub fn log(&self, level: impl Into<Level>, message: impl AsRef<str>) {
        self.emit(level.into(), &CallSite::caller(), message.as_ref());
    }

    #[track_caller]
    pub fn debug(&self, message: impl AsRef<str>) {
        self.emit(Level::DEBUG, &CallSite::caller(), message.as_ref());
    }

    #[track_caller]
    pub fn info(&self, message: impl AsRef<str>) {
        self.emit(Level::INFO, &CallSite::caller(), message.as_ref());
    }

    #[track_caller]
    pub fn warning(&self, message: impl AsRef<str>) {
        self.emit(Level::WARNING, &CallSite::caller(), message.as_ref());
    }

    #[track_caller]
    pub fn error(&self, message: impl AsRef<str>) {
        self.emit(Level::ERROR, &CallSite::caller(), message.as_ref());
    }
}

static GLOBAL: OnceLock<Arc<Facility>> = OnceLock::new();

/// Process-wide facility, configured from the environment on first use.
///
/// Falls back to an unconfigured [`Facility::new`] if the environment names
/// an unknown level or an unopenable file.
pub fn global() -> &'static Arc<Facility> {
    GLOBAL.get_or_init(|| {
        let config = FacilityConfig::from_env();
        let facility = Facility::from_config(&config).unwrap_or_else(|err| {
            log::warn!(target: "mklog::facility", "environment configuration rejected: {}", err);
            Facility::new()
        });
        Arc::new(facility)
    })
}
