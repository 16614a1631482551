//! `log` crate integration.
//!
//! [`LogBridge`] implements [`log::Log`] so records from `log::info!` and
//! friends (including those of dependencies) are filtered and rendered by a
//! [`Facility`].
//!
//! ```no_run
//! use std::sync::Arc;
//! use mklog::{Facility, FacilityConfig, LogBridge};
//!
//! let facility = Arc::new(Facility::from_config(&FacilityConfig::new("i"))?);
//! LogBridge::new(facility.clone()).init()?;
//! log::info!("routed through mklog");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::sync::Arc;

use log::{LevelFilter, Log, Metadata, Record};

use crate::event::{UNKNOWN_FUNCTION, module_of};
use crate::facility::Facility;
use crate::level::Level;

/// Records whose target starts with this prefix come from mklog itself and
/// are never routed back into a facility.
const OWN_TARGET: &str = "mklog";

/// Routes `log` records into a [`Facility`].
#[derive(Debug, Clone)]
pub struct LogBridge {
    facility: Arc<Facility>,
}

impl LogBridge {
    #[must_use]
    pub fn new(facility: Arc<Facility>) -> Self {
        Self { facility }
    }

    #[must_use]
    pub fn facility(&self) -> &Arc<Facility> {
        &self.facility
    }

    /// Install as the global `log` logger.
    ///
    /// The `log` max level is left fully open; the facility's threshold does
    /// the filtering, so later `set_level` calls take effect immediately.
    pub fn init(self) -> Result<(), log::SetLoggerError> {
        log::set_boxed_logger(Box::new(self))?;
        log::set_max_level(LevelFilter::Trace);
        Ok(())
    }

    /// Install, ignoring errors if a logger is already set.
    pub fn try_init(self) {
        let _ = self.init();
    }

    fn is_own(target: &str) -> bool {
        target == OWN_TARGET || target.starts_with("mklog::")
    }
}

impl Log for LogBridge {
    fn enabled(&self, metadata: &Metadata) -> bool {
        !Self::is_own(metadata.target()) && self.facility.enabled(Level::from(metadata.level()))
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let message = record.args().to_string();
        let module = record
            .file()
            .map(module_of)
            .unwrap_or_else(|| record.target());
        self.facility.dispatch_record(
            record.target(),
            Level::from(record.level()),
            module,
            UNKNOWN_FUNCTION,
            record.line().unwrap_or(0),
            &message,
        );
    }

    fn flush(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FacilityConfig;
    use crate::testing::CaptureSink;

    fn bridge() -> (LogBridge, CaptureSink) {
        let capture = CaptureSink::new();
        let facility = Facility::new();
        facility
            .init_with(
                &FacilityConfig::new("i").stream(false).color(false),
                vec![Box::new(capture.clone())],
            )
            .unwrap();
        (LogBridge::new(Arc::new(facility)), capture)
    }

    #[test]
    fn enabled_follows_facility_threshold() {
        let (bridge, _capture) = bridge();
        let meta = |level| Metadata::builder().level(level).target("app").build();
        assert!(bridge.enabled(&meta(log::Level::Error)));
        assert!(bridge.enabled(&meta(log::Level::Info)));
        assert!(!bridge.enabled(&meta(log::Level::Debug)));
        assert!(!bridge.enabled(&meta(log::Level::Trace)));

        bridge.facility().set_level(Level::DEBUG).unwrap();
        assert!(bridge.enabled(&meta(log::Level::Debug)));
    }

    #[test]
    fn own_targets_are_ignored() {
        let (bridge, _capture) = bridge();
        let meta = Metadata::builder()
            .level(log::Level::Error)
            .target("mklog::sink")
            .build();
        assert!(!bridge.enabled(&meta));
    }

    #[test]
    fn record_is_rendered_with_target_as_path() {
        let (bridge, capture) = bridge();
        bridge.facility().set_detail(2, false);
        bridge.log(
            &Record::builder()
                .args(format_args!("hello {}", 1))
                .level(log::Level::Warn)
                .target("app::db")
                .file(Some("src/db.rs"))
                .line(Some(7))
                .build(),
        );
        assert_eq!(capture.lines(), vec!["WARNING: app::db:db::?: hello 1\n"]);
    }
}
