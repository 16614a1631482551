//! Severity model.
//!
//! Four named severities are ordered by a numeric rank:
//!
//! | Severity  | Rank | Mnemonic |
//! |-----------|------|----------|
//! | `DEBUG`   | 10   | `d`      |
//! | `INFO`    | 20   | `i`      |
//! | `WARNING` | 30   | `w`      |
//! | `ERROR`   | 40   | `e`      |
//!
//! Filtering always compares ranks through [`Level`], so thresholds between
//! the named ranks (e.g. `15`) are expressible even though they have no name.

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// One of the four named severities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Debug,
    Info,
    Warning,
    Error,
}

impl Severity {
    /// All severities, lowest rank first.
    pub const ALL: [Severity; 4] = [
        Severity::Debug,
        Severity::Info,
        Severity::Warning,
        Severity::Error,
    ];

    /// Numeric rank used for filtering.
    #[must_use]
    pub const fn rank(self) -> u32 {
        match self {
            Severity::Debug => 10,
            Severity::Info => 20,
            Severity::Warning => 30,
            Severity::Error => 40,
        }
    }

    /// Canonical uppercase name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Severity::Debug => "DEBUG",
            Severity::Info => "INFO",
            Severity::Warning => "WARNING",
            Severity::Error => "ERROR",
        }
    }

    /// Single-letter mnemonic accepted when initializing a facility.
    #[must_use]
    pub const fn mnemonic(self) -> &'static str {
        match self {
            Severity::Debug => "d",
            Severity::Info => "i",
            Severity::Warning => "w",
            Severity::Error => "e",
        }
    }

    /// Resolve a canonical name. Matching is case-sensitive.
    pub fn from_name(name: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|sev| sev.name() == name)
            .ok_or_else(|| Error::unknown_severity(name))
    }

    /// Resolve a rank back to its named severity.
    pub fn from_rank(rank: u32) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|sev| sev.rank() == rank)
            .ok_or_else(|| Error::unknown_severity(rank))
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Severity {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_name(s)
    }
}

/// A rank used as an event severity or as a filtering threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Level(u32);

impl Level {
    pub const DEBUG: Level = Level(Severity::Debug.rank());
    pub const INFO: Level = Level(Severity::Info.rank());
    pub const WARNING: Level = Level(Severity::Warning.rank());
    pub const ERROR: Level = Level(Severity::Error.rank());

    /// A level at an arbitrary rank.
    #[must_use]
    pub const fn from_rank(rank: u32) -> Self {
        Level(rank)
    }

    #[must_use]
    pub const fn rank(self) -> u32 {
        self.0
    }

    /// The named severity at exactly this rank, if any.
    #[must_use]
    pub fn severity(self) -> Option<Severity> {
        Severity::from_rank(self.0).ok()
    }

    /// Display name: the severity name, or `Level <rank>` for unnamed ranks.
    #[must_use]
    pub fn name(self) -> Cow<'static, str> {
        match self.severity() {
            Some(sev) => Cow::Borrowed(sev.name()),
            None => Cow::Owned(format!("Level {}", self.0)),
        }
    }

    /// Whether an event at `self` passes a `threshold`.
    #[must_use]
    pub fn passes(self, threshold: Level) -> bool {
        self.0 >= threshold.0
    }

    /// Parse the initial threshold given to `init`.
    ///
    /// Accepts the mnemonics `d`, `i`, `w`, `e`, the canonical names, and the
    /// canonical names in lowercase.
    pub fn parse_initial(value: &str) -> Result<Self> {
        Severity::ALL
            .into_iter()
            .find(|sev| {
                value == sev.mnemonic()
                    || value == sev.name()
                    || value == sev.name().to_ascii_lowercase()
            })
            .map(Level::from)
            .ok_or_else(|| Error::unknown_severity(value))
    }
}

impl From<Severity> for Level {
    fn from(sev: Severity) -> Self {
        Level(sev.rank())
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

impl FromStr for Level {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Severity::from_name(s).map(Level::from)
    }
}

/// Conversion accepted by level-configuration calls: a rank or a name.
pub trait IntoLevel {
    fn into_level(self) -> Result<Level>;
}

impl IntoLevel for Level {
    fn into_level(self) -> Result<Level> {
        Ok(self)
    }
}

impl IntoLevel for Severity {
    fn into_level(self) -> Result<Level> {
        Ok(self.into())
    }
}

impl IntoLevel for u32 {
    fn into_level(self) -> Result<Level> {
        Ok(Level::from_rank(self))
    }
}

impl IntoLevel for &str {
    fn into_level(self) -> Result<Level> {
        self.parse()
    }
}

impl IntoLevel for String {
    fn into_level(self) -> Result<Level> {
        self.as_str().parse()
    }
}

impl IntoLevel for &String {
    fn into_level(self) -> Result<Level> {
        self.as_str().parse()
    }
}

/// Map a `log` crate level onto a rank. `Trace` sits below `DEBUG`.
impl From<log::Level> for Level {
    fn from(level: log::Level) -> Self {
        match level {
            log::Level::Error => Level::ERROR,
            log::Level::Warn => Level::WARNING,
            log::Level::Info => Level::INFO,
            log::Level::Debug => Level::DEBUG,
            log::Level::Trace => Level(5),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_ordering_follows_rank() {
        assert!(Severity::Debug < Severity::Info);
        assert!(Severity::Info < Severity::Warning);
        assert!(Severity::Warning < Severity::Error);
        for pair in Severity::ALL.windows(2) {
            assert!(pair[0].rank() < pair[1].rank());
        }
    }

    #[test]
    fn name_and_rank_are_inverse() {
        for sev in Severity::ALL {
            assert_eq!(Severity::from_name(sev.name()).unwrap(), sev);
            assert_eq!(Severity::from_rank(sev.rank()).unwrap(), sev);
        }
    }

    #[test]
    fn names_are_case_sensitive() {
        assert!(matches!(
            Severity::from_name("info"),
            Err(Error::UnknownSeverity(name)) if name == "info"
        ));
        assert!(Severity::from_name("VERBOSE").is_err());
    }

    #[test]
    fn unnamed_rank_is_rejected_by_severity_but_not_level() {
        assert!(Severity::from_rank(15).is_err());
        let level = Level::from_rank(15);
        assert_eq!(level.name(), "Level 15");
        assert!(level.passes(Level::DEBUG));
        assert!(!level.passes(Level::INFO));
    }

    #[test]
    fn passes_is_rank_comparison() {
        for emit in Severity::ALL {
            for threshold in Severity::ALL {
                assert_eq!(
                    Level::from(emit).passes(threshold.into()),
                    emit.rank() >= threshold.rank()
                );
            }
        }
    }

    #[test]
    fn parse_initial_accepts_mnemonics_and_names() {
        assert_eq!(Level::parse_initial("d").unwrap(), Level::DEBUG);
        assert_eq!(Level::parse_initial("i").unwrap(), Level::INFO);
        assert_eq!(Level::parse_initial("w").unwrap(), Level::WARNING);
        assert_eq!(Level::parse_initial("e").unwrap(), Level::ERROR);
        assert_eq!(Level::parse_initial("WARNING").unwrap(), Level::WARNING);
        assert_eq!(Level::parse_initial("warning").unwrap(), Level::WARNING);
        assert!(Level::parse_initial("x").is_err());
        assert!(Level::parse_initial("Warning").is_err());
    }

    #[test]
    fn into_level_from_rank_and_name() {
        assert_eq!(20u32.into_level().unwrap(), Level::INFO);
        assert_eq!("ERROR".into_level().unwrap(), Level::ERROR);
        assert!("error".into_level().is_err());
        assert_eq!(Severity::Debug.into_level().unwrap(), Level::DEBUG);
    }

    #[test]
    fn log_levels_map_onto_ranks() {
        assert_eq!(Level::from(log::Level::Warn), Level::WARNING);
        assert!(Level::from(log::Level::Trace) < Level::DEBUG);
    }
}
