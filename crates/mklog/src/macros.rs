//! Emit macros.
//!
//! Unlike the `#[track_caller]` methods on [`Facility`](crate::Facility),
//! the macros also record the enclosing function name, and they skip message
//! formatting entirely when the level is filtered out.
//!
//! The first argument is anything with `enabled`/`emit` methods: a
//! `Facility`, a reference to one, or a [`Logger`](crate::Logger).
//!
//! ```no_run
//! let log = mklog::Facility::new();
//! mklog::info!(log, "listening on {}", 8080);
//! mklog::emit!(log, mklog::Level::from_rank(15), "between debug and info");
//! ```

/// Emit at an explicit level.
#[macro_export]
macro_rules! emit {
    ($target:expr, $level:expr, $($arg:tt)+) => {{
        let __target = &$target;
        let __level: $crate::Level = ::std::convert::From::from($level);
        if __target.enabled(__level) {
            __target.emit(__level, &$crate::call_site!(), &::std::format!($($arg)+));
        }
    }};
}

#[macro_export]
macro_rules! debug {
    ($target:expr, $($arg:tt)+) => {
        $crate::emit!($target, $crate::Level::DEBUG, $($arg)+)
    };
}

#[macro_export]
macro_rules! info {
    ($target:expr, $($arg:tt)+) => {
        $crate::emit!($target, $crate::Level::INFO, $($arg)+)
    };
}

#[macro_export]
macro_rules! warning {
    ($target:expr, $($arg:tt)+) => {
        $crate::emit!($target, $crate::Level::WARNING, $($arg)+)
    };
}

#[macro_export]
macro_rules! error {
    ($target:expr, $($arg:tt)+) => {
        $crate::emit!($target, $crate::Level::ERROR, $($arg)+)
    };
}
