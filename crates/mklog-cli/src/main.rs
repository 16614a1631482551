//! mklog CLI - write log events from the shell.
//!
//! Commands:
//! - `emit` - Write one event through a configured facility
//! - `levels` - Print the severity table

#![forbid(unsafe_code)]

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use mklog::detection::color_enabled;
use mklog::{Facility, FacilityConfig, FileMode, Level, LogBridge, Severity};

/// mklog CLI - Severity-filtered logging from the command line.
#[derive(Parser)]
#[command(name = "mklog")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Initial threshold (d, i, w, e, or a severity name).
    #[arg(
        long = "log-level",
        short = 'l',
        global = true,
        default_value = "warning",
        env = "MKLOG_LEVEL"
    )]
    log_level: String,

    /// Also write events to this file.
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// Append to the log file instead of truncating it.
    #[arg(long, global = true, requires = "log_file")]
    append: bool,

    /// Force colored output (stderr color is detected otherwise).
    #[arg(long, global = true, overrides_with = "no_color")]
    color: bool,

    /// Disable colored output.
    #[arg(long, global = true, overrides_with = "color")]
    no_color: bool,

    /// Detail level (0, 1 or 2).
    #[arg(long, global = true, default_value_t = 0, value_parser = clap::value_parser!(u8).range(0..=2))]
    detail: u8,

    /// Prefix each line with a timestamp.
    #[arg(long, global = true)]
    time: bool,

    /// Do not write to stderr.
    #[arg(long, short = 'q', global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write one event.
    ///
    /// LEVEL is a severity name, a mnemonic (d, i, w, e), or a numeric rank.
    Emit {
        /// Severity of the event.
        level: String,

        /// Message text.
        message: String,
    },

    /// Print the severity table (name, rank, mnemonic).
    Levels,
}

impl Cli {
    fn facility_config(&self) -> FacilityConfig {
        let color = if self.color {
            true
        } else if self.no_color {
            false
        } else {
            !self.quiet && color_enabled()
        };
        let mode = if self.append {
            FileMode::Append
        } else {
            FileMode::Truncate
        };

        let mut config = FacilityConfig::new(self.log_level.as_str())
            .stream(!self.quiet)
            .color(color)
            .detail(self.detail, self.time);
        if let Some(path) = &self.log_file {
            config = config.log_file(path, mode);
        }
        config
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> mklog::Result<()> {
    let facility = Arc::new(Facility::from_config(&cli.facility_config())?);
    LogBridge::new(Arc::clone(&facility)).try_init();
    log::debug!(
        target: "mklog_cli",
        "threshold {} with {} sink(s)",
        facility.level(),
        facility.sink_count()
    );

    let result = match &cli.command {
        Commands::Emit { level, message } => cmd_emit(&facility, level, message),
        Commands::Levels => {
            cmd_levels();
            Ok(())
        }
    };
    facility.shutdown();
    result
}

/// Emit command: write one event at the given level.
fn cmd_emit(facility: &Facility, level: &str, message: &str) -> mklog::Result<()> {
    let level = match level.parse::<u32>() {
        Ok(rank) => Level::from_rank(rank),
        Err(_) => Level::parse_initial(level)?,
    };
    mklog::emit!(facility, level, "{message}");

    for failure in facility.sink_failures() {
        eprintln!("Warning: {} failed: {}", failure.sink, failure.message);
    }
    Ok(())
}

/// Levels command: print each severity with its rank and mnemonic.
fn cmd_levels() {
    for severity in Severity::ALL {
        println!(
            "{:<8} {:>3}  {}",
            severity.name(),
            severity.rank(),
            severity.mnemonic()
        );
    }
}
