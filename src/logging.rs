//! Application logging
//!
//! Script edits and pipeline steps are reported through the `log` macros.
//! The terminal gets the bare message coloured by level; the application
//! log file gets a timestamped copy. Output of the IMOD programs themselves
//! goes to the per-run reconstruction log, never through here.

use std::path::Path;

use anyhow::Result;
use chrono::SecondsFormat;
use fern::Dispatch;
use fern::colors::{Color, ColoredLevelConfig};
use log::LevelFilter;

/// How much of the run is reported
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Edited script lines, pipeline steps and the final volume
    Info,
    /// Also file discovery and external program start-up
    Debug,
    /// Also exit statuses of every external program
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(self) -> LevelFilter {
        match self {
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }

    /// Level selected by repeating `-v`
    pub fn from_occurrences(occurrences: u8) -> Self {
        match occurrences {
            0 => LogLevel::Info,
            1 => LogLevel::Debug,
            _ => LogLevel::Trace,
        }
    }
}

fn terminal_colors() -> ColoredLevelConfig {
    ColoredLevelConfig::new()
        .error(Color::Red)
        .warn(Color::Yellow)
        .info(Color::White)
        .debug(Color::White)
        .trace(Color::BrightBlack)
}

/// Installs the global logger
///
/// When `log_file` is given it is opened in append mode, so consecutive
/// runs accumulate in the same file.
pub fn init_logger(verbosity: LogLevel, log_file: Option<&Path>) -> Result<()> {
    let level = verbosity.to_level_filter();
    let colors = terminal_colors();

    let terminal = Dispatch::new()
        .format(move |out, message, record| {
            out.finish(format_args!(
                "\x1B[{}m{}\x1B[0m",
                colors.get_color(&record.level()).to_fg_str(),
                message
            ))
        })
        .chain(std::io::stdout());

    let mut dispatch = Dispatch::new().level(level).chain(terminal);

    if let Some(path) = log_file {
        let file = Dispatch::new()
            .format(|out, message, record| {
                out.finish(format_args!(
                    "[{} {} {}] {}",
                    chrono::Local::now().to_rfc3339_opts(SecondsFormat::Secs, true),
                    record.level(),
                    record.target(),
                    message
                ))
            })
            .chain(fern::log_file(path)?);
        dispatch = dispatch.chain(file);
    }

    dispatch.apply()?;
    log::debug!("Logging at {verbosity:?} level");

    Ok(())
}
