// ============================================================================
// clipprep-cli/src/logging.rs
// ============================================================================
//
// LOGGING SETUP: console and per-run log file
//
// Everything the core prints goes through the `log` facade. This module
// installs a `fern` dispatcher with two outputs:
// - the console: bare messages, info to stdout and warnings/errors to stderr,
//   debug lines only with --verbose
// - a log file per run: timestamped, levelled, with ANSI styling removed

use crate::config::LOG_FILE_PREFIX;
use crate::error::CliResult;

use clipprep_core::CoreError;
use log::{Level, LevelFilter};
use std::fs;
use std::path::{Path, PathBuf};

/// Returns the current local timestamp formatted as "YYYYMMDD_HHMMSS".
pub fn get_timestamp() -> String {
    chrono::Local::now().format("%Y%m%d_%H%M%S").to_string()
}

/// `<log_dir>/clipprep_<command>_<timestamp>.log`
#[must_use]
pub fn log_file_path(log_dir: &Path, command: &str) -> PathBuf {
    log_dir.join(format!("{LOG_FILE_PREFIX}_{command}_{}.log", get_timestamp()))
}

/// Installs the global logger and returns the path of the run's log file.
///
/// Fails if the log directory cannot be created or a logger is already set.
pub fn init_logging(verbose: bool, log_dir: &Path, command: &str) -> CliResult<PathBuf> {
    fs::create_dir_all(log_dir).map_err(|e| {
        CoreError::PathError(format!(
            "Failed to create log directory '{}': {}",
            log_dir.display(),
            e
        ))
    })?;
    let log_path = log_file_path(log_dir, command);
    let log_file = fern::log_file(&log_path).map_err(|e| {
        CoreError::PathError(format!(
            "Failed to open log file '{}': {}",
            log_path.display(),
            e
        ))
    })?;

    let console_level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let console = fern::Dispatch::new()
        .format(|out, message, _record| out.finish(format_args!("{message}")))
        .level(console_level)
        .chain(
            fern::Dispatch::new()
                .filter(|meta| meta.level() > Level::Warn)
                .chain(std::io::stdout()),
        )
        .chain(
            fern::Dispatch::new()
                .level(LevelFilter::Warn)
                .chain(std::io::stderr()),
        );

    let file = fern::Dispatch::new()
        .format(|out, message, record| {
            let plain = strip_ansi_escapes::strip_str(message.to_string());
            out.finish(format_args!(
                "{} [{:<5}] {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                plain
            ))
        })
        .level(LevelFilter::Debug)
        .chain(log_file);

    fern::Dispatch::new()
        .chain(console)
        .chain(file)
        .apply()
        .map_err(|e| CoreError::OperationFailed(format!("Failed to initialize logging: {e}")))?;

    log::debug!("Logging to {}", log_path.display());
    Ok(log_path)
}
