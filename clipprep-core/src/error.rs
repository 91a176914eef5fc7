//! Error types for the clipprep-core library.
//!
//! One enum covers every failure the pipeline can surface. Which of them are
//! fatal is decided by the caller: per-item failures (`Acquisition`, `Probe`,
//! `Process`) are isolated by the acquisition loop and the crop dispatcher,
//! while `MetadataParse`, `Config`, `Ledger`, `ModelLoad` and
//! `ModelInference` end the run.

use std::path::PathBuf;
use std::process::ExitStatus;
use thiserror::Error;

/// Custom error types for clipprep
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse metadata {path}: {message}")]
    MetadataParse { path: PathBuf, message: String },

    #[error("Invalid clip '{clip_id}': {message}")]
    InvalidClip { clip_id: String, message: String },

    #[error("Failed to probe {path}: {message}")]
    Probe { path: PathBuf, message: String },

    #[error("Processing failed for clip '{clip_id}': {message}")]
    Process { clip_id: String, message: String },

    #[error("Failed to acquire source '{source_id}': {message}")]
    Acquisition { source_id: String, message: String },

    #[error("Failed to load sync model: {0}")]
    ModelLoad(String),

    #[error("Sync model inference failed for '{clip_id}': {message}")]
    ModelInference { clip_id: String, message: String },

    #[error("Ledger error ({path}): {message}")]
    Ledger { path: PathBuf, message: String },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Required dependency '{0}' not found")]
    DependencyNotFound(String),

    #[error("Failed to start {0}: {1}")]
    CommandStart(String, std::io::Error),

    #[error("{cmd} exited with {status}: {stderr}")]
    CommandFailed {
        cmd: String,
        status: ExitStatus,
        stderr: String,
    },

    #[error("Failed waiting for {0}: {1}")]
    CommandWait(String, std::io::Error),

    #[error("Worker panicked while processing clip '{0}'")]
    WorkerPanic(String),

    #[error("Two jobs target the same output file: {0}")]
    DuplicateDestination(PathBuf),

    #[error("Path error: {0}")]
    PathError(String),

    #[error("JSON parse error: {0}")]
    JsonParseError(String),

    #[error("{0}")]
    OperationFailed(String),
}

/// Result type for clipprep operations
pub type CoreResult<T> = std::result::Result<T, CoreError>;

/// Builds a `CommandStart` error for a process that could not be spawned.
pub fn command_start_error(cmd: impl Into<String>, err: std::io::Error) -> CoreError {
    CoreError::CommandStart(cmd.into(), err)
}

/// Builds a `CommandFailed` error for a process that exited unsuccessfully.
pub fn command_failed_error(
    cmd: impl Into<String>,
    status: ExitStatus,
    stderr: impl Into<String>,
) -> CoreError {
    CoreError::CommandFailed {
        cmd: cmd.into(),
        status,
        stderr: stderr.into(),
    }
}

/// Builds a `CommandWait` error for a process whose exit could not be collected.
pub fn command_wait_error(cmd: impl Into<String>, err: std::io::Error) -> CoreError {
    CoreError::CommandWait(cmd.into(), err)
}
