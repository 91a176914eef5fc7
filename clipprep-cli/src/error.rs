// ============================================================================
// clipprep-cli/src/error.rs
// ============================================================================
//
// CLI ERROR HANDLING: Error types and utilities for the CLI
//
// The CLI reuses the core error type and only adds context on top of it.
// `describe` maps the fatal errors an operator can fix to a hint shown
// under the error message.

// ---- Internal crate imports ----
use clipprep_core::{CoreError, CoreResult};

// ---- Standard library imports ----
use std::fmt;

// ============================================================================
// RESULT TYPE ALIAS
// ============================================================================

/// Type alias for CLI results using CoreError.
pub type CliResult<T> = CoreResult<T>;

// ============================================================================
// ERROR CONVERSION UTILITIES
// ============================================================================

/// Extension trait for adding context to errors in the CLI.
pub trait CliErrorContext<T> {
    /// Add context to an error.
    fn cli_context<C>(self, context: C) -> CliResult<T>
    where
        C: fmt::Display;

    /// Add context using a closure (for lazy evaluation).
    fn cli_with_context<C, F>(self, f: F) -> CliResult<T>
    where
        C: fmt::Display,
        F: FnOnce() -> C;
}

impl<T, E> CliErrorContext<T> for Result<T, E>
where
    E: Into<CoreError>,
{
    fn cli_context<C>(self, context: C) -> CliResult<T>
    where
        C: fmt::Display,
    {
        self.map_err(|e| {
            let core_error: CoreError = e.into();
            CoreError::OperationFailed(format!("{context}: {core_error}"))
        })
    }

    fn cli_with_context<C, F>(self, f: F) -> CliResult<T>
    where
        C: fmt::Display,
        F: FnOnce() -> C,
    {
        self.map_err(|e| {
            let core_error: CoreError = e.into();
            CoreError::OperationFailed(format!("{}: {}", f(), core_error))
        })
    }
}

impl<T> CliErrorContext<T> for Option<T> {
    fn cli_context<C>(self, context: C) -> CliResult<T>
    where
        C: fmt::Display,
    {
        self.ok_or_else(|| CoreError::OperationFailed(context.to_string()))
    }

    fn cli_with_context<C, F>(self, f: F) -> CliResult<T>
    where
        C: fmt::Display,
        F: FnOnce() -> C,
    {
        self.ok_or_else(|| CoreError::OperationFailed(f().to_string()))
    }
}

// ============================================================================
// OPERATOR HINTS
// ============================================================================

/// Short title and optional hint for a fatal error.
#[must_use]
pub fn describe(error: &CoreError) -> (&'static str, Option<&'static str>) {
    match error {
        CoreError::MetadataParse { .. } | CoreError::InvalidClip { .. } => (
            "Invalid metadata",
            Some("Check the metadata file passed with --metadata"),
        ),
        CoreError::Config(_) => ("Invalid configuration", None),
        CoreError::Ledger { .. } => (
            "Ledger unusable",
            Some("Point --ledger at a sync score CSV or a new file"),
        ),
        CoreError::ModelLoad(_) => (
            "Sync model failed to start",
            Some("Check --model-command and --checkpoint; rerun with --model-verbose for details"),
        ),
        CoreError::ModelInference { .. } => (
            "Scoring stopped",
            Some("Recorded clips are kept; rerun to resume after fixing the failing clip"),
        ),
        CoreError::DependencyNotFound(_) => ("Missing dependency", None),
        _ => ("Run failed", None),
    }
}
