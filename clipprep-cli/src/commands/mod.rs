//! Command implementations for the CLI.
//!
//! Each submodule contains the implementation of a specific command.

/// Module containing the implementation of the `prepare` command.
/// Downloads missing sources or crops clips, depending on the mode.
pub mod prepare;

/// Module containing the implementation of the `score` command.
pub mod score;
