// clipprep-cli/src/lib.rs
//
// Library portion of the clipprep CLI application.
// Contains argument definitions and command logic.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod logging;

// Re-export items needed by the binary or integration tests
pub use cli::{Cli, Commands, PrepareArgs, ScoreArgs};
pub use commands::prepare::run_prepare;
pub use commands::score::run_score;
