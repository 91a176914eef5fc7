// clipprep-cli/src/main.rs
//
// Entry point for the clipprep binary: parses arguments, installs logging,
// runs the selected command and turns a fatal error into exit status 1.
// Per-clip failures are not fatal; the commands report them and succeed.

use clap::Parser;
use clipprep_cli::error::describe;
use clipprep_cli::logging::init_logging;
use clipprep_cli::{Cli, Commands, run_prepare, run_score};
use clipprep_core::terminal;
use std::process;

fn main() {
    let cli = Cli::parse();

    let (log_dir, command_name) = match &cli.command {
        Commands::Prepare(args) => (args.log_dir.clone(), "prepare"),
        Commands::Score(args) => (args.log_dir.clone(), "score"),
    };

    if let Err(e) = init_logging(cli.verbose, &log_dir, command_name) {
        eprintln!("Error: {e}");
        process::exit(1);
    }

    let result = match cli.command {
        Commands::Prepare(args) => run_prepare(args),
        Commands::Score(args) => run_score(args),
    };

    if let Err(e) = result {
        let (title, suggestion) = describe(&e);
        terminal::print_error(title, &e.to_string(), suggestion);
        log::error!("{command_name} failed: {e}");
        process::exit(1);
    }
}
