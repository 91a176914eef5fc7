//! Implementation of the 'score' subcommand.
//!
//! Scores every clip in the clips directory that the ledger does not record
//! yet. An interrupted or failed run is resumed by running the command again.

use crate::cli::ScoreArgs;
use crate::error::CliResult;

use clipprep_core::external::CommandModelLoader;
use clipprep_core::terminal::{self, BatchProgress};
use clipprep_core::{
    ClipState, CoreConfig, CoreConfigBuilder, CoreError, Ledger, SyncScorer, discover_clips,
    format_duration,
};

use std::io::ErrorKind;
use std::time::Instant;

/// Creates and validates the core configuration from CLI arguments.
fn create_core_config(args: &ScoreArgs) -> CliResult<CoreConfig> {
    let mut builder = CoreConfigBuilder::new()
        .processed_dir(args.clips_dir.clone())
        .ledger_path(args.ledger.clone())
        .model_checkpoint(args.checkpoint.clone())
        .device(args.device)
        .sync_threshold(args.threshold)
        .batch_size(args.batch_size)
        .vshift(args.vshift)
        .quiet_model(!args.model_verbose);

    if !args.model_command.is_empty() {
        builder = builder.model_command(args.model_command.clone());
    }

    builder.build()
}

/// Runs the score command.
pub fn run_score(args: ScoreArgs) -> CliResult<()> {
    let start_time = Instant::now();
    let config = create_core_config(&args)?;

    terminal::print_section("INITIALIZATION");
    terminal::print_status("Clips", &config.processed_dir.display().to_string(), false);
    terminal::print_status("Ledger", &config.ledger_path.display().to_string(), false);
    terminal::print_status("Threshold", &format!("{:.3}", config.sync_threshold), false);

    let clips = match discover_clips(&config.processed_dir, config.extension()) {
        Err(CoreError::Io(e)) if e.kind() == ErrorKind::NotFound => {
            terminal::print_warning(&format!(
                "Clips directory {} does not exist; nothing to score",
                config.processed_dir.display()
            ));
            Vec::new()
        }
        other => other?,
    };
    let mut ledger = Ledger::open(&config.ledger_path)?;
    terminal::print_status("Found", &clips.len().to_string(), true);
    terminal::print_status("Recorded", &ledger.len().to_string(), false);

    let device = config.device.resolve();
    terminal::print_status("Device", &device.to_string(), false);

    let loader = CommandModelLoader::new(config.model_command.clone(), config.quiet_model);
    let scorer = SyncScorer::new(loader, &config, device);
    let pending = scorer.pending(&clips, &ledger)?;

    if clips.is_empty() {
        terminal::print_success("No clips to score");
        return Ok(());
    }
    if pending.is_empty() {
        terminal::print_success("Every clip is already scored");
        return Ok(());
    }

    terminal::print_section("SCORING");
    terminal::print_processing(&format!("Scoring {} clip(s)", pending.len()));

    let progress = BatchProgress::new(pending.len() as u64, "Scoring");
    let result = scorer.run(&clips, &mut ledger, |clip_id, state| match state {
        ClipState::Scoring => progress.suspend(|| log::debug!("Scoring {clip_id}")),
        ClipState::Recorded => progress.inc(),
        ClipState::Pending | ClipState::Skipped => {}
    });
    progress.finish();
    let summary = result?;

    terminal::print_section("SCORING COMPLETE");
    terminal::print_status("Scored", &summary.scored.to_string(), true);
    terminal::print_status("Synced", &summary.synced.to_string(), false);
    terminal::print_status("Out of sync", &(summary.scored - summary.synced).to_string(), false);
    terminal::print_status("Already scored", &summary.skipped.to_string(), false);
    terminal::print_status(
        "Total time",
        &format_duration(start_time.elapsed().as_secs_f64()),
        false,
    );
    terminal::print_success(&format!("{} row(s) in {}", ledger.len(), ledger.path().display()));
    Ok(())
}
