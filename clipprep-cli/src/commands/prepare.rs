//! Implementation of the 'prepare' subcommand.
//!
//! Loads the clip metadata, plans the work for the selected mode and runs it:
//! sequential downloads in acquire mode, the parallel crop dispatcher in crop
//! mode. Per-clip failures are reported in the summary and do not fail the
//! command.

use crate::cli::PrepareArgs;
use crate::config::{ACQUIRE_DEPENDENCIES, CROP_DEPENDENCIES};
use crate::error::{CliErrorContext, CliResult};

use clipprep_core::external::{FfprobeProber, SidecarTranscoder, YtDlpFetcher, check_dependency};
use clipprep_core::terminal::{self, BatchProgress};
use clipprep_core::{
    CoreConfig, CoreConfigBuilder, CoreError, CropWorker, Job, Mode, ParallelDispatcher,
    acquire_sources, format_duration, load_metadata, plan_jobs,
};

use std::fs;
use std::time::Instant;

/// Creates and validates the core configuration from CLI arguments.
fn create_core_config(args: &PrepareArgs) -> CliResult<CoreConfig> {
    let mut builder = CoreConfigBuilder::new()
        .metadata_path(args.metadata.clone())
        .raw_dir(args.raw_dir.clone())
        .processed_dir(args.processed_dir.clone())
        .crop_workers(args.workers)
        .use_aria2c(!args.no_aria2c);

    if let Some(proxy) = &args.proxy {
        builder = builder.proxy(proxy);
    }
    if let Some(cookies) = &args.cookies {
        builder = builder.cookies(cookies.clone());
    }

    builder.build()
}

/// Warns about external tools the selected mode needs but cannot start.
fn warn_missing_dependencies(mode: Mode) {
    let deps = match mode {
        Mode::Acquire => ACQUIRE_DEPENDENCIES,
        Mode::Crop => CROP_DEPENDENCIES,
    };
    for (name, version_arg) in deps {
        if let Err(e) = check_dependency(name, version_arg) {
            terminal::print_warning(&format!("{e}; every {mode} job will fail"));
        }
    }
}

/// Lists per-item failures under one warning line.
fn print_failures(what: &str, failed: &[(String, CoreError)]) {
    if failed.is_empty() {
        return;
    }
    terminal::print_warning(&format!("{} {what}; rerun to retry them", failed.len()));
    for (id, error) in failed {
        terminal::print_sub_item(&format!("{id}: {error}"));
    }
}

/// Runs the prepare command.
pub fn run_prepare(args: PrepareArgs) -> CliResult<()> {
    let start_time = Instant::now();
    let config = create_core_config(&args)?;

    terminal::print_section("INITIALIZATION");
    terminal::print_status("Mode", &args.mode.to_string(), true);
    terminal::print_status("Metadata", &config.metadata_path.display().to_string(), false);
    terminal::print_status("Sources", &config.raw_dir.display().to_string(), false);
    terminal::print_status("Clips", &config.processed_dir.display().to_string(), false);
    if args.mode == Mode::Crop {
        terminal::print_status("Workers", &config.crop_workers.to_string(), false);
    }

    let metadata = load_metadata(&config.metadata_path)?;
    for dir in [&config.raw_dir, &config.processed_dir] {
        fs::create_dir_all(dir)
            .cli_with_context(|| format!("Failed to create directory '{}'", dir.display()))?;
    }

    let plan = plan_jobs(&metadata, &config, args.mode)?;
    terminal::print_status("Clips listed", &metadata.len().to_string(), false);
    terminal::print_status("Jobs", &plan.emitted().to_string(), true);

    if plan.jobs.is_empty() {
        terminal::print_success(&format!("Nothing to {}", args.mode));
        return Ok(());
    }

    warn_missing_dependencies(args.mode);

    match args.mode {
        Mode::Acquire => acquire(&config, &plan.jobs),
        Mode::Crop => crop(&config, &plan.jobs)?,
    }

    terminal::print_status(
        "Total time",
        &format_duration(start_time.elapsed().as_secs_f64()),
        false,
    );
    Ok(())
}

/// Downloads the missing sources one after another.
fn acquire(config: &CoreConfig, jobs: &[Job]) {
    terminal::print_section("ACQUISITION");
    terminal::print_processing(&format!("Fetching sources for {} clip(s)", jobs.len()));

    let fetcher = YtDlpFetcher::from_config(config);
    let progress = BatchProgress::new(jobs.len() as u64, "Acquiring");
    let summary = acquire_sources(&fetcher, jobs, |_| progress.inc());
    progress.finish();

    terminal::print_section("ACQUISITION COMPLETE");
    terminal::print_status("Downloaded", &summary.fetched.to_string(), true);
    terminal::print_status("Already present", &summary.already_present.to_string(), false);
    terminal::print_status("Failed", &summary.failed.len().to_string(), false);
    print_failures("source(s) could not be downloaded", &summary.failed);
    if summary.failed.is_empty() {
        terminal::print_success("All sources acquired");
    }
}

/// Crops every planned clip on the worker pool.
fn crop(config: &CoreConfig, jobs: &[Job]) -> CliResult<()> {
    terminal::print_section("CROPPING");
    terminal::print_processing(&format!(
        "Cropping {} clip(s) with {} worker(s)",
        jobs.len(),
        config.crop_workers
    ));

    let worker = CropWorker::new(
        FfprobeProber::new(),
        SidecarTranscoder::new(),
        config.expand_ratio,
    );
    let dispatcher = ParallelDispatcher::new(config.crop_workers);
    let progress = BatchProgress::new(jobs.len() as u64, "Cropping");

    // Failures are already logged by the dispatcher.
    let summary = dispatcher.run(&worker, jobs, |job, outcome| {
        if let Ok(result) = outcome {
            progress.suspend(|| log::debug!("{}: {}", job.clip_id, result));
        }
        progress.inc();
    })?;
    progress.finish();

    terminal::print_section("CROPPING COMPLETE");
    terminal::print_status("Cropped", &summary.done.to_string(), true);
    terminal::print_status("Already done", &summary.skipped.to_string(), false);
    terminal::print_status("Failed", &summary.failed.len().to_string(), false);
    print_failures("clip(s) failed", &summary.failed);
    if !summary.has_failures() {
        terminal::print_success(&format!("{} clip(s) ready", summary.total()));
    }
    Ok(())
}
