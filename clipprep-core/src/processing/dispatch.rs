// ============================================================================
// clipprep-core/src/processing/dispatch.rs
// ============================================================================
//
// PARALLEL DISPATCH: Fixed-Size Worker Pool for Crop Jobs
//
// Runs CropWorker::process over a job list on a dedicated rayon pool of
// exactly `worker_count` threads. Each completion is handed to the caller on
// the calling thread as soon as it happens, so results arrive in completion
// order, not submission order.
//
// A failing job (including one whose worker panics) is recorded in the
// summary and the batch carries on; nothing a single job does can abort
// the others.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::mpsc;

use rayon::prelude::*;

use crate::error::{CoreError, CoreResult};
use crate::external::{Transcoder, VideoProber};
use crate::planner::Job;
use crate::processing::crop::{CropOutcome, CropWorker};

/// Totals for one crop batch.
#[derive(Debug, Default)]
pub struct DispatchSummary {
    pub done: usize,
    pub skipped: usize,
    /// Clip id and error of every failed job, in completion order
    pub failed: Vec<(String, CoreError)>,
}

impl DispatchSummary {
    /// Number of jobs accounted for.
    #[must_use]
    pub fn total(&self) -> usize {
        self.done + self.skipped + self.failed.len()
    }

    #[must_use]
    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }
}

/// Configure and run crop jobs in parallel.
#[derive(Debug, Clone)]
pub struct ParallelDispatcher {
    worker_count: usize,
}

impl ParallelDispatcher {
    /// Dispatcher with `worker_count` workers (at least one).
    pub fn new(worker_count: usize) -> Self {
        Self {
            worker_count: worker_count.max(1),
        }
    }

    #[must_use]
    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    /// Processes every job and returns the batch totals.
    ///
    /// `on_complete` runs on the calling thread once per job, in completion
    /// order. Only failing to build the pool is an error.
    pub fn run<P, T, F>(
        &self,
        worker: &CropWorker<P, T>,
        jobs: &[Job],
        mut on_complete: F,
    ) -> CoreResult<DispatchSummary>
    where
        P: VideoProber,
        T: Transcoder,
        F: FnMut(&Job, &CoreResult<CropOutcome>),
    {
        let mut summary = DispatchSummary::default();
        if jobs.is_empty() {
            return Ok(summary);
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.worker_count)
            .thread_name(|i| format!("crop-worker-{i}"))
            .build()
            .map_err(|e| CoreError::Config(format!("Failed to initialize thread pool: {e}")))?;

        log::debug!(
            "Dispatching {} crop job(s) on {} worker(s)",
            jobs.len(),
            self.worker_count
        );

        let (tx, rx) = mpsc::channel::<(&Job, CoreResult<CropOutcome>)>();

        std::thread::scope(|scope| {
            scope.spawn(|| {
                pool.install(|| {
                    jobs.par_iter()
                        .with_max_len(1)
                        .for_each_with(tx, |tx, job| {
                            let outcome = run_isolated(worker, job);
                            // The receiver only disappears if the caller's callback panicked.
                            let _ = tx.send((job, outcome));
                        });
                });
            });

            for (job, outcome) in rx {
                on_complete(job, &outcome);
                match outcome {
                    Ok(CropOutcome::Done) => summary.done += 1,
                    Ok(CropOutcome::Skipped) => summary.skipped += 1,
                    Err(e) => {
                        log::error!("Crop failed for {}: {}", job.clip_id, e);
                        summary.failed.push((job.clip_id.clone(), e));
                    }
                }
            }
        });

        log::debug!(
            "Crop batch finished: {} done, {} skipped, {} failed",
            summary.done,
            summary.skipped,
            summary.failed.len()
        );
        Ok(summary)
    }
}

/// Runs one job, turning a worker panic into an error for that job.
fn run_isolated<P, T>(worker: &CropWorker<P, T>, job: &Job) -> CoreResult<CropOutcome>
where
    P: VideoProber,
    T: Transcoder,
{
    catch_unwind(AssertUnwindSafe(|| worker.process(job)))
        .unwrap_or_else(|_| Err(CoreError::WorkerPanic(job.clip_id.clone())))
}
