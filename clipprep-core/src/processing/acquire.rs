//! Sequential source acquisition.
//!
//! Downloads run one at a time to stay within the remote service's rate
//! limits. Failures are logged and counted, never retried in the same run;
//! the source simply stays missing and is planned again next time.

use std::collections::HashSet;

use crate::error::CoreError;
use crate::external::SourceFetcher;
use crate::planner::Job;

/// Totals for one acquisition pass.
#[derive(Debug, Default)]
pub struct AcquireSummary {
    /// Sources downloaded in this run
    pub fetched: usize,
    /// Jobs whose source appeared earlier in this run
    pub already_present: usize,
    /// Source id and error of every failed download
    pub failed: Vec<(String, CoreError)>,
}

/// Fetches the source of every job, in order.
///
/// Several clips often share one source video. The first of them downloads
/// it; later ones find it present (or already failed) and do not fetch
/// again. `on_progress` is called once per job after it is resolved.
pub fn acquire_sources<S, F>(fetcher: &S, jobs: &[Job], mut on_progress: F) -> AcquireSummary
where
    S: SourceFetcher + ?Sized,
    F: FnMut(&Job),
{
    let mut summary = AcquireSummary::default();
    let mut failed_sources = HashSet::new();

    for job in jobs {
        if job.source_path.exists() {
            log::debug!("Source {} already present for {}", job.source_id, job.clip_id);
            summary.already_present += 1;
        } else if failed_sources.contains(&job.source_id) {
            log::debug!("Source {} already failed this run; skipping {}", job.source_id, job.clip_id);
        } else {
            log::debug!("Fetching {} -> {}", job.source_id, job.source_path.display());
            match fetcher.fetch(&job.source_id, &job.source_path) {
                Ok(()) => summary.fetched += 1,
                Err(e) => {
                    log::warn!("Failed to download {}: {}", job.source_id, e);
                    failed_sources.insert(job.source_id.clone());
                    summary.failed.push((job.source_id.clone(), e));
                }
            }
        }
        on_progress(job);
    }

    summary
}
