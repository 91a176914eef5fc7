//! Sequential sync scoring with ledger-backed resume.
//!
//! Every clip moves through `Pending -> Scoring -> Recorded`, or straight to
//! `Skipped` when the ledger already has it. One clip is fully resolved,
//! through the durable ledger append, before the next begins. The model is
//! loaded once, and only if at least one clip is pending.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::config::CoreConfig;
use crate::error::{CoreError, CoreResult};
use crate::external::{InferenceParams, ModelLoader, SyncModel};
use crate::hardware::Device;
use crate::ledger::{Ledger, LedgerEntry};
use crate::temp_files::create_temp_dir;
use crate::utils::{clip_stem, median};

/// Where a clip is in the scoring state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipState {
    /// Not yet in the ledger.
    Pending,
    /// The model is running on it.
    Scoring,
    /// Its row has been appended and synced.
    Recorded,
    /// It was already in the ledger when the run reached it.
    Skipped,
}

impl fmt::Display for ClipState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ClipState::Pending => "pending",
            ClipState::Scoring => "scoring",
            ClipState::Recorded => "recorded",
            ClipState::Skipped => "skipped",
        };
        f.write_str(label)
    }
}

/// Totals for one scoring run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScoreSummary {
    /// Clips scored and recorded in this run
    pub scored: usize,
    /// Clips already in the ledger
    pub skipped: usize,
    /// Of the scored clips, how many were classified as synced
    pub synced: usize,
}

/// `true` when `median_distance` is at or below `threshold`.
#[must_use]
pub fn classify(median_distance: f64, threshold: f64) -> bool {
    median_distance <= threshold
}

/// Drives a sync model over a set of clips, recording results in a ledger.
#[derive(Debug, Clone)]
pub struct SyncScorer<L> {
    loader: L,
    checkpoint: PathBuf,
    device: Device,
    threshold: f64,
    batch_size: u32,
    vshift: u32,
    quiet: bool,
    temp_base: Option<PathBuf>,
}

impl<L: ModelLoader> SyncScorer<L> {
    /// Scorer using the model and threshold settings in `config`.
    pub fn new(loader: L, config: &CoreConfig, device: Device) -> Self {
        Self {
            loader,
            checkpoint: config.model_checkpoint.clone(),
            device,
            threshold: config.sync_threshold,
            batch_size: config.batch_size,
            vshift: config.vshift,
            quiet: config.quiet_model,
            temp_base: config.temp_dir.clone(),
        }
    }

    /// Identity of every clip not yet in `ledger`, in visiting order.
    pub fn pending(&self, clips: &[PathBuf], ledger: &Ledger) -> CoreResult<Vec<String>> {
        let mut pending = Vec::new();
        for clip in clips {
            let clip_id = clip_stem(clip)?;
            if !ledger.contains(&clip_id) && !pending.contains(&clip_id) {
                pending.push(clip_id);
            }
        }
        Ok(pending)
    }

    /// Scores every clip in `clips` that `ledger` does not record yet.
    ///
    /// `on_state` is told about each transition. Any inference failure ends
    /// the run; rows recorded before it stay in the ledger.
    pub fn run<F>(
        &self,
        clips: &[PathBuf],
        ledger: &mut Ledger,
        mut on_state: F,
    ) -> CoreResult<ScoreSummary>
    where
        F: FnMut(&str, ClipState),
    {
        let mut summary = ScoreSummary::default();

        if self.pending(clips, ledger)?.is_empty() {
            log::debug!("Every clip is already recorded; not loading the model");
            for clip in clips {
                on_state(&clip_stem(clip)?, ClipState::Skipped);
            }
            summary.skipped = clips.len();
            return Ok(summary);
        }

        self.device.log_capabilities();
        let mut model = self.loader.load(&self.checkpoint, self.device)?;

        for clip in clips {
            let clip_id = clip_stem(clip)?;
            if ledger.contains(&clip_id) {
                on_state(&clip_id, ClipState::Skipped);
                summary.skipped += 1;
                continue;
            }

            on_state(&clip_id, ClipState::Pending);
            on_state(&clip_id, ClipState::Scoring);
            let entry = self.score_clip(&mut model, &clip_id, clip)?;
            ledger.append(&entry)?;
            on_state(&clip_id, ClipState::Recorded);

            log::debug!(
                "{}: median {:.3}, offset {}, synced {}",
                entry.clip_id,
                entry.median_distance,
                entry.offset,
                entry.is_synced
            );
            summary.scored += 1;
            if entry.is_synced {
                summary.synced += 1;
            }
        }

        Ok(summary)
    }

    /// Runs the model on one clip inside a scratch directory that is removed
    /// on every exit path.
    fn score_clip(
        &self,
        model: &mut L::Model,
        clip_id: &str,
        clip: &Path,
    ) -> CoreResult<LedgerEntry> {
        let workspace = create_temp_dir(self.temp_base.as_deref(), "sync_")?;
        let params = InferenceParams {
            tmp_dir: workspace.path().to_path_buf(),
            reference: clip_id.to_string(),
            batch_size: self.batch_size,
            vshift: self.vshift,
            quiet: self.quiet,
        };

        let result = model.infer(clip, &params)?;
        let median_distance = median(&result.dists).ok_or_else(|| CoreError::ModelInference {
            clip_id: clip_id.to_string(),
            message: format!(
                "no usable frame distances ({} reported)",
                result.dists.len()
            ),
        })?;

        Ok(LedgerEntry {
            clip_id: clip_id.to_string(),
            median_distance,
            is_synced: classify(median_distance, self.threshold),
            offset: result.offset,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification_boundary() {
        assert!(classify(6.0, 6.0));
        assert!(classify(5.999, 6.0));
        assert!(!classify(6.0 + f64::EPSILON * 8.0, 6.0));
        assert!(!classify(6.001, 6.0));
    }

    #[test]
    fn test_state_labels() {
        assert_eq!(ClipState::Recorded.to_string(), "recorded");
        assert_eq!(ClipState::Skipped.to_string(), "skipped");
    }
}
