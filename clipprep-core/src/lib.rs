//! Core library for preparing a face-clip dataset from source videos.
//!
//! The pipeline has three stages, each resumable by re-running it:
//!
//! 1. **Acquire**: download every source video that is missing.
//! 2. **Crop**: cut each clip's time window out of its source and crop it to
//!    a square around the face, in parallel, skipping clips already produced.
//! 3. **Score**: run an audio-visual sync model over the produced clips and
//!    append one row per clip to a durable ledger, skipping recorded clips.
//!
//! External tools (yt-dlp, ffprobe, ffmpeg, the sync model) sit behind the
//! traits in [`external`], so every stage can be driven with stubs.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use clipprep_core::config::CoreConfigBuilder;
//! use clipprep_core::external::{FfprobeProber, SidecarTranscoder};
//! use clipprep_core::processing::{CropWorker, ParallelDispatcher};
//! use clipprep_core::{Mode, load_metadata, plan_jobs};
//!
//! let config = CoreConfigBuilder::new().crop_workers(4).build().unwrap();
//! let metadata = load_metadata(&config.metadata_path).unwrap();
//! let plan = plan_jobs(&metadata, &config, Mode::Crop).unwrap();
//!
//! let worker = CropWorker::new(FfprobeProber::new(), SidecarTranscoder::new(), config.expand_ratio);
//! let summary = ParallelDispatcher::new(config.crop_workers)
//!     .run(&worker, &plan.jobs, |job, outcome| println!("{}: {:?}", job.clip_id, outcome))
//!     .unwrap();
//! println!("{} done, {} failed", summary.done, summary.failed.len());
//! ```

pub mod config;
pub mod discovery;
pub mod error;
pub mod external;
pub mod geometry;
pub mod hardware;
pub mod ledger;
pub mod metadata;
pub mod planner;
pub mod processing;
pub mod temp_files;
pub mod terminal;
pub mod utils;

// Re-exports for public API
pub use config::{CoreConfig, CoreConfigBuilder};
pub use discovery::discover_clips;
pub use error::{CoreError, CoreResult};
pub use geometry::{CropRegion, PixelBox, RelativeBox, crop_region};
pub use hardware::{Device, DevicePreference};
pub use ledger::{Ledger, LedgerEntry};
pub use metadata::{ClipSpec, Metadata, load_metadata};
pub use planner::{Job, JobPlan, Mode, plan_jobs};
pub use processing::{
    AcquireSummary, ClipState, CropOutcome, CropWorker, DispatchSummary, ParallelDispatcher,
    ScoreSummary, SyncScorer, acquire_sources,
};
pub use utils::{format_duration, format_timestamp};
