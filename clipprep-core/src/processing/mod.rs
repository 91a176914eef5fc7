//! Stage drivers: acquisition, cropping and sync scoring.

pub mod acquire;
pub mod crop;
pub mod dispatch;
pub mod score;

pub use acquire::{AcquireSummary, acquire_sources};
pub use crop::{CropOutcome, CropWorker};
pub use dispatch::{DispatchSummary, ParallelDispatcher};
pub use score::{ClipState, ScoreSummary, SyncScorer, classify};
