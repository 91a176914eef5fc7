// ============================================================================
// clipprep-core/src/external/mod.rs
// ============================================================================
//
// EXTERNAL TOOLS: Contracts for the Collaborators the Pipeline Drives
//
// The pipeline never fetches, probes, transcodes or runs inference itself.
// Each of those capabilities is a trait here, with one concrete adapter per
// trait backed by the real tool:
//
// - SourceFetcher -> YtDlpFetcher       (yt-dlp, optionally with aria2c)
// - VideoProber   -> FfprobeProber      (ffprobe crate)
// - Transcoder    -> SidecarTranscoder  (ffmpeg-sidecar crate)
// - ModelLoader   -> CommandModelLoader (long-lived model server process)
//
// Consumers take the traits, so tests swap in stubs that count calls.

use crate::error::{CoreError, CoreResult};

use std::io;
use std::path::Path;
use std::process::{Command, Stdio};

// ============================================================================
// SUBMODULES
// ============================================================================

pub mod fetcher;
pub mod ffmpeg_executor;
pub mod ffprobe_executor;
pub mod sync_model;

// ============================================================================
// RE-EXPORTS
// ============================================================================

pub use fetcher::YtDlpFetcher;
pub use ffmpeg_executor::{SidecarTranscoder, TranscodeRequest};
pub use ffprobe_executor::FfprobeProber;
pub use sync_model::{
    CommandModelLoader, InferenceParams, InferenceResult, ModelLoader, SyncModel,
};

// ============================================================================
// CONTRACTS
// ============================================================================

/// Downloads a source video.
pub trait SourceFetcher {
    /// Writes the video identified by `source_id` to `dest`.
    fn fetch(&self, source_id: &str, dest: &Path) -> CoreResult<()>;
}

/// Reads the pixel dimensions of a video.
///
/// Shared across crop workers, hence `Send + Sync`.
pub trait VideoProber: Send + Sync {
    /// Returns `(width, height)` of the first video stream, or `CoreError::Probe`.
    fn probe(&self, path: &Path) -> CoreResult<(u32, u32)>;
}

/// Cuts and crops a clip out of a source video.
pub trait Transcoder: Send + Sync {
    /// Writes `request.output`, or returns `CoreError::Process` / a command error.
    fn transcode(&self, request: &TranscodeRequest) -> CoreResult<()>;
}

// ============================================================================
// DEPENDENCY CHECKING
// ============================================================================

/// Checks that an external command can be started.
///
/// Runs `cmd_name version_arg` with all output discarded. Only a failure to
/// start counts; the exit status is ignored because not every tool treats
/// its version flag as success.
pub fn check_dependency(cmd_name: &str, version_arg: &str) -> CoreResult<()> {
    let result = Command::new(cmd_name)
        .arg(version_arg)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status();

    match result {
        Ok(_) => {
            log::debug!("Found dependency: {cmd_name}");
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            log::debug!("Dependency '{cmd_name}' not found");
            Err(CoreError::DependencyNotFound(cmd_name.to_string()))
        }
        Err(e) => {
            log::debug!("Failed to start dependency check for '{cmd_name}': {e}");
            Err(CoreError::CommandStart(cmd_name.to_string(), e))
        }
    }
}
