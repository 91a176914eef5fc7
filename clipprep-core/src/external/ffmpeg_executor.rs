// ============================================================================
// clipprep-core/src/external/ffmpeg_executor.rs
// ============================================================================
//
// FFMPEG EXECUTOR: Crop-and-Trim Invocation
//
// Builds the single ffmpeg command the crop stage needs and runs it through
// ffmpeg-sidecar. The process is fully muted and never reads stdin, so a
// worker slot can only ever block on the transcode itself.

use crate::error::{CoreResult, command_failed_error, command_start_error, command_wait_error};
use crate::external::Transcoder;
use ffmpeg_sidecar::command::FfmpegCommand;
use std::path::PathBuf;
use std::process::Stdio;

/// Everything ffmpeg needs to produce one clip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscodeRequest {
    /// Source video
    pub input: PathBuf,
    /// File to write; overwritten if present
    pub output: PathBuf,
    /// Video filter, e.g. `crop=w=200:h=200:x=100:y=20`
    pub filter: String,
    /// Start timestamp, `HH:MM:SS.cc`
    pub start: String,
    /// End timestamp, `HH:MM:SS.cc`
    pub end: String,
}

impl TranscodeRequest {
    /// ffmpeg arguments for this request, program name excluded.
    #[must_use]
    pub fn to_args(&self) -> Vec<String> {
        vec![
            "-v".to_string(),
            "error".to_string(),
            "-nostdin".to_string(),
            "-hide_banner".to_string(),
            "-i".to_string(),
            self.input.to_string_lossy().into_owned(),
            "-vf".to_string(),
            self.filter.clone(),
            "-ss".to_string(),
            self.start.clone(),
            "-to".to_string(),
            self.end.clone(),
            "-y".to_string(),
            self.output.to_string_lossy().into_owned(),
        ]
    }
}

/// [`Transcoder`] backed by `ffmpeg-sidecar`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SidecarTranscoder;

impl SidecarTranscoder {
    pub fn new() -> Self {
        Self
    }
}

impl Transcoder for SidecarTranscoder {
    fn transcode(&self, request: &TranscodeRequest) -> CoreResult<()> {
        let mut cmd = FfmpegCommand::new();
        cmd.args(request.to_args());
        cmd.as_inner_mut()
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        log::debug!("Running crop command: {:?}", cmd);

        let mut child = cmd
            .spawn()
            .map_err(|e| command_start_error("ffmpeg (crop)", e))?;
        let status = child
            .wait()
            .map_err(|e| command_wait_error("ffmpeg (crop)", e))?;

        if !status.success() {
            return Err(command_failed_error(
                "ffmpeg (crop)",
                status,
                format!("failed to write {}", request.output.display()),
            ));
        }

        log::debug!("Crop written to: {}", request.output.display());
        Ok(())
    }
}
