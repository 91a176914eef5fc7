//! FFprobe integration for reading source video dimensions.
//!
//! The crop stage needs exactly one fact about a source: the pixel size of
//! its first video stream. Everything that goes wrong while finding it is
//! reported as `CoreError::Probe` so the dispatcher can isolate the job.

use crate::error::{CoreError, CoreResult};
use crate::external::VideoProber;
use ffprobe::{FfProbeError, ffprobe};
use std::path::Path;

/// [`VideoProber`] backed by the `ffprobe` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct FfprobeProber;

impl FfprobeProber {
    pub fn new() -> Self {
        Self
    }
}

impl VideoProber for FfprobeProber {
    fn probe(&self, path: &Path) -> CoreResult<(u32, u32)> {
        log::debug!("Running ffprobe (via crate) for dimensions on: {}", path.display());

        let metadata = ffprobe(path).map_err(|err| {
            log::debug!("ffprobe failed on {}: {:?}", path.display(), err);
            map_ffprobe_error(err, path)
        })?;

        let video_stream = metadata
            .streams
            .iter()
            .find(|s| s.codec_type.as_deref() == Some("video"))
            .ok_or_else(|| probe_error(path, "no video stream found"))?;

        let width = video_stream
            .width
            .ok_or_else(|| probe_error(path, "video stream missing width"))?;
        let height = video_stream
            .height
            .ok_or_else(|| probe_error(path, "video stream missing height"))?;

        dimensions(width, height).ok_or_else(|| {
            probe_error(path, &format!("invalid dimensions {width}x{height}"))
        })
    }
}

/// Converts probed dimensions, rejecting zero, negative and oversized values.
fn dimensions(width: i64, height: i64) -> Option<(u32, u32)> {
    let w = u32::try_from(width).ok().filter(|w| *w > 0)?;
    let h = u32::try_from(height).ok().filter(|h| *h > 0)?;
    Some((w, h))
}

fn probe_error(path: &Path, message: &str) -> CoreError {
    CoreError::Probe {
        path: path.to_path_buf(),
        message: message.to_string(),
    }
}

fn map_ffprobe_error(err: FfProbeError, path: &Path) -> CoreError {
    let message = match err {
        FfProbeError::Io(io_err) => format!("failed to run ffprobe: {io_err}"),
        FfProbeError::Status(output) => {
            let stderr = String::from_utf8_lossy(&output.stderr);
            format!("ffprobe exited with {}: {}", output.status, stderr.trim())
        }
        FfProbeError::Deserialize(err) => format!("unreadable ffprobe output: {err}"),
        _ => format!("unknown ffprobe error: {err:?}"),
    };
    probe_error(path, &message)
}
