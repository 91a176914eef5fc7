//! Per-job crop worker.
//!
//! One job produces one clip: probe the source, turn the relative face box
//! into a square pixel region, then cut and crop the time window with the
//! transcoder. The worker is idempotent on its output: an existing
//! destination is never touched and no external tool is run for it.
//!
//! The transcoder writes to a hidden temporary file beside the destination,
//! which is renamed into place only after a successful, non-empty transcode.
//! A failed job therefore leaves no file at `dest_path`.

use std::fmt;

use crate::error::{CoreError, CoreResult};
use crate::external::{TranscodeRequest, Transcoder, VideoProber};
use crate::geometry::crop_region;
use crate::planner::Job;
use crate::temp_files::create_temp_output;
use crate::utils::format_timestamp;

/// How a crop job ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CropOutcome {
    /// The destination already existed.
    Skipped,
    /// The clip was produced.
    Done,
}

impl fmt::Display for CropOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CropOutcome::Skipped => write!(f, "skipped"),
            CropOutcome::Done => write!(f, "done"),
        }
    }
}

/// Crops clips out of source videos using a prober and a transcoder.
#[derive(Debug, Clone)]
pub struct CropWorker<P, T> {
    prober: P,
    transcoder: T,
    expand_ratio: f64,
}

impl<P: VideoProber, T: Transcoder> CropWorker<P, T> {
    pub fn new(prober: P, transcoder: T, expand_ratio: f64) -> Self {
        Self {
            prober,
            transcoder,
            expand_ratio,
        }
    }

    pub fn prober(&self) -> &P {
        &self.prober
    }

    pub fn transcoder(&self) -> &T {
        &self.transcoder
    }

    /// Produces `job.dest_path`, or skips it if it already exists.
    ///
    /// Probe failures come back as `CoreError::Probe`; everything that goes
    /// wrong afterwards is `CoreError::Process` for this clip.
    pub fn process(&self, job: &Job) -> CoreResult<CropOutcome> {
        if job.dest_path.exists() {
            log::debug!("Skipping {}: {} exists", job.clip_id, job.dest_path.display());
            return Ok(CropOutcome::Skipped);
        }

        let (width, height) = self.prober.probe(&job.source_path)?;
        let region = crop_region(job.bbox, self.expand_ratio, width, height);
        if region.side() <= 0 {
            return Err(process_error(
                job,
                format!("empty crop region {region:?} for {width}x{height} source"),
            ));
        }

        log::debug!(
            "Cropping {} from {} ({}x{}): {}",
            job.clip_id,
            job.source_path.display(),
            width,
            height,
            region.to_filter()
        );

        let tmp = create_temp_output(&job.dest_path)
            .map_err(|e| process_error(job, format!("reserving temporary output: {e}")))?;

        let request = TranscodeRequest {
            input: job.source_path.clone(),
            output: tmp.to_path_buf(),
            filter: region.to_filter(),
            start: format_timestamp(job.start_sec),
            end: format_timestamp(job.end_sec),
        };

        self.transcoder.transcode(&request).map_err(|e| match e {
            CoreError::Process { .. } => e,
            other => process_error(job, other.to_string()),
        })?;

        let written = std::fs::metadata(&tmp).map(|m| m.len()).unwrap_or(0);
        if written == 0 {
            return Err(process_error(job, "transcoder produced no output".to_string()));
        }

        tmp.persist(&job.dest_path).map_err(|e| {
            process_error(
                job,
                format!("moving output to {}: {}", job.dest_path.display(), e.error),
            )
        })?;

        Ok(CropOutcome::Done)
    }
}

fn process_error(job: &Job, message: String) -> CoreError {
    CoreError::Process {
        clip_id: job.clip_id.clone(),
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::RelativeBox;
    use std::path::{Path, PathBuf};
    use std::sync::Mutex;

    struct FixedProber(u32, u32);

    impl VideoProber for FixedProber {
        fn probe(&self, _path: &Path) -> CoreResult<(u32, u32)> {
            Ok((self.0, self.1))
        }
    }

    #[derive(Default)]
    struct RecordingTranscoder {
        requests: Mutex<Vec<TranscodeRequest>>,
        payload: &'static [u8],
    }

    impl Transcoder for RecordingTranscoder {
        fn transcode(&self, request: &TranscodeRequest) -> CoreResult<()> {
            self.requests.lock().unwrap().push(request.clone());
            std::fs::write(&request.output, self.payload)?;
            Ok(())
        }
    }

    fn job(dir: &Path) -> Job {
        Job {
            clip_id: "clip".to_string(),
            source_id: "src".to_string(),
            source_path: PathBuf::from("/raw/src.mp4"),
            dest_path: dir.join("clip.mp4"),
            bbox: RelativeBox { top: 0.125, bottom: 0.625, left: 0.25, right: 0.625 },
            start_sec: 61.25,
            end_sec: 64.0,
        }
    }

    #[test]
    fn test_request_built_from_job() {
        let dir = tempfile::tempdir().unwrap();
        let transcoder = RecordingTranscoder {
            payload: b"video",
            ..Default::default()
        };
        let worker = CropWorker::new(FixedProber(1000, 1000), transcoder, 0.0);

        assert_eq!(worker.process(&job(dir.path())).unwrap(), CropOutcome::Done);

        let requests = worker.transcoder().requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        let request = &requests[0];
        // 375x500 box on a 1000x1000 frame squares to 375 px
        assert_eq!(request.filter, "crop=w=375:h=375:x=250:y=187");
        assert_eq!(request.start, "00:01:01.25");
        assert_eq!(request.end, "00:01:04.00");
        assert_ne!(request.output, dir.path().join("clip.mp4"));
        assert_eq!(std::fs::read(dir.path().join("clip.mp4")).unwrap(), b"video");
    }

    #[test]
    fn test_empty_output_is_process_error() {
        let dir = tempfile::tempdir().unwrap();
        let worker = CropWorker::new(FixedProber(640, 480), RecordingTranscoder::default(), 0.02);

        let result = worker.process(&job(dir.path()));
        assert!(matches!(result, Err(CoreError::Process { ref clip_id, .. }) if clip_id == "clip"));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
