// clipprep-core/tests/common/mod.rs
//
// Stub collaborators shared by the integration tests. Each stub counts its
// calls through shared atomics so tests can assert that an external tool was
// (or was not) invoked.

#![allow(dead_code)]

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use clipprep_core::external::{
    InferenceParams, InferenceResult, ModelLoader, SyncModel, TranscodeRequest, Transcoder,
    VideoProber,
};
use clipprep_core::{CoreError, CoreResult, Device};

/// Shared call counter.
#[derive(Debug, Clone, Default)]
pub struct Counter(Arc<AtomicUsize>);

impl Counter {
    pub fn hit(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }

    pub fn get(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

/// Prober reporting fixed dimensions, failing for sources whose stem starts with "broken".
#[derive(Debug, Clone)]
pub struct StubProber {
    pub calls: Counter,
    pub width: u32,
    pub height: u32,
}

impl StubProber {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            calls: Counter::default(),
            width,
            height,
        }
    }
}

impl VideoProber for StubProber {
    fn probe(&self, path: &Path) -> CoreResult<(u32, u32)> {
        self.calls.hit();
        let stem = path.file_stem().map(|s| s.to_string_lossy().to_string()).unwrap_or_default();
        if stem.starts_with("broken") {
            return Err(CoreError::Probe {
                path: path.to_path_buf(),
                message: "no video stream found".to_string(),
            });
        }
        Ok((self.width, self.height))
    }
}

/// Transcoder that writes a small file, or fails for inputs whose stem starts with "fail".
#[derive(Debug, Clone, Default)]
pub struct StubTranscoder {
    pub calls: Counter,
    pub requests: Arc<Mutex<Vec<TranscodeRequest>>>,
}

impl Transcoder for StubTranscoder {
    fn transcode(&self, request: &TranscodeRequest) -> CoreResult<()> {
        self.calls.hit();
        self.requests.lock().unwrap().push(request.clone());
        let stem = request
            .input
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        if stem.starts_with("fail") {
            // Leave a partial file behind, like an interrupted transcode would.
            std::fs::write(&request.output, b"partial")?;
            return Err(CoreError::Process {
                clip_id: stem,
                message: "ffmpeg exited with status 1".to_string(),
            });
        }
        std::fs::write(&request.output, format!("{} {}", request.filter, request.start))?;
        Ok(())
    }
}

/// Model loader whose models return scripted distances per clip.
#[derive(Debug, Clone, Default)]
pub struct StubModelLoader {
    pub loads: Counter,
    pub inferred: Arc<Mutex<Vec<String>>>,
    pub workspaces: Arc<Mutex<Vec<PathBuf>>>,
    pub dists: HashMap<String, Vec<f64>>,
    /// Clip ids whose inference fails
    pub failing: Vec<String>,
}

impl StubModelLoader {
    pub fn with_dists(dists: &[(&str, Vec<f64>)]) -> Self {
        Self {
            dists: dists
                .iter()
                .map(|(id, d)| (id.to_string(), d.clone()))
                .collect(),
            ..Default::default()
        }
    }
}

pub struct StubModel {
    loader: StubModelLoader,
}

impl ModelLoader for StubModelLoader {
    type Model = StubModel;

    fn load(&self, _checkpoint: &Path, _device: Device) -> CoreResult<StubModel> {
        self.loads.hit();
        Ok(StubModel {
            loader: self.clone(),
        })
    }
}

impl SyncModel for StubModel {
    fn infer(&mut self, clip: &Path, params: &InferenceParams) -> CoreResult<InferenceResult> {
        assert!(params.tmp_dir.is_dir(), "workspace must exist during inference");
        self.loader.workspaces.lock().unwrap().push(params.tmp_dir.clone());
        self.loader.inferred.lock().unwrap().push(params.reference.clone());

        if self.loader.failing.contains(&params.reference) {
            return Err(CoreError::ModelInference {
                clip_id: params.reference.clone(),
                message: format!("cannot decode {}", clip.display()),
            });
        }

        let dists = self
            .loader
            .dists
            .get(&params.reference)
            .cloned()
            .unwrap_or_else(|| vec![5.0, 7.0, 6.0]);
        Ok(InferenceResult {
            offset: 2,
            confidence: 8.5,
            dists,
        })
    }
}

/// Writes `contents` to `path`, creating parent directories.
pub fn touch(path: &Path, contents: &[u8]) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, contents).unwrap();
}

/// Metadata JSON for `(clip_id, source_id)` pairs with a fixed window and box.
pub fn metadata_json(clips: &[(&str, &str)]) -> String {
    let entries: Vec<String> = clips
        .iter()
        .map(|(clip_id, source_id)| {
            format!(
                r#""{clip_id}": {{"ytb_id": "{source_id}",
                    "duration": {{"start_sec": 1.5, "end_sec": 4.0}},
                    "bbox": {{"top": 0.125, "bottom": 0.625, "left": 0.25, "right": 0.625}}}}"#
            )
        })
        .collect();
    format!("{{\"clips\": {{{}}}}}", entries.join(", "))
}
