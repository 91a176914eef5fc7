//! Audio-visual sync model contract and its process-backed adapter.
//!
//! The scorer only needs two capabilities: load a model once for a device,
//! then run inference on one clip at a time. [`CommandModelLoader`] satisfies
//! them with a long-lived model server process speaking JSON lines:
//!
//! - started as `<command...> --checkpoint <path> --device cuda|cpu`
//! - prints `{"ready": true}` once the weights are loaded, or `{"error": "..."}`
//! - then, per request line
//!   `{"video", "tmp_dir", "reference", "batch_size", "vshift", "quiet"}`,
//!   answers with `{"offset", "confidence", "dists"}` or `{"error": "..."}`
//!
//! The server's own diagnostics go to its stderr, which is discarded when the
//! loader is quiet and inherited otherwise.

use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::hardware::Device;

/// Fixed per-clip inference parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InferenceParams {
    /// Scratch directory the model may fill; removed by the caller afterwards
    pub tmp_dir: PathBuf,
    /// Clip identity, used by the model to name its scratch files
    pub reference: String,
    pub batch_size: u32,
    pub vshift: u32,
    /// Ask the model to suppress its own progress output
    pub quiet: bool,
}

/// What the model reports for one clip.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct InferenceResult {
    /// Estimated audio/video offset in frames
    pub offset: i64,
    pub confidence: f64,
    /// Per-frame distances; lower is better synchrony
    pub dists: Vec<f64>,
}

/// A loaded sync model. Stateful and not shareable between threads.
pub trait SyncModel {
    fn infer(&mut self, clip: &Path, params: &InferenceParams) -> CoreResult<InferenceResult>;
}

/// Produces a [`SyncModel`] from a checkpoint.
pub trait ModelLoader {
    type Model: SyncModel;

    fn load(&self, checkpoint: &Path, device: Device) -> CoreResult<Self::Model>;
}

/// Starts the model server as a child process.
#[derive(Debug, Clone)]
pub struct CommandModelLoader {
    command: Vec<String>,
    quiet: bool,
}

impl CommandModelLoader {
    /// `command` is the program followed by its leading arguments.
    pub fn new(command: Vec<String>, quiet: bool) -> Self {
        Self { command, quiet }
    }
}

impl ModelLoader for CommandModelLoader {
    type Model = CommandModel;

    fn load(&self, checkpoint: &Path, device: Device) -> CoreResult<CommandModel> {
        let (program, leading) = self
            .command
            .split_first()
            .ok_or_else(|| CoreError::ModelLoad("empty model command".to_string()))?;

        log::debug!(
            "Starting model server: {} (checkpoint {}, device {})",
            self.command.join(" "),
            checkpoint.display(),
            device.as_model_arg()
        );

        let mut child = Command::new(program)
            .args(leading)
            .arg("--checkpoint")
            .arg(checkpoint)
            .arg("--device")
            .arg(device.as_model_arg())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(if self.quiet { Stdio::null() } else { Stdio::inherit() })
            .spawn()
            .map_err(|e| CoreError::ModelLoad(format!("failed to start {program}: {e}")))?;

        let (stdin, stdout) = match (child.stdin.take(), child.stdout.take()) {
            (Some(stdin), Some(stdout)) => (stdin, BufReader::new(stdout)),
            _ => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(CoreError::ModelLoad("model server pipes unavailable".to_string()));
            }
        };

        let mut model = CommandModel { child, stdin, stdout };
        model.await_ready()?;
        log::debug!("Model server ready");
        Ok(model)
    }
}

#[derive(Debug, Serialize)]
struct Request<'a> {
    video: &'a Path,
    tmp_dir: &'a Path,
    reference: &'a str,
    batch_size: u32,
    vshift: u32,
    quiet: bool,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Response {
    Failure { error: String },
    Success(InferenceResult),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Handshake {
    Failure { error: String },
    Ready { ready: bool },
}

/// A running model server. The process is killed when this is dropped.
#[derive(Debug)]
pub struct CommandModel {
    child: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
}

impl CommandModel {
    fn read_line(&mut self) -> std::io::Result<Option<String>> {
        let mut line = String::new();
        loop {
            line.clear();
            if self.stdout.read_line(&mut line)? == 0 {
                return Ok(None);
            }
            // Blank lines carry nothing.
            if !line.trim().is_empty() {
                return Ok(Some(line.trim().to_string()));
            }
        }
    }

    fn await_ready(&mut self) -> CoreResult<()> {
        let line = self
            .read_line()
            .map_err(|e| CoreError::ModelLoad(format!("reading model server: {e}")))?
            .ok_or_else(|| CoreError::ModelLoad("model server exited during startup".to_string()))?;

        match serde_json::from_str::<Handshake>(&line) {
            Ok(Handshake::Ready { ready: true }) => Ok(()),
            Ok(Handshake::Ready { ready: false }) => {
                Err(CoreError::ModelLoad("model server reported not ready".to_string()))
            }
            Ok(Handshake::Failure { error }) => Err(CoreError::ModelLoad(error)),
            Err(e) => Err(CoreError::ModelLoad(format!(
                "unexpected handshake '{line}': {e}"
            ))),
        }
    }
}

impl SyncModel for CommandModel {
    fn infer(&mut self, clip: &Path, params: &InferenceParams) -> CoreResult<InferenceResult> {
        let inference_error = |message: String| CoreError::ModelInference {
            clip_id: params.reference.clone(),
            message,
        };

        let request = Request {
            video: clip,
            tmp_dir: &params.tmp_dir,
            reference: &params.reference,
            batch_size: params.batch_size,
            vshift: params.vshift,
            quiet: params.quiet,
        };
        let mut payload = serde_json::to_string(&request)
            .map_err(|e| inference_error(format!("encoding request: {e}")))?;
        payload.push('\n');

        self.stdin
            .write_all(payload.as_bytes())
            .and_then(|()| self.stdin.flush())
            .map_err(|e| inference_error(format!("writing to model server: {e}")))?;

        let line = self
            .read_line()
            .map_err(|e| inference_error(format!("reading model server: {e}")))?
            .ok_or_else(|| inference_error("model server exited".to_string()))?;

        match serde_json::from_str::<Response>(&line) {
            Ok(Response::Success(result)) => Ok(result),
            Ok(Response::Failure { error }) => Err(inference_error(error)),
            Err(e) => Err(inference_error(format!("unexpected response '{line}': {e}"))),
        }
    }
}

impl Drop for CommandModel {
    fn drop(&mut self) {
        if let Err(e) = self.child.kill() {
            log::debug!("Model server already stopped: {e}");
        }
        let _ = self.child.wait();
    }
}
