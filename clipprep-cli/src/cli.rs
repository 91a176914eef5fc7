// clipprep-cli/src/cli.rs
//
// Defines the command-line argument structures using clap.

use crate::config::DEFAULT_LOG_DIR;
use clap::{Parser, Subcommand};
use clipprep_core::config::{
    DEFAULT_BATCH_SIZE, DEFAULT_CROP_WORKERS, DEFAULT_LEDGER_PATH, DEFAULT_METADATA_PATH,
    DEFAULT_MODEL_CHECKPOINT, DEFAULT_PROCESSED_DIR, DEFAULT_RAW_DIR, DEFAULT_SYNC_THRESHOLD,
    DEFAULT_VSHIFT,
};
use clipprep_core::{DevicePreference, Mode};
use std::path::PathBuf;

// --- CLI Argument Definition ---

#[derive(Parser, Debug)]
#[command(
    author,
    version, // Reads from Cargo.toml via "cargo" feature in clap
    about = "clipprep: face-clip dataset preparation",
    long_about = "Downloads source videos, crops face clips out of them, and scores each clip's audio-visual sync."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Show debug output on the console
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Acquires missing source videos or crops clips out of present ones
    Prepare(PrepareArgs),
    /// Scores produced clips for audio-visual sync and records them in the ledger
    Score(ScoreArgs),
}

#[derive(Parser, Debug)]
pub struct PrepareArgs {
    /// Stage to run: acquire (download sources) or crop (cut clips)
    #[arg(short, long, value_name = "MODE")]
    pub mode: Mode,

    /// Number of parallel crop workers
    #[arg(short, long, value_name = "N", env = "CLIPPREP_WORKERS", default_value_t = DEFAULT_CROP_WORKERS)]
    pub workers: usize,

    /// Clip metadata JSON file
    #[arg(long, value_name = "PATH", env = "CLIPPREP_METADATA", default_value = DEFAULT_METADATA_PATH)]
    pub metadata: PathBuf,

    /// Directory holding downloaded source videos
    #[arg(long, value_name = "DIR", env = "CLIPPREP_RAW_DIR", default_value = DEFAULT_RAW_DIR)]
    pub raw_dir: PathBuf,

    /// Directory receiving cropped clips
    #[arg(long, value_name = "DIR", env = "CLIPPREP_PROCESSED_DIR", default_value = DEFAULT_PROCESSED_DIR)]
    pub processed_dir: PathBuf,

    // --- Acquisition ---
    /// Proxy URL handed to yt-dlp
    #[arg(long, value_name = "URL", env = "CLIPPREP_PROXY")]
    pub proxy: Option<String>,

    /// Cookies file handed to yt-dlp
    #[arg(long, value_name = "PATH", env = "CLIPPREP_COOKIES")]
    pub cookies: Option<PathBuf>,

    /// Download with yt-dlp's built-in downloader instead of aria2c
    #[arg(long, default_value_t = false)]
    pub no_aria2c: bool,

    /// Directory for log files
    #[arg(short, long, value_name = "DIR", env = "CLIPPREP_LOG_DIR", default_value = DEFAULT_LOG_DIR)]
    pub log_dir: PathBuf,
}

#[derive(Parser, Debug)]
pub struct ScoreArgs {
    /// Directory of clips to score
    #[arg(long, value_name = "DIR", env = "CLIPPREP_PROCESSED_DIR", default_value = DEFAULT_PROCESSED_DIR)]
    pub clips_dir: PathBuf,

    /// Sync score CSV; created if missing, appended to otherwise
    #[arg(long, value_name = "PATH", env = "CLIPPREP_LEDGER", default_value = DEFAULT_LEDGER_PATH)]
    pub ledger: PathBuf,

    // --- Sync Model ---
    /// Model checkpoint file
    #[arg(long, value_name = "PATH", env = "CLIPPREP_CHECKPOINT", default_value = DEFAULT_MODEL_CHECKPOINT)]
    pub checkpoint: PathBuf,

    /// Model server command, one argument per flag (default: the bundled server)
    #[arg(long = "model-command", value_name = "ARG", allow_hyphen_values = true)]
    pub model_command: Vec<String>,

    /// Device for the model: auto, accelerated or fallback
    #[arg(long, value_name = "DEVICE", env = "CLIPPREP_DEVICE", default_value = "auto")]
    pub device: DevicePreference,

    /// Median distance at or below which a clip counts as synced
    #[arg(long, value_name = "DIST", default_value_t = DEFAULT_SYNC_THRESHOLD)]
    pub threshold: f64,

    /// Frames per inference batch
    #[arg(long, value_name = "N", default_value_t = DEFAULT_BATCH_SIZE)]
    pub batch_size: u32,

    /// Largest audio/video offset searched, in frames
    #[arg(long, value_name = "FRAMES", default_value_t = DEFAULT_VSHIFT)]
    pub vshift: u32,

    /// Show the model process' own output
    #[arg(long, default_value_t = false)]
    pub model_verbose: bool,

    /// Directory for log files
    #[arg(short, long, value_name = "DIR", env = "CLIPPREP_LOG_DIR", default_value = DEFAULT_LOG_DIR)]
    pub log_dir: PathBuf,
}
