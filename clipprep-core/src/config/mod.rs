//! Configuration structures and constants for the clipprep-core library.
//!
//! This module holds every tunable the pipeline uses: directory layout,
//! crop-stage parallelism, the geometry expansion ratio, and the scoring
//! model parameters.

mod builder;

use std::path::{Path, PathBuf};

use crate::error::{CoreError, CoreResult};
use crate::hardware::DevicePreference;

pub use builder::CoreConfigBuilder;

// Default constants

/// Default metadata file describing every clip.
pub const DEFAULT_METADATA_PATH: &str = "celebvhq_info.json";

/// Default directory holding downloaded source videos.
pub const DEFAULT_RAW_DIR: &str = "data/raw";

/// Default directory holding cropped clips.
pub const DEFAULT_PROCESSED_DIR: &str = "data/processed";

/// Default scoring ledger.
pub const DEFAULT_LEDGER_PATH: &str = "data/sync_scores.csv";

/// Container extension for both source videos and produced clips.
pub const DEFAULT_VIDEO_EXTENSION: &str = "mp4";

/// Default number of parallel crop workers.
pub const DEFAULT_CROP_WORKERS: usize = 2;

/// Relative amount each bounding-box side is widened before cropping.
pub const DEFAULT_EXPAND_RATIO: f64 = 0.02;

/// A clip whose median distance is at or below this value counts as synced.
pub const DEFAULT_SYNC_THRESHOLD: f64 = 6.0;

/// Frames per inference batch.
pub const DEFAULT_BATCH_SIZE: u32 = 20;

/// Audio/video offset search window, in frames, in each direction.
pub const DEFAULT_VSHIFT: u32 = 15;

/// Default command that starts the sync model server shipped in `tools/`.
/// Paths are relative to the workspace root.
pub const DEFAULT_MODEL_COMMAND: &[&str] = &["python3", "tools/syncnet-server/syncnet_server.py"];

/// Default model checkpoint.
pub const DEFAULT_MODEL_CHECKPOINT: &str = "syncnet_python/data/syncnet_v2.model";

/// Main configuration structure for the clipprep-core library.
///
/// Created by the CLI from its arguments (or through [`CoreConfigBuilder`])
/// and validated once at startup; an invalid configuration is fatal before
/// any item is processed.
#[derive(Debug, Clone)]
pub struct CoreConfig {
    /// JSON file listing every clip
    pub metadata_path: PathBuf,

    /// Directory of source videos, `<raw_dir>/<source_id>.<ext>`
    pub raw_dir: PathBuf,

    /// Directory of produced clips, `<processed_dir>/<clip_id>.<ext>`
    pub processed_dir: PathBuf,

    /// Append-only scoring ledger
    pub ledger_path: PathBuf,

    /// Optional base directory for scoring scratch space (defaults to the system temp dir)
    pub temp_dir: Option<PathBuf>,

    /// Container extension without the leading dot
    pub video_extension: String,

    /// Size of the crop worker pool
    pub crop_workers: usize,

    /// Bounding-box expansion ratio applied before cropping
    pub expand_ratio: f64,

    /// Median-distance threshold for classifying a clip as synced
    pub sync_threshold: f64,

    /// Inference batch size passed to the model
    pub batch_size: u32,

    /// Vertical-shift search window passed to the model
    pub vshift: u32,

    /// Program and leading arguments that start the model server
    pub model_command: Vec<String>,

    /// Model checkpoint passed to the model server
    pub model_checkpoint: PathBuf,

    /// Which device the model should run on
    pub device: DevicePreference,

    /// Suppress the model's own progress and diagnostic output
    pub quiet_model: bool,

    /// Optional proxy URL for source downloads
    pub proxy: Option<String>,

    /// Optional Netscape cookies file for source downloads
    pub cookies: Option<PathBuf>,

    /// Use aria2c as yt-dlp's external downloader
    pub use_aria2c: bool,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            metadata_path: PathBuf::from(DEFAULT_METADATA_PATH),
            raw_dir: PathBuf::from(DEFAULT_RAW_DIR),
            processed_dir: PathBuf::from(DEFAULT_PROCESSED_DIR),
            ledger_path: PathBuf::from(DEFAULT_LEDGER_PATH),
            temp_dir: None,
            video_extension: DEFAULT_VIDEO_EXTENSION.to_string(),
            crop_workers: DEFAULT_CROP_WORKERS,
            expand_ratio: DEFAULT_EXPAND_RATIO,
            sync_threshold: DEFAULT_SYNC_THRESHOLD,
            batch_size: DEFAULT_BATCH_SIZE,
            vshift: DEFAULT_VSHIFT,
            model_command: DEFAULT_MODEL_COMMAND.iter().map(|s| s.to_string()).collect(),
            model_checkpoint: PathBuf::from(DEFAULT_MODEL_CHECKPOINT),
            device: DevicePreference::Auto,
            quiet_model: true,
            proxy: None,
            cookies: None,
            use_aria2c: true,
        }
    }
}

impl CoreConfig {
    /// Checks every value that would otherwise fail late, mid-batch.
    pub fn validate(&self) -> CoreResult<()> {
        if self.crop_workers == 0 {
            return Err(CoreError::Config(
                "crop worker count must be at least 1".to_string(),
            ));
        }
        if !self.expand_ratio.is_finite() || self.expand_ratio < 0.0 {
            return Err(CoreError::Config(format!(
                "expand ratio must be a finite value >= 0, got {}",
                self.expand_ratio
            )));
        }
        if !self.sync_threshold.is_finite() {
            return Err(CoreError::Config(format!(
                "sync threshold must be finite, got {}",
                self.sync_threshold
            )));
        }
        if self.batch_size == 0 {
            return Err(CoreError::Config("batch size must be at least 1".to_string()));
        }
        if self.model_command.is_empty() || self.model_command[0].trim().is_empty() {
            return Err(CoreError::Config("model command must not be empty".to_string()));
        }
        let ext = self.video_extension.trim_start_matches('.');
        if ext.is_empty() || ext.contains(std::path::MAIN_SEPARATOR) {
            return Err(CoreError::Config(format!(
                "invalid video extension '{}'",
                self.video_extension
            )));
        }
        Ok(())
    }

    /// Extension without a leading dot.
    #[must_use]
    pub fn extension(&self) -> &str {
        self.video_extension.trim_start_matches('.')
    }

    /// Expected location of a source video.
    #[must_use]
    pub fn source_path(&self, source_id: &str) -> PathBuf {
        media_path(&self.raw_dir, source_id, self.extension())
    }

    /// Expected location of a produced clip.
    #[must_use]
    pub fn clip_path(&self, clip_id: &str) -> PathBuf {
        media_path(&self.processed_dir, clip_id, self.extension())
    }
}

/// `<dir>/<stem>.<ext>`
#[must_use]
pub fn media_path(dir: &Path, stem: &str, extension: &str) -> PathBuf {
    dir.join(format!("{stem}.{extension}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = CoreConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.crop_workers, 2);
        assert_eq!(config.expand_ratio, 0.02);
        assert_eq!(config.sync_threshold, 6.0);
    }

    #[test]
    fn test_default_model_server_ships_with_workspace() {
        let workspace = Path::new(env!("CARGO_MANIFEST_DIR")).join("..");
        let script = workspace.join(DEFAULT_MODEL_COMMAND[1]);
        assert!(script.is_file(), "{} is missing", script.display());

        let source = std::fs::read_to_string(&script).unwrap();
        assert!(source.contains("\"ready\": True"));
        assert!(source.contains("--checkpoint"));
        assert!(source.contains("--device"));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let config = CoreConfig {
            crop_workers: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(CoreError::Config(_))));

        let config = CoreConfig {
            expand_ratio: -0.1,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(CoreError::Config(_))));

        let config = CoreConfig {
            sync_threshold: f64::NAN,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(CoreError::Config(_))));

        let config = CoreConfig {
            model_command: Vec::new(),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(CoreError::Config(_))));
    }

    #[test]
    fn test_layout_paths() {
        let config = CoreConfig {
            raw_dir: PathBuf::from("/data/raw"),
            processed_dir: PathBuf::from("/data/processed"),
            video_extension: ".mp4".to_string(),
            ..Default::default()
        };
        assert_eq!(config.source_path("abc"), PathBuf::from("/data/raw/abc.mp4"));
        assert_eq!(config.clip_path("abc_0"), PathBuf::from("/data/processed/abc_0.mp4"));
    }
}
