// ============================================================================
// clipprep-core/src/config/builder.rs
// ============================================================================
//
// CONFIGURATION BUILDER: Builder Pattern for CoreConfig
//
// Fluent API over CoreConfig. Every field starts at its documented default,
// so callers only name what they change. `build()` validates the result.

use std::path::PathBuf;

use super::CoreConfig;
use crate::error::CoreResult;
use crate::hardware::DevicePreference;

/// Builder for creating CoreConfig instances.
///
/// # Examples
///
/// ```rust
/// use clipprep_core::config::CoreConfigBuilder;
/// use std::path::PathBuf;
///
/// let config = CoreConfigBuilder::new()
///     .metadata_path(PathBuf::from("celebvhq_info.json"))
///     .raw_dir(PathBuf::from("/data/raw"))
///     .processed_dir(PathBuf::from("/data/processed"))
///     .crop_workers(8)
///     .build()
///     .unwrap();
/// assert_eq!(config.crop_workers, 8);
/// ```
#[derive(Debug, Clone, Default)]
pub struct CoreConfigBuilder {
    config: CoreConfig,
}

impl CoreConfigBuilder {
    /// Creates a new builder with every field at its default.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the metadata JSON file.
    pub fn metadata_path(mut self, path: PathBuf) -> Self {
        self.config.metadata_path = path;
        self
    }

    /// Sets the source video directory.
    pub fn raw_dir(mut self, dir: PathBuf) -> Self {
        self.config.raw_dir = dir;
        self
    }

    /// Sets the produced clip directory.
    pub fn processed_dir(mut self, dir: PathBuf) -> Self {
        self.config.processed_dir = dir;
        self
    }

    /// Sets the scoring ledger file.
    pub fn ledger_path(mut self, path: PathBuf) -> Self {
        self.config.ledger_path = path;
        self
    }

    /// Sets the base directory for scoring scratch space.
    pub fn temp_dir(mut self, dir: PathBuf) -> Self {
        self.config.temp_dir = Some(dir);
        self
    }

    pub fn video_extension(mut self, extension: &str) -> Self {
        self.config.video_extension = extension.to_string();
        self
    }

    /// Sets the number of parallel crop workers.
    pub fn crop_workers(mut self, workers: usize) -> Self {
        self.config.crop_workers = workers;
        self
    }

    pub fn expand_ratio(mut self, ratio: f64) -> Self {
        self.config.expand_ratio = ratio;
        self
    }

    /// Sets the median-distance threshold at or below which a clip is synced.
    pub fn sync_threshold(mut self, threshold: f64) -> Self {
        self.config.sync_threshold = threshold;
        self
    }

    pub fn batch_size(mut self, batch_size: u32) -> Self {
        self.config.batch_size = batch_size;
        self
    }

    pub fn vshift(mut self, vshift: u32) -> Self {
        self.config.vshift = vshift;
        self
    }

    /// Sets the program and leading arguments that start the model server.
    pub fn model_command(mut self, command: Vec<String>) -> Self {
        self.config.model_command = command;
        self
    }

    pub fn model_checkpoint(mut self, path: PathBuf) -> Self {
        self.config.model_checkpoint = path;
        self
    }

    pub fn device(mut self, device: DevicePreference) -> Self {
        self.config.device = device;
        self
    }

    /// Sets whether the model's own output is discarded.
    pub fn quiet_model(mut self, quiet: bool) -> Self {
        self.config.quiet_model = quiet;
        self
    }

    /// Sets the proxy used for source downloads.
    pub fn proxy(mut self, proxy: &str) -> Self {
        self.config.proxy = Some(proxy.to_string());
        self
    }

    /// Sets the cookies file used for source downloads.
    pub fn cookies(mut self, path: PathBuf) -> Self {
        self.config.cookies = Some(path);
        self
    }

    pub fn use_aria2c(mut self, enable: bool) -> Self {
        self.config.use_aria2c = enable;
        self
    }

    /// Builds and validates the configuration.
    pub fn build(self) -> CoreResult<CoreConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
