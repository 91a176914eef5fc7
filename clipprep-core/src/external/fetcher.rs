//! Source video download through yt-dlp.

use std::path::Path;
use std::process::{Command, Stdio};

use crate::config::CoreConfig;
use crate::error::{CoreError, CoreResult};
use crate::external::SourceFetcher;

const YT_DLP: &str = "yt-dlp";
const WATCH_URL: &str = "https://www.youtube.com/watch?v=";
const FORMAT_SELECTOR: &str = "bestvideo[ext=mp4]+bestaudio[ext=m4a]/bestvideo+bestaudio";
const ARIA2C_ARGS: &str = "aria2c:-x 16 -k 1M";

/// [`SourceFetcher`] that shells out to `yt-dlp`.
#[derive(Debug, Clone, Default)]
pub struct YtDlpFetcher {
    proxy: Option<String>,
    cookies: Option<std::path::PathBuf>,
    use_aria2c: bool,
}

impl YtDlpFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetcher configured from the download settings in `config`.
    pub fn from_config(config: &CoreConfig) -> Self {
        Self {
            proxy: config.proxy.clone(),
            cookies: config.cookies.clone(),
            use_aria2c: config.use_aria2c,
        }
    }

    /// yt-dlp arguments for one download.
    #[must_use]
    pub fn args(&self, source_id: &str, dest: &Path) -> Vec<String> {
        let mut args = vec![
            format!("{WATCH_URL}{source_id}"),
            "--quiet".to_string(),
            "--no-warnings".to_string(),
            "--no-progress".to_string(),
            "-f".to_string(),
            FORMAT_SELECTOR.to_string(),
            "--skip-unavailable-fragments".to_string(),
            "--merge-output-format".to_string(),
            "mp4".to_string(),
        ];
        if let Some(proxy) = &self.proxy {
            args.push("--proxy".to_string());
            args.push(proxy.clone());
        }
        if let Some(cookies) = &self.cookies {
            args.push("--cookies".to_string());
            args.push(cookies.to_string_lossy().into_owned());
        }
        if self.use_aria2c {
            args.push("--external-downloader".to_string());
            args.push("aria2c".to_string());
            args.push("--external-downloader-args".to_string());
            args.push(ARIA2C_ARGS.to_string());
        }
        args.push("-o".to_string());
        args.push(dest.to_string_lossy().into_owned());
        args
    }
}

impl SourceFetcher for YtDlpFetcher {
    fn fetch(&self, source_id: &str, dest: &Path) -> CoreResult<()> {
        let acquisition_error = |message: String| CoreError::Acquisition {
            source_id: source_id.to_string(),
            message,
        };

        let args = self.args(source_id, dest);
        log::debug!("Running {YT_DLP} {}", args.join(" "));

        let status = Command::new(YT_DLP)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map_err(|e| acquisition_error(format!("failed to start {YT_DLP}: {e}")))?;

        if !status.success() {
            return Err(acquisition_error(format!("{YT_DLP} exited with {status}")));
        }
        if !dest.exists() {
            return Err(acquisition_error(format!(
                "{YT_DLP} reported success but {} is missing",
                dest.display()
            )));
        }
        Ok(())
    }
}
