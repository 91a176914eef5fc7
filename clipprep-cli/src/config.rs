// clipprep-cli/src/config.rs
//
// Defaults that only matter to the command-line front end.

/// Directory for per-run log files.
pub const DEFAULT_LOG_DIR: &str = "logs";

/// Prefix of every log file name.
pub const LOG_FILE_PREFIX: &str = "clipprep";

/// External tools the prepare command shells out to, with the flag used to
/// check that each one starts.
pub const ACQUIRE_DEPENDENCIES: &[(&str, &str)] = &[("yt-dlp", "--version")];
pub const CROP_DEPENDENCIES: &[(&str, &str)] = &[("ffprobe", "-version"), ("ffmpeg", "-version")];
