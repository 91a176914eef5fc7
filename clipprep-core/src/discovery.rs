//! Clip discovery for the scoring stage.
//!
//! Only the top level of the processed directory is searched. Hidden files
//! are skipped: they are crop outputs still being written.

use crate::error::CoreResult;

use std::path::{Path, PathBuf};

/// Finds clips with `extension` (case-insensitive) directly under `dir`,
/// sorted by stem so every run visits them in the same order.
///
/// # Examples
///
/// ```rust,no_run
/// use clipprep_core::discover_clips;
/// use std::path::Path;
///
/// let clips = discover_clips(Path::new("data/processed"), "mp4").unwrap();
/// println!("Found {} clips", clips.len());
/// ```
pub fn discover_clips(dir: &Path, extension: &str) -> CoreResult<Vec<PathBuf>> {
    let extension = extension.trim_start_matches('.');
    let read_dir = std::fs::read_dir(dir)?;

    let mut clips: Vec<PathBuf> = read_dir
        .filter_map(|entry| {
            let entry = entry.ok()?;
            let path = entry.path();

            if !path.is_file() {
                return None;
            }
            if path
                .file_name()
                .is_some_and(|name| name.to_string_lossy().starts_with('.'))
            {
                return None;
            }
            // A clip id is one ledger row; a line break would split it.
            if path
                .file_stem()
                .is_some_and(|stem| stem.to_string_lossy().contains(['\n', '\r']))
            {
                log::warn!("Skipping {:?}: line breaks in clip names are not supported", path);
                return None;
            }

            path.extension()
                .and_then(|ext| ext.to_str())
                .filter(|ext_str| ext_str.eq_ignore_ascii_case(extension))
                .map(|_| path.clone())
        })
        .collect();

    // Identity is the stem, so order by it rather than by full file name.
    clips.sort_by(|a, b| a.file_stem().cmp(&b.file_stem()).then_with(|| a.cmp(b)));
    log::debug!("Discovered {} clip(s) in {}", clips.len(), dir.display());
    Ok(clips)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_discovery_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.mp4", "a.MP4", "a-1.mp4", "c.mkv", ".clipprep_x.mp4", "notes.txt"] {
            fs::write(dir.path().join(name), b"").unwrap();
        }
        fs::create_dir(dir.path().join("sub.mp4")).unwrap();

        let clips = discover_clips(dir.path(), "mp4").unwrap();
        let names: Vec<_> = clips
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a.MP4", "a-1.mp4", "b.mp4"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_line_break_in_name_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("two\nlines.mp4"), b"").unwrap();
        fs::write(dir.path().join("ok.mp4"), b"").unwrap();

        let clips = discover_clips(dir.path(), "mp4").unwrap();
        assert_eq!(clips, vec![dir.path().join("ok.mp4")]);
    }

    #[test]
    fn test_missing_directory_is_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(discover_clips(&dir.path().join("missing"), "mp4").is_err());
    }
}
