//! Utility functions for formatting and path handling.
//!
//! General-purpose helpers shared by the crop stage, the scorer and the CLI:
//! ffmpeg timestamp formatting, duration formatting, clip identity from a
//! path, and the median used to summarize per-frame distances.

use std::path::Path;

/// Formats seconds as an ffmpeg `HH:MM:SS.cc` timestamp.
///
/// Every field is truncated, never rounded, and zero-padded to two digits
/// (hours may grow wider past 99). Negative or non-finite input formats as
/// zero.
///
/// ```rust
/// use clipprep_core::utils::format_timestamp;
/// assert_eq!(format_timestamp(3661.5), "01:01:01.50");
/// ```
#[must_use]
pub fn format_timestamp(seconds: f64) -> String {
    let seconds = if seconds.is_finite() && seconds > 0.0 { seconds } else { 0.0 };

    let hours = (seconds / 3600.0).floor();
    let minutes = ((seconds % 3600.0) / 60.0).floor();
    let secs = seconds % 60.0;
    let centis = ((secs - secs.trunc()) * 100.0).trunc();

    format!(
        "{:02}:{:02}:{:02}.{:02}",
        hours as u64, minutes as u64, secs as u64, centis as u64
    )
}

/// Formats seconds as HH:MM:SS (e.g., 3725.0 -> "01:02:05"). Returns "??:??:??" for invalid inputs.
#[must_use]
pub fn format_duration(seconds: f64) -> String {
    if seconds < 0.0 || !seconds.is_finite() {
        return "??:??:??".to_string();
    }

    let total_seconds = seconds as u64;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let secs = total_seconds % 60;
    format!("{hours:02}:{minutes:02}:{secs:02}")
}

/// Extracts a clip's identity (its file stem) from a path.
pub fn clip_stem(path: &Path) -> crate::CoreResult<String> {
    Ok(path
        .file_stem()
        .ok_or_else(|| {
            crate::CoreError::PathError(format!("Failed to get file stem for {}", path.display()))
        })?
        .to_string_lossy()
        .to_string())
}

/// Median of a sequence; the mean of the two middle values for even lengths.
/// Returns `None` for an empty sequence or one containing NaN.
#[must_use]
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() || values.iter().any(|v| v.is_nan()) {
        return None;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(0.0), "00:00:00.00");
        assert_eq!(format_timestamp(3661.5), "01:01:01.50");
        assert_eq!(format_timestamp(59.999), "00:00:59.99");
        assert_eq!(format_timestamp(60.0), "00:01:00.00");
        assert_eq!(format_timestamp(7.25), "00:00:07.25");
        assert_eq!(format_timestamp(36000.0), "10:00:00.00");

        // Clamped
        assert_eq!(format_timestamp(-3.0), "00:00:00.00");
        assert_eq!(format_timestamp(f64::NAN), "00:00:00.00");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0.0), "00:00:00");
        assert_eq!(format_duration(59.9), "00:00:59");
        assert_eq!(format_duration(3661.0), "01:01:01");
        assert_eq!(format_duration(90061.0), "25:01:01");
        assert_eq!(format_duration(-1.0), "??:??:??");
        assert_eq!(format_duration(f64::INFINITY), "??:??:??");
    }

    #[test]
    fn test_clip_stem() {
        assert_eq!(clip_stem(Path::new("/data/processed/abc_0.mp4")).unwrap(), "abc_0");
        assert_eq!(clip_stem(Path::new("x-y.mp4")).unwrap(), "x-y");
        assert!(clip_stem(Path::new("/")).is_err());
    }

    #[test]
    fn test_median() {
        assert_eq!(median(&[]), None);
        assert_eq!(median(&[3.0]), Some(3.0));
        assert_eq!(median(&[9.0, 1.0, 5.0]), Some(5.0));
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), Some(2.5));
        assert_eq!(median(&[1.0, f64::NAN]), None);
    }
}
