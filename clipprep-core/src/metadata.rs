//! Clip metadata loading and validation.
//!
//! The metadata file maps every clip id to the source video it is cut from,
//! its time window and a relative face bounding box:
//!
//! ```json
//! {"clips": {"<clip_id>": {"ytb_id": "...",
//!                          "duration": {"start_sec": 1.0, "end_sec": 4.5},
//!                          "bbox": {"top": 0.1, "bottom": 0.6, "left": 0.3, "right": 0.7}}}}
//! ```
//!
//! Unknown fields are ignored. Any malformed or invalid clip is fatal: the
//! pipeline never starts on partially understood metadata.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use crate::error::{CoreError, CoreResult};
use crate::geometry::RelativeBox;

/// One clip to be cut from a source video.
#[derive(Debug, Clone, PartialEq)]
pub struct ClipSpec {
    pub clip_id: String,
    pub source_id: String,
    pub start_sec: f64,
    pub end_sec: f64,
    pub bbox: RelativeBox,
}

/// Parsed metadata, keyed and ordered by clip id.
pub type Metadata = BTreeMap<String, ClipSpec>;

#[derive(Debug, Deserialize)]
struct RawMetadata {
    clips: BTreeMap<String, RawClip>,
}

#[derive(Debug, Deserialize)]
struct RawClip {
    ytb_id: String,
    duration: RawDuration,
    bbox: RelativeBox,
}

#[derive(Debug, Deserialize)]
struct RawDuration {
    start_sec: f64,
    end_sec: f64,
}

/// Reads and validates the metadata file at `path`.
pub fn load_metadata(path: &Path) -> CoreResult<Metadata> {
    log::debug!("Loading clip metadata from {}", path.display());
    let text = std::fs::read_to_string(path).map_err(|e| CoreError::MetadataParse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    let metadata = parse_metadata(&text).map_err(|e| match e {
        CoreError::JsonParseError(message) => CoreError::MetadataParse {
            path: path.to_path_buf(),
            message,
        },
        other => other,
    })?;
    log::debug!("Loaded {} clip(s) from {}", metadata.len(), path.display());
    Ok(metadata)
}

/// Parses and validates metadata JSON.
pub fn parse_metadata(text: &str) -> CoreResult<Metadata> {
    let raw: RawMetadata =
        serde_json::from_str(text).map_err(|e| CoreError::JsonParseError(e.to_string()))?;

    raw.clips
        .into_iter()
        .map(|(clip_id, clip)| {
            let spec = ClipSpec {
                clip_id: clip_id.clone(),
                source_id: clip.ytb_id,
                start_sec: clip.duration.start_sec,
                end_sec: clip.duration.end_sec,
                bbox: clip.bbox,
            };
            validate_clip(&spec)?;
            Ok((clip_id, spec))
        })
        .collect()
}

fn validate_clip(spec: &ClipSpec) -> CoreResult<()> {
    let invalid = |message: String| CoreError::InvalidClip {
        clip_id: spec.clip_id.clone(),
        message,
    };

    if spec.clip_id.is_empty() || spec.clip_id.contains(['/', '\\']) {
        return Err(invalid("clip id must be a non-empty file name".to_string()));
    }
    // Clip ids become ledger rows, one per line.
    if spec.clip_id.contains(char::is_control) {
        return Err(invalid("clip id must not contain control characters".to_string()));
    }
    if spec.source_id.is_empty() || spec.source_id.contains(['/', '\\']) {
        return Err(invalid(format!(
            "source id '{}' must be a non-empty file name",
            spec.source_id
        )));
    }

    if !spec.start_sec.is_finite() || !spec.end_sec.is_finite() || spec.start_sec < 0.0 {
        return Err(invalid(format!(
            "invalid time window {}..{}",
            spec.start_sec, spec.end_sec
        )));
    }
    if spec.end_sec <= spec.start_sec {
        return Err(invalid(format!(
            "end_sec {} must be greater than start_sec {}",
            spec.end_sec, spec.start_sec
        )));
    }

    let b = spec.bbox;
    if [b.top, b.bottom, b.left, b.right]
        .iter()
        .any(|v| !(0.0..=1.0).contains(v))
    {
        return Err(invalid(format!("bbox {b:?} outside [0, 1]")));
    }
    if b.top >= b.bottom || b.left >= b.right {
        return Err(invalid(format!("bbox {b:?} is empty or inverted")));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_CLIPS: &str = r#"{
        "meta_info": {"version": "1"},
        "clips": {
            "b_clip": {"ytb_id": "srcB", "duration": {"start_sec": 0, "end_sec": 2.5},
                       "bbox": {"top": 0.1, "bottom": 0.6, "left": 0.3, "right": 0.7},
                       "attributes": {"emotion": "neutral"}},
            "a_clip": {"ytb_id": "srcA", "duration": {"start_sec": 10.0, "end_sec": 12.0},
                       "bbox": {"top": 0.0, "bottom": 1.0, "left": 0.0, "right": 1.0}}
        }
    }"#;

    #[test]
    fn test_parse_orders_by_clip_id() {
        let metadata = parse_metadata(TWO_CLIPS).unwrap();
        let ids: Vec<_> = metadata.keys().cloned().collect();
        assert_eq!(ids, vec!["a_clip", "b_clip"]);

        let b = &metadata["b_clip"];
        assert_eq!(b.source_id, "srcB");
        assert_eq!(b.start_sec, 0.0);
        assert_eq!(b.end_sec, 2.5);
        assert_eq!(b.bbox.left, 0.3);
    }

    #[test]
    fn test_rejects_malformed_json() {
        assert!(matches!(
            parse_metadata("{\"clips\": ["),
            Err(CoreError::JsonParseError(_))
        ));
        assert!(matches!(
            parse_metadata("{\"videos\": {}}"),
            Err(CoreError::JsonParseError(_))
        ));
    }

    #[test]
    fn test_rejects_invalid_clips() {
        let inverted = r#"{"clips": {"x": {"ytb_id": "s", "duration": {"start_sec": 0, "end_sec": 1},
            "bbox": {"top": 0.6, "bottom": 0.1, "left": 0.3, "right": 0.7}}}}"#;
        assert!(matches!(
            parse_metadata(inverted),
            Err(CoreError::InvalidClip { ref clip_id, .. }) if clip_id == "x"
        ));

        let out_of_range = r#"{"clips": {"x": {"ytb_id": "s", "duration": {"start_sec": 0, "end_sec": 1},
            "bbox": {"top": 0.1, "bottom": 1.2, "left": 0.3, "right": 0.7}}}}"#;
        assert!(parse_metadata(out_of_range).is_err());

        let backwards = r#"{"clips": {"x": {"ytb_id": "s", "duration": {"start_sec": 5, "end_sec": 1},
            "bbox": {"top": 0.1, "bottom": 0.6, "left": 0.3, "right": 0.7}}}}"#;
        assert!(parse_metadata(backwards).is_err());

        let traversal = r#"{"clips": {"x": {"ytb_id": "../etc", "duration": {"start_sec": 0, "end_sec": 1},
            "bbox": {"top": 0.1, "bottom": 0.6, "left": 0.3, "right": 0.7}}}}"#;
        assert!(parse_metadata(traversal).is_err());

        let multiline = r#"{"clips": {"a\nb": {"ytb_id": "s", "duration": {"start_sec": 0, "end_sec": 1},
            "bbox": {"top": 0.1, "bottom": 0.6, "left": 0.3, "right": 0.7}}}}"#;
        assert!(matches!(
            parse_metadata(multiline),
            Err(CoreError::InvalidClip { ref clip_id, .. }) if clip_id == "a\nb"
        ));
    }

    #[test]
    fn test_load_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("info.json");
        std::fs::write(&path, "not json").unwrap();

        match load_metadata(&path) {
            Err(CoreError::MetadataParse { path: p, .. }) => assert_eq!(p, path),
            other => panic!("unexpected result: {other:?}"),
        }

        let missing = dir.path().join("missing.json");
        assert!(matches!(
            load_metadata(&missing),
            Err(CoreError::MetadataParse { .. })
        ));
    }
}
