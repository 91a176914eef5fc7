//! Work-list construction.
//!
//! The planner diffs the clip metadata against the filesystem: in acquire
//! mode it emits a job for every clip whose source video is missing, in crop
//! mode one for every clip whose source is present. Whether the crop output
//! already exists is not checked here; the crop worker owns that decision.
//!
//! Planning has no side effects. It reflects the filesystem at call time and
//! is not protected against concurrent external changes.

use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::config::CoreConfig;
use crate::error::{CoreError, CoreResult};
use crate::geometry::RelativeBox;
use crate::metadata::Metadata;

/// Which stage of the preparation pipeline to plan for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Download missing source videos.
    Acquire,
    /// Cut clips out of available source videos.
    Crop,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Acquire => write!(f, "acquire"),
            Mode::Crop => write!(f, "crop"),
        }
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "acquire" | "download" => Ok(Mode::Acquire),
            "crop" | "process" => Ok(Mode::Crop),
            other => Err(format!("unknown mode '{other}' (expected acquire or crop)")),
        }
    }
}

/// A single unit of work derived from one clip.
#[derive(Debug, Clone, PartialEq)]
pub struct Job {
    pub clip_id: String,
    pub source_id: String,
    pub source_path: PathBuf,
    pub dest_path: PathBuf,
    pub bbox: RelativeBox,
    pub start_sec: f64,
    pub end_sec: f64,
}

/// Planned jobs plus how many clips were looked at.
#[derive(Debug, Clone, Default)]
pub struct JobPlan {
    /// Jobs in clip-id order
    pub jobs: Vec<Job>,
    /// Number of clips in the metadata
    pub considered: usize,
}

impl JobPlan {
    /// Number of jobs emitted.
    #[must_use]
    pub fn emitted(&self) -> usize {
        self.jobs.len()
    }
}

/// Plans jobs for `mode` against the real filesystem.
pub fn plan_jobs(metadata: &Metadata, config: &CoreConfig, mode: Mode) -> CoreResult<JobPlan> {
    plan_jobs_with(metadata, config, mode, |path| path.exists())
}

/// Plans jobs for `mode`, asking `source_exists` whether each source is present.
pub fn plan_jobs_with<F>(
    metadata: &Metadata,
    config: &CoreConfig,
    mode: Mode,
    source_exists: F,
) -> CoreResult<JobPlan>
where
    F: Fn(&Path) -> bool,
{
    let mut jobs = Vec::new();
    let mut destinations = HashSet::new();

    for spec in metadata.values() {
        let source_path = config.source_path(&spec.source_id);
        let present = source_exists(&source_path);

        let wanted = match mode {
            Mode::Acquire => !present,
            Mode::Crop => present,
        };
        if !wanted {
            continue;
        }

        let dest_path = match mode {
            Mode::Acquire => source_path.clone(),
            Mode::Crop => config.clip_path(&spec.clip_id),
        };
        // Several clips may share a missing source; acquisition dedupes at run time.
        if mode == Mode::Crop && !destinations.insert(dest_path.clone()) {
            return Err(CoreError::DuplicateDestination(dest_path));
        }

        jobs.push(Job {
            clip_id: spec.clip_id.clone(),
            source_id: spec.source_id.clone(),
            source_path,
            dest_path,
            bbox: spec.bbox,
            start_sec: spec.start_sec,
            end_sec: spec.end_sec,
        });
    }

    log::debug!(
        "Planned {} {} job(s) from {} clip(s)",
        jobs.len(),
        mode,
        metadata.len()
    );

    Ok(JobPlan {
        jobs,
        considered: metadata.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::ClipSpec;

    fn spec(clip_id: &str, source_id: &str) -> ClipSpec {
        ClipSpec {
            clip_id: clip_id.to_string(),
            source_id: source_id.to_string(),
            start_sec: 1.0,
            end_sec: 3.0,
            bbox: RelativeBox { top: 0.1, bottom: 0.6, left: 0.3, right: 0.7 },
        }
    }

    fn metadata(specs: &[ClipSpec]) -> Metadata {
        specs.iter().map(|s| (s.clip_id.clone(), s.clone())).collect()
    }

    fn config() -> CoreConfig {
        CoreConfig {
            raw_dir: PathBuf::from("/raw"),
            processed_dir: PathBuf::from("/out"),
            ..Default::default()
        }
    }

    #[test]
    fn test_modes_partition_clips() {
        let md = metadata(&[spec("c1", "present"), spec("c2", "absent"), spec("c3", "present")]);
        let exists = |p: &Path| p == Path::new("/raw/present.mp4");

        let acquire = plan_jobs_with(&md, &config(), Mode::Acquire, exists).unwrap();
        let crop = plan_jobs_with(&md, &config(), Mode::Crop, exists).unwrap();

        let acquire_ids: Vec<_> = acquire.jobs.iter().map(|j| j.clip_id.as_str()).collect();
        let crop_ids: Vec<_> = crop.jobs.iter().map(|j| j.clip_id.as_str()).collect();
        assert_eq!(acquire_ids, vec!["c2"]);
        assert_eq!(crop_ids, vec!["c1", "c3"]);
        assert_eq!(acquire.considered, 3);
        assert_eq!(crop.considered, 3);
        assert_eq!(acquire.emitted() + crop.emitted(), 3);
    }

    #[test]
    fn test_job_paths() {
        let md = metadata(&[spec("clip_a", "srcA")]);

        let crop = plan_jobs_with(&md, &config(), Mode::Crop, |_| true).unwrap();
        let job = &crop.jobs[0];
        assert_eq!(job.source_path, PathBuf::from("/raw/srcA.mp4"));
        assert_eq!(job.dest_path, PathBuf::from("/out/clip_a.mp4"));
        assert_eq!(job.start_sec, 1.0);
        assert_eq!(job.end_sec, 3.0);

        let acquire = plan_jobs_with(&md, &config(), Mode::Acquire, |_| false).unwrap();
        assert_eq!(acquire.jobs[0].dest_path, PathBuf::from("/raw/srcA.mp4"));
    }

    #[test]
    fn test_shared_source_yields_one_job_per_clip() {
        let md = metadata(&[spec("a", "same"), spec("b", "same")]);
        let plan = plan_jobs_with(&md, &config(), Mode::Acquire, |_| false).unwrap();
        assert_eq!(plan.emitted(), 2);
        assert!(plan.jobs.iter().all(|j| j.source_id == "same"));
    }

    #[test]
    fn test_empty_metadata() {
        let plan = plan_jobs_with(&Metadata::new(), &config(), Mode::Crop, |_| true).unwrap();
        assert_eq!(plan.considered, 0);
        assert!(plan.jobs.is_empty());
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!("acquire".parse::<Mode>(), Ok(Mode::Acquire));
        assert_eq!("Crop".parse::<Mode>(), Ok(Mode::Crop));
        assert!("score".parse::<Mode>().is_err());
        assert_eq!(Mode::Crop.to_string(), "crop");
    }
}
