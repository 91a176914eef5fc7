//! Temporary file management utilities.
//!
//! Both scratch artifacts the pipeline creates are scope guards from the
//! tempfile crate, so they are removed on every exit path, including errors
//! and unwinding panics:
//!
//! - the per-clip scoring workspace ([`create_temp_dir`])
//! - the in-flight crop output ([`create_temp_output`]), which is renamed onto
//!   its destination only once the transcode has succeeded

use crate::error::CoreResult;
use std::path::Path;
use tempfile::{Builder as TempFileBuilder, TempDir, TempPath};

/// Creates a temporary directory with `prefix` under `base` (or the system
/// temp directory). Deleted with its contents when dropped.
pub fn create_temp_dir(base: Option<&Path>, prefix: &str) -> CoreResult<TempDir> {
    let mut builder = TempFileBuilder::new();
    builder.prefix(prefix);
    match base {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            Ok(builder.tempdir_in(dir)?)
        }
        None => Ok(builder.tempdir()?),
    }
}

/// Mode given to produced clips. Temporary files start owner-only, and the
/// rename keeps whatever mode the reserved file has.
#[cfg(unix)]
pub const OUTPUT_FILE_MODE: u32 = 0o644;

/// Reserves a hidden temporary file next to `dest`, with the same extension.
///
/// Living in the destination directory keeps the final rename on one
/// filesystem, which makes it atomic. The leading dot keeps in-flight files
/// out of clip discovery. On Unix the file is made world-readable
/// ([`OUTPUT_FILE_MODE`]). Deleted when dropped unless persisted.
pub fn create_temp_output(dest: &Path) -> CoreResult<TempPath> {
    let dir = match dest.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;

    let suffix = dest
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default();

    let file = TempFileBuilder::new()
        .prefix(".clipprep_")
        .suffix(&suffix)
        .tempfile_in(dir)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.as_file()
            .set_permissions(std::fs::Permissions::from_mode(OUTPUT_FILE_MODE))?;
    }

    Ok(file.into_temp_path())
}
