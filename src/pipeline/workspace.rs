//! Workspace preparation and cleanup.
//!
//! The scratch directory doubles as the stale-state detector: if a
//! previous run (or a tool it invoked) still holds it attached, the
//! reset fails loudly instead of letting the build produce a bad image.

use anyhow::{Context, Result};
use std::fs;
use walkdir::WalkDir;

use super::paths::BuildPaths;

/// Guarantee the scratch directory exists and is empty.
///
/// Entries are removed bottom-up so the first path the OS refuses to
/// release surfaces in the error, naming the stale attachment.
pub fn reset_scratch_dir(paths: &BuildPaths) -> Result<()> {
    let scratch = &paths.scratch_dir;

    if scratch.is_dir() {
        for entry in WalkDir::new(scratch).min_depth(1).contents_first(true) {
            let entry = entry
                .with_context(|| format!("walking scratch directory '{}'", scratch.display()))?;
            let removed = if entry.file_type().is_dir() {
                fs::remove_dir(entry.path())
            } else {
                fs::remove_file(entry.path())
            };
            removed.with_context(|| {
                format!(
                    "removing '{}'; the scratch directory appears to still be attached by a previous run",
                    entry.path().display()
                )
            })?;
        }
        fs::remove_dir(scratch).with_context(|| {
            format!(
                "removing scratch directory '{}'; it appears to still be attached by a previous run",
                scratch.display()
            )
        })?;
    }

    fs::create_dir(scratch)
        .with_context(|| format!("creating scratch directory '{}'", scratch.display()))?;
    Ok(())
}

/// Delete stale output artifacts from previous runs.
///
/// Ensures a failed build leaves either current images or nothing, never
/// yesterday's images posing as today's.
pub fn remove_stale_outputs(paths: &BuildPaths) -> Result<()> {
    let stale = [
        &paths.duplicate_image,
        &paths.working_image,
        &paths.stale_compressed_image,
        &paths.raw_image,
        &paths.iso_image,
    ];

    for path in stale {
        if path.is_file() {
            fs::remove_file(path)
                .with_context(|| format!("removing stale artifact '{}'", path.display()))?;
        }
    }
    Ok(())
}

/// Remove the scratch directory and any transient intermediate image.
///
/// Called whether or not the overlay phase succeeded.
pub fn cleanup_transients(paths: &BuildPaths) -> Result<()> {
    if paths.scratch_dir.exists() {
        fs::remove_dir_all(&paths.scratch_dir).with_context(|| {
            format!(
                "removing scratch directory '{}'",
                paths.scratch_dir.display()
            )
        })?;
    }

    for path in [&paths.raw_image, &paths.iso_image] {
        if path.is_file() {
            fs::remove_file(path)
                .with_context(|| format!("removing transient image '{}'", path.display()))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_reset_creates_missing_scratch_dir() {
        let temp = TempDir::new().unwrap();
        let paths = BuildPaths::new(temp.path());

        reset_scratch_dir(&paths).unwrap();

        assert!(paths.scratch_dir.is_dir());
        assert_eq!(fs::read_dir(&paths.scratch_dir).unwrap().count(), 0);
    }

    #[test]
    fn test_reset_clears_populated_scratch_dir() {
        let temp = TempDir::new().unwrap();
        let paths = BuildPaths::new(temp.path());

        fs::create_dir_all(paths.scratch_dir.join("ML/modules")).unwrap();
        fs::write(paths.scratch_dir.join("autoexec.bin"), b"old").unwrap();
        fs::write(paths.scratch_dir.join("ML/modules/dot.mo"), b"old").unwrap();

        reset_scratch_dir(&paths).unwrap();

        assert!(paths.scratch_dir.is_dir());
        assert_eq!(fs::read_dir(&paths.scratch_dir).unwrap().count(), 0);
    }

    #[test]
    fn test_remove_stale_outputs() {
        let temp = TempDir::new().unwrap();
        let paths = BuildPaths::new(temp.path());

        for path in [
            &paths.working_image,
            &paths.duplicate_image,
            &paths.stale_compressed_image,
            &paths.raw_image,
            &paths.iso_image,
        ] {
            fs::write(path, b"stale").unwrap();
        }

        remove_stale_outputs(&paths).unwrap();

        assert!(!paths.working_image.exists());
        assert!(!paths.duplicate_image.exists());
        assert!(!paths.stale_compressed_image.exists());
        assert!(!paths.raw_image.exists());
        assert!(!paths.iso_image.exists());
    }

    #[test]
    fn test_remove_stale_outputs_with_nothing_stale() {
        let temp = TempDir::new().unwrap();
        let paths = BuildPaths::new(temp.path());
        remove_stale_outputs(&paths).unwrap();
    }

    #[test]
    fn test_cleanup_removes_scratch_and_transients() {
        let temp = TempDir::new().unwrap();
        let paths = BuildPaths::new(temp.path());

        fs::create_dir_all(paths.scratch_dir.join("ML")).unwrap();
        fs::write(paths.scratch_dir.join("ML/readme.txt"), b"x").unwrap();
        fs::write(&paths.raw_image, b"raw").unwrap();
        fs::write(&paths.iso_image, b"iso").unwrap();

        cleanup_transients(&paths).unwrap();

        assert!(!paths.scratch_dir.exists());
        assert!(!paths.raw_image.exists());
        assert!(!paths.iso_image.exists());
    }
}
