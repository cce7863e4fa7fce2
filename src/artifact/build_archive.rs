//! Build archive extraction into the scratch tree.
//!
//! The archive is opaque except for its expected top level: one boot
//! binary and one payload directory. The overlay replaces, never
//! merges: a file a previous archive shipped but the new one omits
//! must not survive into the image.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use zip::ZipArchive;

use crate::pipeline::paths::{BOOT_FILE, PAYLOAD_DIR};

/// Remove payload paths left over from a previous archive.
pub fn remove_stale_payload(scratch_dir: &Path) -> Result<()> {
    let stale_boot = scratch_dir.join(BOOT_FILE);
    if stale_boot.is_file() {
        fs::remove_file(&stale_boot)
            .with_context(|| format!("removing stale '{}'", stale_boot.display()))?;
    }

    let stale_payload = scratch_dir.join(PAYLOAD_DIR);
    if stale_payload.is_dir() {
        fs::remove_dir_all(&stale_payload)
            .with_context(|| format!("removing stale '{}'", stale_payload.display()))?;
    }
    Ok(())
}

/// Extract the build archive into the scratch tree.
pub fn extract_build_archive(archive_path: &Path, scratch_dir: &Path) -> Result<()> {
    let file = fs::File::open(archive_path)
        .with_context(|| format!("opening build archive '{}'", archive_path.display()))?;
    let mut archive = ZipArchive::new(file)
        .with_context(|| format!("reading build archive '{}'", archive_path.display()))?;

    archive.extract(scratch_dir).with_context(|| {
        format!(
            "extracting '{}' into '{}'",
            archive_path.display(),
            scratch_dir.display()
        )
    })?;
    Ok(())
}

/// Stale-payload removal followed by archive extraction.
pub fn overlay_build_archive(archive_path: &Path, scratch_dir: &Path) -> Result<()> {
    remove_stale_payload(scratch_dir)?;
    extract_build_archive(archive_path, scratch_dir)
}
