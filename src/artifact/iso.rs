//! Extract-repack tooling: whole-image extraction and ISO-9660 assembly.

use anyhow::Result;
use std::path::Path;

use crate::process::Cmd;

/// Volume label for the repacked filesystem, matching what cameras
/// write when formatting a card.
const VOLUME_LABEL: &str = "EOS_DIGITAL";

/// Extract an image's filesystem contents into a directory using 7z.
pub fn extract_image_contents(image: &Path, dest_dir: &Path) -> Result<()> {
    Cmd::new("7z")
        .args(["x", "-y", &format!("-o{}", dest_dir.display())])
        .arg_path(image)
        .error_msg(format!("7z extraction failed for {}", image.display()))
        .run()?;
    Ok(())
}

/// Build an ISO-9660 image from a directory tree.
pub fn build_iso9660(source_dir: &Path, output: &Path) -> Result<()> {
    Cmd::new("xorriso")
        .args(["-as", "mkisofs", "-o"])
        .arg_path(output)
        .args(["-V", VOLUME_LABEL])
        .arg_path(source_dir)
        .error_msg("xorriso failed. Install xorriso.")
        .run()?;
    Ok(())
}
