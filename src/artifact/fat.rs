//! mtools file injection for FAT images addressed at a byte offset.
//!
//! mcopy cannot interpret the partition table of a flat card image, so
//! the target filesystem is addressed with mtools' `file@@offset`
//! syntax instead of a device name.

use anyhow::{Context, Result};
use std::path::Path;

use crate::process::Cmd;

/// Byte offset of the FAT filesystem inside the flat card image.
pub const FAT_PARTITION_OFFSET: u64 = 50688;

fn image_at_offset(image: &Path) -> String {
    format!("{}@@{}", image.display(), FAT_PARTITION_OFFSET)
}

/// Copy a file into the FAT filesystem root, overwriting any existing
/// entry.
pub fn inject_file(image: &Path, src: &Path) -> Result<()> {
    Cmd::new("mcopy")
        .args(["-o", "-i", &image_at_offset(image)])
        .arg_path(src)
        .arg("::")
        .error_msg(format!("mcopy failed for {}", src.display()))
        .run()?;
    Ok(())
}

/// Recursively copy a directory tree into the FAT filesystem root.
pub fn inject_dir(image: &Path, src: &Path) -> Result<()> {
    // mcopy resolves relative source directories against the drive,
    // not the host; hand it an absolute path.
    let src = src
        .canonicalize()
        .with_context(|| format!("resolving '{}'", src.display()))?;

    Cmd::new("mcopy")
        .args(["-o", "-s", "-i", &image_at_offset(image)])
        .arg_path(&src)
        .arg("::")
        .error_msg(format!("mcopy failed for {}", src.display()))
        .run()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_at_offset_syntax() {
        let addressed = image_at_offset(Path::new("sd.img"));
        assert_eq!(addressed, "sd.img@@50688");
    }
}
