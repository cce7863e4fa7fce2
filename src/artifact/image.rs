//! qemu-img conversions between image formats.

use anyhow::Result;
use std::path::Path;

use crate::process::Cmd;

/// Convert the qcow2 working image to a flat raw image.
pub fn qcow2_to_raw(qcow2: &Path, raw: &Path) -> Result<()> {
    Cmd::new("qemu-img")
        .arg("convert")
        .arg_path(qcow2)
        .arg_path(raw)
        .error_msg(format!("qemu-img convert failed for {}", qcow2.display()))
        .run()?;
    Ok(())
}

/// Convert a flat raw or ISO image to qcow2.
pub fn to_qcow2(source: &Path, qcow2: &Path) -> Result<()> {
    Cmd::new("qemu-img")
        .args(["convert", "-O", "qcow2"])
        .arg_path(source)
        .arg_path(qcow2)
        .error_msg(format!(
            "qemu-img convert to qcow2 failed for {}",
            source.display()
        ))
        .run()?;
    Ok(())
}
