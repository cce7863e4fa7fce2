//! Base image materialization.

use anyhow::{Context, Result};
use std::fs;
use std::io;
use std::path::Path;

/// Decompress the xz base image verbatim into the working image.
///
/// No partial-write recovery: a missing or corrupt source aborts the
/// run before any overlay work starts.
pub fn decompress_base_image(base_image: &Path, working_image: &Path) -> Result<()> {
    let input = fs::File::open(base_image)
        .with_context(|| format!("opening base image '{}'", base_image.display()))?;
    let mut decoder = xz2::read::XzDecoder::new(input);

    let mut output = fs::File::create(working_image)
        .with_context(|| format!("creating working image '{}'", working_image.display()))?;

    io::copy(&mut decoder, &mut output)
        .with_context(|| format!("decompressing '{}'", base_image.display()))?;
    Ok(())
}
