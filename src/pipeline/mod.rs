//! The linear image build pipeline.
//!
//! Build process:
//! 1. Check the build archive exists and the host tools are present
//! 2. Reset the scratch directory and delete stale outputs
//! 3. Decompress the base image into the working image
//! 4. Materialize the build archive into the image via the configured
//!    overlay strategy
//! 5. Clean up the scratch directory and transient images
//! 6. Duplicate the image for the second storage medium
//! 7. Compare digests of the two outputs

pub mod paths;
pub mod verify;
pub mod workspace;

use anyhow::Result;
use std::path::Path;

use crate::artifact::base_image::decompress_base_image;
use crate::artifact::build_archive::overlay_build_archive;
use crate::artifact::{fat, image, iso};
use crate::config::{BuildConfig, OverlayStrategy};
use crate::preflight;
use crate::process::ensure_exists;
use self::paths::{BuildPaths, BOOT_FILE, PAYLOAD_DIR};

/// Run the full build in `work_dir` from the given build archive.
pub fn run(work_dir: &Path, archive_path: &Path, config: &BuildConfig) -> Result<()> {
    ensure_exists(archive_path, "build archive")?;
    preflight::check_host_tools(config.strategy)?;

    let paths = BuildPaths::new(work_dir);
    workspace::reset_scratch_dir(&paths)?;
    workspace::remove_stale_outputs(&paths)?;

    // Everything from here on can leave transients behind, so hold the
    // result until cleanup has run. A cleanup failure must not mask the
    // phase error that caused it.
    let phase_result = build_working_image(&paths, archive_path, config.strategy);
    let cleanup_result = workspace::cleanup_transients(&paths);
    phase_result?;
    cleanup_result?;

    println!("Duplicating image for the second storage medium...");
    verify::duplicate_image(&paths)?;
    verify::check_output_digests(&paths)?;

    println!(
        "Disk images ready: {} and {}",
        paths.working_image.display(),
        paths.duplicate_image.display()
    );
    Ok(())
}

/// Decompress the base image and overlay the build archive onto it.
fn build_working_image(
    paths: &BuildPaths,
    archive_path: &Path,
    strategy: OverlayStrategy,
) -> Result<()> {
    println!("Decompressing base image...");
    decompress_base_image(&paths.base_image, &paths.working_image)?;

    match strategy {
        OverlayStrategy::OffsetCopy => offset_copy_overlay(paths, archive_path),
        OverlayStrategy::ExtractRepack => extract_repack_overlay(paths, archive_path),
    }
}

/// Inject the archive's payload into the FAT filesystem of a flat copy
/// of the working image, then convert back to qcow2.
fn offset_copy_overlay(paths: &BuildPaths, archive_path: &Path) -> Result<()> {
    println!("Converting working image to raw...");
    image::qcow2_to_raw(&paths.working_image, &paths.raw_image)?;

    println!("Unpacking build archive...");
    overlay_build_archive(archive_path, &paths.scratch_dir)?;

    println!("Injecting files into the FAT filesystem...");
    fat::inject_file(&paths.raw_image, &paths.scratch_dir.join(BOOT_FILE))?;
    fat::inject_dir(&paths.raw_image, &paths.scratch_dir.join(PAYLOAD_DIR))?;

    println!("Converting raw image back to qcow2...");
    image::to_qcow2(&paths.raw_image, &paths.working_image)
}

/// Extract the whole image tree, overlay the archive onto it, and
/// repack through ISO-9660.
fn extract_repack_overlay(paths: &BuildPaths, archive_path: &Path) -> Result<()> {
    println!("Extracting image contents...");
    iso::extract_image_contents(&paths.working_image, &paths.scratch_dir)?;

    println!("Unpacking build archive...");
    overlay_build_archive(archive_path, &paths.scratch_dir)?;

    println!("Repacking through ISO-9660...");
    iso::build_iso9660(&paths.scratch_dir, &paths.iso_image)?;
    image::to_qcow2(&paths.iso_image, &paths.working_image)
}
