//! Path definitions for the image build.
//!
//! Every artifact name is fixed. The downstream emulator and the build
//! system that invokes this tool consume these names directly, so none
//! of them are configurable.

use std::path::{Path, PathBuf};

/// Working image, consumed by the emulator's SD storage slot.
pub const SD_IMAGE: &str = "sd.qcow2";
/// Duplicate image, consumed by the emulator's CF storage slot.
pub const CF_IMAGE: &str = "cf.qcow2";
/// Transient flat image used by the offset-copy strategy.
pub const RAW_IMAGE: &str = "sd.img";
/// Transient ISO used by the extract-repack strategy.
pub const ISO_IMAGE: &str = "sd.iso";
/// Compressed base image, expected one directory above the working directory.
pub const BASE_IMAGE: &str = "sd.qcow2.xz";
/// Staging directory for the image's extracted contents.
pub const SCRATCH_DIR: &str = "qemu_disk_mount";

/// Boot binary expected at the top level of the build archive.
pub const BOOT_FILE: &str = "autoexec.bin";
/// Payload tree expected at the top level of the build archive.
pub const PAYLOAD_DIR: &str = "ML";

/// Paths used during a build, all derived from one working directory.
pub struct BuildPaths {
    /// Read-only compressed base image, never mutated.
    pub base_image: PathBuf,
    /// Mutable work-in-progress image, recreated each run.
    pub working_image: PathBuf,
    /// Byte-identical copy of the working image.
    pub duplicate_image: PathBuf,
    /// Flat raw image, exists only during the offset-copy overlay.
    pub raw_image: PathBuf,
    /// ISO-9660 image, exists only during the extract-repack overlay.
    pub iso_image: PathBuf,
    /// Leftover compressed working image from an interrupted prior run.
    pub stale_compressed_image: PathBuf,
    /// Transient staging tree, removed by the end of every run.
    pub scratch_dir: PathBuf,
}

impl BuildPaths {
    /// Create paths relative to the working directory.
    pub fn new(work_dir: &Path) -> Self {
        Self {
            base_image: work_dir.join("..").join(BASE_IMAGE),
            working_image: work_dir.join(SD_IMAGE),
            duplicate_image: work_dir.join(CF_IMAGE),
            raw_image: work_dir.join(RAW_IMAGE),
            iso_image: work_dir.join(ISO_IMAGE),
            stale_compressed_image: work_dir.join(BASE_IMAGE),
            scratch_dir: work_dir.join(SCRATCH_DIR),
        }
    }
}
