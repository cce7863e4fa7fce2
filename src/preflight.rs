//! Preflight checks for required host tools.
//!
//! Validates that the external imaging tools are present before the
//! pipeline touches any artifact. This prevents cryptic errors during
//! the build process.
//!
//! # Example
//!
//! ```rust
//! use disk_image_builder::preflight::{command_exists, check_required_tools};
//!
//! // Check a single command
//! if !command_exists("qemu-img") {
//!     println!("qemu-utils not installed");
//! }
//!
//! // Check multiple tools
//! let tools = &[("qemu-img", "qemu-utils"), ("mcopy", "mtools")];
//! if let Err(e) = check_required_tools(tools) {
//!     eprintln!("{}", e);
//! }
//! ```

use anyhow::{bail, Result};

use crate::config::OverlayStrategy;

/// Check if a command exists on the host system.
pub fn command_exists(cmd: &str) -> bool {
    which::which(cmd).is_ok()
}

/// Tools needed regardless of overlay strategy.
const COMMON_TOOLS: &[(&str, &str)] = &[("qemu-img", "qemu-utils")];

/// Extra tools for the offset-copy strategy.
const OFFSET_COPY_TOOLS: &[(&str, &str)] = &[("mcopy", "mtools")];

/// Extra tools for the extract-repack strategy.
const EXTRACT_REPACK_TOOLS: &[(&str, &str)] = &[("7z", "p7zip"), ("xorriso", "xorriso")];

/// Host tools the given overlay strategy needs.
///
/// Each tuple is (command_name, package_name).
pub fn required_tools(strategy: OverlayStrategy) -> Vec<(&'static str, &'static str)> {
    let extra = match strategy {
        OverlayStrategy::OffsetCopy => OFFSET_COPY_TOOLS,
        OverlayStrategy::ExtractRepack => EXTRACT_REPACK_TOOLS,
    };
    COMMON_TOOLS.iter().chain(extra.iter()).copied().collect()
}

/// Check that specific tools are available.
///
/// # Arguments
///
/// * `tools` - Slice of (command, package) tuples
///
/// # Returns
///
/// * `Ok(())` if all tools are found
/// * `Err` with list of missing tools and their packages
pub fn check_required_tools(tools: &[(&str, &str)]) -> Result<()> {
    let mut missing = Vec::new();

    for (tool, package) in tools {
        if !command_exists(tool) {
            missing.push((*tool, *package));
        }
    }

    if !missing.is_empty() {
        let msg = missing
            .iter()
            .map(|(t, p)| format!("  {} (install: {})", t, p))
            .collect::<Vec<_>>()
            .join("\n");
        bail!("Missing required host tools:\n{}", msg);
    }

    Ok(())
}

/// Check that the selected overlay strategy's tools are available.
pub fn check_host_tools(strategy: OverlayStrategy) -> Result<()> {
    check_required_tools(&required_tools(strategy))
}
