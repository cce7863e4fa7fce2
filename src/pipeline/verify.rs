//! Output duplication and the digest gate.
//!
//! The digest comparison is the build's final correctness check. The
//! overlay tools can leave an image inconsistent without reporting
//! failure, and a corrupted working image copied to the duplicate name
//! would otherwise ship silently.

use anyhow::{bail, Context, Result};
use sha2::{Digest, Sha256};
use std::fs;
use std::io;
use std::path::Path;

use super::paths::BuildPaths;

/// Copy the working image byte-for-byte to the duplicate output name.
pub fn duplicate_image(paths: &BuildPaths) -> Result<()> {
    fs::copy(&paths.working_image, &paths.duplicate_image).with_context(|| {
        format!(
            "copying '{}' to '{}'",
            paths.working_image.display(),
            paths.duplicate_image.display()
        )
    })?;
    Ok(())
}

/// Compute the SHA-256 digest of a file, streamed.
pub fn file_digest(path: &Path) -> Result<String> {
    let mut file = fs::File::open(path)
        .with_context(|| format!("opening '{}' for hashing", path.display()))?;
    let mut hasher = Sha256::new();
    io::copy(&mut file, &mut hasher)
        .with_context(|| format!("hashing '{}'", path.display()))?;
    Ok(format!("{:x}", hasher.finalize()))
}

/// Fail the build if the two output images are not byte-identical.
pub fn check_output_digests(paths: &BuildPaths) -> Result<()> {
    let sd_digest = file_digest(&paths.working_image)?;
    let cf_digest = file_digest(&paths.duplicate_image)?;

    if sd_digest != cf_digest {
        bail!(
            "output image digests do not match, failing!\n  {}: {}\n  {}: {}",
            paths.working_image.display(),
            sd_digest,
            paths.duplicate_image.display(),
            cf_digest
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_file_digest_is_stable() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("image");
        fs::write(&path, b"contents").unwrap();

        let first = file_digest(&path).unwrap();
        let second = file_digest(&path).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 64);
    }

    #[test]
    fn test_identical_outputs_pass_the_gate() {
        let temp = TempDir::new().unwrap();
        let paths = BuildPaths::new(temp.path());

        fs::write(&paths.working_image, b"image bytes").unwrap();
        duplicate_image(&paths).unwrap();

        check_output_digests(&paths).unwrap();
    }

    #[test]
    fn test_corrupted_duplicate_fails_the_gate() {
        let temp = TempDir::new().unwrap();
        let paths = BuildPaths::new(temp.path());

        fs::write(&paths.working_image, b"image bytes").unwrap();
        duplicate_image(&paths).unwrap();
        // Corrupt one copy post-duplication, as an inconsistent overlay
        // tool would have.
        fs::write(&paths.duplicate_image, b"image byteZ").unwrap();

        let err = check_output_digests(&paths).unwrap_err();
        assert!(format!("{}", err).contains("do not match"));
    }

    #[test]
    fn test_missing_duplicate_is_an_error() {
        let temp = TempDir::new().unwrap();
        let paths = BuildPaths::new(temp.path());

        fs::write(&paths.working_image, b"image bytes").unwrap();
        assert!(check_output_digests(&paths).is_err());
    }
}
