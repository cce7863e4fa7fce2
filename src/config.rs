use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// File name of the optional build configuration, looked up in the
/// working directory.
pub const CONFIG_FILENAME: &str = "disk-image.toml";

/// How the build archive is materialized into the working image.
///
/// Both strategies produce equivalent image contents; which one works
/// depends on the tools available on the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayStrategy {
    /// Convert to a flat raw image and inject files at the FAT
    /// partition offset with mcopy.
    OffsetCopy,
    /// Extract the image tree, overlay it, and repack through ISO-9660.
    ExtractRepack,
}

#[derive(Debug, Clone)]
pub struct BuildConfig {
    pub strategy: OverlayStrategy,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            strategy: OverlayStrategy::OffsetCopy,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigToml {
    overlay: Option<OverlayToml>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct OverlayToml {
    strategy: Option<String>,
}

/// Load the build configuration from `disk-image.toml` in `work_dir`.
///
/// A missing file selects the defaults.
pub fn load_config(work_dir: &Path) -> Result<BuildConfig> {
    let config_path = work_dir.join(CONFIG_FILENAME);
    if !config_path.is_file() {
        return Ok(BuildConfig::default());
    }

    let config_bytes = fs::read_to_string(&config_path)
        .with_context(|| format!("reading build config '{}'", config_path.display()))?;
    let parsed: ConfigToml = toml::from_str(&config_bytes)
        .with_context(|| format!("parsing build config '{}'", config_path.display()))?;

    let strategy = match parsed.overlay.and_then(|overlay| overlay.strategy) {
        None => OverlayStrategy::OffsetCopy,
        Some(raw) => parse_strategy(&raw, &config_path)?,
    };

    Ok(BuildConfig { strategy })
}

fn parse_strategy(raw: &str, config_path: &Path) -> Result<OverlayStrategy> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "offset-copy" => Ok(OverlayStrategy::OffsetCopy),
        "extract-repack" => Ok(OverlayStrategy::ExtractRepack),
        other => bail!(
            "invalid build config '{}': unsupported overlay strategy '{}' (expected 'offset-copy' or 'extract-repack')",
            config_path.display(),
            other
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_config_selects_defaults() {
        let temp = TempDir::new().unwrap();
        let config = load_config(temp.path()).unwrap();
        assert_eq!(config.strategy, OverlayStrategy::OffsetCopy);
    }

    #[test]
    fn test_parse_offset_copy() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join(CONFIG_FILENAME),
            "[overlay]\nstrategy = \"offset-copy\"\n",
        )
        .unwrap();
        let config = load_config(temp.path()).unwrap();
        assert_eq!(config.strategy, OverlayStrategy::OffsetCopy);
    }

    #[test]
    fn test_parse_extract_repack() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join(CONFIG_FILENAME),
            "[overlay]\nstrategy = \"extract-repack\"\n",
        )
        .unwrap();
        let config = load_config(temp.path()).unwrap();
        assert_eq!(config.strategy, OverlayStrategy::ExtractRepack);
    }

    #[test]
    fn test_empty_overlay_table_selects_default() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(CONFIG_FILENAME), "[overlay]\n").unwrap();
        let config = load_config(temp.path()).unwrap();
        assert_eq!(config.strategy, OverlayStrategy::OffsetCopy);
    }

    #[test]
    fn test_unknown_strategy_is_rejected() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join(CONFIG_FILENAME),
            "[overlay]\nstrategy = \"guestmount\"\n",
        )
        .unwrap();
        let err = load_config(temp.path()).unwrap_err();
        assert!(format!("{}", err).contains("guestmount"));
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join(CONFIG_FILENAME),
            "[overlay]\nstrategy = \"offset-copy\"\nretries = 3\n",
        )
        .unwrap();
        assert!(load_config(temp.path()).is_err());
    }
}
