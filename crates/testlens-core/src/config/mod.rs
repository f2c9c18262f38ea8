//! Configuration: `ScanConfig` plus the `testlens.toml` project file.

pub mod scan_config;

pub use scan_config::ScanConfig;

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::CONFIG_FILE_NAME;
use crate::errors::ConfigLoadError;

/// Top-level shape of `testlens.toml`.
///
/// ```toml
/// [scan]
/// workers = 8
/// timeout_ms = 60000
/// exclude = ["fixtures/**"]
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct TestlensConfig {
    pub scan: ScanConfig,
}

impl TestlensConfig {
    /// Parse a config from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigLoadError> {
        Ok(toml::from_str(content)?)
    }

    /// Load `<root>/testlens.toml`, falling back to defaults when the file is absent.
    pub fn load(root: &Path) -> Result<Self, ConfigLoadError> {
        let path = root.join(CONFIG_FILE_NAME);
        if !path.is_file() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(&path)?;
        let config = Self::from_toml_str(&content)?;
        tracing::debug!(path = %path.display(), "loaded project config");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = TestlensConfig::load(dir.path()).unwrap();
        assert!(config.scan.exclude.is_empty());
        assert_eq!(config.scan.workers, None);
    }

    #[test]
    fn load_reads_scan_table() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "[scan]\nworkers = 3\ntimeout_ms = 1500\nexclude = [\"fixtures/**\"]\n",
        )
        .unwrap();

        let config = TestlensConfig::load(dir.path()).unwrap();
        assert_eq!(config.scan.workers, Some(3));
        assert_eq!(config.scan.timeout_ms, Some(1500));
        assert_eq!(config.scan.exclude, vec!["fixtures/**".to_string()]);
    }

    #[test]
    fn malformed_toml_is_an_error() {
        let err = TestlensConfig::from_toml_str("[scan\nworkers = ").unwrap_err();
        assert!(matches!(err, ConfigLoadError::TomlParse(_)));
    }
}
